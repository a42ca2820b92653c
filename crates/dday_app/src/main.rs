use dday_app::app::{run, AppConfig};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration, falling back to defaults");
            AppConfig::default()
        }
    };
    if let Err(err) = run(config) {
        eprintln!("Failed to render dashboard: {err:#}");
        std::process::exit(1);
    }
}
