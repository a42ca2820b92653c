use thiserror::Error;

/// Input rejected before anything reaches the store.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a title is required")]
    MissingTitle,
    #[error("a date is required")]
    MissingDate,
    #[error("text is required")]
    MissingText,
    #[error("a weekly routine needs at least one weekday")]
    NoWeekdaySelected,
    #[error("weekday {0} is outside 0..=6")]
    WeekdayOutOfRange(u8),
}

#[derive(Debug, Error)]
pub enum DdayError {
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, DdayError>;
