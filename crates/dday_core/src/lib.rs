pub mod calendar;
pub mod clock;
pub mod completion;
pub mod countdown;
pub mod error;
pub mod feed;
pub mod holiday;
pub mod model;
pub mod routine;
pub mod service;
pub mod session;
pub mod store;

pub use crate::service::{DdayService, DdayServiceBuilder};
