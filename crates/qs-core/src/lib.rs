pub mod error;
pub mod request;
pub mod stats;
pub mod time;

pub use error::{CalibrationError, ConfigError};
pub use request::Request;
pub use stats::{DeviceStatistics, SourceStatistics};
pub use time::Time;
