pub mod build;
pub mod calibration;
pub mod parser;

pub use build::build_simulator;
pub use calibration::{CalibrationOutcome, auto_calibrate};
pub use parser::{Mode, RawConfig, parse};
