use thiserror::Error;

/// Errors produced while parsing a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("duplicate header: {0}")]
    DuplicateHeader(&'static str),

    #[error("unknown header: {0}")]
    UnknownHeader(String),

    #[error("malformed number for header {header}: {token:?}")]
    MalformedNumber { header: &'static str, token: String },

    #[error("invalid mode: {0:?} (expected \"deterministic\" or \"exponential\")")]
    InvalidMode(String),

    #[error("Sources: header must list at least one source period")]
    EmptySources,

    #[error("Devices: header must list at least one device coefficient")]
    EmptyDevices,

    #[error("Buffer: capacity must be a non-negative integer")]
    NonPositiveCapacity,

    #[error("Requests: target request count must be positive")]
    NonPositiveTarget,
}

/// Errors produced by the auto-calibration driver.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error(
        "observed rejection probability {observed} is too small to estimate a stable target"
    )]
    ProbabilityTooSmall { observed: f64 },

    #[error(
        "auto-calibration overshoot: next target {next_target} exceeds max_requests {max_requests}"
    )]
    Overshoot { next_target: u64, max_requests: u64 },
}
