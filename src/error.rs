use thiserror::Error;

/// A parameter set rejected when it was constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} deceleration must be a finite magnitude of at least 0.001 m/s², got {value}")]
    InvalidDeceleration { name: &'static str, value: f64 },

    #[error("{name} must be finite and non-negative, got {value}")]
    NegativeOrNonFinite { name: &'static str, value: f64 },

    #[error("hysteresis factor must be finite and at least 1, got {0}")]
    InvalidHysteresis(f64),

    #[error("yaw difference threshold must lie in [0, pi], got {0}")]
    InvalidYawThreshold(f64),
}

/// An input that cannot be evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInput {
    #[error("trajectory is empty")]
    EmptyTrajectory,

    #[error("time decreases at sample {index}: {previous} -> {current}")]
    NonMonotonicTime {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("sample {index} contains a non-finite value")]
    NonFiniteSample { index: usize },

    #[error("vehicle dimensions must be positive and finite")]
    InvalidDimensions,

    #[error("footprint has no area")]
    DegenerateFootprint,

    #[error("margins must be finite and non-negative, got lon {lon}, lat {lat}")]
    InvalidMargins { lon: f64, lat: f64 },

    #[error("closing speed gain must be finite and non-negative, got {0}")]
    InvalidClosingSpeedGain(f64),
}

/// A failure to evaluate the ego plan as a whole.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("invalid ego trajectory: {0}")]
    EgoTrajectory(InvalidInput),

    #[error("invalid ego shape: {0}")]
    EgoShape(InvalidInput),

    #[error("invalid margin policy: {0}")]
    MarginPolicy(InvalidInput),
}
