use thiserror::Error;

#[derive(Error, Debug)]
pub enum RotationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Insufficient overlap: need {required} common dates, got {got}")]
    InsufficientOverlap { required: usize, got: usize },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}
