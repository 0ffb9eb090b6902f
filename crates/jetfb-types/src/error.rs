use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Integral `{kernel}` over [{lower:e}, {upper:e}] failed: {message}")]
    Integration {
        kernel: String,
        lower: f64,
        upper: f64,
        message: String,
    },

    /// Only raised by strict lookups; the pipeline clamps to the table edges.
    #[error("{table} lookup at {value:e} outside [{min:e}, {max:e}]")]
    InterpolationOutOfRange {
        table: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("No jet escaped its host: {stuck} of {sampled} sampled sources are stuck")]
    SamplingDegeneracy { sampled: usize, stuck: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeedbackError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        FeedbackError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type FeedbackResult<T> = Result<T, FeedbackError>;
