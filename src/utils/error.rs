use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Invalid line format on line {line}: \"{text}\"")]
    InvalidLine { line: usize, text: String },

    #[error("Duplicate activity \"{name}\" on line {line}: \"{text}\"")]
    DuplicateActivity {
        name: String,
        line: usize,
        text: String,
    },

    #[error("Undefined activity \"{name}\" on line {line}: \"{text}\"")]
    UndefinedActivity {
        name: String,
        line: usize,
        text: String,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Verification channel error: {message}")]
    ChannelError { message: String },

    #[error("Command {job_id} not yet visible on the remote target")]
    JobNotVisible { job_id: String },
}

impl MetricsError {
    /// Syntax errors reject the whole model upstream instead of degrading
    /// into a metric value.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            MetricsError::InvalidLine { .. }
                | MetricsError::DuplicateActivity { .. }
                | MetricsError::UndefinedActivity { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;
