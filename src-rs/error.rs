use thiserror::Error;

/// Failure talking to one of the task endpoints.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response carried no task id")]
    MissingTaskId,

    #[error("token is not a valid header value")]
    InvalidToken,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Why tracking a command stopped without a result.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("submission failed: {0}")]
    Submission(#[source] BackendError),

    #[error("polling task {task_id} failed: {source}")]
    Polling {
        task_id: String,
        #[source]
        source: BackendError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    #[error("invalid number for {key}: {value}")]
    InvalidNumber { key: String, value: String },

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}
