use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("No work: {0}")]
    NoWork(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Network failures, timeouts and non-success upstream statuses
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Errors that are expected on every cycle of an idle or unconfigured
    /// deployment and should not be reported loudly.
    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::NoWork(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if err.is_timeout() {
            return Self::Transport(format!("request timed out: {err}"));
        }
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
