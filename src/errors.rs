use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForgeError>;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error("generation service rate limited: {0}")]
    RateLimited(String),

    #[error("generation service error: {0}")]
    Service(String),

    #[error("generation service returned no usable candidates")]
    EmptyCompletion,

    #[error("audio payload decode failed: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Other(String),
}

impl ForgeError {
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Short user-facing status line for the presenter. Rate-limit failures
    /// must stay actionable; everything else collapses to a generic advisory.
    pub fn advisory(&self) -> &'static str {
        match self {
            Self::MissingConfig(_) => "forge offline: credential missing",
            Self::EmptyPrompt => "transmission empty: provide a directive",
            Self::RateLimited(_) => "signal saturated: quota reached, try again later",
            Self::Decode(_) => "audio unavailable",
            _ => "transmission interrupted: unknown error",
        }
    }
}

impl From<anyhow::Error> for ForgeError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(value.to_string())
    }
}
