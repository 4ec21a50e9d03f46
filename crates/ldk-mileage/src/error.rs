use std::fmt;

/// Failures of the HTTP clients. The resolver logs these and moves on to the
/// next tier; they never reach pricing.
#[derive(Debug)]
pub enum MileageError {
    /// Connection, TLS or timeout failure.
    Transport(String),
    /// Non-success HTTP status or an error payload.
    Api { status: Option<u16>, message: String },
    /// Response body did not have the expected shape.
    Decode(String),
}

impl fmt::Display for MileageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MileageError::Transport(msg) => write!(f, "transport error: {msg}"),
            MileageError::Api {
                status: Some(s),
                message,
            } => write!(f, "api error status={s}: {message}"),
            MileageError::Api {
                status: None,
                message,
            } => write!(f, "api error: {message}"),
            MileageError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for MileageError {}

impl From<reqwest::Error> for MileageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            MileageError::Decode(e.to_string())
        } else {
            MileageError::Transport(e.to_string())
        }
    }
}
