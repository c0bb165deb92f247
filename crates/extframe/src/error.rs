use std::error;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures within the envelope codec itself.
#[derive(Debug)]
pub enum Error {
    /// The envelope could not be serialized to JSON.
    Encode(serde_json::Error),
    /// The payload was not a valid envelope.
    Decode(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "Envelope encode error: {}", e),
            Self::Decode(e) => write!(f, "Envelope decode error: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}
