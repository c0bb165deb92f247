use std::error;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::error::Result;

/// Well-known values for [`RemoteError::name`].
///
/// These are part of the wire contract: both endpoints match on the string,
/// not on any local type.
pub mod names {
    /// An inbound request referenced a proxy id with no registered instance.
    pub const UNKNOWN_PROXY: &str = "UnknownProxyIdentifier";
    /// The registered instance has no such method.
    pub const METHOD_NOT_FOUND: &str = "MethodNotFound";
    /// The method exists but is deliberately not implemented on this side.
    pub const METHOD_NOT_SUPPORTED: &str = "MethodNotSupported";
    /// A command id had no handler.
    pub const COMMAND_NOT_FOUND: &str = "CommandNotFound";
    /// The remote method threw or panicked.
    pub const REMOTE_METHOD_THREW: &str = "RemoteMethodThrew";
}

/// An error as it travels over the wire.
///
/// Only the message is guaranteed to survive serialization; `name` is
/// best-effort taxonomy, stack traces are not carried at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), name: None }
    }

    pub fn with_name(name: &str, message: impl Into<String>) -> Self {
        Self { message: message.into(), name: Some(name.to_string()) }
    }

    /// True if the error carries the given well-known name.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}: {}", name, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl error::Error for RemoteError {}

/// One frame on the wire.
///
/// Serialized as a JSON object tagged by `type`. Field names are camelCase on
/// the wire; unknown extra fields are ignored on decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Envelope {
    #[serde(rename = "request", rename_all = "camelCase")]
    Request {
        call_id: u64,
        proxy_id: String,
        method: String,
        #[serde(default)]
        args: Vec<Value>,
    },
    #[serde(rename = "reply", rename_all = "camelCase")]
    Reply {
        call_id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<RemoteError>,
    },
}

impl Envelope {
    pub fn request(call_id: u64, proxy_id: &str, method: &str, args: Vec<Value>) -> Self {
        Self::Request {
            call_id,
            proxy_id: proxy_id.to_string(),
            method: method.to_string(),
            args,
        }
    }

    pub fn reply_ok(call_id: u64, result: Value) -> Self {
        Self::Reply { call_id, result: Some(result), error: None }
    }

    pub fn reply_err(call_id: u64, error: RemoteError) -> Self {
        Self::Reply { call_id, result: None, error: Some(error) }
    }

    /// The correlation id, regardless of frame kind.
    pub fn call_id(&self) -> u64 {
        match self {
            Self::Request { call_id, .. } => *call_id,
            Self::Reply { call_id, .. } => *call_id,
        }
    }

    /// Serializes the envelope to its wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::Encode)
    }

    /// Parses an envelope from wire bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Error::Decode)
    }
}
