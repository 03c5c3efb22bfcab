use thiserror::Error;

use crate::config::ConfigError;

/// Everything a call against the word API can fail with.
///
/// A 404 from the service is not represented here: it is a valid
/// "not found" answer and comes back as [`serde_json::Value::Null`].
#[derive(Debug, Error)]
pub enum Error {
    /// The word argument was empty or only whitespace.
    #[error("{operation} expects a non-blank word")]
    InvalidArgument { operation: &'static str },

    /// No response arrived before the deadline, or the transport failed.
    #[error("TIMEOUT: api call to {url} got no response ({reason})")]
    Timeout { url: String, reason: String },

    #[error("unauthorized API request to {url}; have you specified your API key?")]
    Unauthorized { url: String },

    /// Any status other than 200, 401 or 404.
    #[error("can't connect to the api: {url} response code: {status}")]
    Api { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// The HTTP status the service answered with, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
