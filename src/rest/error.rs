use std::{io, path::PathBuf};

use thiserror::Error;

use crate::screenplay::AbilityMissing;

/// Failure of the HTTP exchange itself, raised by the transport or by
/// decoding the response body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("reading response body from {url} failed")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not decode {status} response body from {url} as {target}")]
    Decode {
        url: String,
        status: u16,
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            TransportError::Timeout { url, source }
        } else if source.is_connect() {
            TransportError::Connect { url, source }
        } else if source.is_body() || source.is_decode() {
            TransportError::Body { url, source }
        } else {
            TransportError::Request { url, source }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, TransportError::Connect { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, TransportError::Decode { .. })
    }
}

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("creating dump directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("reading dump directory {}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("writing dump file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("serializing capture record")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RestError {
    #[error(transparent)]
    AbilityMissing(#[from] AbilityMissing),
    #[error("invalid base URL {base_url}")]
    InvalidBaseUrl {
        base_url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("building HTTP client")]
    Client(#[source] reqwest::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RestError {
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            RestError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_missing_is_transparent() {
        let err = RestError::from(AbilityMissing {
            actor: "Rita".to_string(),
            ability: "CallRestApi",
        });
        assert_eq!(
            err.to_string(),
            "actor Rita does not have the ability CallRestApi"
        );
        assert!(err.as_transport().is_none());
    }

    #[test]
    fn decode_error_names_target_type() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = RestError::from(TransportError::Decode {
            url: "http://localhost/n".to_string(),
            status: 200,
            target: "u32",
            source,
        });
        assert!(err.as_transport().is_some_and(TransportError::is_decode));
        assert_eq!(
            err.to_string(),
            "could not decode 200 response body from http://localhost/n as u32"
        );
    }
}
