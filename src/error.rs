use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaseError {
    /// The API answered with a structured error body
    #[error(
        "error occurred while calling MikroTik API: {}{}",
        .message,
        detail_suffix(.detail)
    )]
    Service {
        status: u16,
        code: i64,
        message: String,
        detail: Option<String>,
    },
    /// The API answered with an error status and a body that is not an error object
    #[error("unknown error, status code [{status}]: {source}")]
    UnknownStatus {
        status: u16,
        source: serde_json::Error,
    },
    /// A successful response carried a malformed lease list
    #[error("malformed lease response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("invalid lease endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("lease request cancelled")]
    Cancelled,
}

impl LeaseError {
    /// HTTP status of the failed response, if the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } | Self::UnknownStatus { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => format!(": {detail}"),
        _ => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {0:?}: {1}")]
    Read(PathBuf, #[source] io::Error),
    #[error("invalid configuration at line {line}: {content:?}")]
    Syntax { line: usize, content: String },
    #[error("missing credentials: {0} must be specified")]
    MissingCredential(&'static str),
    #[error("at least one zone must be specified")]
    MissingZone,
    #[error("invalid mikrotik-url {0:?}: {1}")]
    InvalidUrl(String, #[source] url::ParseError),
}
