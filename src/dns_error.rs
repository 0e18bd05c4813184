use thiserror::Error;

use crate::error::LeaseError;
use crate::libdns::{proto::op::ResponseCode, resolver::error::ResolveError};

/// A query could not be answered.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DnsError {
    /// The lease source failed, the error is passed through untouched
    #[error(transparent)]
    Lease(#[from] LeaseError),
    /// The upstream resolver failed
    #[error("forward lookup failed: {0}")]
    Forward(#[from] ResolveError),
    /// Every stage delegated and nothing followed
    #[error("no next handler found")]
    NoNextHandler,
    #[error("query cancelled")]
    Cancelled,
    #[error("a response was already written for this query")]
    ResponseAlreadyWritten,
}

impl DnsError {
    /// Any failure is reported to the client as a server failure.
    #[inline]
    pub fn response_code(&self) -> ResponseCode {
        ResponseCode::ServFail
    }
}
