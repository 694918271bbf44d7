//! # Adapter Errors
//!
//! The adapter never invents errors for the requests it runs: construction and
//! operation failures come back as the caller's own error type, unchanged.
//! The types here cover the two places where the crate itself has something
//! to report.

use std::error::Error as StdError;

/// A client failed to release its resources.
///
/// Disposal failures are never returned from a request. They are logged and
/// handed to the optional observer registered on the
/// [`ClientFactory`](crate::ClientFactory), nothing more.
#[derive(Debug, thiserror::Error)]
#[error("failed to close {client}: {source}")]
pub struct DisposalError {
    client: &'static str,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl DisposalError {
    pub(crate) fn new<E>(client: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            client,
            source: Box::new(source),
        }
    }

    /// Short type name of the client that failed to close.
    pub fn client(&self) -> &'static str {
        self.client
    }
}

/// Why a [`RequestContext`](crate::RequestContext) stopped a piece of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("socket already closed")]
    struct SocketError;

    #[test]
    fn disposal_error_keeps_source() {
        let err = DisposalError::new("StorageClient", SocketError);
        assert_eq!(err.client(), "StorageClient");
        assert_eq!(
            err.to_string(),
            "failed to close StorageClient: socket already closed"
        );
        assert!(err.source().is_some());
    }
}
