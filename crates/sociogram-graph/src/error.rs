//! Error types for directory lookups and ingestion.

use sociogram_core::{ParseError, UserId};
use thiserror::Error;

/// Lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("user {0} not found")]
    NotFound(UserId),
}

/// Failures that stop an ingestion run.
///
/// Malformed lines and unresolved edges only surface here under
/// [`IngestPolicy::Strict`](crate::IngestPolicy::Strict); the lenient
/// policy counts and skips them.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: ParseError,
    },

    #[error("line {line}: FRIEND {from} {to} references unknown user {missing}")]
    UnresolvedEdge {
        line: usize,
        from: UserId,
        to: UserId,
        missing: UserId,
    },

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}
