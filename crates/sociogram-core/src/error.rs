//! Errors raised while parsing dataset lines.

use thiserror::Error;

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// A line started with a known directive but its arguments were unusable.
///
/// Lines with an unknown directive are not errors; they are skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{directive} is missing a user id")]
    MissingId { directive: &'static str },

    #[error("{directive} has an invalid user id: {value:?}")]
    InvalidId {
        directive: &'static str,
        value: String,
    },
}

impl ParseError {
    /// The directive whose arguments failed to parse.
    pub fn directive(&self) -> &'static str {
        match self {
            ParseError::MissingId { directive } => directive,
            ParseError::InvalidId { directive, .. } => directive,
        }
    }
}
