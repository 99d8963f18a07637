//! Sociogram Core - Ingestion records for the social graph
//!
//! This crate knows how to read the line-oriented dataset format that
//! feeds a Sociogram network. It has no notion of the directory or the
//! friendship graph; it only turns text into [`Record`] values.
//!
//! # Format
//!
//! ```text
//! USER 101
//! USER 102
//! FRIEND 101 102
//! ```
//!
//! Lines whose first token is neither `USER` nor `FRIEND` are ignored.
//!
//! # Example
//!
//! ```
//! use sociogram_core::Record;
//!
//! let record = Record::parse_line("FRIEND 101 102").unwrap();
//! assert_eq!(record, Some(Record::Friend(101, 102)));
//! ```

mod error;
mod record;

pub use error::{ParseError, Result};
pub use record::{Directive, Record, UserId};
