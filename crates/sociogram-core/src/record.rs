//! Dataset records.
//!
//! Each non-ignored line of a dataset becomes one `Record`. The parser is
//! deliberately forgiving about everything except the ids themselves:
//! surrounding whitespace and trailing tokens are dropped, and unknown
//! directives are skipped rather than rejected.

use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};
use std::str::SplitWhitespace;

/// Identifier of a user in the directory.
pub type UserId = i64;

/// The keyword that opens a dataset line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// `USER <id>` creates a user.
    User,

    /// `FRIEND <id1> <id2>` links two existing users.
    Friend,
}

impl Directive {
    /// Matches the first token of a line against the known keywords.
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "USER" => Some(Self::User),
            "FRIEND" => Some(Self::Friend),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Friend => "FRIEND",
        }
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One parsed dataset line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Record {
    /// Insert a user with this id.
    User(UserId),

    /// Create an undirected friendship between two ids.
    Friend(UserId, UserId),
}

impl Record {
    /// Parses a single line.
    ///
    /// Returns `Ok(None)` for blank lines and lines with an unknown
    /// directive. A known directive with a missing or non-integer id is a
    /// [`ParseError`].
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let mut tokens = line.split_whitespace();

        let directive = match tokens.next().and_then(Directive::from_keyword) {
            Some(directive) => directive,
            None => return Ok(None),
        };

        let record = match directive {
            Directive::User => Record::User(next_id(&mut tokens, directive)?),
            Directive::Friend => {
                let a = next_id(&mut tokens, directive)?;
                let b = next_id(&mut tokens, directive)?;
                Record::Friend(a, b)
            }
        };

        Ok(Some(record))
    }

    /// The directive this record was parsed from.
    pub fn directive(&self) -> Directive {
        match self {
            Record::User(_) => Directive::User,
            Record::Friend(_, _) => Directive::Friend,
        }
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Record::User(id) => write!(f, "USER {}", id),
            Record::Friend(a, b) => write!(f, "FRIEND {} {}", a, b),
        }
    }
}

fn next_id(tokens: &mut SplitWhitespace<'_>, directive: Directive) -> Result<UserId> {
    let token = tokens.next().ok_or(ParseError::MissingId {
        directive: directive.as_str(),
    })?;

    token.parse().map_err(|_| ParseError::InvalidId {
        directive: directive.as_str(),
        value: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user() {
        assert_eq!(Record::parse_line("USER 101"), Ok(Some(Record::User(101))));
        assert_eq!(
            Record::parse_line("  USER   -7  \n"),
            Ok(Some(Record::User(-7)))
        );
    }

    #[test]
    fn test_parse_friend() {
        assert_eq!(
            Record::parse_line("FRIEND 101 102"),
            Ok(Some(Record::Friend(101, 102)))
        );
    }

    #[test]
    fn test_trailing_tokens_are_ignored() {
        assert_eq!(
            Record::parse_line("FRIEND 1 2 3 extra"),
            Ok(Some(Record::Friend(1, 2)))
        );
        assert_eq!(Record::parse_line("USER 5 6"), Ok(Some(Record::User(5))));
    }

    #[test]
    fn test_unknown_lines_are_skipped() {
        assert_eq!(Record::parse_line(""), Ok(None));
        assert_eq!(Record::parse_line("   "), Ok(None));
        assert_eq!(Record::parse_line("# comment"), Ok(None));
        assert_eq!(Record::parse_line("user 101"), Ok(None));
        assert_eq!(Record::parse_line("FOLLOW 1 2"), Ok(None));
    }

    #[test]
    fn test_malformed_ids() {
        assert_eq!(
            Record::parse_line("USER"),
            Err(ParseError::MissingId { directive: "USER" })
        );
        assert_eq!(
            Record::parse_line("FRIEND 101"),
            Err(ParseError::MissingId {
                directive: "FRIEND"
            })
        );

        let err = Record::parse_line("FRIEND 101 abc").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidId {
                directive: "FRIEND",
                value: "abc".to_string()
            }
        );
        assert_eq!(err.directive(), "FRIEND");
    }

    #[test]
    fn test_display_matches_dataset_syntax() {
        assert_eq!(Record::User(3).to_string(), "USER 3");
        assert_eq!(Record::Friend(3, 4).to_string(), "FRIEND 3 4");
        assert_eq!(Record::Friend(3, 4).directive(), Directive::Friend);
    }

    #[test]
    fn test_record_json() {
        let friend = serde_json::to_value(Record::Friend(3, 4)).unwrap();
        assert_eq!(friend, serde_json::json!({ "friend": [3, 4] }));

        let user: Record = serde_json::from_str(r#"{ "user": 101 }"#).unwrap();
        assert_eq!(user, Record::User(101));
    }
}
