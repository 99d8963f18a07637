//! Network builder: the ingestion phase.
//!
//! The builder owns the directory while it is still mutable. Users are
//! inserted, friendships are appended, and `build` freezes the result
//! into a read-only [`Network`] for analytics.

use crate::directory::{Directory, NodeIndex};
use crate::error::{GraphError, IngestError};
use crate::network::Network;
use crate::traversal::TraversalStrategy;
use crate::user::User;
use serde::{Deserialize, Serialize};
use sociogram_core::{Record, UserId};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// What ingestion does with lines it cannot use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPolicy {
    /// Skip malformed lines and unresolved edges, counting them in the report.
    #[default]
    Lenient,

    /// Fail on the first malformed line or unresolved edge.
    Strict,
}

/// Result of creating an undirected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Both endpoints resolved and each was appended to the other's list.
    Linked,

    /// An endpoint is not in the directory; nothing was changed.
    Unresolved { missing: UserId },
}

/// Result of applying one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    User(NodeIndex),
    Edge(EdgeOutcome),
}

/// A line that ingestion skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: String,
}

/// Counters from one ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Lines read, including ignored ones.
    pub lines: usize,
    pub users_inserted: usize,
    pub edges_linked: usize,
    /// Blank lines and lines with an unknown directive.
    pub lines_ignored: usize,
    pub malformed_lines: usize,
    pub unresolved_edges: usize,
    /// Malformed lines and unresolved edges, in file order.
    pub skipped: Vec<SkippedLine>,
}

/// Mutable network under construction.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    directory: Directory,
    policy: IngestPolicy,
    strategy: TraversalStrategy,
}

impl NetworkBuilder {
    /// Creates an empty builder with the lenient policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ingestion policy.
    pub fn with_policy(mut self, policy: IngestPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the traversal strategy the built network will use.
    pub fn with_strategy(mut self, strategy: TraversalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn policy(&self) -> IngestPolicy {
        self.policy
    }

    /// Read access to the directory built so far.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Inserts a new user. Duplicate ids create another node.
    pub fn insert_user(&mut self, id: UserId) -> NodeIndex {
        self.directory.insert(id)
    }

    /// Looks up a user by id.
    pub fn search_user(&self, id: UserId) -> Result<&User, GraphError> {
        self.directory
            .search(id)
            .map(|index| self.directory.user(index))
            .ok_or(GraphError::NotFound(id))
    }

    /// Appends `b` to `a`'s friend list. One direction only.
    ///
    /// # Panics
    ///
    /// Panics if either index was not handed out by this builder.
    pub fn add_friend(&mut self, a: NodeIndex, b: NodeIndex) {
        assert!(
            b.index() < self.directory.len(),
            "friend index {:?} is not in this directory",
            b
        );
        self.directory.user_mut(a).push_friend(b);
    }

    /// Creates an undirected friendship between two ids.
    ///
    /// Both ids are resolved first; if either is missing the edge is
    /// dropped and neither friend list changes.
    pub fn connect(&mut self, a: UserId, b: UserId) -> EdgeOutcome {
        let Some(ua) = self.directory.search(a) else {
            return EdgeOutcome::Unresolved { missing: a };
        };
        let Some(ub) = self.directory.search(b) else {
            return EdgeOutcome::Unresolved { missing: b };
        };

        self.add_friend(ua, ub);
        self.add_friend(ub, ua);
        EdgeOutcome::Linked
    }

    /// Applies a single parsed record.
    pub fn apply(&mut self, record: Record) -> Applied {
        match record {
            Record::User(id) => Applied::User(self.insert_user(id)),
            Record::Friend(a, b) => Applied::Edge(self.connect(a, b)),
        }
    }

    /// Ingests a line-oriented dataset.
    ///
    /// Under the lenient policy this only fails on read errors. Bytes that
    /// are not valid UTF-8 are replaced before parsing, so such a line is
    /// ignored or malformed like any other.
    pub fn ingest<R: BufRead>(&mut self, mut reader: R) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            report.lines += 1;
            let line_no = report.lines;
            let line = String::from_utf8_lossy(&buf);

            let record = match Record::parse_line(&line) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    report.lines_ignored += 1;
                    continue;
                }
                Err(source) => {
                    if self.policy == IngestPolicy::Strict {
                        return Err(IngestError::Malformed {
                            line: line_no,
                            source,
                        });
                    }
                    debug!("Skipping malformed line {}: {}", line_no, source);
                    report.malformed_lines += 1;
                    report.skipped.push(SkippedLine {
                        line: line_no,
                        reason: source.to_string(),
                    });
                    continue;
                }
            };

            match self.apply(record) {
                Applied::User(_) => report.users_inserted += 1,
                Applied::Edge(EdgeOutcome::Linked) => report.edges_linked += 1,
                Applied::Edge(EdgeOutcome::Unresolved { missing }) => {
                    let Record::Friend(from, to) = record else {
                        continue;
                    };
                    if self.policy == IngestPolicy::Strict {
                        return Err(IngestError::UnresolvedEdge {
                            line: line_no,
                            from,
                            to,
                            missing,
                        });
                    }
                    debug!(
                        "Dropping edge {} -> {} on line {}: user {} not found",
                        from, to, line_no, missing
                    );
                    report.unresolved_edges += 1;
                    report.skipped.push(SkippedLine {
                        line: line_no,
                        reason: format!("user {} not found", missing),
                    });
                }
            }
        }

        info!(
            "Ingested {} users and {} friendships ({} lines skipped)",
            report.users_inserted,
            report.edges_linked,
            report.skipped.len()
        );

        Ok(report)
    }

    /// Ingests a dataset held in memory.
    pub fn ingest_str(&mut self, text: &str) -> Result<IngestReport, IngestError> {
        self.ingest(text.as_bytes())
    }

    /// Ingests a dataset file.
    pub fn ingest_file<P: AsRef<Path>>(&mut self, path: P) -> Result<IngestReport, IngestError> {
        let file = File::open(path)?;
        self.ingest(BufReader::new(file))
    }

    /// Freezes the builder into a read-only network.
    pub fn build(self) -> Network {
        Network::new(self.directory, self.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn friend_ids(builder: &NetworkBuilder, id: UserId) -> Vec<UserId> {
        let user = builder.search_user(id).unwrap();
        user.friend_nodes()
            .iter()
            .map(|&n| builder.directory().get(n).unwrap().id())
            .collect()
    }

    #[test]
    fn test_add_friend_is_one_directional() {
        let mut builder = NetworkBuilder::new();
        let a = builder.insert_user(1);
        let b = builder.insert_user(2);

        builder.add_friend(a, b);
        assert_eq!(friend_ids(&builder, 1), vec![2]);
        assert!(friend_ids(&builder, 2).is_empty());

        builder.add_friend(b, a);
        assert_eq!(friend_ids(&builder, 2), vec![1]);
        assert_eq!(friend_ids(&builder, 1), vec![2]);
    }

    #[test]
    fn test_connect_links_both_sides() {
        let mut builder = NetworkBuilder::new();
        builder.insert_user(1);
        builder.insert_user(2);

        assert_eq!(builder.connect(1, 2), EdgeOutcome::Linked);
        assert_eq!(friend_ids(&builder, 1), vec![2]);
        assert_eq!(friend_ids(&builder, 2), vec![1]);
    }

    #[test]
    fn test_connect_twice_keeps_duplicates() {
        let mut builder = NetworkBuilder::new();
        builder.insert_user(1);
        builder.insert_user(2);
        builder.connect(1, 2);
        builder.connect(2, 1);

        assert_eq!(friend_ids(&builder, 1), vec![2, 2]);
        assert_eq!(friend_ids(&builder, 2), vec![1, 1]);
    }

    #[test]
    fn test_connect_unresolved_changes_nothing() {
        let mut builder = NetworkBuilder::new();
        builder.insert_user(101);

        assert_eq!(
            builder.connect(101, 999),
            EdgeOutcome::Unresolved { missing: 999 }
        );
        assert_eq!(
            builder.connect(998, 101),
            EdgeOutcome::Unresolved { missing: 998 }
        );
        assert!(friend_ids(&builder, 101).is_empty());
    }

    #[test]
    fn test_search_user_not_found() {
        let builder = NetworkBuilder::new();
        assert_eq!(
            builder.search_user(5).unwrap_err(),
            GraphError::NotFound(5)
        );
    }

    #[test]
    fn test_ingest_counts_everything() {
        let data = "USER 101\nUSER 102\nUSER 103\nFRIEND 101 102\n\n# note\nFRIEND 101 999\nUSER x\n";
        let mut builder = NetworkBuilder::new();
        let report = builder.ingest_str(data).unwrap();

        assert_eq!(report.lines, 8);
        assert_eq!(report.users_inserted, 3);
        assert_eq!(report.edges_linked, 1);
        assert_eq!(report.lines_ignored, 2);
        assert_eq!(report.unresolved_edges, 1);
        assert_eq!(report.malformed_lines, 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].line, 7);
        assert_eq!(report.skipped[1].line, 8);

        assert_eq!(friend_ids(&builder, 101), vec![102]);
        assert!(builder.search_user(103).is_ok());
    }

    #[test]
    fn test_edge_before_user_is_dropped() {
        let mut builder = NetworkBuilder::new();
        let report = builder
            .ingest_str("USER 1\nFRIEND 1 2\nUSER 2\n")
            .unwrap();

        assert_eq!(report.unresolved_edges, 1);
        assert!(friend_ids(&builder, 1).is_empty());
        assert!(friend_ids(&builder, 2).is_empty());
    }

    #[test]
    fn test_strict_policy_rejects_malformed_line() {
        let mut builder = NetworkBuilder::new().with_policy(IngestPolicy::Strict);
        let err = builder.ingest_str("USER 1\nFRIEND 1\n").unwrap_err();

        assert!(matches!(err, IngestError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_strict_policy_rejects_unresolved_edge() {
        let mut builder = NetworkBuilder::new().with_policy(IngestPolicy::Strict);
        let err = builder.ingest_str("USER 101\nFRIEND 101 999\n").unwrap_err();

        match err {
            IngestError::UnresolvedEdge {
                line,
                from,
                to,
                missing,
            } => {
                assert_eq!((line, from, to, missing), (2, 101, 999, 999));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strict_policy_still_ignores_unknown_directives() {
        let mut builder = NetworkBuilder::new().with_policy(IngestPolicy::Strict);
        let report = builder.ingest_str("HELLO\nUSER 1\n").unwrap();

        assert_eq!(report.lines_ignored, 1);
        assert_eq!(report.users_inserted, 1);
    }

    #[test]
    fn test_invalid_utf8_does_not_abort_ingestion() {
        let data: &[u8] = b"USER 1\nUSER 2\n\xff\xfe garbage\nUSER \xff\nFRIEND 1 2\n";
        let mut builder = NetworkBuilder::new();
        let report = builder.ingest(data).unwrap();

        assert_eq!(report.lines, 5);
        assert_eq!(report.users_inserted, 2);
        assert_eq!(report.lines_ignored, 1);
        assert_eq!(report.malformed_lines, 1);
        assert_eq!(report.skipped[0].line, 4);
        assert_eq!(report.edges_linked, 1);
        assert_eq!(friend_ids(&builder, 1), vec![2]);
    }

    #[test]
    fn test_crlf_and_unterminated_last_line() {
        let mut builder = NetworkBuilder::new();
        let report = builder.ingest_str("USER 1\r\nUSER 2\r\nFRIEND 1 2").unwrap();

        assert_eq!(report.lines, 3);
        assert_eq!(report.edges_linked, 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_ingest_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "USER 1").unwrap();
        writeln!(file, "USER 2").unwrap();
        writeln!(file, "FRIEND 1 2").unwrap();

        let mut builder = NetworkBuilder::new();
        let report = builder.ingest_file(file.path()).unwrap();

        assert_eq!(report.users_inserted, 2);
        assert_eq!(report.edges_linked, 1);
    }

    #[test]
    fn test_ingest_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = NetworkBuilder::new();
        let err = builder.ingest_file(dir.path().join("absent.txt")).unwrap_err();

        assert!(matches!(err, IngestError::Io(_)));
    }
}
