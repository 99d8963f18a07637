//! Sociogram Graph - User directory and friendship analytics
//!
//! This crate keeps every user in an ordered directory (a red-black tree
//! keyed by user id) and layers an undirected friendship graph on top of
//! it as per-user adjacency lists.
//!
//! # Architecture
//!
//! Work happens in two phases:
//! - [`NetworkBuilder`] owns the mutable directory during ingestion
//! - [`Network`] is the frozen, read-only view that runs the analytics
//!
//! Analytics only accept a `&User`, which can only come from a successful
//! lookup, so a missing user has to be dealt with before any walk starts.
//!
//! # Example
//!
//! ```
//! use sociogram_graph::NetworkBuilder;
//!
//! let mut builder = NetworkBuilder::new();
//! builder.ingest_str("USER 101\nUSER 102\nUSER 103\nFRIEND 101 102\n").unwrap();
//! let network = builder.build();
//!
//! let user = network.search(101).unwrap();
//! assert_eq!(network.influence(user), 1);
//! assert_eq!(network.detect_communities().len(), 2);
//! ```

mod builder;
mod directory;
mod error;
mod network;
mod traversal;
mod user;

pub use builder::{Applied, EdgeOutcome, IngestPolicy, IngestReport, NetworkBuilder, SkippedLine};
pub use directory::{Color, Directory, InOrder, InvariantViolation, LevelOrder, NodeIndex, TreeNode};
pub use error::{GraphError, IngestError};
pub use network::{Network, NetworkStats};
pub use sociogram_core::UserId;
pub use traversal::{Community, TraversalStrategy};
pub use user::User;
