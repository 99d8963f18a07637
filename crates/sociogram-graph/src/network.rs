//! Read-only network view.
//!
//! A `Network` is what the builder turns into once ingestion is over. It
//! exposes lookups and analytics but no way to add users or edges.

use crate::directory::{Directory, InOrder};
use crate::error::GraphError;
use crate::traversal::TraversalStrategy;
use crate::user::User;
use serde::{Deserialize, Serialize};
use sociogram_core::UserId;

/// The frozen directory plus friend graph.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) directory: Directory,
    strategy: TraversalStrategy,
}

/// Size and shape figures for the stats command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub users: usize,
    /// Total friend-list entries across all users.
    pub friend_links: usize,
    /// `friend_links / 2`; each undirected edge appends two entries.
    pub friendships: usize,
    pub tree_height: usize,
    pub black_height: usize,
}

impl Network {
    pub(crate) fn new(directory: Directory, strategy: TraversalStrategy) -> Self {
        Self {
            directory,
            strategy,
        }
    }

    /// Switches the traversal implementation used by the analytics.
    pub fn with_strategy(mut self, strategy: TraversalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> TraversalStrategy {
        self.strategy
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Looks up a user by id.
    ///
    /// The returned reference is the only way into the analytics, so a
    /// lookup miss has to be handled before any traversal can run.
    pub fn search(&self, id: UserId) -> Result<&User, GraphError> {
        self.directory
            .search(id)
            .map(|index| self.directory.user(index))
            .ok_or(GraphError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// All users in ascending id order.
    pub fn users(&self) -> InOrder<'_> {
        self.directory.in_order()
    }

    /// Friends of `user` in insertion order.
    pub fn friends<'a>(&'a self, user: &'a User) -> impl Iterator<Item = &'a User> + 'a {
        user.friend_nodes()
            .iter()
            .map(move |&index| self.directory.user(index))
    }

    /// Returns network statistics.
    pub fn stats(&self) -> NetworkStats {
        let friend_links: usize = self.users().map(User::friend_count).sum();

        NetworkStats {
            users: self.len(),
            friend_links,
            friendships: friend_links / 2,
            tree_height: self.directory.height(),
            black_height: self.directory.black_height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkBuilder;

    fn sample() -> Network {
        let mut builder = NetworkBuilder::new();
        builder
            .ingest_str("USER 3\nUSER 1\nUSER 2\nFRIEND 1 2\nFRIEND 1 3\n")
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_search() {
        let network = sample();
        assert_eq!(network.search(2).unwrap().id(), 2);
        assert_eq!(network.search(4).unwrap_err(), GraphError::NotFound(4));
    }

    #[test]
    fn test_users_are_sorted() {
        let network = sample();
        let ids: Vec<UserId> = network.users().map(User::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_friends_in_insertion_order() {
        let network = sample();
        let one = network.search(1).unwrap();
        let ids: Vec<UserId> = network.friends(one).map(User::id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(
            stats,
            NetworkStats {
                users: 3,
                friend_links: 4,
                friendships: 2,
                tree_height: 2,
                black_height: 1,
            }
        );

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["friendships"], 2);
    }

    #[test]
    fn test_stats_with_duplicate_ids() {
        let mut builder = NetworkBuilder::new();
        builder.ingest_str("USER 5\nUSER 5\nUSER 5\n").unwrap();
        let network = builder.build();
        let stats = network.stats();

        assert_eq!(stats.users, 3);
        assert_eq!(stats.tree_height, 2);
        assert_eq!(stats.black_height, 1);
        assert_eq!(network.directory().validate(), Ok(1));
    }
}
