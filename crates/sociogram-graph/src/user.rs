//! Users and their friend lists.

use crate::directory::NodeIndex;
use sociogram_core::UserId;

/// Capacity of a freshly created friend list.
const INITIAL_FRIEND_CAPACITY: usize = 2;

/// A member of the directory.
///
/// Every `User` lives inside a tree node owned by the
/// [`Directory`](crate::Directory). Friend entries are arena indices of
/// other users' nodes: lateral references that never own anything.
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    /// Slot of the tree node holding this user.
    node: NodeIndex,
    /// Friends in insertion order. Duplicates are kept.
    friends: Vec<NodeIndex>,
}

impl User {
    pub(crate) fn new(id: UserId, node: NodeIndex) -> Self {
        Self {
            id,
            node,
            friends: Vec::with_capacity(INITIAL_FRIEND_CAPACITY),
        }
    }

    /// The user's id (the tree key).
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Arena slot of the node that owns this user.
    pub fn node(&self) -> NodeIndex {
        self.node
    }

    /// Friend slots in insertion order.
    pub fn friend_nodes(&self) -> &[NodeIndex] {
        &self.friends
    }

    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }

    /// Current capacity of the friend list.
    pub fn friend_capacity(&self) -> usize {
        self.friends.capacity()
    }

    /// Appends a friend, doubling the list's capacity when it is full.
    ///
    /// Allocation failure aborts the process.
    pub(crate) fn push_friend(&mut self, friend: NodeIndex) {
        if self.friends.len() == self.friends.capacity() {
            let additional = self.friends.capacity().max(INITIAL_FRIEND_CAPACITY);
            self.friends.reserve_exact(additional);
        }
        self.friends.push(friend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_has_room_for_two_friends() {
        let user = User::new(7, NodeIndex(0));
        assert_eq!(user.id(), 7);
        assert_eq!(user.friend_count(), 0);
        assert!(user.friend_capacity() >= INITIAL_FRIEND_CAPACITY);
    }

    #[test]
    fn test_push_friend_grows_and_keeps_order() {
        let mut user = User::new(1, NodeIndex(0));
        for slot in [3, 1, 4, 1, 5] {
            user.push_friend(NodeIndex(slot));
        }

        let slots: Vec<u32> = user.friend_nodes().iter().map(|n| n.0).collect();
        assert_eq!(slots, vec![3, 1, 4, 1, 5]);
        assert!(user.friend_capacity() >= 5);
    }
}
