//! Ordered user directory.
//!
//! The directory is a red-black tree keyed by user id. Nodes live in a
//! `Vec` arena and link to each other by [`NodeIndex`]; rotations only
//! reassign indices. Nodes are never removed, so an index handed out by
//! [`Directory::insert`] stays valid for the life of the directory.
//!
//! Duplicate ids are accepted: an equal key descends to the right, so a
//! second node with the same id is added rather than rejected or merged.

use crate::user::User;
use serde::{Deserialize, Serialize};
use sociogram_core::UserId;
use std::collections::VecDeque;
use thiserror::Error;

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeIndex(pub(crate) u32);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node color. Absent links count as black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Black,
}

/// A tree node wrapping exactly one user.
#[derive(Debug, Clone)]
pub struct TreeNode {
    user: User,
    color: Color,
    left: Option<NodeIndex>,
    right: Option<NodeIndex>,
    parent: Option<NodeIndex>,
}

impl TreeNode {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn left(&self) -> Option<NodeIndex> {
        self.left
    }

    pub fn right(&self) -> Option<NodeIndex> {
        self.right
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }
}

/// A broken red-black or search-tree property, reported by
/// [`Directory::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("root node {0} is red")]
    RedRoot(UserId),

    #[error("red node {child} has a red parent {parent}")]
    RedRed { child: UserId, parent: UserId },

    #[error("black height differs under node {at}: left {left}, right {right}")]
    BlackHeight {
        at: UserId,
        left: usize,
        right: usize,
    },

    #[error("node {child} is out of order under {parent}")]
    OutOfOrder { child: UserId, parent: UserId },

    #[error("node {0} does not point back to its parent")]
    ParentLink(UserId),
}

/// Red-black tree of users, the single owner of every `User`.
#[derive(Debug, Default, Clone)]
pub struct Directory {
    nodes: Vec<TreeNode>,
    root: Option<NodeIndex>,
}

impl Directory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocates room for `users` nodes.
    pub fn with_capacity(users: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(users),
            root: None,
        }
    }

    /// Number of nodes, duplicates included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    /// Gets a node by its arena index.
    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index.index())
    }

    /// Gets the user stored at an arena index.
    pub fn get(&self, index: NodeIndex) -> Option<&User> {
        self.node(index).map(TreeNode::user)
    }

    // Indices stored in the tree and in friend lists always come from
    // `insert`, so direct indexing cannot go out of bounds.
    pub(crate) fn user(&self, index: NodeIndex) -> &User {
        &self.nodes[index.index()].user
    }

    pub(crate) fn user_mut(&mut self, index: NodeIndex) -> &mut User {
        &mut self.nodes[index.index()].user
    }

    fn key(&self, index: NodeIndex) -> UserId {
        self.nodes[index.index()].user.id()
    }

    fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.nodes[index.index()].parent
    }

    fn left(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.nodes[index.index()].left
    }

    fn right(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.nodes[index.index()].right
    }

    fn is_red(&self, index: Option<NodeIndex>) -> bool {
        index.is_some_and(|i| self.nodes[i.index()].color == Color::Red)
    }

    fn set_color(&mut self, index: NodeIndex, color: Color) {
        self.nodes[index.index()].color = color;
    }

    /// Inserts a new user and rebalances.
    ///
    /// Returns the arena index of the new node. An id that is already
    /// present gets a second node.
    pub fn insert(&mut self, id: UserId) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);

        // Find insertion point
        let mut parent: Option<NodeIndex> = None;
        let mut current = self.root;
        while let Some(node) = current {
            parent = Some(node);
            current = if id < self.key(node) {
                self.left(node)
            } else {
                self.right(node)
            };
        }

        self.nodes.push(TreeNode {
            user: User::new(id, index),
            color: Color::Red,
            left: None,
            right: None,
            parent,
        });

        match parent {
            None => self.root = Some(index),
            Some(p) if id < self.key(p) => self.nodes[p.index()].left = Some(index),
            Some(p) => self.nodes[p.index()].right = Some(index),
        }

        self.fixup(index);
        index
    }

    /// Finds the first node on the search path whose key equals `id`.
    ///
    /// With duplicate ids this is whichever copy sits highest on the path,
    /// not necessarily the one inserted first.
    pub fn search(&self, id: UserId) -> Option<NodeIndex> {
        let mut current = self.root;
        while let Some(node) = current {
            let key = self.key(node);
            if id == key {
                return Some(node);
            }
            current = if id < key {
                self.left(node)
            } else {
                self.right(node)
            };
        }
        None
    }

    /// Restores the red-black properties after inserting `node`.
    fn fixup(&mut self, mut node: NodeIndex) {
        while self.is_red(self.parent(node)) {
            let Some(parent) = self.parent(node) else {
                break;
            };
            // A red parent is never the root, so the grandparent exists.
            let Some(grandparent) = self.parent(parent) else {
                break;
            };

            if Some(parent) == self.left(grandparent) {
                let uncle = self.right(grandparent);
                if let Some(uncle) = uncle.filter(|&u| self.is_red(Some(u))) {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if Some(node) == self.right(parent) {
                        node = parent;
                        self.rotate_left(node);
                    }
                    self.recolor_and_rotate(node, Self::rotate_right);
                }
            } else {
                let uncle = self.left(grandparent);
                if let Some(uncle) = uncle.filter(|&u| self.is_red(Some(u))) {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if Some(node) == self.left(parent) {
                        node = parent;
                        self.rotate_right(node);
                    }
                    self.recolor_and_rotate(node, Self::rotate_left);
                }
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Outer-child case: parent goes black, grandparent red, then the
    /// grandparent rotates away from `node`.
    fn recolor_and_rotate(&mut self, node: NodeIndex, rotate: fn(&mut Self, NodeIndex)) {
        if let Some(parent) = self.parent(node) {
            if let Some(grandparent) = self.parent(parent) {
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                rotate(self, grandparent);
            }
        }
    }

    /// Left rotation on `x`. Its right child takes its place.
    fn rotate_left(&mut self, x: NodeIndex) {
        let Some(y) = self.right(x) else {
            return;
        };

        let y_left = self.left(y);
        self.nodes[x.index()].right = y_left;
        if let Some(yl) = y_left {
            self.nodes[yl.index()].parent = Some(x);
        }

        let x_parent = self.parent(x);
        self.nodes[y.index()].parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(p) if self.left(p) == Some(x) => self.nodes[p.index()].left = Some(y),
            Some(p) => self.nodes[p.index()].right = Some(y),
        }

        self.nodes[y.index()].left = Some(x);
        self.nodes[x.index()].parent = Some(y);
    }

    /// Right rotation on `x`. Its left child takes its place.
    fn rotate_right(&mut self, x: NodeIndex) {
        let Some(y) = self.left(x) else {
            return;
        };

        let y_right = self.right(y);
        self.nodes[x.index()].left = y_right;
        if let Some(yr) = y_right {
            self.nodes[yr.index()].parent = Some(x);
        }

        let x_parent = self.parent(x);
        self.nodes[y.index()].parent = x_parent;
        match x_parent {
            None => self.root = Some(y),
            Some(p) if self.right(p) == Some(x) => self.nodes[p.index()].right = Some(y),
            Some(p) => self.nodes[p.index()].left = Some(y),
        }

        self.nodes[y.index()].right = Some(x);
        self.nodes[x.index()].parent = Some(y);
    }

    /// Iterates users in ascending id order.
    pub fn in_order(&self) -> InOrder<'_> {
        let mut iter = InOrder {
            directory: self,
            stack: Vec::new(),
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Iterates nodes breadth-first over the tree links, root first.
    pub fn level_order(&self) -> LevelOrder<'_> {
        LevelOrder {
            directory: self,
            queue: self.root.into_iter().collect(),
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<NodeIndex> = self.root.into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&n| [self.left(n), self.right(n)])
                .flatten()
                .collect();
        }
        height
    }

    /// Black nodes on the leftmost root-to-leaf path, the root included.
    ///
    /// Equals the result of [`Directory::validate`] whenever the tree is
    /// balanced; unlike `validate` it does not check the other paths.
    pub fn black_height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(node) = current {
            height += usize::from(!self.is_red(Some(node)));
            current = self.left(node);
        }
        height
    }

    /// Checks every tree invariant.
    ///
    /// Returns the black-height (black nodes on any path from the root to
    /// an absent link, the root included).
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        let Some(root) = self.root else {
            return Ok(0);
        };

        if self.is_red(Some(root)) {
            return Err(InvariantViolation::RedRoot(self.key(root)));
        }
        if self.parent(root).is_some() {
            return Err(InvariantViolation::ParentLink(self.key(root)));
        }

        self.validate_subtree(root)
    }

    fn validate_subtree(&self, node: NodeIndex) -> Result<usize, InvariantViolation> {
        let key = self.key(node);
        let mut heights = [0usize; 2];

        for (slot, child) in [self.left(node), self.right(node)].into_iter().enumerate() {
            let Some(child) = child else {
                continue;
            };
            let child_key = self.key(child);

            if self.parent(child) != Some(node) {
                return Err(InvariantViolation::ParentLink(child_key));
            }
            // Equal keys may sit on either side once rotations move them.
            let ordered = if slot == 0 {
                child_key <= key
            } else {
                child_key >= key
            };
            if !ordered {
                return Err(InvariantViolation::OutOfOrder {
                    child: child_key,
                    parent: key,
                });
            }
            if self.is_red(Some(node)) && self.is_red(Some(child)) {
                return Err(InvariantViolation::RedRed {
                    child: child_key,
                    parent: key,
                });
            }

            heights[slot] = self.validate_subtree(child)?;
        }

        let [left, right] = heights;
        if left != right {
            return Err(InvariantViolation::BlackHeight {
                at: key,
                left,
                right,
            });
        }

        let own = usize::from(!self.is_red(Some(node)));
        Ok(left + own)
    }
}

/// In-order iterator over a [`Directory`].
pub struct InOrder<'a> {
    directory: &'a Directory,
    stack: Vec<NodeIndex>,
}

impl<'a> InOrder<'a> {
    fn push_left_spine(&mut self, mut current: Option<NodeIndex>) {
        while let Some(node) = current {
            self.stack.push(node);
            current = self.directory.left(node);
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a User;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(self.directory.right(node));
        Some(self.directory.user(node))
    }
}

/// Breadth-first iterator over the tree structure of a [`Directory`].
pub struct LevelOrder<'a> {
    directory: &'a Directory,
    queue: VecDeque<NodeIndex>,
}

impl<'a> Iterator for LevelOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.queue.pop_front()?;
        let node = &self.directory.nodes[index.index()];
        self.queue.extend(node.left);
        self.queue.extend(node.right);
        Some(node)
    }
}
