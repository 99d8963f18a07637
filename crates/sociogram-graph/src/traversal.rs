//! Friend-graph analytics.
//!
//! All walks are depth-first and follow each user's friend list in
//! insertion order. Visited users are tracked by id in a set that lives
//! for one call. Each walk has a recursive form and an explicit-stack form
//! that produce the same output; [`TraversalStrategy`] picks one.

use crate::network::Network;
use crate::user::User;
use serde::{Deserialize, Serialize};
use sociogram_core::UserId;
use std::collections::HashSet;

/// How depth-first walks are executed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalStrategy {
    /// Plain recursion. Stack depth grows with the longest DFS path.
    #[default]
    Recursive,

    /// Heap-allocated frame stack, safe on long chains.
    Iterative,
}

/// One connected component of the friend graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    /// Member ids in the order the DFS reached them.
    pub members: Vec<UserId>,
}

impl Community {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.members.contains(&id)
    }
}

impl Network {
    /// Users reported by a depth-first walk at exactly `depth` hops.
    ///
    /// This is not a shortest-path query. The visited set is shared by the
    /// whole walk, and users reported at the target depth are not marked
    /// visited. So a user first reached at a shallower depth is never
    /// reported, a user can be reported via a longer path than its true
    /// distance, and a user reachable through several branches can be
    /// reported more than once.
    ///
    /// `depth == 0` reports `start` alone.
    pub fn reachable_at_depth<'a>(&'a self, start: &'a User, depth: usize) -> Vec<&'a User> {
        let mut visited = HashSet::new();
        let mut found = Vec::new();

        match self.strategy() {
            TraversalStrategy::Recursive => {
                self.reach_recursive(start, depth, 0, &mut visited, &mut found)
            }
            TraversalStrategy::Iterative => {
                self.reach_iterative(start, depth, &mut visited, &mut found)
            }
        }

        found
    }

    fn reach_recursive<'a>(
        &'a self,
        user: &'a User,
        target: usize,
        current: usize,
        visited: &mut HashSet<UserId>,
        found: &mut Vec<&'a User>,
    ) {
        if current == target {
            found.push(user);
            return;
        }

        visited.insert(user.id());
        for friend in self.friends(user) {
            if !visited.contains(&friend.id()) {
                self.reach_recursive(friend, target, current + 1, visited, found);
            }
        }
    }

    fn reach_iterative<'a>(
        &'a self,
        start: &'a User,
        target: usize,
        visited: &mut HashSet<UserId>,
        found: &mut Vec<&'a User>,
    ) {
        if target == 0 {
            found.push(start);
            return;
        }

        // (user, depth, next friend to try)
        let mut stack: Vec<(&'a User, usize, usize)> = vec![(start, 0, 0)];
        visited.insert(start.id());

        while let Some(top) = stack.last_mut() {
            let (user, depth, next) = *top;
            let Some(&index) = user.friend_nodes().get(next) else {
                stack.pop();
                continue;
            };
            top.2 += 1;

            let friend = self.directory.user(index);
            if visited.contains(&friend.id()) {
                continue;
            }

            if depth + 1 == target {
                found.push(friend);
            } else {
                visited.insert(friend.id());
                stack.push((friend, depth + 1, 0));
            }
        }
    }

    /// Ids present in both friend lists.
    ///
    /// Every matching pair is reported, so a friend listed twice on either
    /// side shows up more than once. Order follows `a`'s list, then `b`'s.
    pub fn common_friends(&self, a: &User, b: &User) -> Vec<UserId> {
        let mut common = Vec::new();
        for fa in self.friends(a) {
            for fb in self.friends(b) {
                if fa.id() == fb.id() {
                    common.push(fa.id());
                }
            }
        }
        common
    }

    /// Connected components of the friend graph.
    ///
    /// Candidates come from a breadth-first walk over the directory's tree
    /// links; each one not yet visited seeds a DFS over the friend graph.
    /// Components are ordered by their seed's tree position, members by
    /// DFS order.
    pub fn detect_communities(&self) -> Vec<Community> {
        let mut visited = HashSet::new();
        let mut communities = Vec::new();

        for node in self.directory.level_order() {
            let user = node.user();
            if visited.contains(&user.id()) {
                continue;
            }

            let mut members = Vec::new();
            self.explore(user, &mut visited, &mut members);
            communities.push(Community { members });
        }

        communities
    }

    /// Number of other users reachable from `user`.
    ///
    /// Equals the size of `user`'s community minus one.
    pub fn influence(&self, user: &User) -> usize {
        let mut visited = HashSet::new();
        let mut reached = Vec::new();
        self.explore(user, &mut visited, &mut reached);
        reached.len() - 1
    }

    /// Preorder DFS from `start`, appending every newly visited id.
    fn explore(&self, start: &User, visited: &mut HashSet<UserId>, reached: &mut Vec<UserId>) {
        match self.strategy() {
            TraversalStrategy::Recursive => self.explore_recursive(start, visited, reached),
            TraversalStrategy::Iterative => self.explore_iterative(start, visited, reached),
        }
    }

    fn explore_recursive(
        &self,
        user: &User,
        visited: &mut HashSet<UserId>,
        reached: &mut Vec<UserId>,
    ) {
        visited.insert(user.id());
        reached.push(user.id());
        for friend in self.friends(user) {
            if !visited.contains(&friend.id()) {
                self.explore_recursive(friend, visited, reached);
            }
        }
    }

    fn explore_iterative(
        &self,
        start: &User,
        visited: &mut HashSet<UserId>,
        reached: &mut Vec<UserId>,
    ) {
        visited.insert(start.id());
        reached.push(start.id());

        // (user, next friend to try)
        let mut stack: Vec<(&User, usize)> = vec![(start, 0)];
        while let Some(top) = stack.last_mut() {
            let (user, next) = *top;
            let Some(&index) = user.friend_nodes().get(next) else {
                stack.pop();
                continue;
            };
            top.1 += 1;

            let friend = self.directory.user(index);
            if visited.insert(friend.id()) {
                reached.push(friend.id());
                stack.push((friend, 0));
            }
        }
    }
}
