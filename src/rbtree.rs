// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Red-black tree augmented with a subtree aggregate.
//
// Nodes live in a SlotMap arena; every child/parent link is an
// Option<Locator> into it, and the locator handed back by `insert` is the
// node's own arena key. Deletion splices nodes (never copies payloads
// between nodes), so a locator keeps naming the same record through
// rotations, deletions elsewhere and rekeying. The SlotMap generation makes
// a locator of an erased record permanently dead.
//
// Design:
//   - None plays the role of the black nil leaf; its aggregate is
//     `Aggregate::identity()`.
//   - child[0] is left, child[1] is right, so every rotation and fixup case
//     is written once with a `dir` index.
//   - Equal keys go right on insert, so in-order traversal is stable.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Sub};

use num_traits::Zero;
use slotmap::{new_key_type, SlotMap};

use crate::error::InvariantViolation;

new_key_type! {
    /// Stable handle to one record of a `RedBlackTree`.
    pub struct Locator;
}

/// Combines a node's key with the aggregates of its two subtrees.
pub trait Aggregate<K> {
    type Sum: Clone + PartialEq + fmt::Debug;

    fn identity() -> Self::Sum;
    fn combine(left: &Self::Sum, key: &K, right: &Self::Sum) -> Self::Sum;
}

/// Sum of keys over the subtree.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeySum;

impl<K> Aggregate<K> for KeySum
where
    K: Clone + Zero + Add<Output = K> + PartialEq + fmt::Debug,
{
    type Sum = K;

    fn identity() -> K {
        K::zero()
    }

    fn combine(left: &K, key: &K, right: &K) -> K {
        left.clone() + key.clone() + right.clone()
    }
}

/// No aggregate at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAggregate;

impl<K> Aggregate<K> for NoAggregate {
    type Sum = ();

    fn identity() {}
    fn combine(_: &(), _: &K, _: &()) {}
}

#[derive(Clone, Debug)]
struct Node<K, S, M> {
    key: K,
    sat: S,
    sum: M,
    red: bool,
    parent: Option<Locator>,
    child: [Option<Locator>; 2],
}

pub struct RedBlackTree<K, S, A: Aggregate<K> = KeySum> {
    nodes: SlotMap<Locator, Node<K, S, A::Sum>>,
    root: Option<Locator>,
    _policy: PhantomData<A>,
}

impl<K: Clone, S: Clone, A: Aggregate<K>> Clone for RedBlackTree<K, S, A> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            _policy: PhantomData,
        }
    }
}

impl<K: PartialOrd, S, A: Aggregate<K>> Default for RedBlackTree<K, S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, S: fmt::Debug, A: Aggregate<K>> fmt::Debug for RedBlackTree<K, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut cur = self.root.map(|r| self.extreme(r, 0));
        while let Some(n) = cur {
            let node = &self.nodes[n];
            list.entry(&(&node.key, &node.sat));
            cur = self.step(n, 1);
        }
        list.finish()
    }
}

// ─────────────────────────── Structural helpers ───────────────────────────

impl<K, S, A: Aggregate<K>> RedBlackTree<K, S, A> {
    #[inline]
    fn is_red(&self, n: Option<Locator>) -> bool {
        n.map_or(false, |n| self.nodes[n].red)
    }

    #[inline]
    fn sum_of(&self, n: Option<Locator>) -> A::Sum {
        match n {
            Some(n) => self.nodes[n].sum.clone(),
            None => A::identity(),
        }
    }

    /// Recompute one node's aggregate from its children.
    fn pull(&mut self, n: Locator) {
        let node = &self.nodes[n];
        let sum = A::combine(
            &self.sum_of(node.child[0]),
            &node.key,
            &self.sum_of(node.child[1]),
        );
        self.nodes[n].sum = sum;
    }

    /// Recompute aggregates from `n` up to the root.
    fn pull_up(&mut self, mut n: Option<Locator>) {
        while let Some(x) = n {
            self.pull(x);
            n = self.nodes[x].parent;
        }
    }

    #[inline]
    fn side_of(&self, parent: Locator, n: Option<Locator>) -> usize {
        if self.nodes[parent].child[0] == n {
            0
        } else {
            1
        }
    }

    /// Put `v` where `u` hangs from its parent.
    fn transplant(&mut self, u: Locator, v: Option<Locator>) {
        let parent = self.nodes[u].parent;
        match parent {
            None => self.root = v,
            Some(p) => {
                let dir = self.side_of(p, Some(u));
                self.nodes[p].child[dir] = v;
            }
        }
        if let Some(v) = v {
            self.nodes[v].parent = parent;
        }
    }

    /// Rotate `x` down toward `dir` (dir 0 = left rotation).
    fn rotate(&mut self, x: Locator, dir: usize) {
        let Some(y) = self.nodes[x].child[1 - dir] else {
            return;
        };
        let inner = self.nodes[y].child[dir];
        self.nodes[x].child[1 - dir] = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }
        self.transplant(x, Some(y));
        self.nodes[y].child[dir] = Some(x);
        self.nodes[x].parent = Some(y);
        self.pull(x);
        self.pull(y);
    }

    fn extreme(&self, mut n: Locator, dir: usize) -> Locator {
        while let Some(c) = self.nodes[n].child[dir] {
            n = c;
        }
        n
    }

    /// In-order neighbour of `n` in direction `dir` (1 = successor).
    fn step(&self, n: Locator, dir: usize) -> Option<Locator> {
        if let Some(c) = self.nodes[n].child[dir] {
            return Some(self.extreme(c, 1 - dir));
        }
        let mut cur = n;
        let mut parent = self.nodes[n].parent;
        while let Some(p) = parent {
            if self.nodes[p].child[1 - dir] == Some(cur) {
                return Some(p);
            }
            cur = p;
            parent = self.nodes[p].parent;
        }
        None
    }

    fn insert_fixup(&mut self, mut z: Locator) {
        while let Some(p) = self.nodes[z].parent.filter(|&p| self.nodes[p].red) {
            let Some(g) = self.nodes[p].parent else {
                break;
            };
            let dir = self.side_of(g, Some(p));
            let uncle = self.nodes[g].child[1 - dir];
            if let Some(u) = uncle.filter(|&u| self.nodes[u].red) {
                self.nodes[p].red = false;
                self.nodes[u].red = false;
                self.nodes[g].red = true;
                z = g;
                continue;
            }
            let mut p = p;
            if self.nodes[p].child[1 - dir] == Some(z) {
                self.rotate(p, dir);
                z = p;
                p = match self.nodes[z].parent {
                    Some(p) => p,
                    None => break,
                };
            }
            self.nodes[p].red = false;
            self.nodes[g].red = true;
            self.rotate(g, 1 - dir);
        }
        if let Some(r) = self.root {
            self.nodes[r].red = false;
        }
    }

    /// Unlink `z` from the tree without freeing its slot.
    fn detach(&mut self, z: Locator) {
        let [zl, zr] = self.nodes[z].child;
        let mut removed_red = self.nodes[z].red;
        let x;
        let x_parent;

        match (zl, zr) {
            (None, _) => {
                x = zr;
                x_parent = self.nodes[z].parent;
                self.transplant(z, zr);
            }
            (_, None) => {
                x = zl;
                x_parent = self.nodes[z].parent;
                self.transplant(z, zl);
            }
            (Some(l), Some(r)) => {
                let y = self.extreme(r, 0);
                removed_red = self.nodes[y].red;
                x = self.nodes[y].child[1];
                if self.nodes[y].parent == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self.nodes[y].parent;
                    self.transplant(y, x);
                    self.nodes[y].child[1] = Some(r);
                    self.nodes[r].parent = Some(y);
                }
                self.transplant(z, Some(y));
                self.nodes[y].child[0] = Some(l);
                self.nodes[l].parent = Some(y);
                self.nodes[y].red = self.nodes[z].red;
            }
        }

        self.pull_up(x_parent);
        if !removed_red {
            self.delete_fixup(x, x_parent);
        }
        let node = &mut self.nodes[z];
        node.parent = None;
        node.child = [None, None];
    }

    fn delete_fixup(&mut self, mut x: Option<Locator>, mut parent: Option<Locator>) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else {
                break;
            };
            let dir = self.side_of(p, x);
            let mut w = self.nodes[p].child[1 - dir];

            // Case 1: red sibling.
            if let Some(s) = w.filter(|&s| self.nodes[s].red) {
                self.nodes[s].red = false;
                self.nodes[p].red = true;
                self.rotate(p, dir);
                w = self.nodes[p].child[1 - dir];
            }
            let Some(mut s) = w else {
                x = Some(p);
                parent = self.nodes[p].parent;
                continue;
            };

            let near = self.nodes[s].child[dir];
            let far = self.nodes[s].child[1 - dir];
            if !self.is_red(near) && !self.is_red(far) {
                // Case 2: black sibling, black nephews.
                self.nodes[s].red = true;
                x = Some(p);
                parent = self.nodes[p].parent;
                continue;
            }

            if !self.is_red(far) {
                // Case 3: near nephew red.
                if let Some(n) = near {
                    self.nodes[n].red = false;
                }
                self.nodes[s].red = true;
                self.rotate(s, 1 - dir);
                s = match self.nodes[p].child[1 - dir] {
                    Some(s) => s,
                    None => break,
                };
            }

            // Case 4: far nephew red.
            self.nodes[s].red = self.nodes[p].red;
            self.nodes[p].red = false;
            if let Some(f) = self.nodes[s].child[1 - dir] {
                self.nodes[f].red = false;
            }
            self.rotate(p, dir);
            x = self.root;
            parent = None;
        }
        if let Some(x) = x {
            self.nodes[x].red = false;
        }
    }
}

// ─────────────────────────── Public operations ───────────────────────────

impl<K: PartialOrd, S, A: Aggregate<K>> RedBlackTree<K, S, A> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            _policy: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drop every record. All outstanding locators become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Insert a record and return its locator. Duplicate keys are allowed.
    pub fn insert(&mut self, key: K, sat: S) -> Locator {
        let z = self.nodes.insert(Node {
            key,
            sat,
            sum: A::identity(),
            red: true,
            parent: None,
            child: [None, None],
        });
        self.attach(z);
        z
    }

    /// Insert a record at the place chosen by `cmp`, which orders the new
    /// record against an existing (key, satellite). `Less` goes left; `Equal`
    /// and `Greater` go right, as equal keys do in `insert`. `cmp` has to
    /// agree with the current in-order sequence; the stored keys are not
    /// consulted.
    pub fn insert_by<F>(&mut self, key: K, sat: S, mut cmp: F) -> Locator
    where
        F: FnMut(&K, &S) -> Ordering,
    {
        let mut parent = None;
        let mut dir = 0;
        let mut cur = self.root;
        while let Some(c) = cur {
            let node = &self.nodes[c];
            parent = Some(c);
            dir = usize::from(cmp(&node.key, &node.sat) != Ordering::Less);
            cur = node.child[dir];
        }
        let z = self.nodes.insert(Node {
            key,
            sat,
            sum: A::identity(),
            red: true,
            parent: None,
            child: [None, None],
        });
        self.link(z, parent, dir);
        z
    }

    /// BST-insert an already allocated, unlinked node and rebalance.
    fn attach(&mut self, z: Locator) {
        let mut parent = None;
        let mut dir = 0;
        let mut cur = self.root;
        while let Some(c) = cur {
            parent = Some(c);
            dir = if self.nodes[z].key < self.nodes[c].key {
                0
            } else {
                1
            };
            cur = self.nodes[c].child[dir];
        }
        self.link(z, parent, dir);
    }

    /// Hang `z` as child `dir` of `parent` (or as the root) and rebalance.
    fn link(&mut self, z: Locator, parent: Option<Locator>, dir: usize) {
        {
            let node = &mut self.nodes[z];
            node.parent = parent;
            node.child = [None, None];
            node.red = true;
        }
        match parent {
            None => self.root = Some(z),
            Some(p) => self.nodes[p].child[dir] = Some(z),
        }
        self.pull_up(Some(z));
        self.insert_fixup(z);
    }

    fn find_node(&self, key: &K) -> Option<Locator> {
        let mut cur = self.root;
        while let Some(c) = cur {
            let node = &self.nodes[c];
            if *key < node.key {
                cur = node.child[0];
            } else if node.key < *key {
                cur = node.child[1];
            } else {
                return Some(c);
            }
        }
        None
    }

    /// Locator and satellite of a record with an equal key. Among
    /// duplicates the first one met on the search path wins.
    pub fn find_key(&self, key: &K) -> Option<(Locator, &S)> {
        self.find_node(key).map(|n| (n, &self.nodes[n].sat))
    }

    pub fn contains_loc(&self, loc: Locator) -> bool {
        self.nodes.contains_key(loc)
    }

    pub fn access_loc(&self, loc: Locator) -> Option<(&K, &S)> {
        self.nodes.get(loc).map(|n| (&n.key, &n.sat))
    }

    /// Mutable access to a satellite. Keys are not reachable this way, so
    /// ordering cannot be broken.
    pub fn satellite_mut(&mut self, loc: Locator) -> Option<&mut S> {
        self.nodes.get_mut(loc).map(|n| &mut n.sat)
    }

    /// Remove one record with an equal key and return its satellite.
    pub fn erase_key(&mut self, key: &K) -> Option<S> {
        let n = self.find_node(key)?;
        self.erase_loc(n).map(|(_, sat)| sat)
    }

    /// Remove the record behind `loc`. A dead locator is a no-op.
    pub fn erase_loc(&mut self, loc: Locator) -> Option<(K, S)> {
        if !self.nodes.contains_key(loc) {
            return None;
        }
        self.detach(loc);
        self.nodes.remove(loc).map(|n| (n.key, n.sat))
    }

    /// Change a record's key in place. The locator stays valid.
    pub fn rekey_loc(&mut self, loc: Locator, new_key: K) -> bool {
        if !self.nodes.contains_key(loc) {
            return false;
        }
        self.detach(loc);
        self.nodes[loc].key = new_key;
        self.attach(loc);
        true
    }

    pub fn loc_min(&self) -> Option<Locator> {
        self.root.map(|r| self.extreme(r, 0))
    }

    pub fn loc_max(&self) -> Option<Locator> {
        self.root.map(|r| self.extreme(r, 1))
    }

    pub fn successor(&self, loc: Locator) -> Option<Locator> {
        if !self.nodes.contains_key(loc) {
            return None;
        }
        self.step(loc, 1)
    }

    pub fn predecessor(&self, loc: Locator) -> Option<Locator> {
        if !self.nodes.contains_key(loc) {
            return None;
        }
        self.step(loc, 0)
    }

    /// Record with the greatest key strictly below `key`.
    pub fn loc_below(&self, key: &K) -> Option<Locator> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(c) = cur {
            let node = &self.nodes[c];
            if node.key < *key {
                best = Some(c);
                cur = node.child[1];
            } else {
                cur = node.child[0];
            }
        }
        best
    }

    /// First record, in order, for which `pred` fails. `pred` has to hold on
    /// a prefix of the in-order sequence and fail on the rest.
    pub fn partition_point_by<F>(&self, mut pred: F) -> Option<Locator>
    where
        F: FnMut(&K, &S) -> bool,
    {
        let mut best = None;
        let mut cur = self.root;
        while let Some(c) = cur {
            let node = &self.nodes[c];
            if pred(&node.key, &node.sat) {
                cur = node.child[1];
            } else {
                best = Some(c);
                cur = node.child[0];
            }
        }
        best
    }

    /// Aggregate over the whole tree.
    pub fn root_sum(&self) -> A::Sum {
        self.sum_of(self.root)
    }

    /// Aggregate of the subtree hanging from `loc`.
    pub fn subtree_sum(&self, loc: Locator) -> Option<A::Sum> {
        self.nodes.get(loc).map(|n| n.sum.clone())
    }

    /// Root-to-node turns: false = left, true = right.
    pub fn path_to(&self, loc: Locator) -> Option<Vec<bool>> {
        if !self.nodes.contains_key(loc) {
            return None;
        }
        let mut turns = Vec::new();
        let mut cur = loc;
        while let Some(p) = self.nodes[cur].parent {
            turns.push(self.nodes[p].child[1] == Some(cur));
            cur = p;
        }
        turns.reverse();
        Some(turns)
    }

    /// In-order iteration.
    pub fn iter(&self) -> Iter<'_, K, S, A> {
        Iter {
            tree: self,
            next: self.loc_min(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check ordering, coloring, black height, parent links and aggregates.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return if self.nodes.is_empty() {
                Ok(())
            } else {
                Err(InvariantViolation::CountMismatch)
            };
        };
        if self.nodes[root].red {
            return Err(InvariantViolation::RedRoot);
        }
        if self.nodes[root].parent.is_some() {
            return Err(InvariantViolation::BrokenParentLink);
        }
        let mut count = 0usize;
        self.check_subtree(Some(root), &mut count)?;
        if count != self.nodes.len() {
            return Err(InvariantViolation::CountMismatch);
        }

        let mut prev: Option<&K> = None;
        for (_, key, _) in self.iter() {
            if let Some(p) = prev {
                if *key < *p {
                    return Err(InvariantViolation::OrderViolation);
                }
            }
            prev = Some(key);
        }
        Ok(())
    }

    /// Returns the black height of the subtree.
    fn check_subtree(
        &self,
        n: Option<Locator>,
        count: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        let Some(n) = n else {
            return Ok(1);
        };
        *count += 1;
        let node = &self.nodes[n];
        for c in node.child.iter().flatten() {
            if self.nodes[*c].parent != Some(n) {
                return Err(InvariantViolation::BrokenParentLink);
            }
            if node.red && self.nodes[*c].red {
                return Err(InvariantViolation::RedRedEdge);
            }
        }
        let left = self.check_subtree(node.child[0], count)?;
        let right = self.check_subtree(node.child[1], count)?;
        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch);
        }
        let expected = A::combine(
            &self.sum_of(node.child[0]),
            &node.key,
            &self.sum_of(node.child[1]),
        );
        if expected != node.sum {
            return Err(InvariantViolation::StaleAggregate);
        }
        Ok(left + usize::from(!node.red))
    }
}

impl<K, S> RedBlackTree<K, S, KeySum>
where
    K: Clone + Zero + Add<Output = K> + Sub<Output = K> + PartialOrd + fmt::Debug,
{
    /// Record at which the in-order running key sum first reaches `ck`.
    /// Asking past the total clamps to the last record.
    pub fn loc_using_cumulative_key_sum(&self, ck: K) -> Option<Locator> {
        let mut ck = ck;
        let mut cur = self.root?;
        loop {
            let node = &self.nodes[cur];
            let left_sum = self.sum_of(node.child[0]);
            if let Some(l) = node.child[0] {
                if ck <= left_sum {
                    cur = l;
                    continue;
                }
            }
            ck = ck - left_sum;
            if ck <= node.key {
                return Some(cur);
            }
            match node.child[1] {
                Some(r) => {
                    ck = ck - node.key.clone();
                    cur = r;
                }
                None => {
                    tracing::warn!(
                        remaining = ?(ck - node.key.clone()),
                        "cumulative key sum exceeds tree total, using last record"
                    );
                    return Some(cur);
                }
            }
        }
    }
}

pub struct Iter<'a, K, S, A: Aggregate<K>> {
    tree: &'a RedBlackTree<K, S, A>,
    next: Option<Locator>,
}

impl<'a, K, S, A: Aggregate<K>> Iterator for Iter<'a, K, S, A> {
    type Item = (Locator, &'a K, &'a S);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.next?;
        self.next = self.tree.step(n, 1);
        let node = &self.tree.nodes[n];
        Some((n, &node.key, &node.sat))
    }
}
