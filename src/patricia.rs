//! Persistent big-endian Patricia tree.
//!
//! The backing store for the non-relational map domain: an immutable radix
//! tree over 64-bit key indices with `Rc`-shared subtrees. Cloning is O(1)
//! and mutation copies only the path from the root to the touched leaf, so
//! abstract states can be duplicated freely at merge points.
//!
//! Lattice operations are driven through [`merge_with`] by a
//! [`BinaryOp`]: its `apply` combines the two values stored under one key
//! (`None` meaning "the operator's default", i.e. an absent binding), and
//! `default_is_absorbing` decides what happens to keys present on one side
//! only. Join-like operators absorb (drop one-sided keys), meet-like
//! operators keep the other side and may short-circuit the whole merge
//! with [`BottomFound`].
//!
//! # Invariants
//!
//! - Key identity is `Key::index()`; two keys with equal indices are the
//!   same binding.
//! - Operators passed to [`merge_with`] must be idempotent
//!   (`apply(x, x) = x`): physically shared subtrees are not descended.
//!
//! [`merge_with`]: PatriciaTree::merge_with

use std::rc::Rc;

/// Tree keys: anything carrying a stable 64-bit index.
pub trait Key: Clone {
    fn index(&self) -> u64;
}

/// Short-circuit signal raised by meet-like operators when a pointwise
/// result is the value lattice's bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BottomFound;

/// A binary operator applied pointwise by [`PatriciaTree::merge_with`].
pub trait BinaryOp<V> {
    /// Combine the values bound to one key on both sides. `Ok(None)` means
    /// the result is the operator's default and the binding is dropped.
    fn apply(&self, left: &V, right: &V) -> Result<Option<V>, BottomFound>;

    /// Whether the default value absorbs: `op(x, default) = default`.
    /// When true, keys bound on only one side disappear from the result;
    /// when false, their bindings are kept unchanged.
    fn default_is_absorbing(&self) -> bool;
}

/// A partial order checked pointwise by [`PatriciaTree::leq`].
pub trait PartialOrderOp<V> {
    fn leq(&self, left: &V, right: &V) -> bool;

    /// Whether absent bindings read as the order's top element. Values
    /// equal to the default must then never be stored in the tree.
    fn default_is_top(&self) -> bool;
}

#[derive(Debug, PartialEq, Eq)]
enum Node<K, V> {
    Leaf {
        key: K,
        value: V,
    },
    Branch {
        // Key bits strictly above `bit`, shared by every leaf below.
        prefix: u64,
        // The branching bit: a single set bit; clear goes left.
        bit: u64,
        left: Rc<Node<K, V>>,
        right: Rc<Node<K, V>>,
    },
}

/// A persistent map from [`Key`]s to values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatriciaTree<K, V> {
    root: Option<Rc<Node<K, V>>>,
}

impl<K, V> Default for PatriciaTree<K, V> {
    fn default() -> Self {
        PatriciaTree { root: None }
    }
}

fn mask(index: u64, bit: u64) -> u64 {
    index & !(bit | (bit - 1))
}

fn match_prefix(index: u64, prefix: u64, bit: u64) -> bool {
    mask(index, bit) == prefix
}

fn zero_bit(index: u64, bit: u64) -> bool {
    index & bit == 0
}

fn branching_bit(p: u64, q: u64) -> u64 {
    let diff = p ^ q;
    debug_assert_ne!(diff, 0);
    1u64 << (63 - diff.leading_zeros())
}

fn node_prefix<K: Key, V>(node: &Node<K, V>) -> u64 {
    match node {
        Node::Leaf { key, .. } => key.index(),
        Node::Branch { prefix, .. } => *prefix,
    }
}

/// Combine two trees with disjoint prefixes under a fresh branch.
fn join<K: Key, V>(p: u64, s: Rc<Node<K, V>>, q: u64, t: Rc<Node<K, V>>) -> Rc<Node<K, V>> {
    let bit = branching_bit(p, q);
    let prefix = mask(p, bit);
    if zero_bit(p, bit) {
        Rc::new(Node::Branch { prefix, bit, left: s, right: t })
    } else {
        Rc::new(Node::Branch { prefix, bit, left: t, right: s })
    }
}

/// Rebuild a branch, collapsing empty sides.
fn branch<K, V>(
    prefix: u64,
    bit: u64,
    left: Option<Rc<Node<K, V>>>,
    right: Option<Rc<Node<K, V>>>,
) -> Option<Rc<Node<K, V>>> {
    match (left, right) {
        (None, None) => None,
        (Some(l), None) => Some(l),
        (None, Some(r)) => Some(r),
        (Some(l), Some(r)) => Some(Rc::new(Node::Branch { prefix, bit, left: l, right: r })),
    }
}

fn lookup_node<'a, K: Key, V>(mut node: &'a Node<K, V>, index: u64) -> Option<&'a V> {
    loop {
        match node {
            Node::Leaf { key, value } => {
                return (key.index() == index).then_some(value);
            }
            Node::Branch { prefix, bit, left, right } => {
                if !match_prefix(index, *prefix, *bit) {
                    return None;
                }
                node = if zero_bit(index, *bit) { left } else { right };
            }
        }
    }
}

fn insert_node<K: Key, V>(node: Option<&Rc<Node<K, V>>>, key: K, value: V) -> Rc<Node<K, V>> {
    let index = key.index();
    let Some(node) = node else {
        return Rc::new(Node::Leaf { key, value });
    };
    match node.as_ref() {
        Node::Leaf { key: other, .. } => {
            if other.index() == index {
                Rc::new(Node::Leaf { key, value })
            } else {
                let leaf = Rc::new(Node::Leaf { key, value });
                join(index, leaf, other.index(), node.clone())
            }
        }
        Node::Branch { prefix, bit, left, right } => {
            if match_prefix(index, *prefix, *bit) {
                if zero_bit(index, *bit) {
                    Rc::new(Node::Branch {
                        prefix: *prefix,
                        bit: *bit,
                        left: insert_node(Some(left), key, value),
                        right: right.clone(),
                    })
                } else {
                    Rc::new(Node::Branch {
                        prefix: *prefix,
                        bit: *bit,
                        left: left.clone(),
                        right: insert_node(Some(right), key, value),
                    })
                }
            } else {
                let leaf = Rc::new(Node::Leaf { key, value });
                join(index, leaf, *prefix, node.clone())
            }
        }
    }
}

fn remove_node<K: Key, V>(node: &Rc<Node<K, V>>, index: u64) -> Option<Rc<Node<K, V>>> {
    match node.as_ref() {
        Node::Leaf { key, .. } => {
            if key.index() == index {
                None
            } else {
                Some(node.clone())
            }
        }
        Node::Branch { prefix, bit, left, right } => {
            if !match_prefix(index, *prefix, *bit) {
                return Some(node.clone());
            }
            if zero_bit(index, *bit) {
                match remove_node(left, index) {
                    None => Some(right.clone()),
                    Some(l) if Rc::ptr_eq(&l, left) => Some(node.clone()),
                    Some(l) => branch(*prefix, *bit, Some(l), Some(right.clone())),
                }
            } else {
                match remove_node(right, index) {
                    None => Some(left.clone()),
                    Some(r) if Rc::ptr_eq(&r, right) => Some(node.clone()),
                    Some(r) => branch(*prefix, *bit, Some(left.clone()), Some(r)),
                }
            }
        }
    }
}

fn merge_nodes<K: Key, V: Clone, O: BinaryOp<V>>(
    s: Option<&Rc<Node<K, V>>>,
    t: Option<&Rc<Node<K, V>>>,
    op: &O,
) -> Result<Option<Rc<Node<K, V>>>, BottomFound> {
    let (sn, tn) = match (s, t) {
        (None, None) => return Ok(None),
        (None, Some(t)) => {
            return Ok(if op.default_is_absorbing() { None } else { Some(t.clone()) });
        }
        (Some(s), None) => {
            return Ok(if op.default_is_absorbing() { None } else { Some(s.clone()) });
        }
        (Some(s), Some(t)) => (s, t),
    };
    if Rc::ptr_eq(sn, tn) {
        // Idempotence: a shared subtree merges to itself.
        return Ok(Some(sn.clone()));
    }
    match (sn.as_ref(), tn.as_ref()) {
        (Node::Leaf { key, value }, _) => match lookup_node(tn, key.index()) {
            Some(other) => {
                let combined = op.apply(value, other)?;
                if op.default_is_absorbing() {
                    Ok(combined.map(|v| Rc::new(Node::Leaf { key: key.clone(), value: v })))
                } else {
                    match combined {
                        Some(v) => Ok(Some(insert_node(Some(tn), key.clone(), v))),
                        None => Ok(remove_node(tn, key.index())),
                    }
                }
            }
            None => {
                if op.default_is_absorbing() {
                    Ok(None)
                } else {
                    Ok(Some(insert_node(Some(tn), key.clone(), value.clone())))
                }
            }
        },
        (_, Node::Leaf { key, value }) => match lookup_node(sn, key.index()) {
            Some(mine) => {
                let combined = op.apply(mine, value)?;
                if op.default_is_absorbing() {
                    Ok(combined.map(|v| Rc::new(Node::Leaf { key: key.clone(), value: v })))
                } else {
                    match combined {
                        Some(v) => Ok(Some(insert_node(Some(sn), key.clone(), v))),
                        None => Ok(remove_node(sn, key.index())),
                    }
                }
            }
            None => {
                if op.default_is_absorbing() {
                    Ok(None)
                } else {
                    Ok(Some(insert_node(Some(sn), key.clone(), value.clone())))
                }
            }
        },
        (
            Node::Branch { prefix: p, bit: m, left: s0, right: s1 },
            Node::Branch { prefix: q, bit: n, left: t0, right: t1 },
        ) => {
            if m == n && p == q {
                let left = merge_nodes(Some(s0), Some(t0), op)?;
                let right = merge_nodes(Some(s1), Some(t1), op)?;
                Ok(branch(*p, *m, left, right))
            } else if m > n && match_prefix(*q, *p, *m) {
                // `t` lies entirely below one side of `s`.
                let keep = |side: &Rc<Node<K, V>>| {
                    if op.default_is_absorbing() {
                        None
                    } else {
                        Some(side.clone())
                    }
                };
                if zero_bit(*q, *m) {
                    let left = merge_nodes(Some(s0), Some(tn), op)?;
                    Ok(branch(*p, *m, left, keep(s1)))
                } else {
                    let right = merge_nodes(Some(s1), Some(tn), op)?;
                    Ok(branch(*p, *m, keep(s0), right))
                }
            } else if n > m && match_prefix(*p, *q, *n) {
                // `s` lies entirely below one side of `t`.
                let keep = |side: &Rc<Node<K, V>>| {
                    if op.default_is_absorbing() {
                        None
                    } else {
                        Some(side.clone())
                    }
                };
                if zero_bit(*p, *n) {
                    let left = merge_nodes(Some(sn), Some(t0), op)?;
                    Ok(branch(*q, *n, left, keep(t1)))
                } else {
                    let right = merge_nodes(Some(sn), Some(t1), op)?;
                    Ok(branch(*q, *n, keep(t0), right))
                }
            } else {
                // Disjoint key ranges.
                if op.default_is_absorbing() {
                    Ok(None)
                } else {
                    Ok(Some(join(*p, sn.clone(), *q, tn.clone())))
                }
            }
        }
    }
}

impl<K: Key, V> PatriciaTree<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn lookup(&self, key: &K) -> Option<&V> {
        lookup_node(self.root.as_deref()?, key.index())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.root = Some(insert_node(self.root.as_ref(), key, value));
    }

    pub fn remove(&mut self, key: &K) {
        if let Some(root) = &self.root {
            self.root = remove_node(root, key.index());
        }
    }

    /// Iterate bindings in ascending index order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { stack: self.root.as_deref().into_iter().collect() }
    }

    /// Pointwise comparison under `po`, with absent bindings read as the
    /// order's default.
    pub fn leq<O: PartialOrderOp<V>>(&self, other: &Self, po: &O) -> bool {
        if let (Some(a), Some(b)) = (&self.root, &other.root) {
            if Rc::ptr_eq(a, b) {
                return true;
            }
        }
        let bindings_entailed = other.iter().all(|(k, theirs)| match self.lookup(k) {
            Some(ours) => po.leq(ours, theirs),
            // Our side reads as the default; stored values are never the
            // default, so a one-sided right binding cannot be entailed.
            None => false,
        });
        if po.default_is_top() {
            bindings_entailed
        } else {
            bindings_entailed && self.iter().all(|(k, _)| other.lookup(k).is_some())
        }
    }
}

impl<K: Key, V: Clone> PatriciaTree<K, V> {
    /// Pointwise combination of two trees. Subtrees shared between the
    /// operands are not descended.
    pub fn merge_with<O: BinaryOp<V>>(&self, other: &Self, op: &O) -> Result<Self, BottomFound> {
        let root = merge_nodes(self.root.as_ref(), other.root.as_ref(), op)?;
        Ok(PatriciaTree { root })
    }
}

pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Node::Leaf { key, value } => return Some((key, value)),
                Node::Branch { left, right, .. } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
    }
}

impl<'a, K: Key, V> IntoIterator for &'a PatriciaTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Key for u64 {
        fn index(&self) -> u64 {
            *self
        }
    }

    struct MinOp {
        absorbing: bool,
    }

    impl BinaryOp<i64> for MinOp {
        fn apply(&self, left: &i64, right: &i64) -> Result<Option<i64>, BottomFound> {
            Ok(Some(*left.min(right)))
        }

        fn default_is_absorbing(&self) -> bool {
            self.absorbing
        }
    }

    struct LeqOp;

    impl PartialOrderOp<i64> for LeqOp {
        fn leq(&self, left: &i64, right: &i64) -> bool {
            left <= right
        }

        fn default_is_top(&self) -> bool {
            true
        }
    }

    struct StrictLeqOp;

    impl PartialOrderOp<i64> for StrictLeqOp {
        fn leq(&self, left: &i64, right: &i64) -> bool {
            left <= right
        }

        fn default_is_top(&self) -> bool {
            false
        }
    }

    fn tree(pairs: &[(u64, i64)]) -> PatriciaTree<u64, i64> {
        let mut t = PatriciaTree::new();
        for &(k, v) in pairs {
            t.insert(k, v);
        }
        t
    }

    #[test]
    fn insert_lookup_remove_roundtrip() {
        let mut t = PatriciaTree::new();
        for k in [13u64, 0, 7, 255, 256, 1, 1 << 40] {
            t.insert(k, (k as i64) * 10);
        }
        t.insert(7, 0);
        assert_eq!(t.lookup(&7), Some(&0));
        assert_eq!(t.lookup(&255), Some(&2550));
        assert_eq!(t.lookup(&2), None);
        t.remove(&255);
        assert_eq!(t.lookup(&255), None);
        t.remove(&255);
        assert_eq!(t.lookup(&0), Some(&0));
    }

    #[test]
    fn iteration_is_ordered() {
        let t = tree(&[(9, 1), (2, 2), (1 << 33, 3), (0, 4), (15, 5)]);
        let keys: Vec<u64> = t.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![0, 2, 9, 15, 1 << 33]);
    }

    #[test]
    fn clone_is_unaffected_by_mutation() {
        let original = tree(&[(1, 10), (2, 20)]);
        let mut copy = original.clone();
        copy.insert(1, 99);
        copy.remove(&2);
        assert_eq!(original.lookup(&1), Some(&10));
        assert_eq!(original.lookup(&2), Some(&20));
        assert_eq!(copy.lookup(&1), Some(&99));
        assert_eq!(copy.lookup(&2), None);
    }

    #[test]
    fn merge_with_absorbing_default_keeps_shared_keys_only() {
        let a = tree(&[(1, 5), (2, 7), (8, 1)]);
        let b = tree(&[(2, 3), (8, 4), (9, 6)]);
        let m = a.merge_with(&b, &MinOp { absorbing: true }).unwrap();
        let pairs: Vec<(u64, i64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![(2, 3), (8, 1)]);
    }

    #[test]
    fn merge_with_plain_default_keeps_one_sided_keys() {
        let a = tree(&[(1, 5), (2, 7)]);
        let b = tree(&[(2, 3), (9, 6)]);
        let m = a.merge_with(&b, &MinOp { absorbing: false }).unwrap();
        let pairs: Vec<(u64, i64)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![(1, 5), (2, 3), (9, 6)]);
    }

    #[test]
    fn merge_preserves_shared_subtrees() {
        let a = tree(&[(1, 5), (2, 7), (300, 0)]);
        let b = a.clone();
        let m = a.merge_with(&b, &MinOp { absorbing: true }).unwrap();
        assert!(Rc::ptr_eq(a.root.as_ref().unwrap(), m.root.as_ref().unwrap()));
    }

    #[test]
    fn leq_reads_absent_as_top() {
        let small = tree(&[(1, 0), (2, 1), (3, 9)]);
        let large = tree(&[(1, 4), (3, 9)]);
        let po = LeqOp;
        assert!(small.leq(&large, &po));
        assert!(!large.leq(&small, &po));
        assert!(tree(&[]).leq(&tree(&[]), &po));
        assert!(!tree(&[]).leq(&large, &po));
    }

    #[test]
    fn leq_with_plain_default_rejects_one_sided_keys() {
        let po = StrictLeqOp;
        let small = tree(&[(1, 0), (2, 1)]);
        let exact = tree(&[(1, 4), (2, 1)]);
        assert!(small.leq(&exact, &po));
        assert!(!exact.leq(&small, &po));

        // A key bound only on the left reads as the order's default on
        // the right, which no stored value is below.
        let extra = tree(&[(1, 0), (2, 1), (3, 7)]);
        assert!(!extra.leq(&exact, &po));
        // An implicit-top order accepts the same pair.
        assert!(extra.leq(&exact, &LeqOp));
    }
}
