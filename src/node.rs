//! Node layout and the recursive set/get/delete algorithms.
//!
//! A [`Tree`] is either a `Leaf` or a `NonLeaf`. Items are stored sorted in a fixed capacity
//! vec of [`MAX_ITEMS`], a non-leaf holds one more child than items, and every child of
//! `c[i]` has keys between `v[i-1]` and `v[i]`.
//!
//! Insertion splits a child after the recursive call returns if that call left it full.
//! Deletion takes the predecessor from the left subtree for items found in a non-leaf, and
//! fixes an underflowing child by merging with or borrowing from an adjacent sibling.

use crate::{
    error::{Error, Result},
    vecs::FixedCapVec,
    Key, FREE_KEY, MAX_ITEMS, MIN_ITEMS,
};

pub(crate) type Item<V> = (Key, V);
pub(crate) type ItemVec<V> = FixedCapVec<Item<V>, MAX_ITEMS>;
pub(crate) type TreeVec<V> = FixedCapVec<Tree<V>, { MAX_ITEMS + 1 }>;

/// Median item and new right sibling produced by a split.
pub(crate) type Split<V> = (Item<V>, Tree<V>);

#[derive(Clone, Debug)]
pub(crate) struct Leaf<V>(pub ItemVec<V>);

#[derive(Clone, Debug)]
pub(crate) struct NonLeafInner<V> {
    pub v: ItemVec<V>,
    pub c: TreeVec<V>,
}

/* Boxing both variants keeps Tree at two words, so a TreeVec stays small */
pub(crate) type NonLeaf<V> = Box<NonLeafInner<V>>;

#[derive(Clone, Debug)]
pub(crate) enum Tree<V> {
    L(Box<Leaf<V>>),
    NL(NonLeaf<V>),
}

impl<V> Default for Tree<V> {
    fn default() -> Self {
        Tree::L(Box::new(Leaf(ItemVec::new())))
    }
}

impl<V> Tree<V> {
    /// Leaf holding a single item, the root of a tree that was empty.
    pub(crate) fn single(kv: Item<V>) -> Self {
        let mut leaf = Leaf(ItemVec::new());
        leaf.0.push(kv);
        Tree::L(Box::new(leaf))
    }

    /// The sorted items of this node.
    pub(crate) fn items(&self) -> &[Item<V>] {
        match self {
            Tree::L(leaf) => &leaf.0,
            Tree::NL(nl) => &nl.v,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items().len()
    }

    /// Search this node's items, see [`FixedCapVec::find`].
    pub(crate) fn find(&self, key: Key) -> (usize, bool) {
        match self {
            Tree::L(leaf) => leaf.0.find(key),
            Tree::NL(nl) => nl.v.find(key),
        }
    }

    pub(crate) fn full(&self) -> bool {
        match self {
            Tree::L(leaf) => leaf.0.full(),
            Tree::NL(nl) => nl.v.full(),
        }
    }

    /// Split a full node, this node keeps the items before the median.
    pub(crate) fn split(&mut self) -> Split<V> {
        match self {
            Tree::L(leaf) => {
                let mut right = leaf.0.split_off(MAX_ITEMS / 2);
                let med = right.remove(0);
                (med, Tree::L(Box::new(Leaf(right))))
            }
            Tree::NL(nl) => {
                let mut v = nl.v.split_off(MAX_ITEMS / 2);
                let c = nl.c.split_off(MAX_ITEMS / 2 + 1);
                let med = v.remove(0);
                (med, Tree::NL(Box::new(NonLeafInner { v, c })))
            }
        }
    }

    /// Replace this node with a new root holding the split median, this node and the split sibling.
    pub(crate) fn new_root(&mut self, (med, right): Split<V>) {
        let mut nl = NonLeafInner::new();
        nl.v.push(med);
        nl.c.push(std::mem::take(self));
        nl.c.push(right);
        *self = Tree::NL(nl);
    }

    /// Insert or replace, returns the previous value if the key was present.
    /// May leave this node full, the caller splits it.
    pub(crate) fn insert(&mut self, key: Key, value: V) -> Option<V> {
        match self {
            Tree::L(leaf) => {
                let (i, found) = leaf.0.find(key);
                if found {
                    return Some(std::mem::replace(&mut leaf.0.ixm(i).1, value));
                }
                leaf.0.insert(i, (key, value));
                None
            }
            Tree::NL(nl) => nl.insert(key, value),
        }
    }

    pub(crate) fn get(&self, key: Key) -> Option<&V> {
        match self {
            Tree::L(leaf) => match leaf.0.find(key) {
                (i, true) => Some(&leaf.0.ix(i).1),
                (_, false) => None,
            },
            Tree::NL(nl) => match nl.v.find(key) {
                (i, true) => Some(&nl.v.ix(i).1),
                (i, false) => nl.c.ix(i).get(key),
            },
        }
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        match self {
            Tree::L(leaf) => match leaf.0.find(key) {
                (i, true) => Some(&mut leaf.0.ixm(i).1),
                (_, false) => None,
            },
            Tree::NL(nl) => match nl.v.find(key) {
                (i, true) => Some(&mut nl.v.ixm(i).1),
                (i, false) => nl.c.ixm(i).get_mut(key),
            },
        }
    }

    /// Remove `key`, or the largest item when `max` is set (`key` is then [`FREE_KEY`]).
    /// May leave this node underflowing, the caller rebalances it.
    pub(crate) fn remove(&mut self, key: Key, max: bool) -> Option<Item<V>> {
        match self {
            Tree::L(leaf) => {
                if max {
                    return leaf.0.pop();
                }
                match leaf.0.find(key) {
                    (i, true) => Some(leaf.0.remove(i)),
                    (_, false) => None,
                }
            }
            Tree::NL(nl) => nl.remove(key, max),
        }
    }

    /// Merge `sep` and the right sibling `right` onto the end of this node.
    fn absorb(&mut self, sep: Item<V>, right: Tree<V>) {
        match (self, right) {
            (Tree::L(left), Tree::L(right)) => {
                left.0.push(sep);
                left.0.append(right.0);
            }
            (Tree::NL(left), Tree::NL(right)) => {
                let NonLeafInner { v, c } = *right;
                left.v.push(sep);
                left.v.append(v);
                left.c.append(c);
            }
            _ => unreachable!("siblings at different heights"),
        }
    }

    /// Remove the last item, and the last child of a non-leaf.
    fn pop_back(&mut self) -> Option<(Item<V>, Option<Tree<V>>)> {
        match self {
            Tree::L(leaf) => leaf.0.pop().map(|kv| (kv, None)),
            Tree::NL(nl) => {
                let kv = nl.v.pop()?;
                Some((kv, nl.c.pop()))
            }
        }
    }

    /// Remove the first item, and the first child of a non-leaf.
    fn pop_front(&mut self) -> Option<(Item<V>, Option<Tree<V>>)> {
        match self {
            Tree::L(leaf) if !leaf.0.is_empty() => Some((leaf.0.remove(0), None)),
            Tree::NL(nl) if !nl.v.is_empty() => Some((nl.v.remove(0), Some(nl.c.remove(0)))),
            _ => None,
        }
    }

    fn push_front(&mut self, kv: Item<V>, child: Option<Tree<V>>) {
        match self {
            Tree::L(leaf) => leaf.0.insert(0, kv),
            Tree::NL(nl) => {
                nl.v.insert(0, kv);
                if let Some(child) = child {
                    nl.c.insert(0, child);
                }
            }
        }
    }

    fn push_back(&mut self, kv: Item<V>, child: Option<Tree<V>>) {
        match self {
            Tree::L(leaf) => leaf.0.push(kv),
            Tree::NL(nl) => {
                nl.v.push(kv);
                if let Some(child) = child {
                    nl.c.push(child);
                }
            }
        }
    }

    /// Check the structural invariants of this subtree, returning the number of items in it.
    /// Keys must lie strictly between `lo` and `hi` where given.
    pub(crate) fn validate(
        &self,
        depth: usize,
        height: usize,
        lo: Option<Key>,
        hi: Option<Key>,
    ) -> Result<usize> {
        let items = self.items();
        if depth == 0 && items.is_empty() {
            return Err(Error::EmptyRoot);
        }
        if depth > 0 && items.len() < MIN_ITEMS {
            return Err(Error::Underflow {
                depth,
                items: items.len(),
            });
        }
        if items.len() >= MAX_ITEMS {
            return Err(Error::Overflow {
                depth,
                items: items.len(),
            });
        }
        if items.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(Error::Unsorted { depth });
        }
        for (key, _) in items {
            if lo.is_some_and(|lo| *key <= lo) || hi.is_some_and(|hi| *key >= hi) {
                return Err(Error::OutOfBounds { key: *key, depth });
            }
        }
        match self {
            Tree::L(_) => {
                if depth != height {
                    return Err(Error::Height { depth, height });
                }
                Ok(items.len())
            }
            Tree::NL(nl) => {
                if depth >= height {
                    return Err(Error::Height { depth, height });
                }
                if nl.c.len() != nl.v.len() + 1 {
                    return Err(Error::ChildCount {
                        depth,
                        items: nl.v.len(),
                        children: nl.c.len(),
                    });
                }
                let mut count = nl.v.len();
                for (i, child) in nl.c.iter().enumerate() {
                    let lo = if i == 0 { lo } else { Some(nl.v.ix(i - 1).0) };
                    let hi = if i == nl.v.len() { hi } else { Some(nl.v.ix(i).0) };
                    count += child.validate(depth + 1, height, lo, hi)?;
                }
                Ok(count)
            }
        }
    }
} // End impl Tree

impl<V> NonLeafInner<V> {
    fn new() -> Box<Self> {
        Box::new(Self {
            v: ItemVec::new(),
            c: TreeVec::new(),
        })
    }

    fn insert(&mut self, key: Key, value: V) -> Option<V> {
        let (i, found) = self.v.find(key);
        if found {
            return Some(std::mem::replace(&mut self.v.ixm(i).1, value));
        }
        let prev = self.c.ixm(i).insert(key, value);
        if prev.is_none() && self.c.ix(i).full() {
            let (med, right) = self.c.ixm(i).split();
            self.v.insert(i, med);
            self.c.insert(i + 1, right);
        }
        prev
    }

    fn remove(&mut self, key: Key, max: bool) -> Option<Item<V>> {
        let (i, prev) = if max {
            let i = self.v.len();
            (i, self.c.ixm(i).remove(FREE_KEY, true))
        } else {
            match self.v.find(key) {
                (i, true) => {
                    // Child i is never empty, so there is always a predecessor.
                    let pred = self.c.ixm(i).remove(FREE_KEY, true)?;
                    (i, Some(std::mem::replace(self.v.ixm(i), pred)))
                }
                (i, false) => (i, self.c.ixm(i).remove(key, false)),
            }
        };
        let prev = prev?;
        if self.c.ix(i).len() < MIN_ITEMS {
            self.rebalance(i);
        }
        Some(prev)
    }

    /// Fix underflowing child `i` using its right sibling, or its left sibling if it is the last child.
    fn rebalance(&mut self, mut i: usize) {
        if i == self.v.len() {
            i -= 1;
        }
        let (left, right) = (self.c.ix(i).len(), self.c.ix(i + 1).len());
        if left + right + 1 < MAX_ITEMS {
            let sep = self.v.remove(i);
            let right = self.c.remove(i + 1);
            self.c.ixm(i).absorb(sep, right);
        } else if left > right {
            if let Some((kv, child)) = self.c.ixm(i).pop_back() {
                let sep = std::mem::replace(self.v.ixm(i), kv);
                self.c.ixm(i + 1).push_front(sep, child);
            }
        } else if let Some((kv, child)) = self.c.ixm(i + 1).pop_front() {
            let sep = std::mem::replace(self.v.ixm(i), kv);
            self.c.ixm(i).push_back(sep, child);
        }
    }
} // End impl NonLeafInner
