//! Lazy iteration over a [`BTree`](crate::BTree).
//!
//! Each end of a [`Range`] is a cursor holding the path from the root to the next item it
//! will yield, one frame per level. Cursors are positioned with the node search used by the
//! visitor walks, so `range(pivot..)` yields exactly what `ascend(pivot)` visits and
//! `range(..=pivot).rev()` what `descend(pivot)` visits.
//!
//! The two cursors move independently. Each yielded key narrows the bound checked by the
//! other end, and the first key to fall outside its bound ends the iteration.

use std::{
    iter::FusedIterator,
    ops::{Bound, RangeBounds},
};

use arrayvec::ArrayVec;

use crate::{
    node::{Item, Tree},
    Key,
};

#[inline]
fn kv<V>(x: &Item<V>) -> (Key, &V) {
    (x.0, &x.1)
}

/// Node on a cursor path.
///
/// For the front cursor `ix` is the index of the next item to yield from `node`,
/// for the back cursor it is one past it.
#[derive(Clone, Debug)]
struct Frame<'a, V> {
    node: &'a Tree<V>,
    ix: usize,
}

// Depth of 15 is far beyond any tree that fits in memory.
#[derive(Clone, Debug)]
struct Cursor<'a, V>(ArrayVec<Frame<'a, V>, 15>);

impl<'a, V> Cursor<'a, V> {
    fn new() -> Self {
        Self(ArrayVec::new())
    }

    /// Position at the first item of `tree` that is not below `lo`.
    fn seek_first(&mut self, mut tree: &'a Tree<V>, lo: Bound<&Key>) {
        loop {
            let (ix, hit) = match lo {
                Bound::Unbounded => (0, false),
                Bound::Included(k) => tree.find(*k),
                Bound::Excluded(k) => match tree.find(*k) {
                    (i, true) => (i + 1, false),
                    miss => miss,
                },
            };
            self.0.push(Frame { node: tree, ix });
            match tree {
                Tree::NL(nl) if !hit => tree = nl.c.ix(ix),
                _ => return,
            }
        }
    }

    /// Position at the last item of `tree` that is not above `hi`.
    fn seek_last(&mut self, mut tree: &'a Tree<V>, hi: Bound<&Key>) {
        loop {
            let (ix, hit) = match hi {
                Bound::Unbounded => (tree.len(), false),
                Bound::Included(k) => match tree.find(*k) {
                    (i, true) => (i + 1, true),
                    miss => miss,
                },
                Bound::Excluded(k) => (tree.find(*k).0, false),
            };
            self.0.push(Frame { node: tree, ix });
            match tree {
                Tree::NL(nl) if !hit => tree = nl.c.ix(ix),
                _ => return,
            }
        }
    }

    /// Yield the next item in ascending order.
    fn step_fwd(&mut self) -> Option<(Key, &'a V)> {
        loop {
            let top = self.0.last_mut()?;
            let (node, i) = (top.node, top.ix);
            if i == node.len() {
                self.0.pop();
                continue;
            }
            top.ix = i + 1;
            if let Tree::NL(nl) = node {
                self.seek_first(nl.c.ix(i + 1), Bound::Unbounded);
            }
            return Some(kv(&node.items()[i]));
        }
    }

    /// Yield the next item in descending order.
    fn step_bck(&mut self) -> Option<(Key, &'a V)> {
        loop {
            let top = self.0.last_mut()?;
            let node = top.node;
            if top.ix == 0 {
                self.0.pop();
                continue;
            }
            top.ix -= 1;
            let i = top.ix;
            if let Tree::NL(nl) = node {
                self.seek_last(nl.c.ix(i), Bound::Unbounded);
            }
            return Some(kv(&node.items()[i]));
        }
    }
}

fn not_above(k: Key, hi: Bound<Key>) -> bool {
    match hi {
        Bound::Unbounded => true,
        Bound::Included(e) => k <= e,
        Bound::Excluded(e) => k < e,
    }
}

fn not_below(k: Key, lo: Bound<Key>) -> bool {
    match lo {
        Bound::Unbounded => true,
        Bound::Included(s) => k >= s,
        Bound::Excluded(s) => k > s,
    }
}

/// Iterator returned by [`BTree::range`](crate::BTree::range).
#[derive(Clone, Debug)]
pub struct Range<'a, V> {
    front: Cursor<'a, V>,
    back: Cursor<'a, V>,
    lo: Bound<Key>,
    hi: Bound<Key>,
}
impl<'a, V> Range<'a, V> {
    pub(crate) fn over<R>(root: Option<&'a Tree<V>>, range: &R) -> Self
    where
        R: RangeBounds<Key>,
    {
        let mut x = Self {
            front: Cursor::new(),
            back: Cursor::new(),
            lo: range.start_bound().cloned(),
            hi: range.end_bound().cloned(),
        };
        if let Some(root) = root {
            x.front.seek_first(root, range.start_bound());
            x.back.seek_last(root, range.end_bound());
        }
        x
    }

    fn finish(&mut self) -> Option<(Key, &'a V)> {
        self.front.0.clear();
        self.back.0.clear();
        None
    }
}
impl<'a, V> Iterator for Range<'a, V> {
    type Item = (Key, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let (k, v) = self.front.step_fwd()?;
        if !not_above(k, self.hi) {
            return self.finish();
        }
        self.lo = Bound::Excluded(k);
        Some((k, v))
    }
}
impl<'a, V> DoubleEndedIterator for Range<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (k, v) = self.back.step_bck()?;
        if !not_below(k, self.lo) {
            return self.finish();
        }
        self.hi = Bound::Excluded(k);
        Some((k, v))
    }
}
impl<'a, V> FusedIterator for Range<'a, V> {}

/// Iterator returned by [`BTree::iter`](crate::BTree::iter).
#[derive(Clone, Debug)]
pub struct Iter<'a, V> {
    len: usize,
    inner: Range<'a, V>,
}
impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(len: usize, root: Option<&'a Tree<V>>) -> Self {
        Self {
            len,
            inner: Range::over(root, &(..)),
        }
    }
}
impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Key, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            self.inner.next()
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}
impl<'a, V> ExactSizeIterator for Iter<'a, V> {
    fn len(&self) -> usize {
        self.len
    }
}
impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            self.inner.next_back()
        }
    }
}
impl<'a, V> FusedIterator for Iter<'a, V> {}

/// Iterator returned by [`BTree::keys`](crate::BTree::keys).
#[derive(Clone, Debug)]
pub struct Keys<'a, V>(pub(crate) Iter<'a, V>);
impl<'a, V> Iterator for Keys<'a, V> {
    type Item = Key;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<'a, V> DoubleEndedIterator for Keys<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}
impl<'a, V> ExactSizeIterator for Keys<'a, V> {
    fn len(&self) -> usize {
        self.0.len()
    }
}
impl<'a, V> FusedIterator for Keys<'a, V> {}

/// Iterator returned by [`BTree::values`](crate::BTree::values).
#[derive(Clone, Debug)]
pub struct Values<'a, V>(pub(crate) Iter<'a, V>);
impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
impl<'a, V> DoubleEndedIterator for Values<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}
impl<'a, V> ExactSizeIterator for Values<'a, V> {
    fn len(&self) -> usize {
        self.0.len()
    }
}
impl<'a, V> FusedIterator for Values<'a, V> {}
