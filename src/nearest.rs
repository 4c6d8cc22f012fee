//! Floor, successor and predecessor queries.

use crate::{
    error::{Error, Result},
    node::Tree,
    BTree, Key,
};

impl<V> Tree<V> {
    /// Greatest item with key <= `key`.
    ///
    /// Descends as for a lookup, remembering the item just before the search position at each
    /// level. A deeper candidate is always greater, so the last one remembered wins.
    fn floor(&self, key: Key) -> Option<(Key, &V)> {
        let mut tree = self;
        let mut best = None;
        loop {
            let (i, found) = tree.find(key);
            let items = tree.items();
            if found {
                let kv = &items[i];
                return Some((kv.0, &kv.1));
            }
            if i > 0 {
                let kv = &items[i - 1];
                best = Some((kv.0, &kv.1));
            }
            match tree {
                Tree::L(_) => return best,
                Tree::NL(nl) => tree = nl.c.ix(i),
            }
        }
    }
}

impl<V> BTree<V> {
    /// Get the entry with the greatest key <= `key`, or `None` if every key is greater.
    pub fn get_or_nearest(&self, key: Key) -> Option<(Key, &V)> {
        self.root.as_ref()?.floor(key)
    }

    /// Get the entry immediately after `pivot`.
    ///
    /// `pivot` should be a key in the tree. If it is not, the result is the second entry
    /// with a key >= `pivot`, use [`BTree::try_next`] to have that reported instead.
    pub fn next(&self, pivot: Key) -> Option<(Key, &V)> {
        let mut result = None;
        let mut seen = 0;
        self.greater_or_equal(pivot, |k, v| {
            if seen == 1 {
                result = Some((k, v));
                return false;
            }
            seen += 1;
            true
        });
        result
    }

    /// Get the entry immediately before `pivot`.
    ///
    /// `pivot` should be a key in the tree. If it is not, the result is the second entry
    /// with a key <= `pivot`, use [`BTree::try_prev`] to have that reported instead.
    pub fn prev(&self, pivot: Key) -> Option<(Key, &V)> {
        let mut result = None;
        let mut seen = 0;
        self.less_or_equal(pivot, |k, v| {
            if seen == 1 {
                result = Some((k, v));
                return false;
            }
            seen += 1;
            true
        });
        result
    }

    /// Checked [`BTree::next`], fails with [`Error::MissingPivot`] if `pivot` is not in the tree.
    pub fn try_next(&self, pivot: Key) -> Result<Option<(Key, &V)>> {
        if !self.contains_key(pivot) {
            return Err(Error::MissingPivot(pivot));
        }
        Ok(self.next(pivot))
    }

    /// Checked [`BTree::prev`], fails with [`Error::MissingPivot`] if `pivot` is not in the tree.
    pub fn try_prev(&self, pivot: Key) -> Result<Option<(Key, &V)>> {
        if !self.contains_key(pivot) {
            return Err(Error::MissingPivot(pivot));
        }
        Ok(self.prev(pivot))
    }
}
