//! The [`BTree`] handle and its standard trait impls.

use std::{
    fmt,
    fmt::Debug,
    ops::{Bound, RangeBounds},
};

use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    iter::{Iter, Keys, Range, Values},
    node::Tree,
    Key, FREE_KEY,
};

/// Ordered map from [`Key`] to `V`, implemented as a B-tree with node capacity [`MAX_ITEMS`](crate::MAX_ITEMS).
///
/// General guide to implementation:
///
/// [`BTree`] has a length, a height and an optional root `Tree`, where `Tree` is an enum that can be
/// `Leaf` or `NonLeaf`. The root is `None` exactly when the tree is empty, and every leaf is at
/// depth `height`.
///
/// Set splits full nodes on the way back up, and splitting the root adds a level.
/// Delete rebalances underflowing nodes on the way back up, and an empty root is replaced by its
/// only child.
///
/// Key [`Key::MIN`] is reserved and must not be stored.
pub struct BTree<V> {
    pub(crate) len: usize,
    pub(crate) height: usize,
    pub(crate) root: Option<Tree<V>>,
}
impl<V> Default for BTree<V> {
    fn default() -> Self {
        Self::new()
    }
}
impl<V> BTree<V> {
    /// Returns a new, empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            len: 0,
            height: 0,
            root: None,
        }
    }

    /// Remove all key-value pairs.
    pub fn clear(&mut self) {
        self.len = 0;
        self.height = 0;
        self.root = None;
    }

    /// Get number of key-value pairs in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the tree empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels below the root, 0 when the root is a leaf or the tree is empty.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Insert key-value pair, or if key is already present, replace the value and return the old value.
    ///
    /// `key` must not be [`Key::MIN`], see [`BTree::try_set`].
    pub fn set(&mut self, key: Key, value: V) -> Option<V> {
        debug_assert!(key != FREE_KEY, "key {key} is reserved");
        let root = match &mut self.root {
            Some(root) => root,
            None => {
                self.root = Some(Tree::single((key, value)));
                self.len = 1;
                return None;
            }
        };
        let prev = root.insert(key, value);
        if prev.is_some() {
            return prev;
        }
        if root.full() {
            let split = root.split();
            root.new_root(split);
            self.height += 1;
            trace!(height = self.height, len = self.len + 1, "root split");
        }
        self.len += 1;
        None
    }

    /// Checked [`BTree::set`], fails with [`Error::ReservedKey`] for [`Key::MIN`].
    pub fn try_set(&mut self, key: Key, value: V) -> Result<Option<V>> {
        if key == FREE_KEY {
            return Err(Error::ReservedKey(key));
        }
        Ok(self.set(key, value))
    }

    /// Get reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&V> {
        self.root.as_ref()?.get(key)
    }

    /// Get a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        self.root.as_mut()?.get_mut(key)
    }

    /// Does the tree have an entry for the specified key.
    #[must_use]
    pub fn contains_key(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    /// Remove key-value pair, returning the value.
    pub fn delete(&mut self, key: Key) -> Option<V> {
        let (_, prev) = self.root.as_mut()?.remove(key, false)?;
        self.len -= 1;
        loop {
            match &mut self.root {
                Some(Tree::NL(nl)) if nl.v.is_empty() => {
                    let child = nl.c.pop();
                    self.root = child;
                    self.height -= 1;
                    trace!(height = self.height, len = self.len, "root collapsed");
                }
                Some(Tree::L(leaf)) if leaf.0.is_empty() => {
                    self.root = None;
                }
                _ => break,
            }
        }
        if self.len == 0 {
            self.root = None;
            self.height = 0;
            trace!("tree emptied");
        }
        Some(prev)
    }

    /// Get references to first key and value.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(Key, &V)> {
        self.iter().next()
    }

    /// Gets references to last key and value.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(Key, &V)> {
        self.iter().next_back()
    }

    /// Get iterator of key-value pairs in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self.len, self.root.as_ref())
    }

    /// Get iterator for range of key-value pairs.
    ///
    /// `range(pivot..)` visits the same pairs as [`BTree::ascend`], and
    /// `range(..=pivot).rev()` the same as [`BTree::descend`].
    ///
    /// Panics if the range start is greater than the range end.
    pub fn range<R>(&self, range: R) -> Range<'_, V>
    where
        R: RangeBounds<Key>,
    {
        check_range(&range);
        Range::over(self.root.as_ref(), &range)
    }

    /// Get iterator of keys.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, V> {
        Keys(self.iter())
    }

    /// Get iterator of references to values.
    #[must_use]
    pub fn values(&self) -> Values<'_, V> {
        Values(self.iter())
    }

    /// Check the structural invariants, returning the first violation found.
    ///
    /// Keys are sorted within and across nodes, every non-leaf has one more child than items,
    /// all leaves are at depth [`BTree::height`], non-root nodes are at least
    /// [`MIN_ITEMS`](crate::MIN_ITEMS) full and no node is full, and [`BTree::len`] matches
    /// the number of reachable items.
    pub fn validate(&self) -> Result<()> {
        let found = match &self.root {
            Some(root) => root.validate(0, self.height, None, None),
            None if self.height != 0 => Err(Error::Height {
                depth: 0,
                height: self.height,
            }),
            None => Ok(0),
        };
        let result = found.and_then(|found| {
            if found == self.len {
                Ok(())
            } else {
                Err(Error::LengthMismatch {
                    tracked: self.len,
                    found,
                })
            }
        });
        if let Err(e) = &result {
            debug!(error = %e, height = self.height, len = self.len, "tree validation failed");
        }
        result
    }
} // End impl BTree

fn check_range<R>(range: &R)
where
    R: RangeBounds<Key>,
{
    use Bound::{Excluded, Included};
    match (range.start_bound(), range.end_bound()) {
        (Included(s) | Excluded(s), Included(e)) | (Included(s), Excluded(e)) => {
            assert!(e >= s, "range start is greater than range end in BTree");
        }
        (Excluded(s), Excluded(e)) => {
            assert!(e != s, "range start and end are equal and excluded in BTree");
            assert!(e >= s, "range start is greater than range end in BTree");
        }
        _ => {}
    }
}

impl<V: Clone> Clone for BTree<V> {
    fn clone(&self) -> Self {
        Self {
            len: self.len,
            height: self.height,
            root: self.root.clone(),
        }
    }
}
impl<V: PartialEq> PartialEq for BTree<V> {
    fn eq(&self, other: &BTree<V>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}
impl<V: Eq> Eq for BTree<V> {}

impl<'a, V> IntoIterator for &'a BTree<V> {
    type Item = (Key, &'a V);
    type IntoIter = Iter<'a, V>;
    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}
impl<V> FromIterator<(Key, V)> for BTree<V> {
    fn from_iter<T: IntoIterator<Item = (Key, V)>>(iter: T) -> BTree<V> {
        let mut tree = BTree::new();
        tree.extend(iter);
        tree
    }
}
impl<V, const N: usize> From<[(Key, V); N]> for BTree<V> {
    fn from(arr: [(Key, V); N]) -> BTree<V> {
        arr.into_iter().collect()
    }
}
impl<V> Extend<(Key, V)> for BTree<V> {
    fn extend<T>(&mut self, iter: T)
    where
        T: IntoIterator<Item = (Key, V)>,
    {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}
impl<V> std::ops::Index<Key> for BTree<V> {
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// Panics if the key is not present in the `BTree`.
    fn index(&self, key: Key) -> &V {
        self.get(key).expect("no entry found for key")
    }
}
impl<V: Debug> Debug for BTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize,
};

#[cfg(feature = "serde")]
impl<V> Serialize for BTree<V>
where
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(&k, v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct BTreeVisitor<V> {
    marker: std::marker::PhantomData<fn() -> BTree<V>>,
}

#[cfg(feature = "serde")]
impl<'de, V> Visitor<'de> for BTreeVisitor<V>
where
    V: Deserialize<'de>,
{
    type Value = BTree<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with i64 keys")
    }

    fn visit_map<M>(self, mut access: M) -> std::result::Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut tree = BTree::new();
        while let Some((k, v)) = access.next_entry::<Key, V>()? {
            if k == FREE_KEY {
                return Err(serde::de::Error::custom(Error::ReservedKey(k)));
            }
            tree.set(k, v);
        }
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de, V> Deserialize<'de> for BTree<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(BTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}
