use arrayvec::ArrayVec;
use std::{
    fmt,
    ops::{Bound, Deref, DerefMut, RangeBounds},
};

use crate::Key;

/// In debug mode or feature unsafe-optim not enabled, same as assert! otherwise does nothing.
#[cfg(any(debug_assertions, not(feature = "unsafe-optim")))]
macro_rules! safe_assert {
    ( $cond: expr ) => {
        assert!($cond)
    };
}

/// In debug mode or feature unsafe-optim not enabled, same as assert! otherwise does nothing.
#[cfg(all(not(debug_assertions), feature = "unsafe-optim"))]
macro_rules! safe_assert {
    ( $cond: expr ) => {};
}

/// Vec with fixed capacity, stored inline in the owning node.
pub(crate) struct FixedCapVec<T, const N: usize>(ArrayVec<T, N>);

impl<T, const N: usize> Default for FixedCapVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> FixedCapVec<T, N> {
    pub fn new() -> Self {
        Self(ArrayVec::new())
    }

    #[inline]
    pub fn full(&self) -> bool {
        self.0.is_full()
    }

    #[cfg(not(feature = "unsafe-optim"))]
    #[inline]
    pub fn push(&mut self, value: T) {
        self.0.push(value);
    }

    #[cfg(feature = "unsafe-optim")]
    #[inline]
    pub fn push(&mut self, value: T) {
        safe_assert!(!self.0.is_full());
        unsafe {
            self.0.push_unchecked(value);
        }
    }

    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.0.pop()
    }

    pub fn insert(&mut self, at: usize, value: T) {
        safe_assert!(at <= self.0.len() && !self.0.is_full());
        self.0.insert(at, value);
    }

    pub fn remove(&mut self, at: usize) -> T {
        safe_assert!(at < self.0.len());
        self.0.remove(at)
    }

    /// Moves elements `at..` into a new vec.
    pub fn split_off(&mut self, at: usize) -> Self {
        safe_assert!(at <= self.0.len());
        Self(self.0.drain(at..).collect())
    }

    /// Moves all elements of `other` onto the end of `self`.
    pub fn append(&mut self, other: Self) {
        safe_assert!(self.0.len() + other.0.len() <= N);
        self.0.extend(other.0);
    }

    /// Get reference to ith element.
    #[cfg(not(feature = "unsafe-optim"))]
    #[inline]
    pub fn ix(&self, ix: usize) -> &T {
        &self.0[ix]
    }

    /// Get reference to ith element.
    #[cfg(feature = "unsafe-optim")]
    #[inline]
    pub fn ix(&self, ix: usize) -> &T {
        safe_assert!(ix < self.0.len());
        unsafe { self.0.get_unchecked(ix) }
    }

    /// Get mutable reference to ith element.
    #[cfg(not(feature = "unsafe-optim"))]
    #[inline]
    pub fn ixm(&mut self, ix: usize) -> &mut T {
        &mut self.0[ix]
    }

    /// Get mutable reference to ith element.
    #[cfg(feature = "unsafe-optim")]
    #[inline]
    pub fn ixm(&mut self, ix: usize) -> &mut T {
        safe_assert!(ix < self.0.len());
        unsafe { self.0.get_unchecked_mut(ix) }
    }
}

impl<V, const N: usize> FixedCapVec<(Key, V), N> {
    /// Binary search for `key`.
    ///
    /// Returns `(i, true)` if `key` is at index i, otherwise `(i, false)` where i is the
    /// number of keys less than `key`, which is the child to descend into or the insert position.
    pub fn find(&self, key: Key) -> (usize, bool) {
        let (mut i, mut j) = (0, self.0.len());
        while i < j {
            let h = i + (j - i) / 2;
            if key >= self.ix(h).0 {
                i = h + 1;
            } else {
                j = h;
            }
        }
        if i > 0 && self.ix(i - 1).0 == key {
            (i - 1, true)
        } else {
            (i, false)
        }
    }

    /// Index range `x..y` of the keys that fall within `range`.
    pub fn span<R>(&self, range: &R) -> (usize, usize)
    where
        R: RangeBounds<Key>,
    {
        let x = match range.start_bound() {
            Bound::Unbounded => 0,
            Bound::Included(s) => self.partition_point(|kv| kv.0 < *s),
            Bound::Excluded(s) => self.partition_point(|kv| kv.0 <= *s),
        };
        let y = match range.end_bound() {
            Bound::Unbounded => self.0.len(),
            Bound::Included(e) => self.partition_point(|kv| kv.0 <= *e),
            Bound::Excluded(e) => self.partition_point(|kv| kv.0 < *e),
        };
        (x, y.max(x))
    }
}

impl<T, const N: usize> Deref for FixedCapVec<T, N> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T, const N: usize> DerefMut for FixedCapVec<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.0
    }
}

impl<T: Clone, const N: usize> Clone for FixedCapVec<T, N> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T, const N: usize> fmt::Debug for FixedCapVec<T, N>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
