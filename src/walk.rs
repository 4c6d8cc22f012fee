//! Visitor driven traversal.
//!
//! Each visitor receives the key and a reference to the value and returns whether to continue.
//! The recursive walks return false as soon as a visitor does, so a stop takes effect at
//! every level at once.

use crate::{node::Tree, BTree, Key};

impl<V> Tree<V> {
    fn scan<'a, F>(&'a self, f: &mut F) -> bool
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        match self {
            Tree::L(leaf) => leaf.0.iter().all(|kv| f(kv.0, &kv.1)),
            Tree::NL(nl) => {
                let n = nl.v.len();
                for (kv, ct) in nl.v.iter().zip(nl.c[..n].iter()) {
                    if !ct.scan(f) || !f(kv.0, &kv.1) {
                        return false;
                    }
                }
                nl.c.ix(n).scan(f)
            }
        }
    }

    fn reverse<'a, F>(&'a self, f: &mut F) -> bool
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        match self {
            Tree::L(leaf) => leaf.0.iter().rev().all(|kv| f(kv.0, &kv.1)),
            Tree::NL(nl) => {
                let n = nl.v.len();
                if !nl.c.ix(n).reverse(f) {
                    return false;
                }
                for (kv, ct) in nl.v.iter().zip(nl.c[..n].iter()).rev() {
                    if !f(kv.0, &kv.1) || !ct.reverse(f) {
                        return false;
                    }
                }
                true
            }
        }
    }

    fn ascend<'a, F>(&'a self, pivot: Key, f: &mut F) -> bool
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        match self {
            Tree::L(leaf) => {
                let (i, _) = leaf.0.find(pivot);
                leaf.0[i..].iter().all(|kv| f(kv.0, &kv.1))
            }
            Tree::NL(nl) => {
                let (i, found) = nl.v.find(pivot);
                if !found && !nl.c.ix(i).ascend(pivot, f) {
                    return false;
                }
                for j in i..nl.v.len() {
                    let kv = nl.v.ix(j);
                    if !f(kv.0, &kv.1) || !nl.c.ix(j + 1).scan(f) {
                        return false;
                    }
                }
                true
            }
        }
    }

    fn descend<'a, F>(&'a self, pivot: Key, f: &mut F) -> bool
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        match self {
            Tree::L(leaf) => {
                let (i, found) = leaf.0.find(pivot);
                let end = if found { i + 1 } else { i };
                leaf.0[..end].iter().rev().all(|kv| f(kv.0, &kv.1))
            }
            Tree::NL(nl) => {
                let (i, found) = nl.v.find(pivot);
                if !found && !nl.c.ix(i).descend(pivot, f) {
                    return false;
                }
                let end = if found { i + 1 } else { i };
                for j in (0..end).rev() {
                    let kv = nl.v.ix(j);
                    if !f(kv.0, &kv.1) || !nl.c.ix(j).reverse(f) {
                        return false;
                    }
                }
                true
            }
        }
    }
} // End impl Tree

impl<V> BTree<V> {
    /// Visit every key-value pair in ascending key order until `f` returns false.
    pub fn scan<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        if let Some(root) = self.root.as_ref() {
            root.scan(&mut f);
        }
    }

    /// Visit every key-value pair in descending key order until `f` returns false.
    pub fn reverse<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        if let Some(root) = self.root.as_ref() {
            root.reverse(&mut f);
        }
    }

    /// Visit key-value pairs with key >= `pivot` in ascending order until `f` returns false.
    pub fn ascend<'a, F>(&'a self, pivot: Key, mut f: F)
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        if let Some(root) = self.root.as_ref() {
            root.ascend(pivot, &mut f);
        }
    }

    /// Visit key-value pairs with key <= `pivot` in descending order until `f` returns false.
    pub fn descend<'a, F>(&'a self, pivot: Key, mut f: F)
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        if let Some(root) = self.root.as_ref() {
            root.descend(pivot, &mut f);
        }
    }

    /// Same as [`BTree::ascend`].
    pub fn greater_or_equal<'a, F>(&'a self, pivot: Key, f: F)
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        self.ascend(pivot, f);
    }

    /// Same as [`BTree::descend`].
    pub fn less_or_equal<'a, F>(&'a self, pivot: Key, f: F)
    where
        F: FnMut(Key, &'a V) -> bool,
    {
        self.descend(pivot, f);
    }
}
