#![deny(missing_docs)]

//! This crate implements [BTree], an in-memory B-tree mapping [Key] (`i64`) to values of any type.
//!
//! Besides insert, lookup and delete it supports ordered traversal in both directions, traversal
//! from a pivot key, floor queries ([BTree::get_or_nearest]) and successor/predecessor
//! navigation ([BTree::next], [BTree::prev]).
//!
//! Traversal is available both as visitor methods, where the visitor returns false to stop,
//! and as lazy iterators ([BTree::iter], [BTree::range]).
//!
//! # Example
//!
//! ```
//!     use intbtree::BTree;
//!     let mut tree = BTree::new();
//!     tree.set(10, "ten");
//!     tree.set(20, "twenty");
//!     assert_eq!(tree.get_or_nearest(15), Some((10, &"ten")));
//!     assert_eq!(tree.next(10), Some((20, &"twenty")));
//! ```
//!
//! The tree is not internally synchronised, callers that share a tree between threads
//! must guard it with a lock.
//!
//!# Features
//!
//! This crate supports the following cargo features:
//! - `serde` : enables serialisation of [BTree] via serde crate.
//! - `unsafe-optim` : uses unsafe code for extra optimisation.

mod error;
mod iter;
mod nearest;
mod node;
mod tree;
mod vecs;
mod walk;

pub use error::{Error, Result};
pub use iter::{Iter, Keys, Range, Values};
pub use tree::BTree;

/// Key type.
pub type Key = i64;

/// Node capacity. Between operations a node holds at most `MAX_ITEMS - 1` items,
/// and a node that reaches `MAX_ITEMS` is split. Must be odd so there is a middle item.
pub const MAX_ITEMS: usize = 31;

/// Minimum number of items in a non-root node.
pub const MIN_ITEMS: usize = MAX_ITEMS * 40 / 100;

/// Reserved key, used internally when extracting the largest item of a subtree.
/// Must not be stored in a tree.
pub(crate) const FREE_KEY: Key = Key::MIN;

const _: () = assert!(MAX_ITEMS % 2 == 1 && MIN_ITEMS >= 1);

// Tests.

/* mimalloc cannot be used with miri */
#[cfg(all(test, not(miri)))]
use mimalloc::MiMalloc;

#[cfg(all(test, not(miri)))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[cfg(test)]
mod mytests;
