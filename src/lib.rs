//! Sorted sequences and sets on a weight-balanced order-statistic tree.
//!
//! This crate provides four containers that keep their elements in sorted
//! order and answer positional queries in O(log n):
//!
//! - [`SortedSequence`] keeps duplicates.
//! - [`SortedUniqueSet`] rejects values equal to one already present.
//! - [`WeakSortedSequence`] and [`WeakSortedUniqueSet`] hold [`Tracked`]
//!   values weakly and forget them once they are dropped everywhere else.
//!
//! Ordering comes from a [`Comparator`], which may fail. Operations that must
//! find a position (`add`, `bisect_*`, construction) report the failure as a
//! [`ComparisonError`] and leave the container unchanged; lookups
//! (`contains`, `count`, `discard`, `rank_of`) treat the value as absent.
//!
//! # Example
//!
//! ```
//! use wabi_sorted::{NotFound, SortedSequence};
//!
//! let mut scores = SortedSequence::from_source(vec![88, 92, 75]).unwrap();
//! scores.add(92).unwrap();
//!
//! // Positional access, negative ranks count from the end (O(log n))
//! assert_eq!(scores.get(0), Ok(&75));
//! assert_eq!(scores.get(-1), Ok(&92));
//!
//! // Membership, multiplicity and rank
//! assert_eq!(scores.count(&92), 2);
//! assert_eq!(scores.rank_of(&88), Ok(1));
//! assert_eq!(scores.rank_of(&60), Err(NotFound));
//!
//! // Descending iteration is the exact reverse of ascending
//! assert_eq!(scores.iter_descending().copied().collect::<Vec<_>>(), [92, 92, 88, 75]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Fallible ordering** - `f64::NAN` and friends are rejected, never silently misplaced
//! - **Stable node handles** - Removal relinks nodes instead of moving elements,
//!   which is what lets weak entries be excised by position
//!
//! # Implementation
//!
//! All containers share one engine, [`OrderedTree`]: a weight-balanced binary
//! tree (Δ = 3, Γ = 2) whose nodes live in an arena and carry the size of their
//! subtree. Subtree sizes give rank lookups, and parent links let a node find
//! its own rank without comparing anything.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod comparator;
mod error;
mod order_statistic;
mod raw;
mod sorted_sequence;
mod sorted_unique_set;
mod source;

pub mod ordered_tree;
pub mod weak;

pub use comparator::{Comparator, NaturalOrder, Reversed};
pub use error::{BuildError, ComparisonError, IndexError, NotFound};
pub use order_statistic::resolve_rank;
pub use ordered_tree::OrderedTree;
pub use sorted_sequence::SortedSequence;
pub use sorted_unique_set::SortedUniqueSet;
pub use source::{Advancing, Indexed, IterSource, Source, TryIterSource};
pub use weak::{Tracked, WeakOrderedAdapter, WeakSortedSequence, WeakSortedUniqueSet};
