//! Weakly held sorted containers.
//!
//! Values enter a weak container as [`Tracked`] handles and are held through
//! weak references only. When the last handle to a value is dropped, its
//! reclamation hook queues the entry for excision, and the container applies
//! that excision at the start of its next call.
//!
//! Because any call may excise entries, weak containers take `&mut self` even
//! for reads such as `len` and `contains`.

mod adapter;
mod sequence;
mod set;
mod slot;
mod tracked;

pub use adapter::{Iter, WeakOrderedAdapter};
pub use sequence::WeakSortedSequence;
pub use set::WeakSortedUniqueSet;
pub use tracked::{HookId, Tracked};
