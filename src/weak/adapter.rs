use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::iter::{FusedIterator, Rev};

use smallvec::SmallVec;

use super::slot::{ReferentProbe, WeakSlot};
use super::tracked::Tracked;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{ComparisonError, IndexError, NotFound};
use crate::ordered_tree::{self, OrderedTree};
use crate::raw::Handle;

/// Handles of slots whose referent has been reclaimed, waiting to be excised.
type ReclaimQueue = Rc<RefCell<Vec<Handle>>>;

/// An [`OrderedTree`] of weak entries that forgets values once their last
/// [`Tracked`] handle is dropped.
///
/// Each entry registers a hook on its value; when the value is reclaimed the
/// hook queues the entry's node and the next call on the adapter excises it
/// by rank, without consulting the comparator. Every method (reads included)
/// applies pending excisions first, which is why even `len` takes `&mut self`.
///
/// Lookups take a plain `&T`: a probe does not have to be tracked.
///
/// [`WeakSortedSequence`](crate::WeakSortedSequence) and
/// [`WeakSortedUniqueSet`](crate::WeakSortedUniqueSet) wrap this type with a
/// duplicate policy.
///
/// # Examples
///
/// ```
/// use wabi_sorted::{Tracked, WeakOrderedAdapter};
///
/// let mut adapter = WeakOrderedAdapter::new();
/// let one = Tracked::new(1);
/// let two = Tracked::new(2);
/// adapter.insert(&two).unwrap();
/// adapter.insert(&one).unwrap();
/// assert_eq!(adapter.len(), 2);
///
/// drop(one);
/// assert_eq!(adapter.len(), 1);
/// assert_eq!(adapter.get(0).map(|v| *v), Ok(2));
/// ```
pub struct WeakOrderedAdapter<T, C = NaturalOrder> {
    tree: OrderedTree<WeakSlot<T>, C>,
    reclaimed: ReclaimQueue,
}

/// An iterator over the live values of a weak container, in ascending order.
///
/// Values reclaimed while the iterator is alive are skipped.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    inner: ordered_tree::Iter<'a, WeakSlot<T>>,
}

impl<T> WeakOrderedAdapter<T> {
    /// Creates an empty adapter ordered by [`NaturalOrder`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Creates an empty adapter with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, NaturalOrder)
    }
}

impl<T, C> WeakOrderedAdapter<T, C> {
    /// Creates an empty adapter ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            tree: OrderedTree::with_comparator(comparator),
            reclaimed: ReclaimQueue::default(),
        }
    }

    /// Creates an empty adapter ordered by `comparator` with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        Self {
            tree: OrderedTree::with_capacity_and_comparator(capacity, comparator),
            reclaimed: ReclaimQueue::default(),
        }
    }

    /// Returns the comparator that orders the referents.
    pub const fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Excises every entry whose value has been reclaimed and returns how many there were.
    ///
    /// Every other method does this implicitly.
    pub fn reclaim(&mut self) -> usize {
        let batch: SmallVec<[Handle; 8]> = self.reclaimed.borrow_mut().drain(..).collect();
        let mut excised = 0;
        for handle in batch {
            let raw = self.tree.raw();
            match raw.try_element(handle) {
                Some(slot) if !slot.is_live() => {
                    let rank = raw.rank_of_handle(handle);
                    drop(self.tree.remove_at_rank(rank));
                    excised += 1;
                }
                _ => tracing::debug!(?handle, "ignoring stale reclamation notice"),
            }
        }
        if excised > 0 {
            tracing::debug!(excised, len = self.tree.len(), "excised reclaimed entries");
        }
        excised
    }

    /// Returns the number of live entries.
    pub fn len(&mut self) -> usize {
        self.reclaim();
        self.tree.len()
    }

    /// Returns `true` if there are no live entries.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Removes every entry. The values themselves are untouched.
    pub fn clear(&mut self) {
        for slot in self.tree.raw().elements_unordered() {
            slot.release();
        }
        self.tree.clear();
        self.reclaimed.borrow_mut().clear();
    }

    /// Returns the value at `rank`; negative ranks count from the end.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] when `rank` is outside `[-len, len - 1]`.
    pub fn get(&mut self, rank: isize) -> Result<Tracked<T>, IndexError> {
        self.reclaim();
        self.tree.get(rank).map(live)
    }

    /// Returns the smallest live value.
    pub fn first(&mut self) -> Option<Tracked<T>> {
        self.reclaim();
        self.tree.first().map(live)
    }

    /// Returns the largest live value.
    pub fn last(&mut self) -> Option<Tracked<T>> {
        self.reclaim();
        self.tree.last().map(live)
    }

    /// Removes the entry at `rank` and returns its value.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] when `rank` is outside `[-len, len - 1]`.
    pub fn pop(&mut self, rank: isize) -> Result<Tracked<T>, IndexError> {
        self.reclaim();
        let slot = self.tree.pop(rank)?;
        Ok(slot.detach().expect("`pop`: reclaimed entries were excised first"))
    }

    /// Returns an ascending iterator over the live values.
    pub fn iter(&mut self) -> Iter<'_, T> {
        self.reclaim();
        Iter { inner: self.tree.iter() }
    }

    /// Returns a descending iterator over the live values.
    pub fn iter_descending(&mut self) -> Rev<Iter<'_, T>> {
        self.iter().rev()
    }
}

/// Owning handle to the referent of a slot that survived [`WeakOrderedAdapter::reclaim`].
fn live<T>(slot: &WeakSlot<T>) -> Tracked<T> {
    slot.upgrade().expect("`live`: reclaimed entries were excised first")
}

impl<T, C: Comparator<T>> WeakOrderedAdapter<T, C> {
    fn probe<'a>(&'a self, value: &'a T) -> ReferentProbe<'a, T, C> {
        ReferentProbe {
            value,
            comparator: self.tree.comparator(),
        }
    }

    /// Adds a weak entry for `value` after any equal entries and returns its rank.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position; the
    /// adapter is unchanged and no hook is registered in that case.
    pub fn insert(&mut self, value: &Tracked<T>) -> Result<usize, ComparisonError> {
        self.reclaim();
        let bound = self.tree.upper_bound_by(&self.probe(value))?;
        let handle = self.tree.raw_mut().link(WeakSlot::new(value), bound.attach);

        let queue = Rc::downgrade(&self.reclaimed);
        let hook = value.on_reclaim(move || {
            if let Some(queue) = queue.upgrade() {
                queue.borrow_mut().push(handle);
            }
        });
        self.tree.raw_mut().element_mut(handle).set_hook(hook);
        tracing::trace!(rank = bound.rank, ?handle, "inserted weak entry");
        Ok(bound.rank)
    }

    /// Adds a weak entry for `value` unless an equal live value is present.
    ///
    /// Returns whether an entry was added.
    ///
    /// # Errors
    ///
    /// See [`WeakOrderedAdapter::insert`].
    pub fn insert_unique(&mut self, value: &Tracked<T>) -> Result<bool, ComparisonError> {
        if self.contains(value) {
            return Ok(false);
        }
        self.insert(value).map(|_| true)
    }

    /// Removes the lowest-ranked entry equal to `value` and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] when no live value is equal to `value`.
    pub fn remove(&mut self, value: &T) -> Result<Tracked<T>, NotFound> {
        self.reclaim();
        let Ok(Some((rank, handle))) = self.tree.find_first_by(&self.probe(value)) else {
            return Err(NotFound);
        };
        tracing::trace!(rank, ?handle, "removing weak entry");
        self.tree.raw_mut().unlink(handle).detach().ok_or(NotFound)
    }

    /// Removes the lowest-ranked entry equal to `value`. Returns whether one was removed.
    pub fn remove_first_equal(&mut self, value: &T) -> bool {
        self.remove(value).is_ok()
    }

    /// Returns `true` if a live value equal to `value` is present.
    pub fn contains(&mut self, value: &T) -> bool {
        self.reclaim();
        matches!(self.tree.find_first_by(&self.probe(value)), Ok(Some(_)))
    }

    /// Returns the number of live values equal to `value`.
    pub fn count(&mut self, value: &T) -> usize {
        self.reclaim();
        self.tree.count_by(&self.probe(value))
    }

    /// Returns the lowest rank holding a live value equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] when no live value matches.
    pub fn rank_of(&mut self, value: &T) -> Result<usize, NotFound> {
        self.reclaim();
        match self.tree.find_first_by(&self.probe(value)) {
            Ok(Some((rank, _))) => Ok(rank),
            Ok(None) | Err(_) => Err(NotFound),
        }
    }

    /// Returns the number of live values strictly before `value`.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position.
    pub fn bisect_left(&mut self, value: &T) -> Result<usize, ComparisonError> {
        self.reclaim();
        Ok(self.tree.lower_bound_by(&self.probe(value))?.rank)
    }

    /// Returns the number of live values not after `value`.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position.
    pub fn bisect_right(&mut self, value: &T) -> Result<usize, ComparisonError> {
        self.reclaim();
        Ok(self.tree.upper_bound_by(&self.probe(value))?.rank)
    }
}

impl<T> Default for WeakOrderedAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> Drop for WeakOrderedAdapter<T, C> {
    fn drop(&mut self) {
        for slot in self.tree.raw().elements_unordered() {
            slot.release();
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for WeakOrderedAdapter<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self.tree.iter().filter_map(WeakSlot::upgrade);
        f.debug_list().entries(live).finish()
    }
}

impl<T> Iterator for Iter<'_, T> {
    type Item = Tracked<T>;

    fn next(&mut self) -> Option<Tracked<T>> {
        self.inner.find_map(WeakSlot::upgrade)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.inner.len()))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Tracked<T>> {
        self.inner.by_ref().rev().find_map(WeakSlot::upgrade)
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.inner.len()).finish()
    }
}
