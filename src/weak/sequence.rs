use core::fmt;
use core::iter::Rev;

use super::adapter::{Iter, WeakOrderedAdapter};
use super::tracked::Tracked;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{BuildError, ComparisonError, IndexError, NotFound};
use crate::source::{self, Source};

/// A sorted sequence of weakly held values that keeps duplicates.
///
/// The sequence never keeps a value alive: once the last [`Tracked`] handle
/// to a value is dropped, its entry is gone from every later call.
///
/// # Examples
///
/// ```
/// use wabi_sorted::{Tracked, WeakSortedSequence};
///
/// let owners: Vec<_> = (0..10).map(Tracked::new).collect();
/// let mut seq = WeakSortedSequence::from_source(owners.clone()).unwrap();
/// assert_eq!(seq.len(), 10);
///
/// let survivors: Vec<_> = owners.into_iter().filter(|v| [0, 2, 5, 7, 9].contains(&**v)).collect();
/// assert_eq!(seq.len(), 5);
/// assert_eq!(seq.get(2).map(|v| *v), Ok(5));
/// assert_eq!(seq.rank_of(&5), Ok(2));
/// assert_eq!(seq.iter().map(|v| *v).collect::<Vec<_>>(), [0, 2, 5, 7, 9]);
/// # drop(survivors);
/// ```
pub struct WeakSortedSequence<T, C = NaturalOrder> {
    adapter: WeakOrderedAdapter<T, C>,
}

impl<T> WeakSortedSequence<T> {
    /// Creates an empty sequence ordered by [`NaturalOrder`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            adapter: WeakOrderedAdapter::new(),
        }
    }

    /// Creates an empty sequence with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            adapter: WeakOrderedAdapter::with_capacity(capacity),
        }
    }
}

impl<T: PartialOrd> WeakSortedSequence<T> {
    /// Builds a naturally ordered sequence over the values produced by `source`.
    ///
    /// # Errors
    ///
    /// See [`WeakSortedSequence::from_source_with`].
    pub fn from_source<S>(source: S) -> Result<Self, BuildError<S::Error>>
    where
        S: Source<Item = Tracked<T>>,
    {
        Self::from_source_with(source, NaturalOrder)
    }
}

impl<T, C> WeakSortedSequence<T, C> {
    /// Creates an empty sequence ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            adapter: WeakOrderedAdapter::with_comparator(comparator),
        }
    }

    /// Creates an empty sequence ordered by `comparator` with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        Self {
            adapter: WeakOrderedAdapter::with_capacity_and_comparator(capacity, comparator),
        }
    }

    /// Returns the comparator that orders the values.
    pub const fn comparator(&self) -> &C {
        self.adapter.comparator()
    }

    /// Drops the entries of reclaimed values now and returns how many there were.
    pub fn reclaim(&mut self) -> usize {
        self.adapter.reclaim()
    }

    /// Returns the number of live values.
    pub fn len(&mut self) -> usize {
        self.adapter.len()
    }

    /// Returns `true` if no value is live.
    pub fn is_empty(&mut self) -> bool {
        self.adapter.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.adapter.clear();
    }

    /// Returns the value at `rank`; negative ranks count from the end.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] when `rank` is outside `[-len, len - 1]`.
    pub fn get(&mut self, rank: isize) -> Result<Tracked<T>, IndexError> {
        self.adapter.get(rank)
    }

    /// Returns the smallest live value.
    pub fn first(&mut self) -> Option<Tracked<T>> {
        self.adapter.first()
    }

    /// Returns the largest live value.
    pub fn last(&mut self) -> Option<Tracked<T>> {
        self.adapter.last()
    }

    /// Removes the entry at `rank` and returns its value.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] when `rank` is outside `[-len, len - 1]`.
    pub fn pop(&mut self, rank: isize) -> Result<Tracked<T>, IndexError> {
        self.adapter.pop(rank)
    }

    /// Returns an ascending iterator over the live values.
    pub fn iter(&mut self) -> Iter<'_, T> {
        self.adapter.iter()
    }

    /// Returns a descending iterator over the live values.
    pub fn iter_descending(&mut self) -> Rev<Iter<'_, T>> {
        self.adapter.iter_descending()
    }
}

impl<T, C: Comparator<T>> WeakSortedSequence<T, C> {
    /// Builds a sequence ordered by `comparator` over the values produced by `source`.
    ///
    /// The sequence holds the values weakly; the caller must keep its own
    /// handles for them to stay in it.
    ///
    /// # Errors
    ///
    /// - [`BuildError::UnsupportedSource`] when `source` is neither indexed nor advancing.
    /// - [`BuildError::Source`] with the source's own error, unchanged.
    /// - [`BuildError::Comparison`] when two values cannot be ordered.
    pub fn from_source_with<S>(mut source: S, comparator: C) -> Result<Self, BuildError<S::Error>>
    where
        S: Source<Item = Tracked<T>>,
    {
        let mut seq = Self::with_comparator(comparator);
        source::drain(&mut source, |value| seq.add(&value).map(drop))?;
        Ok(seq)
    }

    /// Adds a weak entry for `value` after any equal entries and returns its rank.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position; the
    /// sequence is unchanged in that case.
    pub fn add(&mut self, value: &Tracked<T>) -> Result<usize, ComparisonError> {
        self.adapter.insert(value)
    }

    /// Removes the lowest-ranked entry equal to `value`. Returns whether one was removed.
    pub fn discard(&mut self, value: &T) -> bool {
        self.adapter.remove_first_equal(value)
    }

    /// Removes the lowest-ranked entry equal to `value` and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] when no live value is equal to `value`.
    pub fn remove(&mut self, value: &T) -> Result<Tracked<T>, NotFound> {
        self.adapter.remove(value)
    }

    /// Returns `true` if a live value equal to `value` is present.
    pub fn contains(&mut self, value: &T) -> bool {
        self.adapter.contains(value)
    }

    /// Returns the number of live values equal to `value`.
    pub fn count(&mut self, value: &T) -> usize {
        self.adapter.count(value)
    }

    /// Returns the lowest rank holding a live value equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] when no live value matches.
    pub fn rank_of(&mut self, value: &T) -> Result<usize, NotFound> {
        self.adapter.rank_of(value)
    }

    /// Returns the number of live values strictly before `value`.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position.
    pub fn bisect_left(&mut self, value: &T) -> Result<usize, ComparisonError> {
        self.adapter.bisect_left(value)
    }

    /// Returns the number of live values not after `value`.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position.
    pub fn bisect_right(&mut self, value: &T) -> Result<usize, ComparisonError> {
        self.adapter.bisect_right(value)
    }
}

impl<T> Default for WeakSortedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, C> fmt::Debug for WeakSortedSequence<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.adapter, f)
    }
}
