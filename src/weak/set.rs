use core::fmt;
use core::iter::Rev;

use super::adapter::{Iter, WeakOrderedAdapter};
use super::tracked::Tracked;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{BuildError, ComparisonError, IndexError, NotFound};
use crate::source::{self, Source};

/// A sorted set of weakly held values: no two live values are comparator-equal.
///
/// Adding a value equal to a live one is a no-op, even when the two are
/// tracked separately. Once the equal value is reclaimed, an equal value can
/// be added again.
///
/// # Examples
///
/// ```
/// use wabi_sorted::{Tracked, WeakSortedUniqueSet};
///
/// let mut set = WeakSortedUniqueSet::new();
/// let first = Tracked::new(5);
/// let second = Tracked::new(5);
/// assert_eq!(set.add(&first), Ok(true));
/// assert_eq!(set.add(&second), Ok(false));
/// assert_eq!(set.len(), 1);
///
/// drop(first);
/// assert!(set.is_empty());
/// assert_eq!(set.add(&second), Ok(true));
/// ```
pub struct WeakSortedUniqueSet<T, C = NaturalOrder> {
    adapter: WeakOrderedAdapter<T, C>,
}

impl<T> WeakSortedUniqueSet<T> {
    /// Creates an empty set ordered by [`NaturalOrder`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            adapter: WeakOrderedAdapter::new(),
        }
    }

    /// Creates an empty set with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            adapter: WeakOrderedAdapter::with_capacity(capacity),
        }
    }
}

impl<T: PartialOrd> WeakSortedUniqueSet<T> {
    /// Builds a naturally ordered set over the values produced by `source`.
    ///
    /// # Errors
    ///
    /// See [`WeakSortedUniqueSet::from_source_with`].
    pub fn from_source<S>(source: S) -> Result<Self, BuildError<S::Error>>
    where
        S: Source<Item = Tracked<T>>,
    {
        Self::from_source_with(source, NaturalOrder)
    }
}

impl<T, C> WeakSortedUniqueSet<T, C> {
    /// Creates an empty set ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            adapter: WeakOrderedAdapter::with_comparator(comparator),
        }
    }

    /// Creates an empty set ordered by `comparator` with room for `capacity` entries.
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

impl<T, C: Comparator<T>> WeakSortedUniqueSet<T, C> {
    /// Builds a set ordered by `comparator` over the values produced by `source`.
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
        let mut set = Self::with_comparator(comparator);
        source::drain(&mut source, |value| set.add(&value).map(drop))?;
        Ok(set)
    }

    /// Adds a weak entry for `value` unless an equal live value is present.
    ///
    /// Returns whether an entry was added.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position; the
    /// set is unchanged in that case.
    pub fn add(&mut self, value: &Tracked<T>) -> Result<bool, ComparisonError> {
        self.adapter.insert_unique(value)
    }

    /// Removes the entry equal to `value`, if any. Returns whether one was removed.
    pub fn discard(&mut self, value: &T) -> bool {
        self.adapter.remove_first_equal(value)
    }

    /// Removes the entry equal to `value` and returns its value.
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

    /// Returns `1` if a live value equal to `value` is present, `0` otherwise.
    pub fn count(&mut self, value: &T) -> usize {
        usize::from(self.adapter.contains(value))
    }

    /// Returns the rank of the live value equal to `value`.
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

impl<T> Default for WeakSortedUniqueSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, C> fmt::Debug for WeakSortedUniqueSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.adapter, f)
    }
}
