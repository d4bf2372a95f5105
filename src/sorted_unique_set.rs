use core::fmt;
use core::iter::Rev;
use core::ops::Index;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{BuildError, ComparisonError, IndexError, NotFound};
use crate::ordered_tree::{IntoIter, Iter, OrderedTree};
use crate::source::{self, Source};

/// A sorted set: no two elements are comparator-equal.
///
/// Adding a value equal to one already present is a no-op. Everything else
/// behaves like [`SortedSequence`](crate::SortedSequence), including the
/// treatment of values the comparator cannot order.
///
/// # Examples
///
/// ```
/// use wabi_sorted::SortedUniqueSet;
///
/// let mut set = SortedUniqueSet::new();
/// assert_eq!(set.add(5), Ok(true));
/// assert_eq!(set.add(5), Ok(false));
/// assert_eq!(set.len(), 1);
///
/// let letters = SortedUniqueSet::from_source("mississippi".chars().collect::<Vec<_>>()).unwrap();
/// assert_eq!(letters.iter().collect::<String>(), "imps");
/// assert_eq!(letters.rank_of(&'p'), Ok(2));
/// ```
#[derive(Clone)]
pub struct SortedUniqueSet<T, C = NaturalOrder> {
    tree: OrderedTree<T, C>,
}

impl<T> SortedUniqueSet<T> {
    /// Creates an empty set ordered by [`NaturalOrder`].
    #[must_use]
    pub const fn new() -> Self {
        Self { tree: OrderedTree::new() }
    }

    /// Creates an empty set with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: OrderedTree::with_capacity(capacity),
        }
    }
}

impl<T: PartialOrd> SortedUniqueSet<T> {
    /// Builds a naturally ordered set from `source`. Repeated values are kept once.
    ///
    /// # Errors
    ///
    /// See [`SortedUniqueSet::from_source_with`].
    pub fn from_source<S>(source: S) -> Result<Self, BuildError<S::Error>>
    where
        S: Source<Item = T>,
    {
        Self::from_source_with(source, NaturalOrder)
    }

    /// Builds a naturally ordered set from `values`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ComparisonError`].
    pub fn try_from_iter<I>(values: I) -> Result<Self, ComparisonError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = Self::new();
        set.try_extend(values)?;
        Ok(set)
    }
}

impl<T, C> SortedUniqueSet<T, C> {
    /// Creates an empty set ordered by `comparator`.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            tree: OrderedTree::with_comparator(comparator),
        }
    }

    /// Creates an empty set ordered by `comparator` with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        Self {
            tree: OrderedTree::with_capacity_and_comparator(capacity, comparator),
        }
    }

    /// Returns the comparator that orders this set.
    pub const fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Returns the number of elements the set can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the element at `rank`; negative ranks count from the end.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] when `rank` is outside `[-len, len - 1]`.
    pub fn get(&self, rank: isize) -> Result<&T, IndexError> {
        self.tree.get(rank)
    }

    /// Returns the smallest element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    /// Returns the largest element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    /// Removes and returns the element at `rank`; negative ranks count from the end.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] when `rank` is outside `[-len, len - 1]`.
    pub fn pop(&mut self, rank: isize) -> Result<T, IndexError> {
        self.tree.pop(rank)
    }

    /// Returns an ascending iterator.
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    /// Returns a descending iterator.
    pub fn iter_descending(&self) -> Rev<Iter<'_, T>> {
        self.tree.iter_descending()
    }
}

impl<T, C: Comparator<T>> SortedUniqueSet<T, C> {
    /// Builds a set ordered by `comparator` from `source`, adding values in source order.
    ///
    /// # Errors
    ///
    /// - [`BuildError::UnsupportedSource`] when `source` is neither indexed nor advancing.
    /// - [`BuildError::Source`] with the source's own error, unchanged.
    /// - [`BuildError::Comparison`] when two values cannot be ordered.
    pub fn from_source_with<S>(mut source: S, comparator: C) -> Result<Self, BuildError<S::Error>>
    where
        S: Source<Item = T>,
    {
        let mut set = Self::with_comparator(comparator);
        source::drain(&mut source, |value| set.add(value).map(drop))?;
        Ok(set)
    }

    /// Adds `value` unless an equal element is already present.
    ///
    /// Returns whether the value was inserted.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position; the
    /// set is unchanged in that case.
    pub fn add(&mut self, value: T) -> Result<bool, ComparisonError> {
        if self.tree.rank_of(&value).is_ok() {
            return Ok(false);
        }
        self.tree.insert(value).map(|_| true)
    }

    /// Adds every value produced by `values` that is not already present, or none of them.
    ///
    /// Returns how many values were inserted.
    ///
    /// # Errors
    ///
    /// Returns the first [`ComparisonError`]; the set is left as it was before
    /// the call.
    pub fn try_extend<I>(&mut self, values: I) -> Result<usize, ComparisonError>
    where
        I: IntoIterator<Item = T>,
    {
        self.tree.try_extend_unique(values)
    }

    /// Removes the element equal to `value`, if any. Returns whether one was removed.
    pub fn discard(&mut self, value: &T) -> bool {
        self.tree.remove_first_equal(value)
    }

    /// Removes and returns the element equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] when there is no equal element.
    pub fn remove(&mut self, value: &T) -> Result<T, NotFound> {
        self.tree.remove(value)
    }

    /// Returns `true` if an element equal to `value` is present.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    /// Returns `1` if an element equal to `value` is present, `0` otherwise.
    #[must_use]
    pub fn count(&self, value: &T) -> usize {
        usize::from(self.contains(value))
    }

    /// Returns the rank of the element equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] when no element matches.
    pub fn rank_of(&self, value: &T) -> Result<usize, NotFound> {
        self.tree.rank_of(value)
    }

    /// Returns the number of elements strictly before `value`.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position.
    pub fn bisect_left(&self, value: &T) -> Result<usize, ComparisonError> {
        self.tree.bisect_left(value)
    }

    /// Returns the number of elements not after `value`.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position.
    pub fn bisect_right(&self, value: &T) -> Result<usize, ComparisonError> {
        self.tree.bisect_right(value)
    }

    /// Returns `true` if every element of `other` is contained in `self`.
    ///
    /// Membership is decided by `self`'s comparator; elements it cannot order
    /// count as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_sorted::SortedUniqueSet;
    ///
    /// let big = SortedUniqueSet::try_from_iter([1, 2, 3, 4]).unwrap();
    /// let small = SortedUniqueSet::try_from_iter([2, 4]).unwrap();
    /// assert!(big.is_superset(&small));
    /// assert!(small.is_subset(&big));
    /// assert!(!small.is_superset(&big));
    /// ```
    #[must_use]
    pub fn is_superset<D>(&self, other: &SortedUniqueSet<T, D>) -> bool {
        other.len() <= self.len() && other.iter().all(|value| self.contains(value))
    }

    /// Returns `true` if every element of `self` is contained in `other`.
    ///
    /// Membership is decided by `other`'s comparator.
    #[must_use]
    pub fn is_subset<D: Comparator<T>>(&self, other: &SortedUniqueSet<T, D>) -> bool {
        other.is_superset(self)
    }
}

impl<T, C: Default> Default for SortedUniqueSet<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: fmt::Debug, C> fmt::Debug for SortedUniqueSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for SortedUniqueSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq, C> Eq for SortedUniqueSet<T, C> {}

/// Indexes into the set by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
impl<T, C> Index<usize> for SortedUniqueSet<T, C> {
    type Output = T;

    fn index(&self, rank: usize) -> &T {
        &self.tree[rank]
    }
}

impl<'a, T, C> IntoIterator for &'a SortedUniqueSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> IntoIterator for SortedUniqueSet<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        self.tree.into_iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::source::IterSource;
    use alloc::format;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn duplicate_add_is_noop() {
        let mut set = SortedUniqueSet::new();
        assert_eq!(set.add(5), Ok(true));
        assert_eq!(set.add(5), Ok(false));
        assert_eq!(set.len(), 1);
        assert_eq!(set.count(&5), 1);
        assert!(set.discard(&5));
        assert!(set.is_empty());
        assert!(!set.discard(&5));
    }

    #[test]
    fn failed_add_leaves_set_unchanged() {
        let mut set = SortedUniqueSet::try_from_iter([1.0, 2.0]).unwrap();
        assert_eq!(set.add(f64::NAN), Err(ComparisonError::Incomparable));
        assert_eq!(set.len(), 2);
        assert_eq!(set.rank_of(&f64::NAN), Err(NotFound));
    }

    #[test]
    fn try_extend_skips_present_values() {
        let mut set = SortedUniqueSet::try_from_iter([3, 1]).unwrap();
        assert_eq!(set.try_extend([1, 2, 2, 4]), Ok(2));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4]);
    }

    #[test]
    fn try_extend_is_atomic() {
        let mut set = SortedUniqueSet::try_from_iter([3.0]).unwrap();
        assert_eq!(set.try_extend([1.0, 2.0, f64::NAN]), Err(ComparisonError::Incomparable));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3.0]);
    }

    #[test]
    fn debug_renders_as_set() {
        let set = SortedUniqueSet::try_from_iter([2, 1]).unwrap();
        assert_eq!(format!("{set:?}"), "{1, 2}");
    }

    proptest! {
        #[test]
        fn set_matches_sorted_dedup(values in prop::collection::vec(-50i32..50, 0..200)) {
            let mut incremental = SortedUniqueSet::new();
            for &value in &values {
                let fresh = !incremental.contains(&value);
                prop_assert_eq!(incremental.add(value), Ok(fresh));
            }
            let bulk = SortedUniqueSet::from_source(IterSource::new(values.iter().copied())).unwrap();

            let mut expected = values.clone();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(incremental.iter().copied().collect::<Vec<_>>(), expected.clone());
            prop_assert_eq!(&incremental, &bulk);
            for (rank, value) in expected.iter().enumerate() {
                prop_assert_eq!(incremental.rank_of(value), Ok(rank));
            }
            prop_assert!(incremental.is_subset(&bulk) && incremental.is_superset(&bulk));
        }
    }
}
