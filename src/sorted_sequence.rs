use core::fmt;
use core::iter::Rev;
use core::ops::Index;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{BuildError, ComparisonError, IndexError, NotFound};
use crate::ordered_tree::{IntoIter, Iter, OrderedTree};
use crate::source::{self, Source};

/// A sorted sequence that keeps duplicates.
///
/// Elements are kept in comparator order; comparator-equal elements keep the
/// order they were added in. Adding, discarding, membership, counting and
/// positional access are all O(log n).
///
/// A comparator that cannot order two values makes `add` fail and leaves the
/// sequence unchanged, while lookups treat such values as absent:
///
/// ```
/// use wabi_sorted::{ComparisonError, NotFound, SortedSequence};
///
/// let mut seq = SortedSequence::from_source(vec![3.0, 1.0, 2.0]).unwrap();
/// assert_eq!(seq.add(f64::NAN), Err(ComparisonError::Incomparable));
/// assert!(!seq.contains(&f64::NAN));
/// assert_eq!(seq.count(&f64::NAN), 0);
/// assert!(!seq.discard(&f64::NAN));
/// assert_eq!(seq.rank_of(&f64::NAN), Err(NotFound));
/// assert_eq!(seq.len(), 3);
/// ```
///
/// # Examples
///
/// ```
/// use wabi_sorted::{NotFound, SortedSequence};
///
/// let mut seq = SortedSequence::from_source([3, 1, 2]).unwrap();
/// assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
///
/// assert!(seq.discard(&2));
/// assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [1, 3]);
/// assert_eq!(seq.rank_of(&1), Ok(0));
/// assert_eq!(seq.rank_of(&5), Err(NotFound));
///
/// seq.add(3).unwrap();
/// assert_eq!(seq.count(&3), 2);
/// assert_eq!(seq.get(-1), Ok(&3));
/// ```
#[derive(Clone)]
pub struct SortedSequence<T, C = NaturalOrder> {
    tree: OrderedTree<T, C>,
}

impl<T> SortedSequence<T> {
    /// Creates an empty sequence ordered by [`NaturalOrder`].
    #[must_use]
    pub const fn new() -> Self {
        Self { tree: OrderedTree::new() }
    }

    /// Creates an empty sequence with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: OrderedTree::with_capacity(capacity),
        }
    }
}

impl<T: PartialOrd> SortedSequence<T> {
    /// Builds a naturally ordered sequence from `source`.
    ///
    /// # Errors
    ///
    /// See [`SortedSequence::from_source_with`].
    pub fn from_source<S>(source: S) -> Result<Self, BuildError<S::Error>>
    where
        S: Source<Item = T>,
    {
        Self::from_source_with(source, NaturalOrder)
    }

    /// Builds a naturally ordered sequence from `values`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ComparisonError`].
    pub fn try_from_iter<I>(values: I) -> Result<Self, ComparisonError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut seq = Self::new();
        seq.try_extend(values)?;
        Ok(seq)
    }
}

impl<T, C> SortedSequence<T, C> {
    /// Creates an empty sequence ordered by `comparator`.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            tree: OrderedTree::with_comparator(comparator),
        }
    }

    /// Creates an empty sequence ordered by `comparator` with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        Self {
            tree: OrderedTree::with_capacity_and_comparator(capacity, comparator),
        }
    }

    /// Returns the comparator that orders this sequence.
    pub const fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Returns the number of elements the sequence can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the sequence holds no elements.
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

impl<T, C: Comparator<T>> SortedSequence<T, C> {
    /// Builds a sequence ordered by `comparator` from `source`, adding values in source order.
    ///
    /// # Errors
    ///
    /// - [`BuildError::UnsupportedSource`] when `source` is neither indexed nor advancing.
    /// - [`BuildError::Source`] with the source's own error, unchanged.
    /// - [`BuildError::Comparison`] when two values cannot be ordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_sorted::{NaturalOrder, Reversed, SortedSequence};
    ///
    /// let seq = SortedSequence::from_source_with(vec![1, 3, 2], Reversed(NaturalOrder)).unwrap();
    /// assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn from_source_with<S>(mut source: S, comparator: C) -> Result<Self, BuildError<S::Error>>
    where
        S: Source<Item = T>,
    {
        let mut seq = Self::with_comparator(comparator);
        source::drain(&mut source, |value| seq.add(value).map(drop))?;
        Ok(seq)
    }

    /// Inserts `value` after any equal elements and returns its rank.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position; the
    /// sequence is unchanged in that case.
    pub fn add(&mut self, value: T) -> Result<usize, ComparisonError> {
        self.tree.insert(value)
    }

    /// Adds every value produced by `values`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns the first [`ComparisonError`]; the sequence is left as it was
    /// before the call.
    pub fn try_extend<I>(&mut self, values: I) -> Result<(), ComparisonError>
    where
        I: IntoIterator<Item = T>,
    {
        self.tree.try_extend(values)
    }

    /// Removes one element equal to `value`, the lowest-ranked one.
    ///
    /// Returns `false` and does nothing when there is no such element.
    pub fn discard(&mut self, value: &T) -> bool {
        self.tree.remove_first_equal(value)
    }

    /// Removes and returns the lowest-ranked element equal to `value`.
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

    /// Returns the number of elements equal to `value`.
    #[must_use]
    pub fn count(&self, value: &T) -> usize {
        self.tree.count(value)
    }

    /// Returns the lowest rank holding an element equal to `value`.
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
}

impl<T, C: Default> Default for SortedSequence<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: PartialEq, C> PartialEq for SortedSequence<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq, C> Eq for SortedSequence<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for SortedSequence<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

/// Indexes into the sequence by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
impl<T, C> Index<usize> for SortedSequence<T, C> {
    type Output = T;

    fn index(&self, rank: usize) -> &T {
        &self.tree[rank]
    }
}

impl<'a, T, C> IntoIterator for &'a SortedSequence<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> IntoIterator for SortedSequence<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        self.tree.into_iter()
    }
}
