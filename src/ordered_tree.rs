use core::fmt;
use core::iter::{FusedIterator, Rev};
use core::ops::Index;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{ComparisonError, IndexError, NotFound};
use crate::order_statistic::resolve_rank;
use crate::raw::{Bound, Handle, RawTree, Side};

/// A balanced, size-augmented tree kept in comparator order.
///
/// This is the engine under every container in the crate. Elements that are
/// comparator-equal keep their insertion order: a new element goes after the
/// equal ones already present. Every operation is O(log n) except iteration,
/// which is amortised O(1) per element.
///
/// Positional queries and mutations treat comparator failure differently:
///
/// | operation                           | on [`ComparisonError`]            |
/// |-------------------------------------|-----------------------------------|
/// | `insert`, `bisect_left/right`       | returned, tree unchanged          |
/// | `contains`, `count`                 | `false`, `0`                      |
/// | `rank_of`, `remove`                 | [`NotFound`]                      |
/// | `remove_first_equal`                | `false`                           |
///
/// # Examples
///
/// ```
/// use wabi_sorted::OrderedTree;
///
/// let mut tree = OrderedTree::new();
/// for value in [3, 1, 2] {
///     tree.insert(value).unwrap();
/// }
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// assert_eq!(tree.get(-1), Ok(&3));
/// assert_eq!(tree.rank_of(&2), Ok(1));
/// ```
#[derive(Clone)]
pub struct OrderedTree<T, C = NaturalOrder> {
    raw: RawTree<T>,
    comparator: C,
}

/// Compares one probe value against tree elements.
///
/// Lets the same search code serve plain elements and weak slots, whose
/// referent has to be resolved before it can be compared.
pub(crate) trait Probe<E: ?Sized> {
    /// Whether `element` sorts strictly before the probe.
    fn precedes(&self, element: &E) -> Result<bool, ComparisonError>;
    /// Whether `element` sorts strictly after the probe.
    fn follows(&self, element: &E) -> Result<bool, ComparisonError>;
}

/// A probe that compares a borrowed value with the tree's comparator.
pub(crate) struct ValueProbe<'a, T: ?Sized, C> {
    pub(crate) value: &'a T,
    pub(crate) comparator: &'a C,
}

impl<T: ?Sized, C: Comparator<T>> Probe<T> for ValueProbe<'_, T, C> {
    #[inline]
    fn precedes(&self, element: &T) -> Result<bool, ComparisonError> {
        self.comparator.less_than(element, self.value)
    }

    #[inline]
    fn follows(&self, element: &T) -> Result<bool, ComparisonError> {
        self.comparator.less_than(self.value, element)
    }
}

/// An iterator over the elements of an [`OrderedTree`] in ascending order.
///
/// Created by [`OrderedTree::iter`]. Reverse it (or use
/// [`OrderedTree::iter_descending`]) for descending order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    raw: &'a RawTree<T>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// An owning iterator over the elements of an [`OrderedTree`] in ascending order.
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<T>,
}

impl<T> OrderedTree<T> {
    /// Creates an empty tree ordered by [`NaturalOrder`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Creates an empty tree with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, NaturalOrder)
    }
}

impl<T, C> OrderedTree<T, C> {
    /// Creates an empty tree ordered by `comparator`.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            raw: RawTree::new(),
            comparator,
        }
    }

    /// Creates an empty tree ordered by `comparator` with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        Self {
            raw: RawTree::with_capacity(capacity),
            comparator,
        }
    }

    /// Returns the comparator that orders this tree.
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the number of elements the tree can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the element at `rank`; negative ranks count from the end.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] when `rank` is outside `[-len, len - 1]`.
    pub fn get(&self, rank: isize) -> Result<&T, IndexError> {
        let resolved = resolve_rank(rank, self.len())?;
        self.raw
            .at_rank(resolved)
            .map(|handle| self.raw.element(handle))
            .ok_or(IndexError { rank, len: self.len() })
    }

    /// Returns the smallest element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first().map(|handle| self.raw.element(handle))
    }

    /// Returns the largest element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last().map(|handle| self.raw.element(handle))
    }

    /// Removes and returns the element at `rank` without consulting the comparator.
    pub fn remove_at_rank(&mut self, rank: usize) -> Option<T> {
        let removed = self.raw.remove_at(rank);
        if removed.is_some() {
            tracing::trace!(rank, len = self.len(), "removed element by rank");
        }
        removed
    }

    /// Removes and returns the element at `rank`; negative ranks count from the end.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] when `rank` is outside `[-len, len - 1]`.
    pub fn pop(&mut self, rank: isize) -> Result<T, IndexError> {
        let len = self.len();
        let resolved = resolve_rank(rank, len)?;
        self.remove_at_rank(resolved).ok_or(IndexError { rank, len })
    }

    /// Returns an ascending iterator. Each call starts a fresh traversal.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            raw: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.len(),
        }
    }

    /// Returns a descending iterator, the exact reverse of [`OrderedTree::iter`].
    pub fn iter_descending(&self) -> Rev<Iter<'_, T>> {
        self.iter().rev()
    }

    pub(crate) fn raw(&self) -> &RawTree<T> {
        &self.raw
    }

    pub(crate) fn raw_mut(&mut self) -> &mut RawTree<T> {
        &mut self.raw
    }

    /// Position of the first element that does not precede the probe.
    pub(crate) fn lower_bound_by(&self, probe: &impl Probe<T>) -> Result<Bound, ComparisonError> {
        self.raw.bound_by(|element| probe.precedes(element).map(|before| !before))
    }

    /// Position of the first element that follows the probe.
    pub(crate) fn upper_bound_by(&self, probe: &impl Probe<T>) -> Result<Bound, ComparisonError> {
        self.raw.bound_by(|element| probe.follows(element))
    }

    /// Lowest-ranked element equal to the probe.
    pub(crate) fn find_first_by(&self, probe: &impl Probe<T>) -> Result<Option<(usize, Handle)>, ComparisonError> {
        let bound = self.lower_bound_by(probe)?;
        match bound.handle {
            Some(handle) if !probe.follows(self.raw.element(handle))? => Ok(Some((bound.rank, handle))),
            _ => Ok(None),
        }
    }

    pub(crate) fn count_by(&self, probe: &impl Probe<T>) -> usize {
        let counted = || -> Result<usize, ComparisonError> {
            let Some((first, _)) = self.find_first_by(probe)? else {
                return Ok(0);
            };
            Ok(self.upper_bound_by(probe)?.rank - first)
        };
        counted().unwrap_or(0)
    }
}

impl<T, C: Comparator<T>> OrderedTree<T, C> {
    fn probe<'a>(&'a self, value: &'a T) -> ValueProbe<'a, T, C> {
        ValueProbe {
            value,
            comparator: &self.comparator,
        }
    }

    /// Inserts `value` after any comparator-equal elements and returns its rank.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position; the
    /// tree is unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_sorted::{ComparisonError, OrderedTree};
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.insert(2.0), Ok(0));
    /// assert_eq!(tree.insert(1.0), Ok(0));
    /// assert_eq!(tree.insert(f64::NAN), Err(ComparisonError::Incomparable));
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, value: T) -> Result<usize, ComparisonError> {
        let bound = self.upper_bound_by(&self.probe(&value))?;
        self.raw.link(value, bound.attach);
        tracing::trace!(rank = bound.rank, len = self.len(), "inserted element");
        Ok(bound.rank)
    }

    /// Inserts every value produced by `values`, or none of them.
    ///
    /// # Errors
    ///
    /// On the first [`ComparisonError`] every element inserted by this call is
    /// removed again and the error is returned.
    pub fn try_extend<I>(&mut self, values: I) -> Result<(), ComparisonError>
    where
        I: IntoIterator<Item = T>,
    {
        self.extend_atomically(values, false).map(drop)
    }

    /// Like [`OrderedTree::try_extend`], but skips values already present
    /// (including ones added earlier in the same call). Returns how many were inserted.
    pub(crate) fn try_extend_unique<I>(&mut self, values: I) -> Result<usize, ComparisonError>
    where
        I: IntoIterator<Item = T>,
    {
        self.extend_atomically(values, true)
    }

    fn extend_atomically<I>(&mut self, values: I, skip_present: bool) -> Result<usize, ComparisonError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut inserted = alloc::vec::Vec::new();
        for value in values {
            if skip_present && self.contains(&value) {
                continue;
            }
            let located = self.upper_bound_by(&self.probe(&value));
            match located {
                Ok(bound) => inserted.push(self.raw.link(value, bound.attach)),
                Err(error) => {
                    tracing::debug!(rolled_back = inserted.len(), %error, "bulk insert failed");
                    for handle in inserted.into_iter().rev() {
                        drop(self.raw.unlink(handle));
                    }
                    return Err(error);
                }
            }
        }
        Ok(inserted.len())
    }

    /// Removes the lowest-ranked element equal to `value`.
    ///
    /// Returns `false` when there is none, including when `value` cannot be
    /// compared with the elements.
    pub fn remove_first_equal(&mut self, value: &T) -> bool {
        self.take_first_equal(value).is_some()
    }

    /// Removes and returns the lowest-ranked element equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] when there is no equal element or equality cannot be decided.
    pub fn remove(&mut self, value: &T) -> Result<T, NotFound> {
        self.take_first_equal(value).ok_or(NotFound)
    }

    fn take_first_equal(&mut self, value: &T) -> Option<T> {
        let (rank, handle) = self.find_first_by(&self.probe(value)).ok().flatten()?;
        tracing::trace!(rank, "removing first equal element");
        Some(self.raw.unlink(handle))
    }

    /// Returns `true` if an element equal to `value` is present.
    ///
    /// A comparator failure counts as "not present".
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        matches!(self.find_first_by(&self.probe(value)), Ok(Some(_)))
    }

    /// Returns the number of elements equal to `value`.
    ///
    /// A comparator failure counts as zero.
    #[must_use]
    pub fn count(&self, value: &T) -> usize {
        self.count_by(&self.probe(value))
    }

    /// Returns the lowest rank holding an element equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] when no element matches, including when the
    /// comparator cannot order `value` against the elements.
    pub fn rank_of(&self, value: &T) -> Result<usize, NotFound> {
        match self.find_first_by(&self.probe(value)) {
            Ok(Some((rank, _))) => Ok(rank),
            Ok(None) | Err(_) => Err(NotFound),
        }
    }

    /// Returns the number of elements strictly before `value`.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position.
    pub fn bisect_left(&self, value: &T) -> Result<usize, ComparisonError> {
        Ok(self.lower_bound_by(&self.probe(value))?.rank)
    }

    /// Returns the number of elements not after `value`.
    ///
    /// # Errors
    ///
    /// Returns the [`ComparisonError`] raised while locating the position.
    pub fn bisect_right(&self, value: &T) -> Result<usize, ComparisonError> {
        Ok(self.upper_bound_by(&self.probe(value))?.rank)
    }
}

impl<T, C: Default> Default for OrderedTree<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: fmt::Debug, C> fmt::Debug for OrderedTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for OrderedTree<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for OrderedTree<T, C> {}

/// Indexes into the tree by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
impl<T, C> Index<usize> for OrderedTree<T, C> {
    type Output = T;

    fn index(&self, rank: usize) -> &Self::Output {
        let handle = self.raw.at_rank(rank).expect("index out of bounds");
        self.raw.element(handle)
    }
}

impl<'a, T, C> IntoIterator for &'a OrderedTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> IntoIterator for OrderedTree<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            inner: self.raw.drain_in_order().into_iter(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.remaining -= 1;
        self.front = self.raw.step(handle, Side::Right);
        Some(self.raw.element(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.remaining -= 1;
        self.back = self.raw.step(handle, Side::Left);
        Some(self.raw.element(handle))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner.as_slice()).finish()
    }
}
