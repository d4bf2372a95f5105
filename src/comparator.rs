//! Fallible total orders.
//!
//! Every container is parameterised by a [`Comparator`]. The default,
//! [`NaturalOrder`], orders any [`PartialOrd`] type and reports values that
//! `partial_cmp` cannot order (such as `f64::NAN`) as
//! [`ComparisonError::Incomparable`]. Closures of the shape
//! `Fn(&T, &T) -> Result<bool, ComparisonError>` are comparators too.

use core::cmp::Ordering;

use crate::error::ComparisonError;

/// A strict "less than" over `T` that may fail.
///
/// Two values are comparator-equal when neither is less than the other. The
/// relation must be a strict weak order over every set of values it does not
/// fail on; a comparator must not touch the container that is calling it.
pub trait Comparator<T: ?Sized> {
    /// Returns whether `a` sorts strictly before `b`.
    ///
    /// # Errors
    ///
    /// Returns a [`ComparisonError`] when `a` and `b` cannot be ordered.
    fn less_than(&self, a: &T, b: &T) -> Result<bool, ComparisonError>;

    /// Returns whether `a` and `b` are comparator-equal.
    ///
    /// # Errors
    ///
    /// Propagates the first failing [`Comparator::less_than`].
    fn equivalent(&self, a: &T, b: &T) -> Result<bool, ComparisonError> {
        Ok(!self.less_than(a, b)? && !self.less_than(b, a)?)
    }
}

/// Orders values by their [`PartialOrd`] implementation.
///
/// # Examples
///
/// ```
/// use wabi_sorted::{Comparator, ComparisonError, NaturalOrder};
///
/// assert_eq!(NaturalOrder.less_than(&1, &2), Ok(true));
/// assert_eq!(NaturalOrder.less_than(&f64::NAN, &2.0), Err(ComparisonError::Incomparable));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<T: PartialOrd + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn less_than(&self, a: &T, b: &T) -> Result<bool, ComparisonError> {
        match a.partial_cmp(b) {
            Some(ordering) => Ok(ordering == Ordering::Less),
            None => Err(ComparisonError::Incomparable),
        }
    }
}

/// Reverses another comparator.
///
/// # Examples
///
/// ```
/// use wabi_sorted::{NaturalOrder, Reversed, SortedSequence};
///
/// let mut seq = SortedSequence::with_comparator(Reversed(NaturalOrder));
/// for value in [2, 3, 1] {
///     seq.add(value).unwrap();
/// }
/// assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reversed<C> {
    #[inline]
    fn less_than(&self, a: &T, b: &T) -> Result<bool, ComparisonError> {
        self.0.less_than(b, a)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Result<bool, ComparisonError>,
{
    #[inline]
    fn less_than(&self, a: &T, b: &T) -> Result<bool, ComparisonError> {
        self(a, b)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn natural_order_on_floats() {
        assert_eq!(NaturalOrder.less_than(&1.0, &2.0), Ok(true));
        assert_eq!(NaturalOrder.less_than(&2.0, &1.0), Ok(false));
        assert_eq!(NaturalOrder.equivalent(&2.0, &2.0), Ok(true));
        assert_eq!(NaturalOrder.less_than(&f64::NAN, &f64::NAN), Err(ComparisonError::Incomparable));
        assert_eq!(NaturalOrder.equivalent(&1.0, &f64::NAN), Err(ComparisonError::Incomparable));
    }

    #[test]
    fn natural_order_on_unsized() {
        assert_eq!(NaturalOrder.less_than("apple", "banana"), Ok(true));
    }

    #[test]
    fn closure_comparator() {
        let by_len = |a: &&str, b: &&str| -> Result<bool, ComparisonError> { Ok(a.len() < b.len()) };
        assert_eq!(by_len.less_than(&"aa", &"b"), Ok(false));
        assert_eq!(by_len.equivalent(&"aa", &"bb"), Ok(true));
    }

    #[test]
    fn reversed_flips_operands() {
        assert_eq!(Reversed(NaturalOrder).less_than(&1, &2), Ok(false));
        assert_eq!(Reversed(NaturalOrder).less_than(&2, &1), Ok(true));
    }
}
