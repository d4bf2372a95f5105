//! Construction sources.
//!
//! A container can be built from anything implementing [`Source`]. A source
//! exposes its values through one of two shapes:
//!
//! - [`Indexed`]: reports a length and hands out values by position.
//! - [`Advancing`]: a single `advance` step yielding the next value, or `None`
//!   once exhausted.
//!
//! A source that offers neither shape is rejected with
//! [`BuildError::UnsupportedSource`](crate::BuildError::UnsupportedSource).

use alloc::vec::Vec;
use core::convert::Infallible;

use crate::error::{BuildError, ComparisonError};

/// Positional access to a finite sequence of values.
pub trait Indexed {
    /// The values produced.
    type Item;
    /// Error raised while producing a value.
    type Error;

    /// Number of values.
    fn len(&self) -> usize;

    /// Whether the sequence is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produces the value at `index`, which is always below [`Indexed::len`].
    ///
    /// # Errors
    ///
    /// Any error the underlying sequence raises.
    fn get(&self, index: usize) -> Result<Self::Item, Self::Error>;
}

/// One-shot, advance-only access to a finite sequence of values.
pub trait Advancing {
    /// The values produced.
    type Item;
    /// Error raised while producing a value.
    type Error;

    /// Produces the next value, or `Ok(None)` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Any error the underlying sequence raises.
    fn advance(&mut self) -> Result<Option<Self::Item>, Self::Error>;
}

/// Something a container can be constructed from.
///
/// Implementors override the accessor for the shape they support. When both
/// are offered the indexed shape is used.
pub trait Source {
    /// The values produced.
    type Item;
    /// Error raised while producing a value.
    type Error;

    /// Returns the indexed view of this source, if it has one.
    fn as_indexed(&self) -> Option<&dyn Indexed<Item = Self::Item, Error = Self::Error>> {
        None
    }

    /// Returns the advancing view of this source, if it has one.
    fn as_advancing(&mut self) -> Option<&mut dyn Advancing<Item = Self::Item, Error = Self::Error>> {
        None
    }
}

/// Feeds every value of `source` to `add`, in source order.
///
/// Stops at the first failure from either side.
pub(crate) fn drain<S, F>(source: &mut S, mut add: F) -> Result<(), BuildError<S::Error>>
where
    S: Source + ?Sized,
    F: FnMut(S::Item) -> Result<(), ComparisonError>,
{
    if let Some(indexed) = source.as_indexed() {
        for index in 0..indexed.len() {
            add(indexed.get(index).map_err(BuildError::Source)?)?;
        }
        return Ok(());
    }

    if let Some(advancing) = source.as_advancing() {
        while let Some(value) = advancing.advance().map_err(BuildError::Source)? {
            add(value)?;
        }
        return Ok(());
    }

    Err(BuildError::UnsupportedSource)
}

macro_rules! indexed_by_slice {
    ($($ty:ty => [$($generics:tt)*]),* $(,)?) => {$(
        impl<$($generics)*> Indexed for $ty {
            type Item = T;
            type Error = Infallible;

            fn len(&self) -> usize {
                <[T]>::len(self)
            }

            fn get(&self, index: usize) -> Result<T, Infallible> {
                Ok(self[index].clone())
            }
        }

        impl<$($generics)*> Source for $ty {
            type Item = T;
            type Error = Infallible;

            fn as_indexed(&self) -> Option<&dyn Indexed<Item = T, Error = Infallible>> {
                Some(self)
            }
        }
    )*};
}

indexed_by_slice! {
    &[T] => [T: Clone],
    Vec<T> => [T: Clone],
    [T; N] => [T: Clone, const N: usize],
}

/// Adapts any [`Iterator`] into an infallible advancing source.
///
/// # Examples
///
/// ```
/// use wabi_sorted::{IterSource, SortedSequence};
///
/// let seq = SortedSequence::from_source(IterSource::new("cab".chars())).unwrap();
/// assert_eq!(seq.iter().collect::<String>(), "abc");
/// ```
#[derive(Clone, Debug)]
pub struct IterSource<I>(I);

impl<I> IterSource<I> {
    /// Wraps `iter`.
    pub fn new<J: IntoIterator<IntoIter = I>>(iter: J) -> Self {
        Self(iter.into_iter())
    }
}

impl<I: Iterator> Advancing for IterSource<I> {
    type Item = I::Item;
    type Error = Infallible;

    fn advance(&mut self) -> Result<Option<I::Item>, Infallible> {
        Ok(self.0.next())
    }
}

impl<I: Iterator> Source for IterSource<I> {
    type Item = I::Item;
    type Error = Infallible;

    fn as_advancing(&mut self) -> Option<&mut dyn Advancing<Item = I::Item, Error = Infallible>> {
        Some(self)
    }
}

/// Adapts an iterator of `Result`s into a fallible advancing source.
///
/// The first `Err` aborts construction and is returned unchanged inside
/// [`BuildError::Source`].
///
/// # Examples
///
/// ```
/// use wabi_sorted::{BuildError, SortedSequence, TryIterSource};
///
/// let values = vec![Ok(2), Err("bad input"), Ok(1)];
/// let built = SortedSequence::from_source(TryIterSource::new(values));
/// assert_eq!(built.unwrap_err(), BuildError::Source("bad input"));
/// ```
#[derive(Clone, Debug)]
pub struct TryIterSource<I>(I);

impl<I> TryIterSource<I> {
    /// Wraps `iter`.
    pub fn new<J: IntoIterator<IntoIter = I>>(iter: J) -> Self {
        Self(iter.into_iter())
    }
}

impl<T, E, I: Iterator<Item = Result<T, E>>> Advancing for TryIterSource<I> {
    type Item = T;
    type Error = E;

    fn advance(&mut self) -> Result<Option<T>, E> {
        self.0.next().transpose()
    }
}

impl<T, E, I: Iterator<Item = Result<T, E>>> Source for TryIterSource<I> {
    type Item = T;
    type Error = E;

    fn as_advancing(&mut self) -> Option<&mut dyn Advancing<Item = T, Error = E>> {
        Some(self)
    }
}
