//! Error types shared by every container.

use thiserror::Error;

/// A comparator could not order two values.
///
/// Mutations that must establish a position (`add`, `bisect_*`, construction)
/// return this error and leave the container unchanged. Lookups (`contains`,
/// `count`, `discard`, `rank_of`) treat it as "no match" instead.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq, Hash)]
pub enum ComparisonError {
    /// The operands are not mutually orderable (for example a float `NaN`).
    #[error("values are not mutually orderable")]
    Incomparable,
    /// A weak entry's referent was reclaimed before it could be compared.
    #[error("referent was reclaimed before it could be compared")]
    Reclaimed,
}

/// No element comparator-equal to the probe exists, or equality could not be decided.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq, Hash)]
#[error("value not found in container")]
pub struct NotFound;

/// A rank outside `[-len, len - 1]`.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq, Hash)]
#[error("rank {rank} out of range for container of length {len}")]
pub struct IndexError {
    /// The rank that was requested.
    pub rank: isize,
    /// Length of the container at the time of the request.
    pub len: usize,
}

/// Failure while constructing a container from a [`Source`](crate::Source).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum BuildError<E> {
    /// A value could not be placed.
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
    /// The source failed while producing a value; the error is passed through as-is.
    #[error("source failed: {0}")]
    Source(E),
    /// The source offers neither indexed nor advancing access.
    #[error("source is neither indexed nor advancing")]
    UnsupportedSource,
}
