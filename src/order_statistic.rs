use crate::error::IndexError;

/// Resolves a possibly negative rank against a container of length `len`.
///
/// Non-negative ranks count from the front, negative ones from the back
/// (`-1` is the last element). Anything outside `[-len, len - 1]` is an
/// [`IndexError`].
///
/// # Errors
///
/// Returns an [`IndexError`] when `rank` does not address an element.
///
/// # Examples
///
/// ```
/// use wabi_sorted::{IndexError, resolve_rank};
///
/// assert_eq!(resolve_rank(1, 3), Ok(1));
/// assert_eq!(resolve_rank(-1, 3), Ok(2));
/// assert_eq!(resolve_rank(3, 3), Err(IndexError { rank: 3, len: 3 }));
/// ```
pub fn resolve_rank(rank: isize, len: usize) -> Result<usize, IndexError> {
    let resolved = if rank < 0 {
        len.checked_sub(rank.unsigned_abs())
    } else {
        Some(rank.unsigned_abs()).filter(|&r| r < len)
    };
    resolved.ok_or(IndexError { rank, len })
}
