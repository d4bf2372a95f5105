use super::handle::Handle;

/// Number of elements in a subtree.
///
/// Sizes never exceed the number of handles an arena can issue, so they are
/// stored in the same width as a [`Handle`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
pub(crate) struct Size(u32);

impl Size {
    pub(crate) const MAX: usize = Handle::MAX;
    pub(crate) const ZERO: Self = Self(0);
    pub(crate) const ONE: Self = Self(1);

    #[inline]
    pub(crate) const fn from_usize(size: usize) -> Self {
        assert!(size <= Self::MAX, "`Size::from_usize()` - `size` > `Size::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        Self(size as u32)
    }

    #[inline]
    pub(crate) const fn to_usize(self) -> usize {
        self.0 as usize
    }

    /// Size of a subtree made of a node and the two given children.
    #[inline]
    pub(crate) const fn joined(left: Self, right: Self) -> Self {
        Self::from_usize(left.to_usize() + right.to_usize() + 1)
    }

    /// Balance weight of a subtree: its size plus one, so empty subtrees weigh 1.
    #[inline]
    pub(crate) const fn weight(self) -> usize {
        self.to_usize() + 1
    }
}
