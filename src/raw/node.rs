use super::handle::Handle;
use super::size::Size;

/// Which child link of a parent a node hangs off.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A binary tree node. Links are arena handles; the node exclusively owns its
/// element, never the nodes it links to (the arena does).
#[derive(Clone)]
pub(crate) struct Node<T> {
    element: T,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
    // Number of elements in the subtree rooted at this node, itself included.
    size: Size,
}

impl<T> Node<T> {
    /// Creates a detached leaf.
    pub(crate) const fn leaf(element: T, parent: Option<Handle>) -> Self {
        Self {
            element,
            parent,
            left: None,
            right: None,
            size: Size::ONE,
        }
    }

    #[inline]
    pub(crate) const fn element(&self) -> &T {
        &self.element
    }

    #[inline]
    pub(crate) fn element_mut(&mut self) -> &mut T {
        &mut self.element
    }

    pub(crate) fn into_element(self) -> T {
        self.element
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) const fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Returns which side `child` hangs off, if it is a child of this node at all.
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }
}

impl Side {
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
