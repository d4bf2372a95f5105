use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use super::size::Size;

/// A subtree may weigh at most `DELTA` times its sibling.
pub(crate) const DELTA: usize = 3;
/// Threshold that picks a single over a double rotation.
pub(crate) const GAMMA: usize = 2;

/// The weight-balanced, size-augmented binary tree behind every container.
///
/// The raw tree knows nothing about ordering: callers locate positions with
/// [`RawTree::bound_by`] and then link or unlink nodes structurally. Removal
/// relinks nodes instead of moving elements between them, so a [`Handle`]
/// keeps addressing the same element until that element leaves the tree.
#[derive(Clone)]
pub(crate) struct RawTree<T> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<T>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

/// Result of a descent: the first position at or after a probe.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Bound {
    /// Number of elements before the position.
    pub(crate) rank: usize,
    /// The element at `rank`, or `None` when `rank == len`.
    pub(crate) handle: Option<Handle>,
    /// Where a new leaf for this position would be linked, `None` for an empty tree.
    pub(crate) attach: Option<(Handle, Side)>,
}

impl<T> RawTree<T> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a new tree with room for `capacity` elements.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns the number of elements in the tree.
    pub(crate) fn len(&self) -> usize {
        self.size_of(self.root).to_usize()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drops every element.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) fn element(&self, handle: Handle) -> &T {
        self.nodes.get(handle).element()
    }

    pub(crate) fn element_mut(&mut self, handle: Handle) -> &mut T {
        self.nodes.get_mut(handle).element_mut()
    }

    /// Returns the element at `handle` if the handle is currently issued.
    pub(crate) fn try_element(&self, handle: Handle) -> Option<&T> {
        self.nodes.try_get(handle).map(Node::element)
    }

    /// Iterates the elements in storage order, which is unrelated to tree order.
    pub(crate) fn elements_unordered(&self) -> impl Iterator<Item = &T> {
        self.nodes.values().map(Node::element)
    }

    #[inline]
    fn size_of(&self, handle: Option<Handle>) -> Size {
        handle.map_or(Size::ZERO, |h| self.nodes.get(h).size())
    }

    /// Returns the lowest-ranked node.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Left))
    }

    /// Returns the highest-ranked node.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Right))
    }

    fn extreme(&self, mut handle: Handle, side: Side) -> Handle {
        while let Some(child) = self.nodes.get(handle).child(side) {
            handle = child;
        }
        handle
    }

    /// In-order neighbour of `handle`: the successor for [`Side::Right`], the
    /// predecessor for [`Side::Left`].
    pub(crate) fn step(&self, handle: Handle, side: Side) -> Option<Handle> {
        if let Some(child) = self.nodes.get(handle).child(side) {
            return Some(self.extreme(child, side.opposite()));
        }

        let mut current = handle;
        while let Some(parent) = self.nodes.get(current).parent() {
            if self.nodes.get(parent).child(side) != Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Returns the node holding the element at `rank`.
    pub(crate) fn at_rank(&self, rank: usize) -> Option<Handle> {
        if rank >= self.len() {
            return None;
        }

        let mut current = self.root?;
        let mut remaining = rank;
        loop {
            let node = self.nodes.get(current);
            let left = self.size_of(node.left()).to_usize();
            if remaining < left {
                current = node.left()?;
            } else if remaining == left {
                return Some(current);
            } else {
                remaining -= left + 1;
                current = node.right()?;
            }
        }
    }

    /// Computes the rank of the element at `handle` by walking parent links.
    pub(crate) fn rank_of_handle(&self, handle: Handle) -> usize {
        let mut rank = self.size_of(self.nodes.get(handle).left()).to_usize();
        let mut current = handle;
        while let Some(parent) = self.nodes.get(current).parent() {
            let parent_node = self.nodes.get(parent);
            if parent_node.right() == Some(current) {
                rank += self.size_of(parent_node.left()).to_usize() + 1;
            }
            current = parent;
        }
        rank
    }

    /// Finds the first element for which `at_or_after` holds.
    ///
    /// The predicate must be monotone over the in-order sequence (false for a
    /// prefix, true for the rest). An `Err` from the predicate aborts the
    /// descent; nothing has been modified at that point.
    pub(crate) fn bound_by<E, F>(&self, mut at_or_after: F) -> Result<Bound, E>
    where
        F: FnMut(&T) -> Result<bool, E>,
    {
        let mut bound = Bound {
            rank: 0,
            handle: None,
            attach: None,
        };

        let mut cursor = self.root;
        while let Some(current) = cursor {
            let node = self.nodes.get(current);
            if at_or_after(node.element())? {
                bound.handle = Some(current);
                bound.attach = Some((current, Side::Left));
                cursor = node.left();
            } else {
                bound.rank += self.size_of(node.left()).to_usize() + 1;
                bound.attach = Some((current, Side::Right));
                cursor = node.right();
            }
        }
        Ok(bound)
    }

    /// Links `element` as a new leaf at `attach` (as found by [`RawTree::bound_by`])
    /// and restores balance on the way up.
    pub(crate) fn link(&mut self, element: T, attach: Option<(Handle, Side)>) -> Handle {
        let handle = self.nodes.alloc(Node::leaf(element, attach.map(|(parent, _)| parent)));
        match attach {
            None => {
                debug_assert!(self.root.is_none(), "`RawTree::link()` - missing attach point in a non-empty tree");
                self.root = Some(handle);
            }
            Some((parent, side)) => {
                debug_assert!(
                    self.nodes.get(parent).child(side).is_none(),
                    "`RawTree::link()` - attach point is occupied"
                );
                self.nodes.get_mut(parent).set_child(side, Some(handle));
                self.fix_upward(Some(parent));
            }
        }
        handle
    }

    /// Removes the element at `rank`.
    pub(crate) fn remove_at(&mut self, rank: usize) -> Option<T> {
        let handle = self.at_rank(rank)?;
        Some(self.unlink(handle))
    }

    /// Unlinks the node at `handle` and returns its element.
    pub(crate) fn unlink(&mut self, handle: Handle) -> T {
        let node = self.nodes.get(handle);
        let (parent, left, right) = (node.parent(), node.left(), node.right());

        let rebalance_from = match (left, right) {
            (Some(left), Some(right)) => {
                let successor = self.extreme(right, Side::Left);
                let resume = if successor == right {
                    successor
                } else {
                    // The successor has no left child; lift its right subtree into its place.
                    let successor_parent = self.nodes.get(successor).parent();
                    let successor_right = self.nodes.get(successor).right();
                    self.replace_child(successor_parent, successor, successor_right);
                    self.adopt(successor, Side::Right, Some(right));
                    successor_parent.unwrap_or(successor)
                };
                self.adopt(successor, Side::Left, Some(left));
                self.replace_child(parent, handle, Some(successor));
                Some(resume)
            }
            (only, None) | (None, only) => {
                self.replace_child(parent, handle, only);
                parent
            }
        };

        let element = self.nodes.take(handle).into_element();
        self.fix_upward(rebalance_from);
        element
    }

    /// Drains the tree in ascending order.
    pub(crate) fn drain_in_order(&mut self) -> Vec<T> {
        let mut handles = Vec::with_capacity(self.len());
        let mut cursor = self.first();
        while let Some(handle) = cursor {
            handles.push(handle);
            cursor = self.step(handle, Side::Right);
        }

        let elements = handles.into_iter().map(|h| self.nodes.take(h).into_element()).collect();
        self.clear();
        elements
    }

    /// Sets `parent`'s `side` link to `child` and points `child` back at `parent`.
    fn adopt(&mut self, parent: Handle, side: Side, child: Option<Handle>) {
        self.nodes.get_mut(parent).set_child(side, child);
        if let Some(child) = child {
            self.nodes.get_mut(child).set_parent(Some(parent));
        }
    }

    /// Puts `new` where `old` hangs under `parent` (or at the root).
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            Some(parent) => {
                let side = self
                    .nodes
                    .get(parent)
                    .side_of(old)
                    .expect("`RawTree::replace_child()` - `old` is not a child of `parent`");
                self.adopt(parent, side, new);
            }
            None => {
                self.root = new;
                if let Some(new) = new {
                    self.nodes.get_mut(new).set_parent(None);
                }
            }
        }
    }

    fn update_size(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let size = Size::joined(self.size_of(node.left()), self.size_of(node.right()));
        self.nodes.get_mut(handle).set_size(size);
    }

    /// Recomputes sizes and restores weight balance from `from` to the root.
    fn fix_upward(&mut self, from: Option<Handle>) {
        let mut cursor = from;
        while let Some(current) = cursor {
            self.update_size(current);
            let top = self.rebalance(current);
            cursor = self.nodes.get(top).parent();
        }
    }

    /// Rotates `handle` if one side outweighs the other; returns the subtree's new top.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        let node = self.nodes.get(handle);
        let left = self.size_of(node.left()).weight();
        let right = self.size_of(node.right()).weight();

        let heavy = if right > DELTA * left {
            Side::Right
        } else if left > DELTA * right {
            Side::Left
        } else {
            return handle;
        };

        // A heavy side weighs at least DELTA + 1, so it cannot be empty.
        let Some(child) = node.child(heavy) else {
            unreachable!("`RawTree::rebalance()` - heavy side is empty");
        };
        let child_node = self.nodes.get(child);
        let inner = self.size_of(child_node.child(heavy.opposite())).weight();
        let outer = self.size_of(child_node.child(heavy)).weight();

        if inner >= GAMMA * outer {
            self.rotate(child, heavy);
        }
        self.rotate(handle, heavy.opposite())
    }

    /// Rotates `handle` towards `direction`: its child on the opposite side
    /// becomes the subtree's top, which is returned.
    fn rotate(&mut self, handle: Handle, direction: Side) -> Handle {
        let rising = direction.opposite();
        let node = self.nodes.get(handle);
        let parent = node.parent();
        let Some(pivot) = node.child(rising) else {
            unreachable!("`RawTree::rotate()` - nothing to rotate into place");
        };
        let inner = self.nodes.get(pivot).child(direction);

        self.adopt(handle, rising, inner);
        self.replace_child(parent, handle, Some(pivot));
        self.adopt(pivot, direction, Some(handle));

        self.update_size(handle);
        self.update_size(pivot);
        pivot
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::convert::Infallible;
    use proptest::prelude::*;

    impl<T> RawTree<T> {
        /// Validates links, sizes and weight balance. Panics with every violation found.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();
            if let Some(root) = self.root {
                if self.nodes.get(root).parent().is_some() {
                    errors.push(String::from("root has a parent"));
                }
                let counted = self.validate_node(root, &mut errors);
                if counted != self.nodes.len() {
                    errors.push(alloc::format!("reachable nodes {} != allocated nodes {}", counted, self.nodes.len()));
                }
            } else if self.nodes.len() != 0 {
                errors.push(alloc::format!("empty tree still holds {} nodes", self.nodes.len()));
            }
            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        fn validate_node(&self, handle: Handle, errors: &mut Vec<String>) -> usize {
            let node = self.nodes.get(handle);
            let mut count = 1;
            for side in [Side::Left, Side::Right] {
                if let Some(child) = node.child(side) {
                    if self.nodes.get(child).parent() != Some(handle) {
                        errors.push(alloc::format!("{:?} child of {:?} has a wrong parent link", side, handle));
                    }
                    count += self.validate_node(child, errors);
                }
            }

            if node.size().to_usize() != count {
                errors.push(alloc::format!("{:?} size {} != counted {}", handle, node.size().to_usize(), count));
            }

            let left = self.size_of(node.left()).weight();
            let right = self.size_of(node.right()).weight();
            if left > DELTA * right || right > DELTA * left {
                errors.push(alloc::format!("{:?} out of balance: weights {} / {}", handle, left, right));
            }
            count
        }

        fn in_order(&self) -> Vec<&T> {
            let mut out = Vec::new();
            let mut cursor = self.first();
            while let Some(handle) = cursor {
                out.push(self.element(handle));
                cursor = self.step(handle, Side::Right);
            }
            out
        }

        fn height(&self, handle: Option<Handle>) -> usize {
            handle.map_or(0, |h| {
                let node = self.nodes.get(h);
                1 + self.height(node.left()).max(self.height(node.right()))
            })
        }
    }

    /// Inserts after any equal elements, the way the containers do.
    fn insert(tree: &mut RawTree<i32>, value: i32) -> Handle {
        let bound = tree.bound_by::<Infallible, _>(|e| Ok(value < *e)).unwrap();
        tree.link(value, bound.attach)
    }

    fn lower_bound(tree: &RawTree<i32>, value: i32) -> Bound {
        tree.bound_by::<Infallible, _>(|e| Ok(*e >= value)).unwrap()
    }

    #[test]
    fn empty_tree() {
        let tree: RawTree<i32> = RawTree::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert!(tree.first().is_none());
        assert!(tree.at_rank(0).is_none());
        assert_eq!(lower_bound(&tree, 5), Bound { rank: 0, handle: None, attach: None });
        tree.validate_invariants();
    }

    #[test]
    fn ascending_inserts_stay_logarithmic() {
        let mut tree = RawTree::new();
        for value in 0..4096 {
            insert(&mut tree, value);
        }
        tree.validate_invariants();
        // A weight-balanced tree with DELTA = 3 has height below 2.5 * log2(n + 1).
        assert!(tree.height(tree.root) <= 30, "height {}", tree.height(tree.root));
    }

    #[test]
    fn handles_survive_unrelated_removals() {
        let mut tree = RawTree::new();
        let handles: Vec<Handle> = (0..64).map(|v| insert(&mut tree, v)).collect();
        for (value, handle) in handles.iter().enumerate() {
            if value % 3 == 0 {
                assert_eq!(tree.unlink(*handle), value as i32);
            }
        }
        tree.validate_invariants();
        for (value, handle) in handles.iter().enumerate() {
            if value % 3 != 0 {
                assert_eq!(*tree.element(*handle), value as i32);
                assert_eq!(tree.at_rank(tree.rank_of_handle(*handle)), Some(*handle));
            }
        }
    }

    #[test]
    fn equal_elements_insert_after_existing() {
        let mut tree: RawTree<(i32, char)> = RawTree::new();
        for (key, tag) in [(1, 'a'), (2, 'b'), (1, 'c'), (1, 'd')] {
            let bound = tree.bound_by::<Infallible, _>(|e| Ok(key < e.0)).unwrap();
            tree.link((key, tag), bound.attach);
        }
        let order: Vec<char> = tree.in_order().into_iter().map(|e| e.1).collect();
        assert_eq!(order, ['a', 'c', 'd', 'b']);
    }

    #[test]
    fn failing_predicate_leaves_tree_untouched() {
        let mut tree = RawTree::new();
        for value in [5, 1, 9] {
            insert(&mut tree, value);
        }
        let result = tree.bound_by(|e: &i32| if *e == 1 { Err("boom") } else { Ok(*e > 3) });
        assert_eq!(result, Err("boom"));
        assert_eq!(tree.in_order(), [&1, &5, &9]);
        tree.validate_invariants();
    }

    #[test]
    fn drain_in_order_empties_tree() {
        let mut tree = RawTree::new();
        for value in [3, 1, 2, 2] {
            insert(&mut tree, value);
        }
        assert_eq!(tree.drain_in_order(), [1, 2, 2, 3]);
        assert!(tree.is_empty());
        tree.validate_invariants();
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        RemoveValue(i32),
        RemoveRank(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0i32..200).prop_map(Op::Insert),
            2 => (0i32..200).prop_map(Op::RemoveValue),
            1 => any::<usize>().prop_map(Op::RemoveRank),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn tree_matches_sorted_vec(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = RawTree::new();
            let mut model: Vec<i32> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(value) => {
                        let handle = insert(&mut tree, value);
                        let at = model.partition_point(|e| *e <= value);
                        model.insert(at, value);
                        prop_assert_eq!(tree.rank_of_handle(handle), at);
                    }
                    Op::RemoveValue(value) => {
                        let bound = lower_bound(&tree, value);
                        let at = model.partition_point(|e| *e < value);
                        prop_assert_eq!(bound.rank, at);
                        match bound.handle {
                            Some(handle) if *tree.element(handle) == value => {
                                prop_assert_eq!(tree.unlink(handle), model.remove(at));
                            }
                            _ => prop_assert!(model.get(at) != Some(&value)),
                        }
                    }
                    Op::RemoveRank(which) => {
                        if model.is_empty() {
                            prop_assert!(tree.remove_at(which).is_none());
                            continue;
                        }
                        let rank = which % model.len();
                        prop_assert_eq!(tree.remove_at(rank), Some(model.remove(rank)));
                    }
                }

                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
                let in_order: Vec<i32> = tree.in_order().into_iter().copied().collect();
                prop_assert_eq!(&in_order, &model);
            }

            for (rank, value) in model.iter().enumerate() {
                let handle = tree.at_rank(rank).unwrap();
                prop_assert_eq!(tree.element(handle), value);
                prop_assert_eq!(tree.rank_of_handle(handle), rank);
            }

            let mut backwards = Vec::new();
            let mut cursor = tree.last();
            while let Some(handle) = cursor {
                backwards.push(*tree.element(handle));
                cursor = tree.step(handle, Side::Left);
            }
            backwards.reverse();
            prop_assert_eq!(backwards, model);
        }
    }
}
