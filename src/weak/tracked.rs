use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::ops::Deref;

/// Identifies a reclamation hook registered on a [`Tracked`] value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct HookId(u64);

/// A reference-counted owner whose last drop runs registered hooks.
///
/// Weak containers hold `Tracked` values weakly: an entry stays in the
/// container while at least one `Tracked` handle to its value exists, and
/// disappears once the last one is dropped.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use wabi_sorted::Tracked;
///
/// let fired = Rc::new(Cell::new(0));
/// let value = Tracked::new("config");
/// let spare = value.clone();
///
/// let counter = Rc::clone(&fired);
/// value.on_reclaim(move || counter.set(counter.get() + 1));
///
/// drop(value);
/// assert_eq!(fired.get(), 0);
/// drop(spare);
/// assert_eq!(fired.get(), 1);
/// ```
pub struct Tracked<T>(Rc<Tracker<T>>);

pub(crate) struct Tracker<T> {
    value: T,
    hooks: RefCell<Hooks>,
}

#[derive(Default)]
struct Hooks {
    next: u64,
    pending: Vec<(HookId, Box<dyn FnOnce()>)>,
}

impl<T> Tracked<T> {
    /// Starts tracking `value`.
    pub fn new(value: T) -> Self {
        Self(Rc::new(Tracker {
            value,
            hooks: RefCell::new(Hooks::default()),
        }))
    }

    /// Registers `hook` to run once, when the last handle to this value is dropped.
    pub fn on_reclaim(&self, hook: impl FnOnce() + 'static) -> HookId {
        let mut hooks = self.0.hooks.borrow_mut();
        let id = HookId(hooks.next);
        hooks.next += 1;
        hooks.pending.push((id, Box::new(hook)));
        id
    }

    /// Unregisters a hook. Returns `false` if it was not registered.
    pub fn cancel(&self, id: HookId) -> bool {
        let mut hooks = self.0.hooks.borrow_mut();
        let before = hooks.pending.len();
        hooks.pending.retain(|(registered, _)| *registered != id);
        hooks.pending.len() != before
    }

    /// Returns `true` if both handles track the same value.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.0, &other.0)
    }

    /// Number of live handles to this value.
    #[must_use]
    pub fn handle_count(this: &Self) -> usize {
        Rc::strong_count(&this.0)
    }

    pub(crate) fn downgrade(this: &Self) -> Weak<Tracker<T>> {
        Rc::downgrade(&this.0)
    }

    pub(crate) fn from_tracker(tracker: Rc<Tracker<T>>) -> Self {
        Self(tracker)
    }

    #[cfg(test)]
    pub(crate) fn pending_hooks(&self) -> usize {
        self.0.hooks.borrow().pending.len()
    }
}

impl<T> Tracker<T> {
    pub(crate) fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for Tracker<T> {
    fn drop(&mut self) {
        let pending = core::mem::take(&mut self.hooks.get_mut().pending);
        for (_, hook) in pending {
            hook();
        }
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0.value
    }
}

impl<T> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> From<T> for Tracked<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.0.value).finish()
    }
}

impl<T: PartialEq> PartialEq for Tracked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.value == other.0.value
    }
}

impl<T: Eq> Eq for Tracked<T> {}
