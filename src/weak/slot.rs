use alloc::rc::Weak;

use super::tracked::{HookId, Tracked, Tracker};
use crate::comparator::Comparator;
use crate::error::ComparisonError;
use crate::ordered_tree::Probe;

/// A tree element that refers to a [`Tracked`] value without owning it.
pub(crate) struct WeakSlot<T> {
    referent: Weak<Tracker<T>>,
    hook: Option<HookId>,
}

impl<T> WeakSlot<T> {
    pub(crate) fn new(tracked: &Tracked<T>) -> Self {
        Self {
            referent: Tracked::downgrade(tracked),
            hook: None,
        }
    }

    pub(crate) fn set_hook(&mut self, hook: HookId) {
        debug_assert!(self.hook.is_none(), "`set_hook`: slot already has a hook");
        self.hook = Some(hook);
    }

    pub(crate) fn is_live(&self) -> bool {
        self.referent.strong_count() > 0
    }

    pub(crate) fn upgrade(&self) -> Option<Tracked<T>> {
        self.referent.upgrade().map(Tracked::from_tracker)
    }

    /// Runs `f` on the referent, or fails with [`ComparisonError::Reclaimed`] if it is gone.
    pub(crate) fn with_referent<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, ComparisonError> {
        let tracker = self.referent.upgrade().ok_or(ComparisonError::Reclaimed)?;
        Ok(f(tracker.value()))
    }

    /// Cancels the reclamation hook, leaving the referent untouched.
    pub(crate) fn release(&self) {
        if let (Some(tracked), Some(hook)) = (self.upgrade(), self.hook) {
            tracked.cancel(hook);
        }
    }

    /// Cancels the reclamation hook and hands back an owning handle to the referent.
    pub(crate) fn detach(self) -> Option<Tracked<T>> {
        let tracked = self.upgrade()?;
        if let Some(hook) = self.hook {
            tracked.cancel(hook);
        }
        Some(tracked)
    }
}

/// Compares a borrowed value against the referents of weak slots.
pub(crate) struct ReferentProbe<'a, T, C> {
    pub(crate) value: &'a T,
    pub(crate) comparator: &'a C,
}

impl<T, C: Comparator<T>> Probe<WeakSlot<T>> for ReferentProbe<'_, T, C> {
    fn precedes(&self, slot: &WeakSlot<T>) -> Result<bool, ComparisonError> {
        slot.with_referent(|referent| self.comparator.less_than(referent, self.value))?
    }

    fn follows(&self, slot: &WeakSlot<T>) -> Result<bool, ComparisonError> {
        slot.with_referent(|referent| self.comparator.less_than(self.value, referent))?
    }
}
