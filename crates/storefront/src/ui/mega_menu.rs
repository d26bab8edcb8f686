//! Hover state machine for the category mega-menu.
//!
//! Three levels: a top-level category opens a panel listing its children
//! (second level); hovering one of those shows its own children in a third
//! column. Leaving the top-level item schedules a hide after a grace delay so
//! the pointer can travel into the panel; re-entering cancels it.
//!
//! At most one second-level item is active at any time, and the third column
//! is always derived from it.

use std::time::{Duration, Instant};

use orfarm_core::{Category, CategoryId, CategoryTree};

/// Default delay before a panel closes after the pointer leaves.
pub const DEFAULT_HIDE_GRACE: Duration = Duration::from_millis(200);

/// Declarative open/active state for the mega-menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MegaMenu {
    open_top: Option<CategoryId>,
    active_second: Option<CategoryId>,
    pending_hide: Option<Instant>,
    grace: Duration,
}

impl Default for MegaMenu {
    fn default() -> Self {
        Self::new(DEFAULT_HIDE_GRACE)
    }
}

impl MegaMenu {
    #[must_use]
    pub const fn new(grace: Duration) -> Self {
        Self {
            open_top: None,
            active_second: None,
            pending_hide: None,
            grace,
        }
    }

    /// The top-level category whose panel is open.
    #[must_use]
    pub const fn open_top(&self) -> Option<CategoryId> {
        self.open_top
    }

    /// The second-level item driving the third column.
    #[must_use]
    pub const fn active_second(&self) -> Option<CategoryId> {
        self.active_second
    }

    #[must_use]
    pub const fn grace(&self) -> Duration {
        self.grace
    }

    /// Pointer entered a top-level item. Cancels any pending hide; switching
    /// to a different top item clears the second-level selection.
    pub fn enter_top(&mut self, id: CategoryId) {
        self.pending_hide = None;
        if self.open_top != Some(id) {
            self.open_top = Some(id);
            self.active_second = None;
        }
    }

    /// Pointer entered a second-level item. Only children of the open top
    /// item are accepted; the previous selection is replaced.
    ///
    /// Returns whether the selection changed.
    pub fn enter_second(&mut self, tree: &CategoryTree, id: CategoryId) -> bool {
        let Some(top) = self.open_top.and_then(|top| tree.find(top)) else {
            return false;
        };
        if top.child(id).is_none() {
            return false;
        }
        self.pending_hide = None;
        let changed = self.active_second != Some(id);
        self.active_second = Some(id);
        changed
    }

    /// Second-level entries of the open panel.
    #[must_use]
    pub fn second_column<'a>(&self, tree: &'a CategoryTree) -> &'a [Category] {
        self.open_top
            .and_then(|top| tree.find(top))
            .map(|top| top.children.as_slice())
            .unwrap_or_default()
    }

    /// Children of the active second-level item, if any.
    #[must_use]
    pub fn third_column<'a>(&self, tree: &'a CategoryTree) -> Option<&'a [Category]> {
        let top = tree.find(self.open_top?)?;
        let second = top.child(self.active_second?)?;
        second
            .has_children()
            .then_some(second.children.as_slice())
    }
}

/// Hide timing. Served panels carry it in markup as a
/// `mouseleave ... delay:{grace}ms` trigger that swaps in the closed panel;
/// these methods model that behaviour.
#[cfg_attr(not(test), allow(dead_code))]
impl MegaMenu {
    #[must_use]
    pub(crate) const fn hide_pending(&self) -> bool {
        self.pending_hide.is_some()
    }

    /// Pointer left the top-level item's region. The panel closes on the
    /// first `tick` at or after `now + grace`.
    pub(crate) fn leave_top(&mut self, now: Instant) {
        if self.open_top.is_some() {
            self.pending_hide = now.checked_add(self.grace).or(Some(now));
        }
    }

    /// Apply a due hide. Returns whether the panel closed.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        match self.pending_hide {
            Some(due) if now >= due => {
                self.close();
                true
            }
            _ => false,
        }
    }

    /// Close immediately.
    pub(crate) fn close(&mut self) {
        self.open_top = None;
        self.active_second = None;
        self.pending_hide = None;
    }
}
