//! Menu-entry identifier allocation and callback lookup.

use std::collections::HashMap;
use std::sync::Arc;

/// First identifier handed out for a menu entry. Identifier 0 is
/// reserved by the platform for "menu dismissed" and is never allocated.
pub(crate) const MENU_ID_BASE: u32 = 100;

/// Callback invoked when its menu entry is selected.
///
/// Shared so the actor can hand a clone to a detached worker thread
/// while keeping the registration alive for later activations.
pub(crate) type MenuCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Owns the identifier-to-callback mapping for one tray instance.
///
/// Identifiers are allocated monotonically and never reused within a
/// session. Display order is the platform menu's concern; this map only
/// serves lookup on activation.
pub(crate) struct MenuRegistry {
    next_id: u32,
    callbacks: HashMap<u32, MenuCallback>,
}

impl MenuRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: MENU_ID_BASE,
            callbacks: HashMap::new(),
        }
    }

    /// Hands out the next identifier. The caller registers a callback
    /// under it only once the platform accepted the entry; an id whose
    /// append was rejected stays consumed and unmapped.
    pub(crate) fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Maps an allocated identifier to its callback.
    pub(crate) fn insert(&mut self, id: u32, callback: MenuCallback) {
        self.callbacks.insert(id, callback);
    }

    /// Looks up the callback for a selected identifier. Returns `None`
    /// for 0 (dismissed) and for separators, which carry no identifier.
    pub(crate) fn get(&self, id: u32) -> Option<&MenuCallback> {
        self.callbacks.get(&id)
    }
}
