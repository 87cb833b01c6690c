use crate::menu::{MENU_ID_BASE, MenuRegistry};

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// WHAT: Identifiers start at the base and increase monotonically
/// WHY: The platform needs unique command ids; 0 means dismissed
#[test]
fn given_fresh_registry_when_allocating_then_ids_monotonic_from_base() {
    // Given: A fresh registry
    let mut registry = MenuRegistry::new();

    // When: Allocating three identifiers
    let ids: Vec<u32> = (0..3).map(|_| registry.allocate_id()).collect();

    // Then: Ids are 100, 101, 102
    assert_eq!(ids, vec![MENU_ID_BASE, MENU_ID_BASE + 1, MENU_ID_BASE + 2]);
}

/// WHAT: Identifier 0 and unknown identifiers resolve to nothing
/// WHY: Menu dismissal and separators must never invoke a callback
#[test]
fn given_registry_when_looking_up_unknown_ids_then_none() {
    // Given: A registry with one mapped entry
    let mut registry = MenuRegistry::new();
    let id = registry.allocate_id();
    registry.insert(id, Arc::new(|| {}));

    // Then: 0 and an unallocated id find nothing; the real id does
    assert!(registry.get(0).is_none());
    assert!(registry.get(id + 1).is_none());
    assert!(registry.get(id).is_some());
}

/// WHAT: An allocated but never-mapped identifier resolves to nothing
/// WHY: An entry the platform rejected consumes its id without gaining
/// a callback
#[test]
fn given_allocated_id_without_registration_when_looking_up_then_none() {
    // Given: An id allocated for an entry that was never accepted
    let mut registry = MenuRegistry::new();
    let rejected = registry.allocate_id();

    // When: A later entry allocates and maps normally
    let accepted = registry.allocate_id();
    registry.insert(accepted, Arc::new(|| {}));

    // Then: The consumed id stays unmapped; allocation moved past it
    assert!(registry.get(rejected).is_none());
    assert_eq!(accepted, rejected + 1);
    assert!(registry.get(accepted).is_some());
}

/// WHAT: A registered callback stays invocable across activations
/// WHY: Menu entries fire every time they are selected
#[test]
#[allow(clippy::unwrap_used)]
fn given_registered_callback_when_invoked_twice_then_runs_twice() {
    // Given: A callback counting its invocations
    let mut registry = MenuRegistry::new();
    let count = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&count);
    let id = registry.allocate_id();
    registry.insert(
        id,
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    // When: Looking it up and invoking it twice
    registry.get(id).unwrap()();
    registry.get(id).unwrap()();

    // Then: Both invocations ran
    assert_eq!(count.load(Ordering::SeqCst), 2);
}
