// src/events/mod.rs
//
// Store change notifications - Public API
//
// Writers publish, live queries listen. Nothing else crosses this boundary.

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod change;
pub mod notifier;

// ============================================================================
// PUBLIC EXPORTS
// ============================================================================

pub use change::{EntityKind, EntityKinds, StoreChange};
pub use notifier::{ChangeNotifier, ListenerId};

/// Initialize a new change notifier
pub fn create_change_notifier() -> ChangeNotifier {
    ChangeNotifier::new()
}
