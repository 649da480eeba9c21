//! Default-enabled initializer
//!
//! Runs once at startup, before any consent decision, so that opt-out
//! mode can honour the categories the site enables by default.

use crate::store::ConsentStore;
use consent_types::ConsentCatalog;

/// Seed the default-enabled categories and their services into `store`.
///
/// Re-running with the same catalog adds nothing. Returns the number of
/// newly recorded services.
pub fn seed_defaults(catalog: &ConsentCatalog, store: &mut ConsentStore) -> usize {
    let mut seeded = 0;

    for category in catalog.categories().iter().filter(|c| c.enabled) {
        store.record_default_category(&category.id);

        for service in &category.services {
            if store.snapshot_mut().enable_service(&category.id, service) {
                seeded += 1;
            }
        }
    }

    tracing::debug!(
        categories = ?store.default_enabled_categories(),
        services = seeded,
        "Default-enabled consent seeded"
    );
    seeded
}
