//! Consent snapshot: what is accepted now, and what changed last time

use crate::{CategoryId, ServiceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The consent state the engine reads on every pass.
///
/// `last_changed_services` distinguishes "no entry" from "empty entry": a
/// category without an entry has never been through a consent update, so
/// its enabled services are examined instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSnapshot {
    /// Categories accepted in the saved consent, empty before the first decision
    pub accepted_categories: Vec<CategoryId>,
    /// Enabled services per category
    pub enabled_services: BTreeMap<CategoryId, Vec<ServiceId>>,
    /// Services whose acceptance changed in the last update, per category
    pub last_changed_services: BTreeMap<CategoryId, Vec<ServiceId>>,
    /// Categories whose acceptance changed in the last update
    pub last_changed_categories: Vec<CategoryId>,
}

impl ConsentSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_category_accepted(&self, category: &CategoryId) -> bool {
        self.accepted_categories.contains(category)
    }

    pub fn enabled_services(&self, category: &CategoryId) -> &[ServiceId] {
        self.enabled_services
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_service_enabled(&self, category: &CategoryId, service: &ServiceId) -> bool {
        self.enabled_services(category).contains(service)
    }

    pub fn category_changed(&self, category: &CategoryId) -> bool {
        self.last_changed_categories.contains(category)
    }

    pub fn service_changed(&self, category: &CategoryId, service: &ServiceId) -> bool {
        self.last_changed_services
            .get(category)
            .is_some_and(|changed| changed.contains(service))
    }

    /// Services the notifier must examine for `category`: the last-changed
    /// entry when one exists, otherwise the enabled services.
    pub fn services_to_examine(&self, category: &CategoryId) -> &[ServiceId] {
        match self.last_changed_services.get(category) {
            Some(changed) => changed,
            None => self.enabled_services(category),
        }
    }

    /// Add `service` to the enabled set of `category` unless already present.
    pub fn enable_service(&mut self, category: &CategoryId, service: &ServiceId) -> bool {
        let services = self.enabled_services.entry(category.clone()).or_default();
        if services.contains(service) {
            return false;
        }
        services.push(service.clone());
        true
    }
}
