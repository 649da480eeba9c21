//! Category and service definitions
//!
//! The catalog is built once from configuration and lives for the whole
//! process. It is read-only: runtime state (which services are currently
//! enabled) is tracked elsewhere.

use crate::config::ConsentConfig;
use crate::{ConsentError, ConsentResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Identifiers ──────────────────────────────────────────────────────

/// Identifier of a consent category (e.g. `analytics`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a service inside a category (e.g. `ga`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Definitions ──────────────────────────────────────────────────────

/// A consent category
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    /// Enabled by default before the user decides
    pub enabled: bool,
    /// Always accepted, cannot be rejected
    pub read_only: bool,
    /// Declared services, in configuration order
    pub services: Vec<ServiceId>,
}

impl Category {
    pub fn has_service(&self, service: &ServiceId) -> bool {
        self.services.contains(service)
    }
}

/// A service belonging to a category
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    pub id: ServiceId,
    pub category: CategoryId,
    pub label: Option<String>,
}

/// All categories and services known to the widget
#[derive(Clone, Debug, Default)]
pub struct ConsentCatalog {
    categories: Vec<Category>,
    services: Vec<Service>,
}

impl ConsentCatalog {
    /// Build and validate a catalog from configuration.
    pub fn from_config(config: &ConsentConfig) -> ConsentResult<Self> {
        let mut catalog = Self::default();
        let mut seen = HashSet::new();

        for cat_cfg in &config.categories {
            if cat_cfg.id.trim().is_empty() {
                return Err(ConsentError::Config("category id must not be empty".into()));
            }
            let category_id = CategoryId::new(cat_cfg.id.clone());
            if !seen.insert(category_id.clone()) {
                return Err(ConsentError::DuplicateCategory(category_id));
            }

            let mut service_ids = Vec::with_capacity(cat_cfg.services.len());
            for svc_cfg in &cat_cfg.services {
                if svc_cfg.id.trim().is_empty() {
                    return Err(ConsentError::Config(format!(
                        "service id in category {category_id} must not be empty"
                    )));
                }
                let service_id = ServiceId::new(svc_cfg.id.clone());
                if service_ids.contains(&service_id) {
                    return Err(ConsentError::DuplicateService {
                        category: category_id,
                        service: service_id,
                    });
                }
                service_ids.push(service_id.clone());
                catalog.services.push(Service {
                    id: service_id,
                    category: category_id.clone(),
                    label: svc_cfg.label.clone(),
                });
            }

            catalog.categories.push(Category {
                id: category_id,
                enabled: cat_cfg.enabled || cat_cfg.read_only,
                read_only: cat_cfg.read_only,
                services: service_ids,
            });
        }

        tracing::debug!(
            categories = catalog.categories.len(),
            services = catalog.services.len(),
            "Consent catalog built"
        );
        Ok(catalog)
    }

    /// Categories in configuration order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category identifiers in configuration order
    pub fn category_ids(&self) -> impl Iterator<Item = &CategoryId> {
        self.categories.iter().map(|c| &c.id)
    }

    pub fn category(&self, id: &CategoryId) -> ConsentResult<&Category> {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| ConsentError::UnknownCategory(id.clone()))
    }

    pub fn service(&self, category: &CategoryId, service: &ServiceId) -> ConsentResult<&Service> {
        self.category(category)?;
        self.services
            .iter()
            .find(|s| &s.category == category && &s.id == service)
            .ok_or_else(|| ConsentError::UnknownService {
                category: category.clone(),
                service: service.clone(),
            })
    }

    pub fn contains_category(&self, id: &CategoryId) -> bool {
        self.categories.iter().any(|c| &c.id == id)
    }
}
