//! Consent store: current snapshot and the delta of the last update
//!
//! The store compares every new choice against the consent that was in
//! effect before it. That baseline is the saved consent once the user has
//! decided, the default-enabled sets when defaults were put into effect
//! (opt-out start), and nothing otherwise.

use consent_types::{CategoryId, ConsentCatalog, ConsentError, ConsentResult, ConsentSnapshot, ServiceId};
use std::collections::BTreeMap;

/// A user's consent decision
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsentChoice {
    /// Accepted categories
    pub categories: Vec<CategoryId>,
    /// Explicit service selection per accepted category. Accepted categories
    /// without an entry get all their services.
    pub services: BTreeMap<CategoryId, Vec<ServiceId>>,
}

impl ConsentChoice {
    pub fn accept<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories
                .into_iter()
                .map(|c| CategoryId::new(c))
                .collect(),
            services: BTreeMap::new(),
        }
    }

    pub fn accept_all(catalog: &ConsentCatalog) -> Self {
        Self {
            categories: catalog.category_ids().cloned().collect(),
            services: BTreeMap::new(),
        }
    }

    /// Only read-only categories stay accepted.
    pub fn reject_all() -> Self {
        Self::default()
    }

    pub fn with_services<I, S>(mut self, category: impl Into<String>, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services.insert(
            CategoryId::new(category),
            services.into_iter().map(|s| ServiceId::new(s)).collect(),
        );
        self
    }
}

/// Holds the consent snapshot the engine reads
#[derive(Clone, Debug, Default)]
pub struct ConsentStore {
    snapshot: ConsentSnapshot,
    default_enabled_categories: Vec<CategoryId>,
    has_consent: bool,
    defaults_in_effect: bool,
}

impl ConsentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &ConsentSnapshot {
        &self.snapshot
    }

    pub fn default_enabled_categories(&self) -> &[CategoryId] {
        &self.default_enabled_categories
    }

    /// Whether the user has saved a consent decision
    pub fn has_consent(&self) -> bool {
        self.has_consent
    }

    pub(crate) fn record_default_category(&mut self, category: &CategoryId) -> bool {
        if self.default_enabled_categories.contains(category) {
            return false;
        }
        self.default_enabled_categories.push(category.clone());
        true
    }

    pub(crate) fn snapshot_mut(&mut self) -> &mut ConsentSnapshot {
        &mut self.snapshot
    }

    /// Treat the default-enabled sets as the consent in effect until the
    /// user decides.
    pub fn put_defaults_in_effect(&mut self) {
        self.defaults_in_effect = true;
    }

    /// Record a new consent decision and compute what changed.
    pub fn apply_choice(
        &mut self,
        catalog: &ConsentCatalog,
        choice: &ConsentChoice,
    ) -> ConsentResult<&ConsentSnapshot> {
        for category in &choice.categories {
            catalog.category(category)?;
        }
        for (category, services) in &choice.services {
            for service in services {
                catalog.service(category, service)?;
            }
        }

        let (baseline_categories, baseline_services) = self.baseline();

        let mut accepted = Vec::new();
        let mut enabled_services = BTreeMap::new();
        let mut changed_categories = Vec::new();
        let mut changed_services = BTreeMap::new();

        for category in catalog.categories() {
            let is_accepted = category.read_only || choice.categories.contains(&category.id);
            if is_accepted {
                accepted.push(category.id.clone());
            }

            let enabled: Vec<ServiceId> = if !is_accepted {
                Vec::new()
            } else {
                match choice.services.get(&category.id) {
                    Some(selected) => category
                        .services
                        .iter()
                        .filter(|s| selected.contains(s))
                        .cloned()
                        .collect(),
                    None => category.services.clone(),
                }
            };

            if is_accepted != baseline_categories.contains(&category.id) {
                changed_categories.push(category.id.clone());
            }

            let previous = baseline_services
                .get(&category.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let changed: Vec<ServiceId> = category
                .services
                .iter()
                .filter(|s| enabled.contains(s) != previous.contains(s))
                .cloned()
                .collect();

            changed_services.insert(category.id.clone(), changed);
            enabled_services.insert(category.id.clone(), enabled);
        }

        self.snapshot = ConsentSnapshot {
            accepted_categories: accepted,
            enabled_services,
            last_changed_services: changed_services,
            last_changed_categories: changed_categories,
        };
        self.has_consent = true;

        tracing::info!(
            accepted = ?self.snapshot.accepted_categories,
            changed = ?self.snapshot.last_changed_categories,
            "Consent updated"
        );
        Ok(&self.snapshot)
    }

    /// Reject a snapshot that references unknown categories or services.
    pub fn validate_against(&self, catalog: &ConsentCatalog) -> ConsentResult<()> {
        for category in &self.snapshot.accepted_categories {
            catalog.category(category)?;
        }
        for (category, services) in self
            .snapshot
            .enabled_services
            .iter()
            .chain(self.snapshot.last_changed_services.iter())
        {
            for service in services {
                catalog.service(category, service)?;
            }
        }
        if let Some(unknown) = self
            .snapshot
            .last_changed_categories
            .iter()
            .find(|c| !catalog.contains_category(c))
        {
            return Err(ConsentError::UnknownCategory(unknown.clone()));
        }
        Ok(())
    }

    fn baseline(&self) -> (Vec<CategoryId>, BTreeMap<CategoryId, Vec<ServiceId>>) {
        if self.has_consent {
            (
                self.snapshot.accepted_categories.clone(),
                self.snapshot.enabled_services.clone(),
            )
        } else if self.defaults_in_effect {
            (
                self.default_enabled_categories.clone(),
                self.snapshot.enabled_services.clone(),
            )
        } else {
            (Vec::new(), BTreeMap::new())
        }
    }
}

impl From<ConsentSnapshot> for ConsentStore {
    /// A store that resumes from previously saved consent.
    ///
    /// The last-changed sets describe the decision of an earlier session and
    /// are dropped, so the notifier falls back to the enabled services.
    fn from(mut snapshot: ConsentSnapshot) -> Self {
        snapshot.last_changed_categories.clear();
        snapshot.last_changed_services.clear();
        Self {
            snapshot,
            default_enabled_categories: Vec::new(),
            has_consent: true,
            defaults_in_effect: false,
        }
    }
}
