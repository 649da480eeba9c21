//! Consent manager: the entry point for the surrounding widget
//!
//! The manager wires the pieces together and owns the host:
//! 1. Builds the catalog from configuration
//! 2. Registers service hooks and scanned script directives
//! 3. Seeds defaults on start and honours opt-out mode
//! 4. On every consent update: store → notifier → activation
//! 5. Forwards load settlements back into the activator

use crate::activator::{ActivationReport, ScriptActivator};
use crate::host::{LoadOutcome, LoadTicket, ResourceHost};
use crate::initializer;
use crate::notifier::{ServiceHooks, ServiceTransition, ServiceTransitionNotifier};
use crate::registry::DirectiveRegistry;
use crate::store::{ConsentChoice, ConsentStore};
use consent_types::{
    CategoryId, ConsentCatalog, ConsentConfig, ConsentMode, ConsentResult, ConsentSnapshot,
    ScriptElement, ServiceId,
};

/// What a consent update did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManageReport {
    pub transitions: Vec<ServiceTransition>,
    /// `None` when script management is disabled
    pub activation: Option<ActivationReport>,
}

/// Orchestrates service notification and script activation
pub struct ConsentManager<H: ResourceHost> {
    config: ConsentConfig,
    catalog: ConsentCatalog,
    store: ConsentStore,
    notifier: ServiceTransitionNotifier,
    registry: DirectiveRegistry,
    activator: ScriptActivator,
    host: H,
    started: bool,
}

impl<H: ResourceHost> ConsentManager<H> {
    pub fn new(config: ConsentConfig, host: H) -> ConsentResult<Self> {
        let catalog = ConsentCatalog::from_config(&config)?;
        Ok(Self {
            config,
            catalog,
            store: ConsentStore::new(),
            notifier: ServiceTransitionNotifier::new(),
            registry: DirectiveRegistry::new(),
            activator: ScriptActivator::new(),
            host,
            started: false,
        })
    }

    /// Resume from consent saved in an earlier session.
    pub fn restore(&mut self, saved: ConsentSnapshot) -> ConsentResult<()> {
        let store = ConsentStore::from(saved);
        store.validate_against(&self.catalog)?;
        self.store = store;
        Ok(())
    }

    // ── Registration ─────────────────────────────────────────────────

    pub fn register_hooks(
        &mut self,
        category: impl Into<String>,
        service: impl Into<String>,
        hooks: ServiceHooks,
    ) -> ConsentResult<()> {
        self.notifier.register_hooks(
            &self.catalog,
            CategoryId::new(category),
            ServiceId::new(service),
            hooks,
        )
    }

    /// Register scanned placeholder elements in document order. Returns the
    /// number registered.
    pub fn scan_scripts<I>(&mut self, elements: I) -> ConsentResult<usize>
    where
        I: IntoIterator<Item = ScriptElement>,
    {
        let mut count = 0;
        for element in elements {
            self.registry.register(&self.catalog, element)?;
            count += 1;
        }
        tracing::info!(count, total = self.registry.len(), "Script directives scanned");
        Ok(count)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Apply saved consent, or seed defaults when the user has not decided
    /// yet. Only the first call does anything.
    pub fn start(&mut self) -> ConsentResult<ManageReport> {
        if self.started {
            return Ok(ManageReport::default());
        }
        self.started = true;

        if self.store.has_consent() {
            tracing::info!("Applying saved consent");
            return self.manage_existing_scripts(None);
        }

        initializer::seed_defaults(&self.catalog, &mut self.store);

        match self.config.mode {
            ConsentMode::OptOut => {
                let defaults = self.store.default_enabled_categories().to_vec();
                tracing::info!(defaults = ?defaults, "Opt-out mode: enabling defaults");
                self.store.put_defaults_in_effect();
                self.manage_existing_scripts(Some(&defaults))
            }
            ConsentMode::OptIn => Ok(ManageReport::default()),
        }
    }

    /// Record a consent decision and react to it.
    pub fn update_consent(&mut self, choice: &ConsentChoice) -> ConsentResult<ManageReport> {
        self.store.apply_choice(&self.catalog, choice)?;
        self.manage_existing_scripts(None)
    }

    /// Notify services, then activate directives unless script management
    /// is switched off.
    pub fn manage_existing_scripts(
        &mut self,
        explicit_accepted: Option<&[CategoryId]>,
    ) -> ConsentResult<ManageReport> {
        let transitions = self.notify_service_transitions()?;

        let activation = if self.config.manage_script_tags {
            Some(self.activate_directives(explicit_accepted)?)
        } else {
            None
        };

        Ok(ManageReport {
            transitions,
            activation,
        })
    }

    // ── Engine operations ────────────────────────────────────────────

    pub fn notify_service_transitions(&mut self) -> ConsentResult<Vec<ServiceTransition>> {
        self.notifier.notify(&self.catalog, self.store.snapshot())
    }

    pub fn activate_directives(
        &mut self,
        explicit_accepted: Option<&[CategoryId]>,
    ) -> ConsentResult<ActivationReport> {
        self.activator.activate_directives(
            &mut self.registry,
            self.store.snapshot(),
            explicit_accepted,
            &mut self.host,
        )
    }

    /// Hand back the ticket of a settled external load.
    pub fn load_settled(
        &mut self,
        ticket: LoadTicket,
        outcome: LoadOutcome,
    ) -> ConsentResult<ActivationReport> {
        self.activator
            .resume(ticket, outcome, &mut self.registry, &mut self.host)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn catalog(&self) -> &ConsentCatalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> &ConsentSnapshot {
        self.store.snapshot()
    }

    pub fn store(&self) -> &ConsentStore {
        &self.store
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    pub fn activator(&self) -> &ScriptActivator {
        &self.activator
    }

    pub fn is_service_enabled(&self, category: &str, service: &str) -> bool {
        self.notifier
            .is_enabled(&CategoryId::new(category), &ServiceId::new(service))
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
