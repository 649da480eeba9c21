//! Service transition notifier
//!
//! Owns the enabled flag of every service and fires `on_accept` /
//! `on_reject` hooks when a service's membership in the accepted set
//! changes. A service without the relevant hook keeps its previous flag:
//! the flag only moves when a hook fires.

use consent_types::{
    CategoryId, ConsentCatalog, ConsentError, ConsentResult, ConsentSnapshot, HookError, HookKind,
    ServiceId,
};
use std::collections::HashMap;

type Hook = Box<dyn FnMut() -> Result<(), HookError>>;

/// Lifecycle hooks of a single service
#[derive(Default)]
pub struct ServiceHooks {
    on_accept: Option<Hook>,
    on_reject: Option<Hook>,
}

impl ServiceHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_accept<F>(mut self, hook: F) -> Self
    where
        F: FnMut() -> Result<(), HookError> + 'static,
    {
        self.on_accept = Some(Box::new(hook));
        self
    }

    pub fn on_reject<F>(mut self, hook: F) -> Self
    where
        F: FnMut() -> Result<(), HookError> + 'static,
    {
        self.on_reject = Some(Box::new(hook));
        self
    }

    pub fn has_accept(&self) -> bool {
        self.on_accept.is_some()
    }

    pub fn has_reject(&self) -> bool {
        self.on_reject.is_some()
    }
}

impl std::fmt::Debug for ServiceHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHooks")
            .field("on_accept", &self.has_accept())
            .field("on_reject", &self.has_reject())
            .finish()
    }
}

/// Direction of a service transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Accepted,
    Rejected,
}

/// A transition that fired a hook
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceTransition {
    pub category: CategoryId,
    pub service: ServiceId,
    pub kind: TransitionKind,
}

type ServiceKey = (CategoryId, ServiceId);

/// Tracks service enabled flags and dispatches lifecycle hooks
#[derive(Debug, Default)]
pub struct ServiceTransitionNotifier {
    enabled: HashMap<ServiceKey, bool>,
    hooks: HashMap<ServiceKey, ServiceHooks>,
}

impl ServiceTransitionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach hooks to a declared service, replacing any previous ones.
    pub fn register_hooks(
        &mut self,
        catalog: &ConsentCatalog,
        category: CategoryId,
        service: ServiceId,
        hooks: ServiceHooks,
    ) -> ConsentResult<()> {
        catalog.service(&category, &service)?;
        tracing::debug!(%category, %service, ?hooks, "Service hooks registered");
        self.hooks.insert((category, service), hooks);
        Ok(())
    }

    pub fn is_enabled(&self, category: &CategoryId, service: &ServiceId) -> bool {
        self.enabled
            .get(&(category.clone(), service.clone()))
            .copied()
            .unwrap_or(false)
    }

    /// Fire hooks for every service whose acceptance changed.
    ///
    /// Categories are visited in catalog order. A failing hook aborts the
    /// remaining notifications; the flag of the failing service has
    /// already been updated.
    pub fn notify(
        &mut self,
        catalog: &ConsentCatalog,
        snapshot: &ConsentSnapshot,
    ) -> ConsentResult<Vec<ServiceTransition>> {
        let mut transitions = Vec::new();

        for category in catalog.category_ids() {
            for service in snapshot.services_to_examine(category) {
                catalog.service(category, service)?;

                let key = (category.clone(), service.clone());
                let was_enabled = self.enabled.get(&key).copied().unwrap_or(false);
                let accepted = snapshot.is_service_enabled(category, service);
                let hooks = self.hooks.get_mut(&key);

                let (kind, hook) = match hooks {
                    Some(h) if !was_enabled && accepted && h.on_accept.is_some() => {
                        (TransitionKind::Accepted, h.on_accept.as_mut())
                    }
                    Some(h) if was_enabled && !accepted && h.on_reject.is_some() => {
                        (TransitionKind::Rejected, h.on_reject.as_mut())
                    }
                    _ => {
                        tracing::trace!(%category, %service, was_enabled, accepted, "No service transition");
                        continue;
                    }
                };

                self.enabled.insert(key, kind == TransitionKind::Accepted);

                let hook_kind = match kind {
                    TransitionKind::Accepted => HookKind::Accept,
                    TransitionKind::Rejected => HookKind::Reject,
                };
                tracing::debug!(%category, %service, hook = %hook_kind, "Invoking service hook");

                if let Some(hook) = hook {
                    hook().map_err(|source| ConsentError::Hook {
                        category: category.clone(),
                        service: service.clone(),
                        hook: hook_kind,
                        source,
                    })?;
                }

                transitions.push(ServiceTransition {
                    category: category.clone(),
                    service: service.clone(),
                    kind,
                });
            }
        }

        if !transitions.is_empty() {
            tracing::info!(count = transitions.len(), "Service transitions notified");
        }
        Ok(transitions)
    }
}
