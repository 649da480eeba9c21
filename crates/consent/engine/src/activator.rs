//! Sequential script activation
//!
//! A *pass* walks the registry from index 0 and activates every directive
//! whose consent condition holds. Inline directives activate synchronously.
//! A directive with an external source suspends the pass until the host
//! returns its [`LoadTicket`]; only then does the walk continue at the next
//! index. At most one external load is outstanding at any time.
//!
//! Activation requests that arrive while a pass is suspended are queued
//! and run in arrival order once the suspended pass completes. Each request
//! captures the accepted categories and snapshot it was made with.

use crate::host::{LoadOutcome, LoadTicket, ResourceHost};
use crate::registry::DirectiveRegistry;
use consent_types::{CategoryId, ConsentError, ConsentResult, ConsentSnapshot, ScriptDirective};
use std::collections::VecDeque;

/// Why a directive was activated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationTrigger {
    CategoryEnabled,
    ServiceEnabled,
    CategoryDisabled,
    ServiceDisabled,
}

/// Decide whether `directive` should activate for the given consent.
///
/// Disable-triggered directives only fire on an actual transition, never
/// merely because their scope is off.
pub fn activation_trigger(
    directive: &ScriptDirective,
    accepted_categories: &[CategoryId],
    snapshot: &ConsentSnapshot,
) -> Option<ActivationTrigger> {
    let category = directive.category();
    let category_accepted = accepted_categories.contains(category);

    match (directive.service(), directive.run_on_disable()) {
        (None, false) if category_accepted => Some(ActivationTrigger::CategoryEnabled),
        (Some(service), false) if snapshot.is_service_enabled(category, service) => {
            Some(ActivationTrigger::ServiceEnabled)
        }
        (None, true) if !category_accepted && snapshot.category_changed(category) => {
            Some(ActivationTrigger::CategoryDisabled)
        }
        (Some(service), true)
            if !snapshot.is_service_enabled(category, service)
                && snapshot.service_changed(category, service) =>
        {
            Some(ActivationTrigger::ServiceDisabled)
        }
        _ => None,
    }
}

/// Where the activator stands after a call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassStatus {
    /// No pass running
    Idle,
    /// Waiting for the external load of directive `index`
    Suspended { index: usize },
}

/// Outcome of an activation call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationReport {
    /// Directives activated during this call, in activation order
    pub activated: Vec<usize>,
    pub status: PassStatus,
    /// Requests waiting behind the current pass
    pub queued: usize,
}

impl ActivationReport {
    pub fn is_suspended(&self) -> bool {
        matches!(self.status, PassStatus::Suspended { .. })
    }
}

#[derive(Clone, Debug)]
struct ActivationRequest {
    accepted: Vec<CategoryId>,
    snapshot: ConsentSnapshot,
}

#[derive(Debug)]
struct ActivationPass {
    id: u64,
    request: ActivationRequest,
    next_index: usize,
    awaiting: Option<usize>,
}

enum PassStep {
    Suspended(usize),
    Finished,
}

/// Drives activation passes over a [`DirectiveRegistry`]
#[derive(Debug, Default)]
pub struct ScriptActivator {
    current: Option<ActivationPass>,
    queue: VecDeque<ActivationRequest>,
    next_pass_id: u64,
}

impl ScriptActivator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> PassStatus {
        match self.current.as_ref().and_then(|p| p.awaiting) {
            Some(index) => PassStatus::Suspended { index },
            None => PassStatus::Idle,
        }
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Start a pass over `registry`.
    ///
    /// `explicit_accepted` overrides the snapshot's accepted categories,
    /// which is how defaults are honoured before the user has decided.
    pub fn activate_directives<H: ResourceHost>(
        &mut self,
        registry: &mut DirectiveRegistry,
        snapshot: &ConsentSnapshot,
        explicit_accepted: Option<&[CategoryId]>,
        host: &mut H,
    ) -> ConsentResult<ActivationReport> {
        let request = ActivationRequest {
            accepted: explicit_accepted
                .map(<[CategoryId]>::to_vec)
                .unwrap_or_else(|| snapshot.accepted_categories.clone()),
            snapshot: snapshot.clone(),
        };

        if self.current.is_some() {
            self.queue.push_back(request);
            tracing::debug!(queued = self.queue.len(), "Activation pass queued behind pending load");
            return Ok(ActivationReport {
                activated: Vec::new(),
                status: self.status(),
                queued: self.queue.len(),
            });
        }

        self.open_pass(request);
        self.drive(registry, host, Vec::new())
    }

    /// Deliver the settlement of an external load and continue the pass.
    pub fn resume<H: ResourceHost>(
        &mut self,
        ticket: LoadTicket,
        outcome: LoadOutcome,
        registry: &mut DirectiveRegistry,
        host: &mut H,
    ) -> ConsentResult<ActivationReport> {
        let pass = match self.current.as_mut() {
            Some(pass) if pass.id == ticket.pass && pass.awaiting == Some(ticket.index) => pass,
            _ => {
                tracing::warn!(index = ticket.index, "Load ticket does not match the pending load");
                return Err(ConsentError::StaleTicket {
                    index: ticket.index,
                });
            }
        };

        match &outcome {
            LoadOutcome::Loaded => {
                tracing::debug!(index = ticket.index, pass = pass.id, "External script loaded")
            }
            LoadOutcome::Failed { reason } => tracing::warn!(
                index = ticket.index,
                pass = pass.id,
                %reason,
                "External script failed to load, continuing"
            ),
        }
        pass.awaiting = None;

        self.drive(registry, host, Vec::new())
    }

    fn open_pass(&mut self, request: ActivationRequest) {
        let id = self.next_pass_id;
        self.next_pass_id += 1;
        tracing::debug!(pass = id, accepted = ?request.accepted, "Activation pass started");
        self.current = Some(ActivationPass {
            id,
            request,
            next_index: 0,
            awaiting: None,
        });
    }

    fn drive<H: ResourceHost>(
        &mut self,
        registry: &mut DirectiveRegistry,
        host: &mut H,
        mut activated: Vec<usize>,
    ) -> ConsentResult<ActivationReport> {
        while let Some(pass) = self.current.as_mut() {
            match step(pass, registry, host, &mut activated) {
                Ok(PassStep::Suspended(index)) => {
                    return Ok(ActivationReport {
                        activated,
                        status: PassStatus::Suspended { index },
                        queued: self.queue.len(),
                    });
                }
                Ok(PassStep::Finished) => {
                    tracing::info!(
                        pass = pass.id,
                        executed = registry.executed_count(),
                        total = registry.len(),
                        "Activation pass completed"
                    );
                    self.current = None;
                    if let Some(next) = self.queue.pop_front() {
                        self.open_pass(next);
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "Activation pass aborted");
                    self.current = None;
                    self.queue.clear();
                    return Err(err);
                }
            }
        }

        Ok(ActivationReport {
            activated,
            status: PassStatus::Idle,
            queued: 0,
        })
    }
}

fn step<H: ResourceHost>(
    pass: &mut ActivationPass,
    registry: &mut DirectiveRegistry,
    host: &mut H,
    activated: &mut Vec<usize>,
) -> ConsentResult<PassStep> {
    while pass.next_index < registry.len() {
        let index = pass.next_index;
        pass.next_index += 1;

        let Some(directive) = registry.get(index) else {
            break;
        };
        if directive.is_executed() {
            continue;
        }
        let Some(trigger) =
            activation_trigger(directive, &pass.request.accepted, &pass.request.snapshot)
        else {
            continue;
        };

        let resource = directive.materialize();
        let placeholder = directive.placeholder().clone();
        let external = resource.is_external();

        registry.mark_executed(index);
        activated.push(index);
        tracing::info!(index, %placeholder, ?trigger, external, "Activating script directive");

        let handle = host
            .create_active_resource(&placeholder, resource)
            .map_err(|source| ConsentError::Host { index, source })?;

        if external {
            pass.awaiting = Some(index);
            host.on_load_settled(
                handle,
                LoadTicket {
                    pass: pass.id,
                    index,
                },
            );
            return Ok(PassStep::Suspended(index));
        }
    }

    Ok(PassStep::Finished)
}
