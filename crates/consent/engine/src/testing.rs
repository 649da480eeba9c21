//! In-memory host for tests

use crate::host::{LoadTicket, ResourceHost};
use consent_types::{ActiveResource, HostError, PlaceholderId};
use std::collections::VecDeque;

/// Records every activation and keeps load tickets until the test settles
/// them.
#[derive(Debug, Default)]
pub struct RecordingHost {
    /// Activated resources, in activation order
    pub activations: Vec<(PlaceholderId, ActiveResource)>,
    /// Placeholders whose external load was started, in order
    pub loads_started: Vec<PlaceholderId>,
    pending: VecDeque<LoadTicket>,
    fail_on: Option<PlaceholderId>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_active_resource` fail for `placeholder`.
    pub fn failing_on(mut self, placeholder: impl Into<String>) -> Self {
        self.fail_on = Some(PlaceholderId::new(placeholder));
        self
    }

    pub fn activated_placeholders(&self) -> Vec<&str> {
        self.activations.iter().map(|(p, _)| p.0.as_str()).collect()
    }

    pub fn resource(&self, placeholder: &str) -> Option<&ActiveResource> {
        self.activations
            .iter()
            .find(|(p, _)| p.0 == placeholder)
            .map(|(_, r)| r)
    }

    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    /// Oldest unsettled load ticket
    pub fn take_ticket(&mut self) -> Option<LoadTicket> {
        self.pending.pop_front()
    }
}

impl ResourceHost for RecordingHost {
    type Handle = usize;

    fn create_active_resource(
        &mut self,
        placeholder: &PlaceholderId,
        resource: ActiveResource,
    ) -> Result<Self::Handle, HostError> {
        if self.fail_on.as_ref() == Some(placeholder) {
            return Err(HostError::new(format!("placeholder {placeholder} is detached")));
        }
        self.activations.push((placeholder.clone(), resource));
        Ok(self.activations.len() - 1)
    }

    fn on_load_settled(&mut self, handle: Self::Handle, ticket: LoadTicket) {
        if let Some((placeholder, _)) = self.activations.get(handle) {
            self.loads_started.push(placeholder.clone());
        }
        self.pending.push_back(ticket);
    }
}
