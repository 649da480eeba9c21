//! Host capability for materializing scripts
//!
//! The engine never touches markup itself. The host replaces placeholders
//! with live resources and reports back when an external load settles by
//! handing the [`LoadTicket`] to [`ScriptActivator::resume`].
//!
//! [`ScriptActivator::resume`]: crate::ScriptActivator::resume

use consent_types::{ActiveResource, HostError, PlaceholderId};

/// One-shot continuation for an outstanding external load.
///
/// Tickets cannot be cloned, so a load can be settled at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub(crate) pass: u64,
    pub(crate) index: usize,
}

impl LoadTicket {
    /// Index of the directive being loaded
    pub fn index(&self) -> usize {
        self.index
    }
}

/// How an external load ended. Both outcomes resume traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed { reason: String },
}

impl LoadOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        LoadOutcome::Failed {
            reason: reason.into(),
        }
    }
}

/// Capability the engine uses to activate directives
pub trait ResourceHost {
    type Handle;

    /// Replace `placeholder` with a live resource built from `resource`.
    fn create_active_resource(
        &mut self,
        placeholder: &PlaceholderId,
        resource: ActiveResource,
    ) -> Result<Self::Handle, HostError>;

    /// Arrange for `ticket` to be handed back to the engine once the load
    /// of `handle` succeeds or fails.
    fn on_load_settled(&mut self, handle: Self::Handle, ticket: LoadTicket);
}
