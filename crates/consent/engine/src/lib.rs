//! Consent-driven script activation engine
//!
//! Reacts to consent updates in two steps:
//!
//! 1. The [`ServiceTransitionNotifier`] fires `on_accept` / `on_reject`
//!    hooks for services whose acceptance changed.
//! 2. The [`ScriptActivator`] walks the [`DirectiveRegistry`] in document
//!    order and revives deferred scripts whose consent condition now
//!    holds. Scripts with an external source are loaded strictly one at a
//!    time; the walk resumes when the host settles the load.
//!
//! The engine never touches markup. A [`ResourceHost`] materializes live
//! scripts and reports load completion.
//!
//! # Example
//!
//! ```rust
//! use consent_engine::{ConsentChoice, ConsentManager, LoadOutcome, LoadTicket, ResourceHost};
//! use consent_types::{ActiveResource, CategoryConfig, ConsentConfig, HostError, PlaceholderId, ScriptElement};
//!
//! #[derive(Default)]
//! struct Page {
//!     live: Vec<PlaceholderId>,
//!     loading: Option<LoadTicket>,
//! }
//!
//! impl ResourceHost for Page {
//!     type Handle = ();
//!
//!     fn create_active_resource(
//!         &mut self,
//!         placeholder: &PlaceholderId,
//!         _resource: ActiveResource,
//!     ) -> Result<(), HostError> {
//!         self.live.push(placeholder.clone());
//!         Ok(())
//!     }
//!
//!     fn on_load_settled(&mut self, _handle: (), ticket: LoadTicket) {
//!         self.loading = Some(ticket);
//!     }
//! }
//!
//! let config = ConsentConfig {
//!     categories: vec![CategoryConfig::new("analytics")],
//!     ..ConsentConfig::default()
//! };
//! let mut manager = ConsentManager::new(config, Page::default()).unwrap();
//! manager
//!     .scan_scripts(vec![
//!         ScriptElement::new("gtag")
//!             .attr("type", "text/plain")
//!             .attr("data-category", "analytics")
//!             .attr("data-src", "https://www.googletagmanager.com/gtag/js"),
//!         ScriptElement::new("init")
//!             .attr("type", "text/plain")
//!             .attr("data-category", "analytics")
//!             .inline("gtag('config', 'G-XXXX')"),
//!     ])
//!     .unwrap();
//! manager.start().unwrap();
//!
//! let report = manager.update_consent(&ConsentChoice::accept(["analytics"])).unwrap();
//! assert_eq!(report.activation.unwrap().activated, vec![0]);
//!
//! // The inline script waits for the external one
//! let ticket = manager.host_mut().loading.take().unwrap();
//! let resumed = manager.load_settled(ticket, LoadOutcome::Loaded).unwrap();
//! assert_eq!(resumed.activated, vec![1]);
//! assert_eq!(manager.host().live.len(), 2);
//! ```

#![deny(unsafe_code)]

pub mod activator;
pub mod host;
pub mod initializer;
pub mod manager;
pub mod notifier;
pub mod registry;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use activator::{activation_trigger, ActivationReport, ActivationTrigger, PassStatus, ScriptActivator};
pub use host::{LoadOutcome, LoadTicket, ResourceHost};
pub use initializer::seed_defaults;
pub use manager::{ConsentManager, ManageReport};
pub use notifier::{ServiceHooks, ServiceTransition, ServiceTransitionNotifier, TransitionKind};
pub use registry::DirectiveRegistry;
pub use store::{ConsentChoice, ConsentStore};
