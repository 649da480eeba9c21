//! Consent domain types
//!
//! Shared vocabulary for the consent engine:
//!
//! - [`ConsentConfig`]: categories and services as declared by the site
//! - [`ConsentCatalog`]: validated, read-only definitions built from config
//! - [`ConsentSnapshot`]: what is accepted now and what changed last update
//! - [`ScriptDirective`]: a deferred script parsed from a placeholder element
//! - [`ConsentError`]: every failure the engine can report

#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod directive;
pub mod error;
pub mod snapshot;

pub use catalog::{Category, CategoryId, ConsentCatalog, Service, ServiceId};
pub use config::{CategoryConfig, ConsentConfig, ConsentMode, ServiceConfig};
pub use directive::{ActiveResource, Attribute, PlaceholderId, ScriptDirective, ScriptElement};
pub use error::{ConsentError, ConsentResult, HookError, HookKind, HostError};
pub use snapshot::ConsentSnapshot;
