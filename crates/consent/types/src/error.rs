use thiserror::Error;

use crate::catalog::{CategoryId, ServiceId};

/// Error returned by a service lifecycle hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which lifecycle hook of a service was running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookKind {
    Accept,
    Reject,
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookKind::Accept => write!(f, "on_accept"),
            HookKind::Reject => write!(f, "on_reject"),
        }
    }
}

/// Failure reported by the host while materializing an active resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from the consent engine.
#[derive(Error, Debug)]
pub enum ConsentError {
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    #[error("unknown service {service} in category {category}")]
    UnknownService {
        category: CategoryId,
        service: ServiceId,
    },

    #[error("duplicate category: {0}")]
    DuplicateCategory(CategoryId),

    #[error("duplicate service {service} in category {category}")]
    DuplicateService {
        category: CategoryId,
        service: ServiceId,
    },

    #[error("invalid script directive at index {index}: {reason}")]
    InvalidDirective { index: usize, reason: String },

    #[error("{hook} hook of service {service} ({category}) failed: {source}")]
    Hook {
        category: CategoryId,
        service: ServiceId,
        hook: HookKind,
        #[source]
        source: HookError,
    },

    #[error("host failed to activate directive {index}: {source}")]
    Host {
        index: usize,
        #[source]
        source: HostError,
    },

    #[error("load ticket for directive {index} does not match the outstanding load")]
    StaleTicket { index: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ConsentResult<T> = Result<T, ConsentError>;
