//! Widget configuration
//!
//! Configuration is read from YAML or JSON. Category order in the file is
//! significant: it is the order in which service transitions are notified.

use crate::{ConsentCatalog, ConsentError, ConsentResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the widget behaves before the user has made a choice
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentMode {
    /// Nothing runs until the user accepts
    #[default]
    OptIn,
    /// Default-enabled categories run immediately
    OptOut,
}

/// Top-level consent configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsentConfig {
    #[serde(default)]
    pub mode: ConsentMode,

    /// Activate deferred script directives on consent changes
    #[serde(default = "default_true")]
    pub manage_script_tags: bool,

    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            mode: ConsentMode::OptIn,
            manage_script_tags: true,
            categories: Vec::new(),
        }
    }
}

/// A category declaration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

impl CategoryConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: false,
            read_only: false,
            services: Vec::new(),
        }
    }

    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Read-only categories are also enabled by default.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.enabled = true;
        self
    }

    pub fn with_service(mut self, service: ServiceConfig) -> Self {
        self.services.push(service);
        self
    }
}

/// A service declaration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ServiceConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl ConsentConfig {
    pub fn from_yaml_str(source: &str) -> ConsentResult<Self> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(source: &str) -> ConsentResult<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> ConsentResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents)?,
            Some("json") => Self::from_json_str(&contents)?,
            other => {
                return Err(ConsentError::Config(format!(
                    "unsupported config extension {:?} for {}",
                    other,
                    path.display()
                )))
            }
        };

        tracing::info!(
            path = %path.display(),
            categories = config.categories.len(),
            mode = ?config.mode,
            "Consent configuration loaded"
        );
        Ok(config)
    }

    /// Check identifiers by building a catalog and discarding it.
    pub fn validate(&self) -> ConsentResult<()> {
        ConsentCatalog::from_config(self).map(|_| ())
    }
}

fn default_true() -> bool {
    true
}
