//! Script directives: deferred scripts waiting for consent
//!
//! A directive is parsed once from a scanned placeholder element. Markup
//! conventions:
//!
//! - `data-category="analytics"` (required) names the governing category
//! - `data-service="ga"` (optional) narrows it to one service
//! - a leading `!` on either value makes the directive run when its scope
//!   is *disabled* instead of enabled
//! - `data-type` is the type the active script gets
//! - `data-src` (or plain `src`) is the external source

use crate::{CategoryId, ConsentError, ConsentResult, ServiceId};
use serde::{Deserialize, Serialize};

pub const CATEGORY_ATTR: &str = "data-category";
pub const SERVICE_ATTR: &str = "data-service";
pub const TYPE_ATTR: &str = "type";
pub const DATA_TYPE_ATTR: &str = "data-type";
pub const SRC_ATTR: &str = "src";
pub const DATA_SRC_ATTR: &str = "data-src";

const DISABLE_PREFIX: char = '!';

/// A single (name, value) attribute pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Host reference to the inert placeholder node
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceholderId(pub String);

impl PlaceholderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A placeholder element as reported by the markup scanner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptElement {
    pub placeholder: PlaceholderId,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
    /// Inline script body
    #[serde(default)]
    pub inline: String,
}

impl ScriptElement {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: PlaceholderId::new(placeholder),
            attributes: Vec::new(),
            inline: String::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn inline(mut self, body: impl Into<String>) -> Self {
        self.inline = body.into();
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// The live resource handed to the host on activation.
///
/// Hosts apply `attributes` in order and set `source` last, so a type
/// that disables execution is in place before loading starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveResource {
    pub attributes: Vec<Attribute>,
    pub inline: String,
    pub source: Option<String>,
}

impl ActiveResource {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn is_external(&self) -> bool {
        self.source.is_some()
    }
}

/// A deferred script awaiting its consent condition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptDirective {
    index: usize,
    category: CategoryId,
    service: Option<ServiceId>,
    run_on_disable: bool,
    executed: bool,
    placeholder: PlaceholderId,
    inline: String,
    source: Option<String>,
    resource_type: Option<String>,
    attributes: Vec<Attribute>,
}

impl ScriptDirective {
    /// Parse a scanned element into the directive at position `index`.
    pub fn from_element(index: usize, element: ScriptElement) -> ConsentResult<Self> {
        let invalid = |reason: &str| ConsentError::InvalidDirective {
            index,
            reason: reason.to_string(),
        };

        let raw_category = element
            .get(CATEGORY_ATTR)
            .ok_or_else(|| invalid("missing data-category"))?;
        let (category, category_negated) = split_disable_prefix(raw_category);
        if category.is_empty() {
            return Err(invalid("empty data-category"));
        }

        let (service, service_negated) = match element.get(SERVICE_ATTR) {
            Some(raw) => {
                let (name, negated) = split_disable_prefix(raw);
                if name.is_empty() {
                    return Err(invalid("empty data-service"));
                }
                (Some(ServiceId::new(name)), negated)
            }
            None => (None, false),
        };

        let resource_type = element.get(DATA_TYPE_ATTR).map(str::to_string);
        let source = element
            .get(DATA_SRC_ATTR)
            .filter(|s| !s.is_empty())
            .or_else(|| element.get(SRC_ATTR).filter(|s| !s.is_empty()))
            .map(str::to_string);

        let category = CategoryId::new(category);
        let attributes = element
            .attributes
            .into_iter()
            .filter(|a| {
                !matches!(
                    a.name.as_str(),
                    CATEGORY_ATTR | DATA_TYPE_ATTR | DATA_SRC_ATTR | SRC_ATTR
                )
            })
            .collect();

        Ok(Self {
            index,
            category,
            service,
            run_on_disable: category_negated || service_negated,
            executed: false,
            placeholder: element.placeholder,
            inline: element.inline,
            source,
            resource_type,
            attributes,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn category(&self) -> &CategoryId {
        &self.category
    }

    pub fn service(&self) -> Option<&ServiceId> {
        self.service.as_ref()
    }

    pub fn run_on_disable(&self) -> bool {
        self.run_on_disable
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn placeholder(&self) -> &PlaceholderId {
        &self.placeholder
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Flip `executed` to true. Returns false if it already was; the flag
    /// is never cleared. Registered directives are only flipped by the
    /// engine's registry, which hands out shared references.
    #[doc(hidden)]
    pub fn mark_executed(&mut self) -> bool {
        !std::mem::replace(&mut self.executed, true)
    }

    /// Build the active resource that replaces the placeholder.
    pub fn materialize(&self) -> ActiveResource {
        let mut attributes = self.attributes.clone();

        if let Some(resource_type) = &self.resource_type {
            match attributes.iter_mut().find(|a| a.name == TYPE_ATTR) {
                Some(existing) => existing.value = resource_type.clone(),
                None => attributes.push(Attribute::new(TYPE_ATTR, resource_type.clone())),
            }
        }

        ActiveResource {
            attributes,
            inline: self.inline.clone(),
            source: self.source.clone(),
        }
    }
}

fn split_disable_prefix(raw: &str) -> (&str, bool) {
    match raw.strip_prefix(DISABLE_PREFIX) {
        Some(rest) => (rest.trim(), true),
        None => (raw.trim(), false),
    }
}
