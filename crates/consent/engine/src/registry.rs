//! Directive registry: scanned script directives in document order
//!
//! Directives are validated against the catalog when they are registered.
//! A directive naming an unknown category or service is a configuration
//! error and never reaches activation.

use consent_types::{ConsentCatalog, ConsentResult, ScriptDirective, ScriptElement};

/// Ordered collection of script directives
#[derive(Clone, Debug, Default)]
pub struct DirectiveRegistry {
    directives: Vec<ScriptDirective>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from scanned elements. Fails on the first invalid
    /// element; nothing is registered in that case.
    pub fn scan<I>(catalog: &ConsentCatalog, elements: I) -> ConsentResult<Self>
    where
        I: IntoIterator<Item = ScriptElement>,
    {
        let mut registry = Self::new();
        for element in elements {
            registry.register(catalog, element)?;
        }
        Ok(registry)
    }

    /// Append a directive and return its index.
    pub fn register(
        &mut self,
        catalog: &ConsentCatalog,
        element: ScriptElement,
    ) -> ConsentResult<usize> {
        let index = self.directives.len();
        let directive = ScriptDirective::from_element(index, element)?;

        match directive.service() {
            Some(service) => {
                catalog.service(directive.category(), service)?;
            }
            None => {
                catalog.category(directive.category())?;
            }
        }

        tracing::debug!(
            index,
            category = %directive.category(),
            service = ?directive.service().map(|s| s.as_str()),
            run_on_disable = directive.run_on_disable(),
            external = directive.source().is_some(),
            "Script directive registered"
        );
        self.directives.push(directive);
        Ok(index)
    }

    pub fn get(&self, index: usize) -> Option<&ScriptDirective> {
        self.directives.get(index)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScriptDirective> {
        self.directives.iter()
    }

    pub fn executed_count(&self) -> usize {
        self.directives.iter().filter(|d| d.is_executed()).count()
    }

    pub(crate) fn mark_executed(&mut self, index: usize) -> bool {
        self.directives
            .get_mut(index)
            .is_some_and(ScriptDirective::mark_executed)
    }
}
