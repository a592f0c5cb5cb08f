//! Agent registry
//!
//! An agent is a named prompt template plus a response parser, representing
//! one planning facet (architecture, cost, security, ...). The registry is
//! immutable: it is constructed once at process start and passed explicitly
//! to the orchestrator; nothing mutates or replaces it afterwards.

mod catalog;
pub mod parse;

use parse::ParseError;
use std::collections::HashMap;

/// Input context for prompt building
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    /// High-level project description
    pub description: String,
    /// Rendered summary of a referenced dataset, when the run names one
    pub dataset_summary: Option<String>,
}

impl PromptContext {
    /// Create a context from a description
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            dataset_summary: None,
        }
    }
}

/// Prompt builder: pure function of the input context
pub type PromptFn = fn(&PromptContext) -> String;

/// Response parser: pure function of the raw completion text
pub type ParseFn = fn(&str) -> Result<serde_json::Value, ParseError>;

/// One registered agent
#[derive(Clone)]
pub struct AgentSpec {
    /// Unique registry key (also the result mapping key)
    pub name: &'static str,
    /// Friendly display name
    pub title: &'static str,
    /// Prompt builder
    pub prompt: PromptFn,
    /// Response parser
    pub parse: ParseFn,
}

impl std::fmt::Debug for AgentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSpec")
            .field("name", &self.name)
            .field("title", &self.title)
            .finish()
    }
}

/// Immutable, ordered set of agents keyed by name
pub struct AgentRegistry {
    specs: Vec<AgentSpec>,
    index: HashMap<&'static str, usize>,
}

impl AgentRegistry {
    /// Build a registry from specs; declaration order is the `/agents` order
    fn from_specs(specs: Vec<AgentSpec>) -> Self {
        let index = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name, i))
            .collect();
        Self { specs, index }
    }

    /// The standard planning agent set
    #[must_use]
    pub fn standard() -> Self {
        Self::from_specs(catalog::standard_specs())
    }

    /// Agent names in declaration order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.specs.iter().map(|spec| spec.name).collect()
    }

    /// Look up an agent by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AgentSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    /// Iterate specs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &AgentSpec> {
        self.specs.iter()
    }

    /// Whether the registry contains the name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered agents
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_names_are_unique() {
        let registry = AgentRegistry::standard();
        let names = registry.names();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }

    #[test]
    fn test_standard_registry_covers_planning_facets() {
        let registry = AgentRegistry::standard();
        for name in [
            "architect",
            "pm",
            "cost",
            "security",
            "devops",
            "performance",
            "data",
            "ux",
            "datasci",
            "aicoding",
            "docs",
        ] {
            assert!(registry.contains(name), "missing agent {name}");
        }
    }

    #[test]
    fn test_names_keep_declaration_order() {
        let registry = AgentRegistry::standard();
        let names = registry.names();
        assert_eq!(names[0], "architect");
        assert_eq!(names[1], "pm");
    }

    #[test]
    fn test_prompts_embed_description() {
        let registry = AgentRegistry::standard();
        let ctx = PromptContext::new("Global AI FinTech platform");
        for name in registry.names() {
            let spec = registry.get(name).unwrap();
            let prompt = (spec.prompt)(&ctx);
            assert!(
                prompt.contains("Global AI FinTech platform"),
                "agent {name} prompt does not embed the description"
            );
        }
    }

    #[test]
    fn test_datasci_prompt_includes_dataset_summary() {
        let registry = AgentRegistry::standard();
        let mut ctx = PromptContext::new("Effort estimation platform");
        ctx.dataset_summary = Some("120 rows, columns: effort, size".to_string());

        let spec = registry.get("datasci").unwrap();
        let prompt = (spec.prompt)(&ctx);
        assert!(prompt.contains("120 rows"));
    }

    #[test]
    fn test_unknown_name_lookup_fails() {
        let registry = AgentRegistry::standard();
        assert!(registry.get("astrologer").is_none());
    }
}
