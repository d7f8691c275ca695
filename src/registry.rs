//! Named grammars.
//!
//! The matcher resolves every non-terminal that is not a primitive through a [Registry]:
//! productions by name (`calc-sum`, `rgb()`), properties by their quoted name (`'width'`).
//! Registries are read-only once built and may be shared across threads.
//!
//! [StandardRegistry] holds the productions the engine itself depends on (math functions,
//! colors, ratios, boolean expressions) plus a few common properties. [MapRegistry] layers
//! caller-supplied definitions over it.

pub mod builtins;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

/// A registry entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Definition {
    /// The value definition text.
    pub syntax: String,
    /// The initial value, for properties.
    #[serde(default)]
    pub initial: Option<String>,
    /// Anything else the host keeps about the entry. The engine never reads it.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Definition {
    pub fn new(syntax: impl Into<String>) -> Self {
        Self {
            syntax: syntax.into(),
            initial: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = Some(initial.into());
        self
    }
}

/// Lookup of named grammars.
pub trait Registry: Send + Sync {
    /// The entry for a production name, or for a property name wrapped in single quotes.
    fn lookup(&self, name: &str) -> Option<&Definition>;
}

/// The registry key of a property.
pub fn property_key(name: &str) -> String {
    format!("'{}'", name.to_ascii_lowercase())
}

static STANDARD: Lazy<HashMap<String, Definition>> = Lazy::new(|| {
    let productions = builtins::PRODUCTIONS
        .iter()
        .map(|(name, syntax)| (name.to_string(), Definition::new(*syntax)));
    let properties = builtins::PROPERTIES.iter().map(|(name, syntax, initial)| {
        (
            property_key(name),
            Definition::new(*syntax).with_initial(*initial),
        )
    });
    productions.chain(properties).collect()
});

/// The built-in productions and properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRegistry;

impl Registry for StandardRegistry {
    fn lookup(&self, name: &str) -> Option<&Definition> {
        STANDARD.get(name)
    }
}

/// Caller-supplied productions and properties over the standard ones.
///
/// Entries here shadow built-in entries of the same name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapRegistry {
    #[serde(default)]
    productions: HashMap<String, Definition>,
    #[serde(default)]
    properties: HashMap<String, Definition>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load productions and properties from JSON of the shape
    /// `{"productions": {name: {syntax, ...}}, "properties": {name: {syntax, initial}}}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut registry: MapRegistry = serde_json::from_str(json)?;
        registry.properties = std::mem::take(&mut registry.properties)
            .into_iter()
            .map(|(name, definition)| (name.to_ascii_lowercase(), definition))
            .collect();
        Ok(registry)
    }

    pub fn with_production(mut self, name: &str, syntax: &str) -> Self {
        self.productions
            .insert(name.to_string(), Definition::new(syntax));
        self
    }

    pub fn with_property(mut self, name: &str, definition: Definition) -> Self {
        self.properties.insert(name.to_ascii_lowercase(), definition);
        self
    }
}

impl Registry for MapRegistry {
    fn lookup(&self, name: &str) -> Option<&Definition> {
        let property = name
            .strip_prefix('\'')
            .and_then(|quoted| quoted.strip_suffix('\''));
        let own = match property {
            Some(property) => self.properties.get(property),
            None => self.productions.get(name),
        };
        own.or_else(|| StandardRegistry.lookup(name))
    }
}
