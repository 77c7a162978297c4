//! Provider schema document.
//!
//! The schema crosses the wire as a single serialised document rather than
//! field by field, so these types only need to round-trip through serde.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Selects which parts of the schema a caller wants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSchemaRequest {
    /// Resource type names to include.
    pub resource_types: Vec<String>,
    /// Data source names to include.
    pub data_sources: Vec<String>,
}

/// Schema for a provider's configuration, resources and data sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSchema {
    /// Schema of the provider configuration block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Block>,
    /// Schemas keyed by resource type name.
    #[serde(default)]
    pub resource_types: BTreeMap<String, Block>,
    /// Schemas keyed by data source name.
    #[serde(default)]
    pub data_sources: BTreeMap<String, Block>,
}

impl ProviderSchema {
    /// Keeps only the resource types and data sources named in `request`.
    /// The provider block is always kept.
    #[must_use]
    pub fn filter(mut self, request: &ProviderSchemaRequest) -> Self {
        self.resource_types
            .retain(|name, _| request.resource_types.contains(name));
        self.data_sources
            .retain(|name, _| request.data_sources.contains(name));
        self
    }
}

/// A configuration block: attributes plus nested blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Attributes keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Attribute>,
    /// Nested block types keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub block_types: BTreeMap<String, NestedBlock>,
}

impl Block {
    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Adds a nested block type.
    #[must_use]
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block_types.insert(name.into(), block);
        self
    }
}

/// A single attribute in a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Type expression, e.g. `"string"` or `["list", "string"]`.
    #[serde(rename = "type")]
    pub value_type: Value,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// May be omitted from configuration.
    #[serde(default)]
    pub optional: bool,
    /// Must be set in configuration.
    #[serde(default)]
    pub required: bool,
    /// Set by the provider when not configured.
    #[serde(default)]
    pub computed: bool,
    /// Hidden from plan output.
    #[serde(default)]
    pub sensitive: bool,
}

impl Attribute {
    /// A required attribute of the given type.
    #[must_use]
    pub fn required(value_type: impl Into<Value>) -> Self {
        Self {
            value_type: value_type.into(),
            required: true,
            ..Self::default()
        }
    }

    /// An optional attribute of the given type.
    #[must_use]
    pub fn optional(value_type: impl Into<Value>) -> Self {
        Self {
            value_type: value_type.into(),
            optional: true,
            ..Self::default()
        }
    }

    /// A provider-computed attribute of the given type.
    #[must_use]
    pub fn computed(value_type: impl Into<Value>) -> Self {
        Self {
            value_type: value_type.into(),
            computed: true,
            ..Self::default()
        }
    }
}

/// A nested block type and how many instances it allows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    /// Shape of each nested block.
    pub block: Block,
    /// How nested instances are collected.
    pub nesting: NestingMode,
    /// Minimum number of instances.
    #[serde(default)]
    pub min_items: u32,
    /// Maximum number of instances; `0` means unbounded.
    #[serde(default)]
    pub max_items: u32,
}

/// Collection shape of a nested block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingMode {
    /// Exactly one nested block.
    Single,
    /// An ordered list of blocks.
    List,
    /// An unordered set of blocks.
    Set,
    /// Blocks keyed by label.
    Map,
}
