//! Host-native records exchanged through the bridge.
//!
//! These are plain value objects, built fresh for each call. Opaque values
//! use [`serde_json::Value`]; maps whose absence carries meaning are
//! `Option<...>` so the wire translation can preserve it.

mod diff;
pub mod schema;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::PluginError;

pub use self::diff::{DiffAttrType, InstanceDiff, ResourceAttrDiff};
pub use self::schema::{ProviderSchema, ProviderSchemaRequest};

/// Map of configuration keys to dynamically-typed values.
pub type ConfigMap = BTreeMap<String, Value>;

/// User-supplied configuration for a resource, possibly partly computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceConfig {
    /// Keys whose values are not yet known.
    pub computed_keys: Vec<String>,
    /// Configuration as written, before interpolation.
    pub raw: Option<ConfigMap>,
    /// Configuration after interpolation.
    pub config: Option<ConfigMap>,
}

impl ResourceConfig {
    /// Builds a fully-known configuration whose raw and interpolated forms
    /// are the same map.
    #[must_use]
    pub fn new(values: ConfigMap) -> Self {
        Self {
            computed_keys: Vec::new(),
            raw: Some(values.clone()),
            config: Some(values),
        }
    }

    /// Looks a key up in the interpolated configuration.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.as_ref().and_then(|config| config.get(key))
    }

    /// Whether the value for `key` is still unknown.
    #[must_use]
    pub fn is_computed(&self, key: &str) -> bool {
        self.computed_keys.iter().any(|computed| computed == key)
    }
}

/// Identity of a resource instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceInfo {
    /// Instance identifier within its module, e.g. `aws_instance.web`.
    pub id: String,
    /// Resource type name.
    pub type_name: String,
    /// Path of module names leading to the instance, root first.
    pub module_path: Vec<String>,
}

impl InstanceInfo {
    /// Builds an instance in the root module.
    #[must_use]
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            module_path: vec![String::from("root")],
        }
    }

    /// Replaces the module path.
    #[must_use]
    pub fn with_module_path(mut self, module_path: Vec<String>) -> Self {
        self.module_path = module_path;
        self
    }
}

/// Runtime connection data kept only for the lifetime of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EphemeralState {
    /// Connection type, e.g. `ssh`.
    pub type_name: String,
    /// Connection parameters.
    pub conn_info: BTreeMap<String, String>,
}

/// Persisted state of a resource instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceState {
    /// Provider-assigned identifier.
    pub id: String,
    /// Flattened attribute values.
    pub attributes: Option<BTreeMap<String, String>>,
    /// Connection data for provisioners.
    pub ephemeral: EphemeralState,
    /// Provider metadata; `null` when unset.
    pub meta: Value,
    /// Whether the instance must be replaced on the next apply.
    pub tainted: bool,
}

impl InstanceState {
    /// Builds a state with the given identifier and attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, attributes: BTreeMap<String, String>) -> Self {
        Self {
            id: id.into(),
            attributes: Some(attributes),
            ..Self::default()
        }
    }

    /// Looks an attribute up by its flattened key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .as_ref()
            .and_then(|attributes| attributes.get(key))
            .map(String::as_str)
    }
}

/// Warnings and errors returned by a validation call.
///
/// Errors that crossed the wire are plain [`PluginError::Message`] values;
/// only their text is preserved.
#[derive(Debug, Clone, Default)]
pub struct ValidateResult {
    /// Warning messages, in the order reported.
    pub warnings: Vec<String>,
    /// Validation failures, in the order reported.
    pub errors: Vec<PluginError>,
}

impl ValidateResult {
    /// A result with no warnings and no errors.
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// A result carrying a single error.
    #[must_use]
    pub fn from_error(error: PluginError) -> Self {
        Self {
            warnings: Vec::new(),
            errors: vec![error],
        }
    }

    /// Whether the validation reported no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error texts, in order.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// A resource type offered by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceType {
    /// Resource type name.
    pub name: String,
    /// Whether existing infrastructure can be imported as this type.
    pub importable: bool,
}

/// A data source offered by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSource {
    /// Data source name.
    pub name: String,
}

/// Describes a value the plugin needs the operator to supply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputOpts {
    /// Stable identifier for the requested value.
    pub id: String,
    /// Short question shown to the operator.
    pub query: String,
    /// Longer explanation of what is being asked.
    pub description: String,
    /// Value used when the operator gives an empty answer.
    pub default: String,
}

#[cfg(test)]
mod tests;
