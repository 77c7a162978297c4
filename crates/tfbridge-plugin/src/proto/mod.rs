//! Wire envelope for the `tfbridge.v1` services.
//!
//! Messages are declared with `prost` derives; the `Provider` and
//! `Provisioner` service bindings are generated by `build.rs` and re-exported
//! here. Several types share names with the host records in
//! [`crate::model`], so refer to these through the `proto::` prefix.
//!
//! Maps whose absence is meaningful are wrapped in a message ([`ValueMap`],
//! [`StringMap`], [`AttrDiffMap`]): message fields have presence on the wire,
//! bare protobuf maps do not.

use std::collections::BTreeMap;

mod generated {
    #![allow(
        missing_docs,
        clippy::all,
        clippy::pedantic,
        clippy::nursery,
        clippy::restriction,
        reason = "tonic-build output is not written against the workspace lint table"
    )]

    include!(concat!(env!("OUT_DIR"), "/tfbridge.v1.Provider.rs"));
    include!(concat!(env!("OUT_DIR"), "/tfbridge.v1.Provisioner.rs"));
}

pub use self::generated::{provider_client, provider_server, provisioner_client, provisioner_server};

/// Acknowledgement with no payload.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Empty {}

/// Map of keys to JSON-encoded values.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValueMap {
    /// Entries, each value an independent JSON document.
    #[prost(btree_map = "string, bytes", tag = "1")]
    pub entries: BTreeMap<String, Vec<u8>>,
}

/// Map of string keys to string values.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringMap {
    /// Entries.
    #[prost(btree_map = "string, string", tag = "1")]
    pub entries: BTreeMap<String, String>,
}

/// Map of attribute names to attribute diffs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttrDiffMap {
    /// Entries.
    #[prost(btree_map = "string, message", tag = "1")]
    pub entries: BTreeMap<String, ResourceAttrDiff>,
}

/// Resource configuration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResourceConfig {
    /// Keys whose values are still unknown.
    #[prost(string, repeated, tag = "1")]
    pub computed_keys: Vec<String>,
    /// Configuration before interpolation.
    #[prost(message, optional, tag = "2")]
    pub raw: Option<ValueMap>,
    /// Configuration after interpolation.
    #[prost(message, optional, tag = "3")]
    pub config: Option<ValueMap>,
}

/// Instance identity.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct InstanceInfo {
    /// Instance identifier.
    #[prost(string, tag = "1")]
    pub id: String,
    /// Resource type name.
    #[prost(string, tag = "2")]
    pub type_name: String,
    /// Module path, root first.
    #[prost(string, repeated, tag = "3")]
    pub module_path: Vec<String>,
}

/// Runtime connection data.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct EphemeralState {
    /// Connection type.
    #[prost(string, tag = "1")]
    pub type_name: String,
    /// Connection parameters.
    #[prost(btree_map = "string, string", tag = "2")]
    pub conn_info: BTreeMap<String, String>,
}

/// Persisted instance state.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstanceState {
    /// Provider-assigned identifier.
    #[prost(string, tag = "1")]
    pub id: String,
    /// Flattened attributes.
    #[prost(message, optional, tag = "2")]
    pub attributes: Option<StringMap>,
    /// Connection data.
    #[prost(message, optional, tag = "3")]
    pub ephemeral: Option<EphemeralState>,
    /// JSON-encoded provider metadata.
    #[prost(bytes = "vec", tag = "4")]
    pub meta: Vec<u8>,
    /// Tainted flag.
    #[prost(bool, tag = "5")]
    pub tainted: bool,
}

/// Diff of one attribute.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResourceAttrDiff {
    /// Current value.
    #[prost(string, tag = "1")]
    pub old: String,
    /// Planned value.
    #[prost(string, tag = "2")]
    pub new: String,
    /// Planned value is computed.
    #[prost(bool, tag = "3")]
    pub new_computed: bool,
    /// Attribute is removed.
    #[prost(bool, tag = "4")]
    pub new_removed: bool,
    /// JSON-encoded extra data.
    #[prost(bytes = "vec", tag = "5")]
    pub new_extra: Vec<u8>,
    /// Change forces replacement.
    #[prost(bool, tag = "6")]
    pub requires_new: bool,
    /// Values are sensitive.
    #[prost(bool, tag = "7")]
    pub sensitive: bool,
    /// Diff type code: 0 invalid, 1 attribute, 2 list block.
    #[prost(int32, tag = "8")]
    pub diff_type: i32,
}

/// Diff of one instance.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InstanceDiff {
    /// Per-attribute diffs.
    #[prost(message, optional, tag = "1")]
    pub attributes: Option<AttrDiffMap>,
    /// Instance is destroyed.
    #[prost(bool, tag = "2")]
    pub destroy: bool,
    /// Deposed instance is destroyed.
    #[prost(bool, tag = "3")]
    pub destroy_deposed: bool,
    /// Instance is destroyed because it is tainted.
    #[prost(bool, tag = "4")]
    pub destroy_tainted: bool,
    /// JSON-encoded provider metadata.
    #[prost(bytes = "vec", tag = "5")]
    pub meta: Vec<u8>,
}

/// Schema filter.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetSchemaRequest {
    /// Resource type names.
    #[prost(string, repeated, tag = "1")]
    pub resource_types: Vec<String>,
    /// Data source names.
    #[prost(string, repeated, tag = "2")]
    pub data_sources: Vec<String>,
}

/// Serialised schema document.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetSchemaResponse {
    /// JSON document describing the provider schema.
    #[prost(bytes = "vec", tag = "1")]
    pub schema: Vec<u8>,
}

/// Host-to-plugin message on the input stream.
///
/// The first message carries the configuration; every later one is an
/// operator reply and leaves `resource_config` unset.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InputRequest {
    /// Configuration to complete.
    #[prost(message, optional, tag = "1")]
    pub resource_config: Option<ResourceConfig>,
    /// Operator's answer to the last prompt.
    #[prost(string, tag = "2")]
    pub reply: String,
}

/// Plugin-to-host message on the input stream.
///
/// Carries either a prompt or, to end the exchange, the completed
/// configuration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InputResponse {
    /// Prompt identifier.
    #[prost(string, tag = "1")]
    pub id: String,
    /// Prompt question.
    #[prost(string, tag = "2")]
    pub query: String,
    /// Prompt description.
    #[prost(string, tag = "3")]
    pub description: String,
    /// Default answer.
    #[prost(string, tag = "4")]
    pub default: String,
    /// Completed configuration; set only on the final message.
    #[prost(message, optional, tag = "5")]
    pub resource_config: Option<ResourceConfig>,
}

/// Provider or provisioner configuration validation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateRequest {
    /// Configuration to validate.
    #[prost(message, optional, tag = "1")]
    pub config: Option<ResourceConfig>,
}

/// Validation outcome.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ValidateResponse {
    /// Warning messages.
    #[prost(string, repeated, tag = "1")]
    pub warnings: Vec<String>,
    /// Error messages.
    #[prost(string, repeated, tag = "2")]
    pub errors: Vec<String>,
}

/// Resource configuration validation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateResourceRequest {
    /// Resource type name.
    #[prost(string, tag = "1")]
    pub type_name: String,
    /// Configuration to validate.
    #[prost(message, optional, tag = "2")]
    pub config: Option<ResourceConfig>,
}

/// Data source configuration validation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ValidateDataSourceRequest {
    /// Data source name.
    #[prost(string, tag = "1")]
    pub type_name: String,
    /// Configuration to validate.
    #[prost(message, optional, tag = "2")]
    pub config: Option<ResourceConfig>,
}

/// Provider configuration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigureRequest {
    /// Provider configuration.
    #[prost(message, optional, tag = "1")]
    pub resource_config: Option<ResourceConfig>,
}

/// Apply a diff.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplyRequest {
    /// Target instance.
    #[prost(message, optional, tag = "1")]
    pub info: Option<InstanceInfo>,
    /// Prior state.
    #[prost(message, optional, tag = "2")]
    pub state: Option<InstanceState>,
    /// Diff to apply.
    #[prost(message, optional, tag = "3")]
    pub diff: Option<InstanceDiff>,
}

/// Resulting state of an apply.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplyResponse {
    /// New state; unset when the instance was destroyed.
    #[prost(message, optional, tag = "1")]
    pub state: Option<InstanceState>,
}

/// Plan changes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DiffRequest {
    /// Target instance.
    #[prost(message, optional, tag = "1")]
    pub info: Option<InstanceInfo>,
    /// Prior state.
    #[prost(message, optional, tag = "2")]
    pub state: Option<InstanceState>,
    /// Desired configuration.
    #[prost(message, optional, tag = "3")]
    pub config: Option<ResourceConfig>,
}

/// Planned changes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DiffResponse {
    /// Diff; unset when nothing changes.
    #[prost(message, optional, tag = "1")]
    pub diff: Option<InstanceDiff>,
}

/// Re-read an instance.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RefreshRequest {
    /// Target instance.
    #[prost(message, optional, tag = "1")]
    pub info: Option<InstanceInfo>,
    /// Prior state.
    #[prost(message, optional, tag = "2")]
    pub state: Option<InstanceState>,
}

/// Refreshed state.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RefreshResponse {
    /// Current state; unset when the instance is gone.
    #[prost(message, optional, tag = "1")]
    pub state: Option<InstanceState>,
}

/// Import existing infrastructure.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImportStateRequest {
    /// Target instance.
    #[prost(message, optional, tag = "1")]
    pub info: Option<InstanceInfo>,
    /// Identifier of the infrastructure to import.
    #[prost(string, tag = "2")]
    pub id: String,
}

/// Imported states.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImportStateResponse {
    /// Imported states, in order.
    #[prost(message, repeated, tag = "1")]
    pub state: Vec<InstanceState>,
}

/// A supported resource type.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ResourceType {
    /// Type name.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Supports import.
    #[prost(bool, tag = "2")]
    pub importable: bool,
}

/// Supported resource types.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ResourcesResponse {
    /// Resource types, in provider order.
    #[prost(message, repeated, tag = "1")]
    pub resources: Vec<ResourceType>,
}

/// Supported data sources.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct DataSourcesResponse {
    /// Data source names, in provider order.
    #[prost(string, repeated, tag = "1")]
    pub data_sources: Vec<String>,
}

/// Plan a data source read.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadDataDiffRequest {
    /// Target data instance.
    #[prost(message, optional, tag = "1")]
    pub info: Option<InstanceInfo>,
    /// Data source configuration.
    #[prost(message, optional, tag = "2")]
    pub config: Option<ResourceConfig>,
}

/// Planned data source read.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadDataDiffResponse {
    /// Diff; unset when nothing needs reading.
    #[prost(message, optional, tag = "1")]
    pub diff: Option<InstanceDiff>,
}

/// Perform a data source read.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadDataApplyRequest {
    /// Target data instance.
    #[prost(message, optional, tag = "1")]
    pub info: Option<InstanceInfo>,
    /// Planned read.
    #[prost(message, optional, tag = "2")]
    pub diff: Option<InstanceDiff>,
}

/// Data source read result.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadDataApplyResponse {
    /// Read state.
    #[prost(message, optional, tag = "1")]
    pub state: Option<InstanceState>,
}

/// Run a provisioner.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProvisionerApplyRequest {
    /// State of the resource being provisioned.
    #[prost(message, optional, tag = "1")]
    pub state: Option<InstanceState>,
    /// Provisioner configuration.
    #[prost(message, optional, tag = "2")]
    pub config: Option<ResourceConfig>,
}

/// One progress message from a provisioner.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UiOutput {
    /// Progress text.
    #[prost(string, tag = "1")]
    pub message: String,
}
