//! Record translators between host-native types and wire messages.
//!
//! Every translator is a pure function of its input. Absent input maps to
//! absent output in both directions: [`to_wire_opt`] and [`from_wire_opt`]
//! never synthesise an empty record. Opaque fields go through
//! [`crate::codec`] and any failure there aborts the translation.

use std::collections::BTreeMap;

use crate::codec::{self, CodecError};
use crate::error::PluginError;
use crate::model::{
    DataSource, DiffAttrType, EphemeralState, InputOpts, InstanceDiff, InstanceInfo,
    InstanceState, ProviderSchema, ProviderSchemaRequest, ResourceAttrDiff, ResourceConfig,
    ResourceType, ValidateResult,
};
use crate::proto;

/// Converts a host record into its wire message.
pub trait ToWire {
    /// Wire representation.
    type Wire;

    /// Builds the wire message.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when an opaque field cannot be encoded.
    fn to_wire(&self) -> Result<Self::Wire, CodecError>;
}

/// Rebuilds a host record from its wire message.
pub trait FromWire: Sized {
    /// Wire representation.
    type Wire;

    /// Consumes the wire message.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when an opaque field or enum code is invalid.
    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError>;
}

/// Translates an optional record, keeping absence.
///
/// # Errors
///
/// Propagates the record's [`ToWire`] failure.
pub fn to_wire_opt<T: ToWire>(value: Option<&T>) -> Result<Option<T::Wire>, CodecError> {
    value.map(ToWire::to_wire).transpose()
}

/// Translates an optional wire message, keeping absence.
///
/// # Errors
///
/// Propagates the record's [`FromWire`] failure.
pub fn from_wire_opt<T: FromWire>(wire: Option<T::Wire>) -> Result<Option<T>, CodecError> {
    wire.map(T::from_wire).transpose()
}

/// Translates a sequence, keeping order and length.
///
/// # Errors
///
/// Fails on the first element that cannot be translated.
pub fn to_wire_all<T: ToWire>(values: &[T]) -> Result<Vec<T::Wire>, CodecError> {
    values.iter().map(ToWire::to_wire).collect()
}

/// Translates a wire sequence, keeping order and length.
///
/// # Errors
///
/// Fails on the first element that cannot be translated.
pub fn from_wire_all<T: FromWire>(wire: Vec<T::Wire>) -> Result<Vec<T>, CodecError> {
    wire.into_iter().map(T::from_wire).collect()
}

/// Unwraps a field the receiving operation cannot proceed without.
///
/// # Errors
///
/// Returns [`CodecError::MissingField`] naming `field` when it is absent.
pub fn require<W>(wire: Option<W>, field: &'static str) -> Result<W, CodecError> {
    wire.ok_or_else(|| CodecError::MissingField { field })
}

/// Translates a required wire record, failing when it is absent.
///
/// # Errors
///
/// Returns [`CodecError::MissingField`] or the record's decode failure.
pub fn from_required<T: FromWire>(
    wire: Option<T::Wire>,
    field: &'static str,
) -> Result<T, CodecError> {
    T::from_wire(require(wire, field)?)
}

// ---------------------------------------------------------------------------
// Configuration and identity
// ---------------------------------------------------------------------------

impl ToWire for ResourceConfig {
    type Wire = proto::ResourceConfig;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        Ok(proto::ResourceConfig {
            computed_keys: self.computed_keys.clone(),
            raw: codec::encode_map(self.raw.as_ref())?,
            config: codec::encode_map(self.config.as_ref())?,
        })
    }
}

impl FromWire for ResourceConfig {
    type Wire = proto::ResourceConfig;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        Ok(Self {
            computed_keys: wire.computed_keys,
            raw: codec::decode_map(wire.raw)?,
            config: codec::decode_map(wire.config)?,
        })
    }
}

impl ToWire for InstanceInfo {
    type Wire = proto::InstanceInfo;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        Ok(proto::InstanceInfo {
            id: self.id.clone(),
            type_name: self.type_name.clone(),
            module_path: self.module_path.clone(),
        })
    }
}

impl FromWire for InstanceInfo {
    type Wire = proto::InstanceInfo;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        Ok(Self {
            id: wire.id,
            type_name: wire.type_name,
            module_path: wire.module_path,
        })
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

impl ToWire for EphemeralState {
    type Wire = proto::EphemeralState;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        Ok(proto::EphemeralState {
            type_name: self.type_name.clone(),
            conn_info: self.conn_info.clone(),
        })
    }
}

impl FromWire for EphemeralState {
    type Wire = proto::EphemeralState;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        Ok(Self {
            type_name: wire.type_name,
            conn_info: wire.conn_info,
        })
    }
}

impl ToWire for InstanceState {
    type Wire = proto::InstanceState;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        Ok(proto::InstanceState {
            id: self.id.clone(),
            attributes: self.attributes.as_ref().map(|entries| proto::StringMap {
                entries: entries.clone(),
            }),
            ephemeral: Some(self.ephemeral.to_wire()?),
            meta: codec::encode_value(&self.meta)?,
            tainted: self.tainted,
        })
    }
}

impl FromWire for InstanceState {
    type Wire = proto::InstanceState;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        Ok(Self {
            id: wire.id,
            attributes: wire.attributes.map(|map| map.entries),
            ephemeral: from_wire_opt::<EphemeralState>(wire.ephemeral)?.unwrap_or_default(),
            meta: codec::decode_value(&wire.meta)?,
            tainted: wire.tainted,
        })
    }
}

// ---------------------------------------------------------------------------
// Diffs
// ---------------------------------------------------------------------------

impl ToWire for ResourceAttrDiff {
    type Wire = proto::ResourceAttrDiff;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        Ok(proto::ResourceAttrDiff {
            old: self.old.clone(),
            new: self.new.clone(),
            new_computed: self.new_computed,
            new_removed: self.new_removed,
            new_extra: codec::encode_value(&self.new_extra)?,
            requires_new: self.requires_new,
            sensitive: self.sensitive,
            diff_type: self.diff_type.code(),
        })
    }
}

impl FromWire for ResourceAttrDiff {
    type Wire = proto::ResourceAttrDiff;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        Ok(Self {
            old: wire.old,
            new: wire.new,
            new_computed: wire.new_computed,
            new_removed: wire.new_removed,
            new_extra: codec::decode_value(&wire.new_extra)?,
            requires_new: wire.requires_new,
            sensitive: wire.sensitive,
            diff_type: DiffAttrType::from_code(wire.diff_type)?,
        })
    }
}

impl ToWire for InstanceDiff {
    type Wire = proto::InstanceDiff;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        let attributes = self
            .attributes
            .as_ref()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(name, diff)| Ok((name.clone(), diff.to_wire()?)))
                    .collect::<Result<BTreeMap<_, _>, CodecError>>()
                    .map(|diffs| proto::AttrDiffMap { entries: diffs })
            })
            .transpose()?;

        Ok(proto::InstanceDiff {
            attributes,
            destroy: self.destroy,
            destroy_deposed: self.destroy_deposed,
            destroy_tainted: self.destroy_tainted,
            meta: codec::encode_value(&self.meta)?,
        })
    }
}

impl FromWire for InstanceDiff {
    type Wire = proto::InstanceDiff;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        let attributes = wire
            .attributes
            .map(|map| {
                map.entries
                    .into_iter()
                    .map(|(name, diff)| Ok((name, ResourceAttrDiff::from_wire(diff)?)))
                    .collect::<Result<BTreeMap<_, _>, CodecError>>()
            })
            .transpose()?;

        Ok(Self {
            attributes,
            destroy: wire.destroy,
            destroy_deposed: wire.destroy_deposed,
            destroy_tainted: wire.destroy_tainted,
            meta: codec::decode_value(&wire.meta)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Listings and prompts
// ---------------------------------------------------------------------------

impl ToWire for ResourceType {
    type Wire = proto::ResourceType;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        Ok(proto::ResourceType {
            name: self.name.clone(),
            importable: self.importable,
        })
    }
}

impl FromWire for ResourceType {
    type Wire = proto::ResourceType;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        Ok(Self {
            name: wire.name,
            importable: wire.importable,
        })
    }
}

impl ToWire for DataSource {
    type Wire = String;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        Ok(self.name.clone())
    }
}

impl FromWire for DataSource {
    type Wire = String;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        Ok(Self { name: wire })
    }
}

/// A prompt travels as an [`proto::InputResponse`] with no configuration.
impl ToWire for InputOpts {
    type Wire = proto::InputResponse;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        Ok(proto::InputResponse {
            id: self.id.clone(),
            query: self.query.clone(),
            description: self.description.clone(),
            default: self.default.clone(),
            resource_config: None,
        })
    }
}

impl FromWire for InputOpts {
    type Wire = proto::InputResponse;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        Ok(Self {
            id: wire.id,
            query: wire.query,
            description: wire.description,
            default: wire.default,
        })
    }
}

impl ToWire for ProviderSchemaRequest {
    type Wire = proto::GetSchemaRequest;

    fn to_wire(&self) -> Result<Self::Wire, CodecError> {
        Ok(proto::GetSchemaRequest {
            resource_types: self.resource_types.clone(),
            data_sources: self.data_sources.clone(),
        })
    }
}

impl FromWire for ProviderSchemaRequest {
    type Wire = proto::GetSchemaRequest;

    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError> {
        Ok(Self {
            resource_types: wire.resource_types,
            data_sources: wire.data_sources,
        })
    }
}

// ---------------------------------------------------------------------------
// Validation and schema documents
// ---------------------------------------------------------------------------

/// Flattens validation errors to their message text.
#[must_use]
pub fn validate_to_wire(result: &ValidateResult) -> proto::ValidateResponse {
    proto::ValidateResponse {
        warnings: result.warnings.clone(),
        errors: result.error_messages(),
    }
}

/// Rebuilds validation errors as plain message errors.
#[must_use]
pub fn validate_from_wire(wire: proto::ValidateResponse) -> ValidateResult {
    ValidateResult {
        warnings: wire.warnings,
        errors: wire.errors.into_iter().map(PluginError::message).collect(),
    }
}

/// Serialises the schema as one self-contained document.
///
/// # Errors
///
/// Returns [`PluginError::Schema`] if the schema cannot be serialised.
pub fn schema_to_wire(schema: &ProviderSchema) -> Result<proto::GetSchemaResponse, PluginError> {
    serde_json::to_vec(schema)
        .map(|document| proto::GetSchemaResponse { schema: document })
        .map_err(PluginError::schema)
}

/// Parses the schema document carried by a response.
///
/// # Errors
///
/// Returns [`PluginError::Schema`] if the document is not a valid schema.
pub fn schema_from_wire(wire: &proto::GetSchemaResponse) -> Result<ProviderSchema, PluginError> {
    serde_json::from_slice(&wire.schema).map_err(PluginError::schema)
}
