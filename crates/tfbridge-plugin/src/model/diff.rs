use std::collections::BTreeMap;

use serde_json::Value;

use crate::codec::CodecError;

/// How an attribute diff should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DiffAttrType {
    /// No type specified.
    #[default]
    Invalid,
    /// A plain attribute.
    Attribute,
    /// A block nested as a list.
    ListBlock,
}

impl DiffAttrType {
    /// Wire code for this tag.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Invalid => 0,
            Self::Attribute => 1,
            Self::ListBlock => 2,
        }
    }

    /// Looks a wire code up in the closed code table.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownDiffType`] for codes outside the table.
    pub fn from_code(code: i32) -> Result<Self, CodecError> {
        match code {
            0 => Ok(Self::Invalid),
            1 => Ok(Self::Attribute),
            2 => Ok(Self::ListBlock),
            _ => Err(CodecError::UnknownDiffType { code }),
        }
    }
}

/// Planned change to a single attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceAttrDiff {
    /// Current value.
    pub old: String,
    /// Planned value.
    pub new: String,
    /// The planned value is only known after apply.
    pub new_computed: bool,
    /// The attribute is being removed.
    pub new_removed: bool,
    /// Provider-specific extra data for the planned value.
    pub new_extra: Value,
    /// Changing this attribute forces replacement.
    pub requires_new: bool,
    /// Values must be hidden from output.
    pub sensitive: bool,
    /// Interpretation of the diff.
    pub diff_type: DiffAttrType,
}

impl ResourceAttrDiff {
    /// An in-place change from `old` to `new`.
    #[must_use]
    pub fn change(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
            diff_type: DiffAttrType::Attribute,
            ..Self::default()
        }
    }
}

/// Planned changes to one resource instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceDiff {
    /// Per-attribute changes.
    pub attributes: Option<BTreeMap<String, ResourceAttrDiff>>,
    /// The instance is being destroyed.
    pub destroy: bool,
    /// A deposed copy of the instance is being destroyed.
    pub destroy_deposed: bool,
    /// The instance is destroyed because it is tainted.
    pub destroy_tainted: bool,
    /// Provider metadata; `null` when unset.
    pub meta: Value,
}

impl InstanceDiff {
    /// Whether the diff changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let no_attributes = self
            .attributes
            .as_ref()
            .is_none_or(BTreeMap::is_empty);
        no_attributes && !self.destroy && !self.destroy_deposed && !self.destroy_tainted
    }

    /// Whether any attribute change forces replacement.
    #[must_use]
    pub fn requires_new(&self) -> bool {
        self.attributes
            .as_ref()
            .is_some_and(|attributes| attributes.values().any(|attr| attr.requires_new))
    }
}
