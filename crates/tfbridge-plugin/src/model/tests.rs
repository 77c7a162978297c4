//! Unit tests for host-native records.

use std::collections::BTreeMap;

use rstest::rstest;
use serde_json::json;

use super::schema::{Attribute, Block, NestedBlock, NestingMode};
use super::*;
use crate::codec::CodecError;

fn config_map(entries: &[(&str, serde_json::Value)]) -> ConfigMap {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_owned(), value.clone()))
        .collect()
}

#[test]
fn resource_config_lookups_use_interpolated_values() {
    let mut config = ResourceConfig::new(config_map(&[("region", json!("eu-west-1"))]));
    config.computed_keys.push(String::from("arn"));

    assert_eq!(config.get("region"), Some(&json!("eu-west-1")));
    assert!(config.get("missing").is_none());
    assert!(config.is_computed("arn"));
    assert!(!config.is_computed("region"));
}

#[test]
fn instance_info_defaults_to_root_module() {
    let info = InstanceInfo::new("aws_instance.web", "aws_instance");
    assert_eq!(info.module_path, vec![String::from("root")]);

    let nested = info.with_module_path(vec!["root".into(), "network".into()]);
    assert_eq!(nested.module_path.len(), 2);
}

#[test]
fn instance_state_attribute_lookup() {
    let mut attributes = BTreeMap::new();
    attributes.insert(String::from("ami"), String::from("ami-123"));
    let state = InstanceState::new("i-abc", attributes);

    assert_eq!(state.attribute("ami"), Some("ami-123"));
    assert_eq!(state.attribute("size"), None);
    assert_eq!(InstanceState::default().attribute("ami"), None);
}

#[rstest]
#[case(DiffAttrType::Invalid, 0)]
#[case(DiffAttrType::Attribute, 1)]
#[case(DiffAttrType::ListBlock, 2)]
fn diff_type_codes_are_stable(#[case] tag: DiffAttrType, #[case] code: i32) {
    assert_eq!(tag.code(), code);
    assert_eq!(DiffAttrType::from_code(code).expect("known code"), tag);
}

#[rstest]
#[case(-1)]
#[case(3)]
#[case(i32::MAX)]
fn out_of_range_diff_type_codes_are_rejected(#[case] code: i32) {
    let error = DiffAttrType::from_code(code).expect_err("unknown code");
    assert!(matches!(error, CodecError::UnknownDiffType { code: found } if found == code));
}

#[test]
fn instance_diff_emptiness() {
    assert!(InstanceDiff::default().is_empty());

    let mut attributes = BTreeMap::new();
    attributes.insert(String::from("ami"), ResourceAttrDiff::change("a", "b"));
    let diff = InstanceDiff {
        attributes: Some(attributes),
        ..InstanceDiff::default()
    };
    assert!(!diff.is_empty());
    assert!(!diff.requires_new());

    let destroy = InstanceDiff {
        destroy: true,
        ..InstanceDiff::default()
    };
    assert!(!destroy.is_empty());
}

#[test]
fn validate_result_reports_error_text() {
    let result = ValidateResult::from_error(PluginError::message("name is required"));
    assert!(!result.is_valid());
    assert_eq!(result.error_messages(), vec![String::from("name is required")]);
    assert!(ValidateResult::ok().is_valid());
}

#[test]
fn schema_filter_keeps_requested_names_and_provider() {
    let block = Block::default().with_attribute("name", Attribute::required("string"));
    let schema = ProviderSchema {
        provider: Some(Block::default()),
        resource_types: [
            (String::from("memory_item"), block.clone()),
            (String::from("memory_bucket"), block.clone()),
        ]
        .into_iter()
        .collect(),
        data_sources: [(String::from("memory_lookup"), block)].into_iter().collect(),
    };

    let request = ProviderSchemaRequest {
        resource_types: vec![String::from("memory_item")],
        data_sources: Vec::new(),
    };
    let filtered = schema.filter(&request);

    assert!(filtered.provider.is_some());
    assert_eq!(
        filtered.resource_types.keys().collect::<Vec<_>>(),
        vec!["memory_item"]
    );
    assert!(filtered.data_sources.is_empty());
}

#[test]
fn schema_document_uses_stable_field_names() {
    let block = Block::default()
        .with_attribute("id", Attribute::computed("string"))
        .with_block(
            "rule",
            NestedBlock {
                block: Block::default().with_attribute("port", Attribute::optional("number")),
                nesting: NestingMode::List,
                min_items: 0,
                max_items: 4,
            },
        );
    let document = serde_json::to_value(&block).expect("serialise");

    assert_eq!(document["attributes"]["id"]["type"], json!("string"));
    assert_eq!(document["attributes"]["id"]["computed"], json!(true));
    assert_eq!(document["block_types"]["rule"]["nesting"], json!("list"));
}
