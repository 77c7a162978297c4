//! In-memory resource provider.
//!
//! `demo_file` resources are records keyed by their `path`; nothing touches
//! the filesystem. Changing `path` forces replacement, changing `content`
//! updates in place.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use tfbridge_plugin::model::schema::{Attribute, Block};
use tfbridge_plugin::{
    DataSource, InputOpts, InstanceDiff, InstanceInfo, InstanceState, PluginError,
    ProviderSchema, ProviderSchemaRequest, ResourceAttrDiff, ResourceConfig, ResourceProvider,
    ResourceType, UiInput, ValidateResult,
};

const PROVIDER_TARGET: &str = "tfbridge_demo_plugin::provider";

/// Resource type managed by the provider.
pub const FILE_RESOURCE: &str = "demo_file";
/// Data source offered by the provider.
pub const GREETING_SOURCE: &str = "demo_greeting";
/// Greeting used when the operator gives an empty answer.
pub const DEFAULT_GREETING: &str = "hello";

const PATH: &str = "path";
const CONTENT: &str = "content";
const GREETING: &str = "greeting";
const ID: &str = "id";

/// A provider whose resources live in process memory.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    greeting: Mutex<Option<String>>,
    files: Mutex<BTreeMap<String, InstanceState>>,
    stopped: AtomicBool,
}

fn poisoned() -> PluginError {
    PluginError::message("demo provider state lock poisoned")
}

fn string_value<'a>(config: &'a ResourceConfig, key: &str) -> Option<&'a str> {
    config.get(key).and_then(Value::as_str)
}

impl MemoryProvider {
    /// Whether the host has asked the provider to stop.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The greeting set by the last `configure` call.
    #[must_use]
    pub fn greeting(&self) -> Option<String> {
        self.greeting.lock().ok().and_then(|greeting| greeting.clone())
    }

    fn files(&self) -> Result<MutexGuard<'_, BTreeMap<String, InstanceState>>, PluginError> {
        self.files.lock().map_err(|_| poisoned())
    }

    fn schema() -> ProviderSchema {
        let provider = Block::default().with_attribute(GREETING, Attribute::optional("string"));
        let file = Block::default()
            .with_attribute(PATH, Attribute::required("string"))
            .with_attribute(CONTENT, Attribute::optional("string"))
            .with_attribute(ID, Attribute::computed("string"));
        let greeting = Block::default().with_attribute(GREETING, Attribute::computed("string"));
        ProviderSchema {
            provider: Some(provider),
            resource_types: BTreeMap::from([(String::from(FILE_RESOURCE), file)]),
            data_sources: BTreeMap::from([(String::from(GREETING_SOURCE), greeting)]),
        }
    }
}

fn plan_file(
    state: Option<&InstanceState>,
    config: &ResourceConfig,
) -> BTreeMap<String, ResourceAttrDiff> {
    let mut changes = BTreeMap::new();
    for key in [PATH, CONTENT] {
        let old = state
            .and_then(|prior| prior.attribute(key))
            .unwrap_or_default();
        if config.is_computed(key) {
            let unknown = ResourceAttrDiff {
                new_computed: true,
                requires_new: key == PATH && state.is_some(),
                ..ResourceAttrDiff::change(old, "")
            };
            changes.insert(key.to_owned(), unknown);
            continue;
        }
        let new = string_value(config, key).unwrap_or_default();
        if old != new {
            let change = ResourceAttrDiff {
                requires_new: key == PATH && state.is_some(),
                ..ResourceAttrDiff::change(old, new)
            };
            changes.insert(key.to_owned(), change);
        }
    }
    if state.is_none() {
        let id = ResourceAttrDiff {
            new_computed: true,
            ..ResourceAttrDiff::change("", "")
        };
        changes.insert(String::from(ID), id);
    }
    changes
}

fn applied_attributes(
    prior: Option<&InstanceState>,
    diff: &InstanceDiff,
) -> BTreeMap<String, String> {
    let mut attributes = prior
        .and_then(|state| state.attributes.clone())
        .unwrap_or_default();
    for (key, change) in diff.attributes.iter().flatten() {
        if change.new_removed {
            attributes.remove(key);
        } else if !change.new_computed {
            attributes.insert(key.clone(), change.new.clone());
        }
    }
    if let Some(path) = attributes.get(PATH).cloned() {
        attributes.insert(String::from(ID), path);
    }
    attributes
}

#[async_trait]
impl ResourceProvider for MemoryProvider {
    async fn get_schema(
        &self,
        request: &ProviderSchemaRequest,
    ) -> Result<ProviderSchema, PluginError> {
        Ok(Self::schema().filter(request))
    }

    async fn input(
        &self,
        ui: &dyn UiInput,
        config: &ResourceConfig,
    ) -> Result<ResourceConfig, PluginError> {
        if config.get(GREETING).is_some() || config.is_computed(GREETING) {
            return Ok(config.clone());
        }

        let opts = InputOpts {
            id: String::from(GREETING),
            query: String::from("Greeting to use"),
            description: String::from("Text returned by the demo_greeting data source."),
            default: String::from(DEFAULT_GREETING),
        };
        let reply = ui.input(&opts).await?;
        let greeting = if reply.is_empty() { opts.default } else { reply };
        debug!(target: PROVIDER_TARGET, %greeting, "operator supplied greeting");

        let mut completed = config.clone();
        for map in [&mut completed.raw, &mut completed.config] {
            map.get_or_insert_with(BTreeMap::new)
                .insert(String::from(GREETING), Value::String(greeting.clone()));
        }
        Ok(completed)
    }

    async fn validate(&self, config: &ResourceConfig) -> ValidateResult {
        if config.get(GREETING).is_some_and(|greeting| !greeting.is_string()) {
            return ValidateResult::from_error(PluginError::message("greeting must be a string"));
        }
        ValidateResult::ok()
    }

    async fn validate_resource(&self, type_name: &str, config: &ResourceConfig) -> ValidateResult {
        if type_name != FILE_RESOURCE {
            return ValidateResult::from_error(PluginError::message(format!(
                "unknown resource type {type_name}"
            )));
        }
        let mut result = ValidateResult::ok();
        if string_value(config, PATH).is_none() && !config.is_computed(PATH) {
            result.errors.push(PluginError::message("path is required"));
        }
        if config.get(CONTENT).is_some_and(|content| !content.is_string()) {
            result.errors.push(PluginError::message("content must be a string"));
        }
        if string_value(config, CONTENT).is_some_and(str::is_empty) {
            result.warnings.push(String::from("content is empty"));
        }
        result
    }

    async fn configure(&self, config: &ResourceConfig) -> Result<(), PluginError> {
        let greeting = string_value(config, GREETING).unwrap_or(DEFAULT_GREETING);
        *self.greeting.lock().map_err(|_| poisoned())? = Some(greeting.to_owned());
        debug!(target: PROVIDER_TARGET, greeting, "provider configured");
        Ok(())
    }

    async fn apply(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
        diff: Option<&InstanceDiff>,
    ) -> Result<Option<InstanceState>, PluginError> {
        let Some(planned) = diff else {
            return Ok(state.cloned());
        };
        let mut files = self.files()?;

        if planned.destroy {
            if let Some(prior) = state {
                files.remove(&prior.id);
            }
            debug!(target: PROVIDER_TARGET, instance = %info.id, "destroyed file");
            return Ok(None);
        }

        let attributes = applied_attributes(state, planned);
        let Some(path) = attributes.get(PATH).cloned() else {
            return Err(PluginError::message("path is required"));
        };
        if let Some(prior) = state.filter(|prior| prior.id != path) {
            files.remove(&prior.id);
        }
        let applied = InstanceState {
            meta: planned.meta.clone(),
            ..InstanceState::new(path.clone(), attributes)
        };
        files.insert(path, applied.clone());
        debug!(target: PROVIDER_TARGET, instance = %info.id, id = %applied.id, "applied file");
        Ok(Some(applied))
    }

    async fn diff(
        &self,
        _info: &InstanceInfo,
        state: Option<&InstanceState>,
        config: &ResourceConfig,
    ) -> Result<Option<InstanceDiff>, PluginError> {
        let changes = plan_file(state, config);
        if changes.is_empty() {
            return Ok(None);
        }
        Ok(Some(InstanceDiff {
            attributes: Some(changes),
            ..InstanceDiff::default()
        }))
    }

    async fn refresh(
        &self,
        _info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<Option<InstanceState>, PluginError> {
        let Some(prior) = state else {
            return Ok(None);
        };
        Ok(self.files()?.get(&prior.id).cloned())
    }

    async fn import_state(
        &self,
        _info: &InstanceInfo,
        id: &str,
    ) -> Result<Vec<InstanceState>, PluginError> {
        Ok(self.files()?.get(id).cloned().into_iter().collect())
    }

    async fn resources(&self) -> Result<Vec<ResourceType>, PluginError> {
        Ok(vec![ResourceType {
            name: String::from(FILE_RESOURCE),
            importable: true,
        }])
    }

    async fn validate_data_source(
        &self,
        type_name: &str,
        _config: &ResourceConfig,
    ) -> ValidateResult {
        if type_name == GREETING_SOURCE {
            ValidateResult::ok()
        } else {
            ValidateResult::from_error(PluginError::message(format!(
                "unknown data source {type_name}"
            )))
        }
    }

    async fn read_data_diff(
        &self,
        _info: &InstanceInfo,
        _config: &ResourceConfig,
    ) -> Result<Option<InstanceDiff>, PluginError> {
        let greeting = ResourceAttrDiff {
            new_computed: true,
            ..ResourceAttrDiff::change("", "")
        };
        Ok(Some(InstanceDiff {
            attributes: Some(BTreeMap::from([(String::from(GREETING), greeting)])),
            ..InstanceDiff::default()
        }))
    }

    async fn read_data_apply(
        &self,
        info: &InstanceInfo,
        _diff: Option<&InstanceDiff>,
    ) -> Result<Option<InstanceState>, PluginError> {
        let greeting = self
            .greeting()
            .unwrap_or_else(|| String::from(DEFAULT_GREETING));
        let attributes = BTreeMap::from([(String::from(GREETING), greeting)]);
        Ok(Some(InstanceState::new(info.id.clone(), attributes)))
    }

    async fn data_sources(&self) -> Result<Vec<DataSource>, PluginError> {
        Ok(vec![DataSource {
            name: String::from(GREETING_SOURCE),
        }])
    }

    async fn stop(&self) -> Result<(), PluginError> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}
