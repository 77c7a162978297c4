//! Test doubles and an in-process loopback server.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mockall::mock;
use serde_json::json;
use tfbridge_config::SocketEndpoint;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tonic::transport::Channel;

use crate::client::{GrpcResourceProvider, GrpcResourceProvisioner};
use crate::error::PluginError;
use crate::interface::{ResourceProvider, ResourceProvisioner, UiInput, UiOutput};
use crate::model::schema::{Attribute, Block};
use crate::model::{
    DataSource, InputOpts, InstanceDiff, InstanceInfo, InstanceState, ProviderSchema,
    ProviderSchemaRequest, ResourceAttrDiff, ResourceConfig, ResourceType, ValidateResult,
};
use crate::transport::{Listener, PluginServices, connect};

pub(crate) const LIMIT: usize = 1024 * 1024;

mock! {
    pub Operator {}

    #[async_trait]
    impl UiInput for Operator {
        async fn input(&self, opts: &InputOpts) -> Result<String, PluginError>;
    }
}

mock! {
    pub Console {}

    impl UiOutput for Console {
        fn output(&self, message: &str);
    }
}

pub(crate) fn prompt(id: &str) -> InputOpts {
    InputOpts {
        id: id.to_owned(),
        query: format!("Value for {id}?"),
        description: format!("The {id} to deploy into"),
        default: String::new(),
    }
}

pub(crate) fn region_config() -> ResourceConfig {
    ResourceConfig::new(BTreeMap::from([(String::from("region"), json!("eu-west-1"))]))
}

// ---------------------------------------------------------------------------
// Operator-facing doubles that record what they saw
// ---------------------------------------------------------------------------

/// Answers prompts from a fixed list and records each prompt id.
#[derive(Default)]
pub(crate) struct ScriptedOperator {
    replies: Mutex<Vec<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub(crate) fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|reply| (*reply).to_owned()).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn asked(&self) -> Vec<String> {
        self.asked.lock().expect("asked lock").clone()
    }
}

#[async_trait]
impl UiInput for ScriptedOperator {
    async fn input(&self, opts: &InputOpts) -> Result<String, PluginError> {
        self.asked.lock().expect("asked lock").push(opts.id.clone());
        self.replies
            .lock()
            .expect("replies lock")
            .pop()
            .ok_or_else(|| PluginError::message("operator has no answer"))
    }
}

/// Collects provisioner output in arrival order.
#[derive(Default)]
pub(crate) struct RecordingConsole {
    lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("lines lock").clone()
    }
}

impl UiOutput for RecordingConsole {
    fn output(&self, message: &str) {
        self.lines.lock().expect("lines lock").push(message.to_owned());
    }
}

// ---------------------------------------------------------------------------
// Local implementations served by the loopback server
// ---------------------------------------------------------------------------

/// How the fake provider's input exchange ends.
#[derive(Debug, Clone, Default)]
pub(crate) enum InputEnding {
    /// Return the configuration with every reply filled in.
    #[default]
    Complete,
    /// Fail with this error after the prompts.
    Fail(PluginError),
    /// Kill the exchange task without a final message.
    Vanish,
}

/// An in-memory provider with scripted behaviour.
#[derive(Default)]
pub(crate) struct FakeProvider {
    pub(crate) prompts: Vec<InputOpts>,
    pub(crate) input_ending: InputEnding,
    pub(crate) import_count: usize,
    pub(crate) configure_error: Option<PluginError>,
    pub(crate) configured: Mutex<Option<ResourceConfig>>,
    pub(crate) stops: AtomicUsize,
}

fn vanish() -> ! {
    panic!("input exchange task aborted by test");
}

impl FakeProvider {
    pub(crate) fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    fn schema() -> ProviderSchema {
        let provider = Block::default().with_attribute("region", Attribute::required("string"));
        let instance = Block::default()
            .with_attribute("ami", Attribute::required("string"))
            .with_attribute("id", Attribute::computed("string"));
        let bucket = Block::default().with_attribute("name", Attribute::required("string"));
        ProviderSchema {
            provider: Some(provider),
            resource_types: BTreeMap::from([
                (String::from("fake_instance"), instance),
                (String::from("fake_bucket"), bucket),
            ]),
            data_sources: BTreeMap::from([(String::from("fake_ami"), Block::default())]),
        }
    }
}

#[async_trait]
impl ResourceProvider for FakeProvider {
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
        let mut completed = config.clone();
        for opts in &self.prompts {
            let reply = ui.input(opts).await?;
            completed
                .config
                .get_or_insert_with(BTreeMap::new)
                .insert(opts.id.clone(), json!(reply));
        }
        match &self.input_ending {
            InputEnding::Complete => Ok(completed),
            InputEnding::Fail(error) => Err(error.clone()),
            InputEnding::Vanish => vanish(),
        }
    }

    async fn validate(&self, config: &ResourceConfig) -> ValidateResult {
        let mut result = ValidateResult::ok();
        if config.get("region").is_none() {
            result.errors.push(PluginError::message("region is required"));
        }
        if config.get("legacy_auth").is_some() {
            result.warnings.push(String::from("legacy_auth is deprecated"));
        }
        result
    }

    async fn validate_resource(&self, type_name: &str, _config: &ResourceConfig) -> ValidateResult {
        if type_name.starts_with("fake_") {
            ValidateResult::ok()
        } else {
            ValidateResult::from_error(PluginError::message(format!(
                "unknown resource type {type_name}"
            )))
        }
    }

    async fn configure(&self, config: &ResourceConfig) -> Result<(), PluginError> {
        if let Some(error) = &self.configure_error {
            return Err(error.clone());
        }
        *self.configured.lock().expect("configured lock") = Some(config.clone());
        Ok(())
    }

    async fn apply(
        &self,
        info: &InstanceInfo,
        _state: Option<&InstanceState>,
        diff: Option<&InstanceDiff>,
    ) -> Result<Option<InstanceState>, PluginError> {
        let Some(planned) = diff.filter(|candidate| !candidate.destroy) else {
            return Ok(None);
        };
        let attributes = planned
            .attributes
            .iter()
            .flatten()
            .map(|(name, change)| (name.clone(), change.new.clone()))
            .collect();
        Ok(Some(InstanceState {
            meta: planned.meta.clone(),
            ..InstanceState::new(format!("{}-1", info.type_name), attributes)
        }))
    }

    async fn diff(
        &self,
        _info: &InstanceInfo,
        state: Option<&InstanceState>,
        config: &ResourceConfig,
    ) -> Result<Option<InstanceDiff>, PluginError> {
        let wanted = config
            .get("ami")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        let current = state
            .and_then(|prior| prior.attribute("ami"))
            .unwrap_or_default();
        if wanted == current {
            return Ok(None);
        }
        let change = ResourceAttrDiff {
            requires_new: true,
            ..ResourceAttrDiff::change(current, wanted)
        };
        Ok(Some(InstanceDiff {
            attributes: Some(BTreeMap::from([(String::from("ami"), change)])),
            ..InstanceDiff::default()
        }))
    }

    async fn refresh(
        &self,
        _info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<Option<InstanceState>, PluginError> {
        Ok(state.filter(|prior| !prior.tainted).cloned())
    }

    async fn import_state(
        &self,
        info: &InstanceInfo,
        id: &str,
    ) -> Result<Vec<InstanceState>, PluginError> {
        Ok((0..self.import_count)
            .map(|index| {
                let attributes = BTreeMap::from([(String::from("type"), info.type_name.clone())]);
                InstanceState::new(format!("{id}-{index}"), attributes)
            })
            .collect())
    }

    async fn resources(&self) -> Result<Vec<ResourceType>, PluginError> {
        Ok(vec![
            ResourceType {
                name: String::from("fake_instance"),
                importable: true,
            },
            ResourceType {
                name: String::from("fake_bucket"),
                importable: false,
            },
        ])
    }

    async fn validate_data_source(
        &self,
        type_name: &str,
        _config: &ResourceConfig,
    ) -> ValidateResult {
        if type_name == "fake_ami" {
            ValidateResult::ok()
        } else {
            ValidateResult::from_error(PluginError::message("unknown data source"))
        }
    }

    async fn read_data_diff(
        &self,
        _info: &InstanceInfo,
        _config: &ResourceConfig,
    ) -> Result<Option<InstanceDiff>, PluginError> {
        let image = ResourceAttrDiff {
            new_computed: true,
            ..ResourceAttrDiff::change("", "")
        };
        Ok(Some(InstanceDiff {
            attributes: Some(BTreeMap::from([(String::from("image_id"), image)])),
            ..InstanceDiff::default()
        }))
    }

    async fn read_data_apply(
        &self,
        info: &InstanceInfo,
        diff: Option<&InstanceDiff>,
    ) -> Result<Option<InstanceState>, PluginError> {
        Ok(diff.map(|_| {
            let attributes = BTreeMap::from([(String::from("image_id"), String::from("ami-42"))]);
            InstanceState::new(info.id.clone(), attributes)
        }))
    }

    async fn data_sources(&self) -> Result<Vec<DataSource>, PluginError> {
        Ok(vec![DataSource {
            name: String::from("fake_ami"),
        }])
    }

    async fn stop(&self) -> Result<(), PluginError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A provisioner that emits fixed lines and then succeeds or fails.
#[derive(Default)]
pub(crate) struct ScriptedProvisioner {
    pub(crate) lines: Vec<String>,
    pub(crate) failure: Option<PluginError>,
}

#[async_trait]
impl ResourceProvisioner for ScriptedProvisioner {
    async fn validate(&self, config: &ResourceConfig) -> ValidateResult {
        if config.get("command").is_some() {
            ValidateResult::ok()
        } else {
            ValidateResult::from_error(PluginError::message("command is required"))
        }
    }

    async fn apply(
        &self,
        output: &dyn UiOutput,
        _state: Option<&InstanceState>,
        _config: &ResourceConfig,
    ) -> Result<(), PluginError> {
        for line in &self.lines {
            output.output(line);
        }
        self.failure.clone().map_or(Ok(()), Err)
    }

    async fn stop(&self) -> Result<(), PluginError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loopback server
// ---------------------------------------------------------------------------

/// Plugin services running on `127.0.0.1` with an OS-assigned port.
pub(crate) struct Loopback {
    pub(crate) endpoint: SocketEndpoint,
    channel: Channel,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<Result<(), PluginError>>,
}

impl Loopback {
    pub(crate) async fn start(services: PluginServices) -> Self {
        let listener = Listener::bind(&SocketEndpoint::tcp("127.0.0.1", 0))
            .await
            .expect("bind loopback listener");
        let endpoint = listener.local_endpoint().expect("loopback endpoint");
        let (shutdown, signal) = oneshot::channel::<()>();
        let server = tokio::spawn(services.serve(listener, async move {
            signal.await.ok();
        }));
        let channel = connect(&endpoint).await.expect("connect to loopback");
        Self {
            endpoint,
            channel,
            shutdown: Some(shutdown),
            server,
        }
    }

    pub(crate) fn channel(&self) -> Channel {
        self.channel.clone()
    }

    pub(crate) fn provider(&self) -> GrpcResourceProvider {
        GrpcResourceProvider::new(self.channel(), LIMIT)
    }

    pub(crate) fn provisioner(&self) -> GrpcResourceProvisioner {
        GrpcResourceProvisioner::new(self.channel(), LIMIT)
    }
}

impl Drop for Loopback {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        self.server.abort();
    }
}
