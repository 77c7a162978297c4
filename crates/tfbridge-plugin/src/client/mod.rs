//! Host-side adapters that implement the collaborator traits over RPC.
//!
//! Each uniform method translates its arguments, makes one call, classifies
//! any failure and translates the response back. The adapters hold a
//! generated client behind a lock only so [`GrpcResourceProvider::close`]
//! can take it away; calls clone the client out and never hold the lock
//! across the network.

mod input;
mod provisioner;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tonic::transport::Channel;
use tracing::debug;

use crate::classify::classify_result;
use crate::error::PluginError;
use crate::interface::{ResourceProvider, UiInput};
use crate::model::{
    DataSource, InstanceDiff, InstanceInfo, InstanceState, ProviderSchema, ProviderSchemaRequest,
    ResourceConfig, ResourceType, ValidateResult,
};
use crate::proto::{self, provider_client::ProviderClient};
use crate::translate::{
    ToWire, from_wire_all, from_wire_opt, schema_from_wire, to_wire_opt, validate_from_wire,
};

pub use self::provisioner::GrpcResourceProvisioner;

pub(crate) const CLIENT_TARGET: &str = "tfbridge_plugin::client";

/// A [`ResourceProvider`] backed by a plugin process.
#[derive(Debug)]
pub struct GrpcResourceProvider {
    client: RwLock<Option<ProviderClient<Channel>>>,
}

impl GrpcResourceProvider {
    /// Wraps a connected channel. `max_message_bytes` bounds every message
    /// sent or received.
    #[must_use]
    pub fn new(channel: Channel, max_message_bytes: usize) -> Self {
        let client = ProviderClient::new(channel)
            .max_decoding_message_size(max_message_bytes)
            .max_encoding_message_size(max_message_bytes);
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    /// Tears the connection down. Later calls fail with
    /// [`PluginError::Closed`]; closing twice is harmless.
    pub async fn close(&self) {
        if self.client.write().await.take().is_some() {
            debug!(target: CLIENT_TARGET, service = "provider", "closed plugin connection");
        }
    }

    async fn client(&self, method: &'static str) -> Result<ProviderClient<Channel>, PluginError> {
        let client = self.client.read().await.clone().ok_or(PluginError::Closed)?;
        debug!(target: CLIENT_TARGET, service = "provider", method, "calling plugin");
        Ok(client)
    }

    async fn validate_call<F, Fut>(&self, method: &'static str, call: F) -> ValidateResult
    where
        F: FnOnce(ProviderClient<Channel>) -> Fut + Send,
        Fut: Future<Output = Result<tonic::Response<proto::ValidateResponse>, tonic::Status>>
            + Send,
    {
        let outcome = match self.client(method).await {
            Ok(client) => classify_result(call(client).await),
            Err(error) => Err(error),
        };
        outcome.map_or_else(ValidateResult::from_error, |response| {
            validate_from_wire(response.into_inner())
        })
    }
}

#[async_trait]
impl ResourceProvider for GrpcResourceProvider {
    async fn get_schema(
        &self,
        request: &ProviderSchemaRequest,
    ) -> Result<ProviderSchema, PluginError> {
        let wire = request.to_wire()?;
        let mut client = self.client("get_schema").await?;
        let response = classify_result(client.get_schema(wire).await)?.into_inner();
        schema_from_wire(&response)
    }

    async fn input(
        &self,
        ui: &dyn UiInput,
        config: &ResourceConfig,
    ) -> Result<ResourceConfig, PluginError> {
        let client = self.client("input").await?;
        input::exchange(client, ui, config).await
    }

    async fn validate(&self, config: &ResourceConfig) -> ValidateResult {
        let request = match config.to_wire() {
            Ok(wire) => proto::ValidateRequest { config: Some(wire) },
            Err(error) => return ValidateResult::from_error(error.into()),
        };
        self.validate_call("validate", |mut client| async move {
            client.validate(request).await
        })
        .await
    }

    async fn validate_resource(&self, type_name: &str, config: &ResourceConfig) -> ValidateResult {
        let request = match config.to_wire() {
            Ok(wire) => proto::ValidateResourceRequest {
                type_name: type_name.to_owned(),
                config: Some(wire),
            },
            Err(error) => return ValidateResult::from_error(error.into()),
        };
        self.validate_call("validate_resource", |mut client| async move {
            client.validate_resource(request).await
        })
        .await
    }

    async fn configure(&self, config: &ResourceConfig) -> Result<(), PluginError> {
        let request = proto::ConfigureRequest {
            resource_config: Some(config.to_wire()?),
        };
        let mut client = self.client("configure").await?;
        classify_result(client.configure(request).await)?;
        Ok(())
    }

    async fn apply(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
        diff: Option<&InstanceDiff>,
    ) -> Result<Option<InstanceState>, PluginError> {
        let request = proto::ApplyRequest {
            info: Some(info.to_wire()?),
            state: to_wire_opt(state)?,
            diff: to_wire_opt(diff)?,
        };
        let mut client = self.client("apply").await?;
        let response = classify_result(client.apply(request).await)?.into_inner();
        Ok(from_wire_opt(response.state)?)
    }

    async fn diff(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
        config: &ResourceConfig,
    ) -> Result<Option<InstanceDiff>, PluginError> {
        let request = proto::DiffRequest {
            info: Some(info.to_wire()?),
            state: to_wire_opt(state)?,
            config: Some(config.to_wire()?),
        };
        let mut client = self.client("diff").await?;
        let response = classify_result(client.diff(request).await)?.into_inner();
        Ok(from_wire_opt(response.diff)?)
    }

    async fn refresh(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<Option<InstanceState>, PluginError> {
        let request = proto::RefreshRequest {
            info: Some(info.to_wire()?),
            state: to_wire_opt(state)?,
        };
        let mut client = self.client("refresh").await?;
        let response = classify_result(client.refresh(request).await)?.into_inner();
        Ok(from_wire_opt(response.state)?)
    }

    async fn import_state(
        &self,
        info: &InstanceInfo,
        id: &str,
    ) -> Result<Vec<InstanceState>, PluginError> {
        let request = proto::ImportStateRequest {
            info: Some(info.to_wire()?),
            id: id.to_owned(),
        };
        let mut client = self.client("import_state").await?;
        let response = classify_result(client.import_state(request).await)?.into_inner();
        Ok(from_wire_all(response.state)?)
    }

    async fn resources(&self) -> Result<Vec<ResourceType>, PluginError> {
        let mut client = self.client("resources").await?;
        let response = classify_result(client.resources(proto::Empty {}).await)?.into_inner();
        Ok(from_wire_all(response.resources)?)
    }

    async fn validate_data_source(
        &self,
        type_name: &str,
        config: &ResourceConfig,
    ) -> ValidateResult {
        let request = match config.to_wire() {
            Ok(wire) => proto::ValidateDataSourceRequest {
                type_name: type_name.to_owned(),
                config: Some(wire),
            },
            Err(error) => return ValidateResult::from_error(error.into()),
        };
        self.validate_call("validate_data_source", |mut client| async move {
            client.validate_data_source(request).await
        })
        .await
    }

    async fn read_data_diff(
        &self,
        info: &InstanceInfo,
        config: &ResourceConfig,
    ) -> Result<Option<InstanceDiff>, PluginError> {
        let request = proto::ReadDataDiffRequest {
            info: Some(info.to_wire()?),
            config: Some(config.to_wire()?),
        };
        let mut client = self.client("read_data_diff").await?;
        let response = classify_result(client.read_data_diff(request).await)?.into_inner();
        Ok(from_wire_opt(response.diff)?)
    }

    async fn read_data_apply(
        &self,
        info: &InstanceInfo,
        diff: Option<&InstanceDiff>,
    ) -> Result<Option<InstanceState>, PluginError> {
        let request = proto::ReadDataApplyRequest {
            info: Some(info.to_wire()?),
            diff: to_wire_opt(diff)?,
        };
        let mut client = self.client("read_data_apply").await?;
        let response = classify_result(client.read_data_apply(request).await)?.into_inner();
        Ok(from_wire_opt(response.state)?)
    }

    async fn data_sources(&self) -> Result<Vec<DataSource>, PluginError> {
        let mut client = self.client("data_sources").await?;
        let response = classify_result(client.data_sources(proto::Empty {}).await)?.into_inner();
        Ok(from_wire_all(response.data_sources)?)
    }

    async fn stop(&self) -> Result<(), PluginError> {
        let mut client = self.client("stop").await?;
        classify_result(client.stop(proto::Empty {}).await)?;
        Ok(())
    }
}
