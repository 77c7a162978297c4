//! Host-side provisioner adapter.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tonic::transport::Channel;
use tracing::debug;

use super::CLIENT_TARGET;
use crate::classify::classify_result;
use crate::error::PluginError;
use crate::interface::{ResourceProvisioner, UiOutput};
use crate::model::{InstanceState, ResourceConfig, ValidateResult};
use crate::proto::{self, provisioner_client::ProvisionerClient};
use crate::translate::{ToWire, to_wire_opt, validate_from_wire};

/// A [`ResourceProvisioner`] backed by a plugin process.
#[derive(Debug)]
pub struct GrpcResourceProvisioner {
    client: RwLock<Option<ProvisionerClient<Channel>>>,
}

impl GrpcResourceProvisioner {
    /// Wraps a connected channel. `max_message_bytes` bounds every message
    /// sent or received.
    #[must_use]
    pub fn new(channel: Channel, max_message_bytes: usize) -> Self {
        let client = ProvisionerClient::new(channel)
            .max_decoding_message_size(max_message_bytes)
            .max_encoding_message_size(max_message_bytes);
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    /// Tears the connection down. Later calls fail with
    /// [`PluginError::Closed`].
    pub async fn close(&self) {
        if self.client.write().await.take().is_some() {
            debug!(target: CLIENT_TARGET, service = "provisioner", "closed plugin connection");
        }
    }

    async fn client(
        &self,
        method: &'static str,
    ) -> Result<ProvisionerClient<Channel>, PluginError> {
        let client = self.client.read().await.clone().ok_or(PluginError::Closed)?;
        debug!(target: CLIENT_TARGET, service = "provisioner", method, "calling plugin");
        Ok(client)
    }

    async fn request_validation(
        &self,
        config: &ResourceConfig,
    ) -> Result<proto::ValidateResponse, PluginError> {
        let request = proto::ValidateRequest {
            config: Some(config.to_wire()?),
        };
        let mut client = self.client("validate").await?;
        Ok(classify_result(client.validate(request).await)?.into_inner())
    }
}

#[async_trait]
impl ResourceProvisioner for GrpcResourceProvisioner {
    async fn validate(&self, config: &ResourceConfig) -> ValidateResult {
        self.request_validation(config)
            .await
            .map_or_else(ValidateResult::from_error, validate_from_wire)
    }

    /// Forwards each streamed message to `output` as it arrives. A stream
    /// that closes cleanly is success; one that ends with a status is that
    /// status, classified.
    async fn apply(
        &self,
        output: &dyn UiOutput,
        state: Option<&InstanceState>,
        config: &ResourceConfig,
    ) -> Result<(), PluginError> {
        let request = proto::ProvisionerApplyRequest {
            state: to_wire_opt(state)?,
            config: Some(config.to_wire()?),
        };
        let mut client = self.client("apply").await?;
        let mut stream = classify_result(client.apply(request).await)?.into_inner();

        let mut delivered = 0_usize;
        while let Some(message) = classify_result(stream.message().await)? {
            output.output(&message.message);
            delivered += 1;
        }
        debug!(target: CLIENT_TARGET, delivered, "provisioner output stream completed");
        Ok(())
    }

    async fn stop(&self) -> Result<(), PluginError> {
        let mut client = self.client("stop").await?;
        classify_result(client.stop(proto::Empty {}).await)?;
        Ok(())
    }
}
