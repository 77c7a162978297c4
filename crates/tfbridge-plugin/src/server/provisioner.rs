//! Plugin-side provisioner adapter.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tonic::{Request, Response, Status};
use tracing::debug;

use super::output::StreamOutput;
use super::{SERVER_TARGET, dispatching};
use crate::interface::ResourceProvisioner;
use crate::model::{InstanceState, ResourceConfig};
use crate::proto::{
    self,
    provisioner_server::{Provisioner, ProvisionerServer},
};
use crate::translate::{from_required, from_wire_opt, validate_to_wire};

/// Serves a local [`ResourceProvisioner`] as the `Provisioner` service.
#[derive(Clone)]
pub struct GrpcResourceProvisionerServer {
    provisioner: Arc<dyn ResourceProvisioner>,
    max_message_bytes: usize,
}

impl GrpcResourceProvisionerServer {
    /// Wraps `provisioner`. `max_message_bytes` bounds every message sent or
    /// received.
    #[must_use]
    pub const fn new(
        provisioner: Arc<dyn ResourceProvisioner>,
        max_message_bytes: usize,
    ) -> Self {
        Self {
            provisioner,
            max_message_bytes,
        }
    }

    /// Builds the tonic service.
    #[must_use]
    pub fn into_service(self) -> ProvisionerServer<Self> {
        let limit = self.max_message_bytes;
        ProvisionerServer::new(self)
            .max_decoding_message_size(limit)
            .max_encoding_message_size(limit)
    }
}

#[tonic::async_trait]
impl Provisioner for GrpcResourceProvisionerServer {
    type ApplyStream = UnboundedReceiverStream<Result<proto::UiOutput, Status>>;

    async fn validate(
        &self,
        request: Request<proto::ValidateRequest>,
    ) -> Result<Response<proto::ValidateResponse>, Status> {
        dispatching("provisioner", "validate");
        let config: ResourceConfig = from_required(request.into_inner().config, "config")?;
        let result = self.provisioner.validate(&config).await;
        Ok(Response::new(validate_to_wire(&result)))
    }

    /// Streams each progress message as it is produced. A failed apply ends
    /// the stream with its status instead of a final item.
    async fn apply(
        &self,
        request: Request<proto::ProvisionerApplyRequest>,
    ) -> Result<Response<Self::ApplyStream>, Status> {
        dispatching("provisioner", "apply");
        let wire = request.into_inner();
        let state: Option<InstanceState> = from_wire_opt(wire.state)?;
        let config: ResourceConfig = from_required(wire.config, "config")?;

        let (outbound, responses) = mpsc::unbounded_channel();
        let provisioner = Arc::clone(&self.provisioner);
        tokio::spawn(async move {
            let output = StreamOutput::new(outbound.clone());
            let outcome = provisioner.apply(&output, state.as_ref(), &config).await;
            drop(output);
            if let Err(error) = outcome {
                debug!(target: SERVER_TARGET, %error, "provisioner apply failed");
                if outbound.send(Err(error.into())).is_err() {
                    debug!(target: SERVER_TARGET, "host left before the apply error was delivered");
                }
            }
        });

        Ok(Response::new(UnboundedReceiverStream::new(responses)))
    }

    async fn stop(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::Empty>, Status> {
        dispatching("provisioner", "stop");
        self.provisioner.stop().await?;
        Ok(Response::new(proto::Empty {}))
    }
}
