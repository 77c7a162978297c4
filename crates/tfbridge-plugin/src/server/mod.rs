//! Plugin-side adapters that serve local implementations over RPC.
//!
//! Each handler decodes its request, calls the local implementation and
//! encodes the result. Instance info and configuration are required; a
//! request without them is rejected with `InvalidArgument` before the
//! implementation is touched.

mod input;
mod output;
mod provisioner;

use std::sync::Arc;

use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::debug;

use crate::interface::ResourceProvider;
use crate::model::{
    InstanceDiff, InstanceInfo, InstanceState, ProviderSchemaRequest, ResourceConfig,
};
use crate::proto::{
    self,
    provider_server::{Provider, ProviderServer},
};
use crate::translate::{
    FromWire, from_required, from_wire_opt, schema_to_wire, to_wire_all, to_wire_opt,
    validate_to_wire,
};

pub use self::provisioner::GrpcResourceProvisionerServer;

pub(crate) const SERVER_TARGET: &str = "tfbridge_plugin::server";

fn dispatching(service: &'static str, method: &'static str) {
    debug!(target: SERVER_TARGET, service, method, "dispatching request");
}

/// Serves a local [`ResourceProvider`] as the `Provider` service.
#[derive(Clone)]
pub struct GrpcResourceProviderServer {
    provider: Arc<dyn ResourceProvider>,
    max_message_bytes: usize,
}

impl GrpcResourceProviderServer {
    /// Wraps `provider`. `max_message_bytes` bounds every message sent or
    /// received.
    #[must_use]
    pub const fn new(provider: Arc<dyn ResourceProvider>, max_message_bytes: usize) -> Self {
        Self {
            provider,
            max_message_bytes,
        }
    }

    /// Builds the tonic service.
    #[must_use]
    pub fn into_service(self) -> ProviderServer<Self> {
        let limit = self.max_message_bytes;
        ProviderServer::new(self)
            .max_decoding_message_size(limit)
            .max_encoding_message_size(limit)
    }
}

#[tonic::async_trait]
impl Provider for GrpcResourceProviderServer {
    type InputStream = ReceiverStream<Result<proto::InputResponse, Status>>;

    async fn stop(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::Empty>, Status> {
        dispatching("provider", "stop");
        self.provider.stop().await?;
        Ok(Response::new(proto::Empty {}))
    }

    async fn get_schema(
        &self,
        request: Request<proto::GetSchemaRequest>,
    ) -> Result<Response<proto::GetSchemaResponse>, Status> {
        dispatching("provider", "get_schema");
        let filter = ProviderSchemaRequest::from_wire(request.into_inner())?;
        let schema = self.provider.get_schema(&filter).await?;
        Ok(Response::new(schema_to_wire(&schema)?))
    }

    async fn input(
        &self,
        request: Request<Streaming<proto::InputRequest>>,
    ) -> Result<Response<Self::InputStream>, Status> {
        dispatching("provider", "input");
        let responses = input::spawn_exchange(Arc::clone(&self.provider), request.into_inner());
        Ok(Response::new(responses))
    }

    async fn validate(
        &self,
        request: Request<proto::ValidateRequest>,
    ) -> Result<Response<proto::ValidateResponse>, Status> {
        dispatching("provider", "validate");
        let config: ResourceConfig = from_required(request.into_inner().config, "config")?;
        let result = self.provider.validate(&config).await;
        Ok(Response::new(validate_to_wire(&result)))
    }

    async fn validate_resource(
        &self,
        request: Request<proto::ValidateResourceRequest>,
    ) -> Result<Response<proto::ValidateResponse>, Status> {
        dispatching("provider", "validate_resource");
        let wire = request.into_inner();
        let config: ResourceConfig = from_required(wire.config, "config")?;
        let result = self
            .provider
            .validate_resource(&wire.type_name, &config)
            .await;
        Ok(Response::new(validate_to_wire(&result)))
    }

    async fn configure(
        &self,
        request: Request<proto::ConfigureRequest>,
    ) -> Result<Response<proto::Empty>, Status> {
        dispatching("provider", "configure");
        let config: ResourceConfig =
            from_required(request.into_inner().resource_config, "resource_config")?;
        self.provider.configure(&config).await?;
        Ok(Response::new(proto::Empty {}))
    }

    async fn apply(
        &self,
        request: Request<proto::ApplyRequest>,
    ) -> Result<Response<proto::ApplyResponse>, Status> {
        dispatching("provider", "apply");
        let wire = request.into_inner();
        let info: InstanceInfo = from_required(wire.info, "info")?;
        let state: Option<InstanceState> = from_wire_opt(wire.state)?;
        let diff: Option<InstanceDiff> = from_wire_opt(wire.diff)?;
        let applied = self
            .provider
            .apply(&info, state.as_ref(), diff.as_ref())
            .await?;
        Ok(Response::new(proto::ApplyResponse {
            state: to_wire_opt(applied.as_ref())?,
        }))
    }

    async fn diff(
        &self,
        request: Request<proto::DiffRequest>,
    ) -> Result<Response<proto::DiffResponse>, Status> {
        dispatching("provider", "diff");
        let wire = request.into_inner();
        let info: InstanceInfo = from_required(wire.info, "info")?;
        let state: Option<InstanceState> = from_wire_opt(wire.state)?;
        let config: ResourceConfig = from_required(wire.config, "config")?;
        let planned = self.provider.diff(&info, state.as_ref(), &config).await?;
        Ok(Response::new(proto::DiffResponse {
            diff: to_wire_opt(planned.as_ref())?,
        }))
    }

    async fn refresh(
        &self,
        request: Request<proto::RefreshRequest>,
    ) -> Result<Response<proto::RefreshResponse>, Status> {
        dispatching("provider", "refresh");
        let wire = request.into_inner();
        let info: InstanceInfo = from_required(wire.info, "info")?;
        let state: Option<InstanceState> = from_wire_opt(wire.state)?;
        let refreshed = self.provider.refresh(&info, state.as_ref()).await?;
        Ok(Response::new(proto::RefreshResponse {
            state: to_wire_opt(refreshed.as_ref())?,
        }))
    }

    async fn import_state(
        &self,
        request: Request<proto::ImportStateRequest>,
    ) -> Result<Response<proto::ImportStateResponse>, Status> {
        dispatching("provider", "import_state");
        let wire = request.into_inner();
        let info: InstanceInfo = from_required(wire.info, "info")?;
        let imported = self.provider.import_state(&info, &wire.id).await?;
        Ok(Response::new(proto::ImportStateResponse {
            state: to_wire_all(&imported)?,
        }))
    }

    async fn resources(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::ResourcesResponse>, Status> {
        dispatching("provider", "resources");
        let resources = self.provider.resources().await?;
        Ok(Response::new(proto::ResourcesResponse {
            resources: to_wire_all(&resources)?,
        }))
    }

    async fn validate_data_source(
        &self,
        request: Request<proto::ValidateDataSourceRequest>,
    ) -> Result<Response<proto::ValidateResponse>, Status> {
        dispatching("provider", "validate_data_source");
        let wire = request.into_inner();
        let config: ResourceConfig = from_required(wire.config, "config")?;
        let result = self
            .provider
            .validate_data_source(&wire.type_name, &config)
            .await;
        Ok(Response::new(validate_to_wire(&result)))
    }

    async fn read_data_diff(
        &self,
        request: Request<proto::ReadDataDiffRequest>,
    ) -> Result<Response<proto::ReadDataDiffResponse>, Status> {
        dispatching("provider", "read_data_diff");
        let wire = request.into_inner();
        let info: InstanceInfo = from_required(wire.info, "info")?;
        let config: ResourceConfig = from_required(wire.config, "config")?;
        let planned = self.provider.read_data_diff(&info, &config).await?;
        Ok(Response::new(proto::ReadDataDiffResponse {
            diff: to_wire_opt(planned.as_ref())?,
        }))
    }

    async fn read_data_apply(
        &self,
        request: Request<proto::ReadDataApplyRequest>,
    ) -> Result<Response<proto::ReadDataApplyResponse>, Status> {
        dispatching("provider", "read_data_apply");
        let wire = request.into_inner();
        let info: InstanceInfo = from_required(wire.info, "info")?;
        let diff: Option<InstanceDiff> = from_wire_opt(wire.diff)?;
        let read = self.provider.read_data_apply(&info, diff.as_ref()).await?;
        Ok(Response::new(proto::ReadDataApplyResponse {
            state: to_wire_opt(read.as_ref())?,
        }))
    }

    async fn data_sources(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::DataSourcesResponse>, Status> {
        dispatching("provider", "data_sources");
        let sources = self.provider.data_sources().await?;
        Ok(Response::new(proto::DataSourcesResponse {
            data_sources: to_wire_all(&sources)?,
        }))
    }
}
