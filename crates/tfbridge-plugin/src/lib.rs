//! Out-of-process resource providers and provisioners over gRPC.
//!
//! `tfbridge-plugin` lets a plugin process implement [`ResourceProvider`] or
//! [`ResourceProvisioner`] while the host engine drives it through the same
//! traits from another process. The crate has two halves that mirror each
//! other:
//!
//! - the **client adapters** ([`GrpcResourceProvider`],
//!   [`GrpcResourceProvisioner`]) implement the traits on the host by making
//!   RPC calls;
//! - the **server adapters** ([`GrpcResourceProviderServer`],
//!   [`GrpcResourceProvisionerServer`]) serve a local implementation of the
//!   traits as the `tfbridge.v1` services.
//!
//! Records cross the wire through the [`translate`] functions, which keep
//! the difference between an absent map and an empty one, and encode opaque
//! values as JSON with [`codec`]. Errors returned by the remote side are
//! passed through [`classify`] so plain application errors arrive as plain
//! messages.
//!
//! Two exchanges go beyond request and response. Interactive input lets the
//! plugin prompt the host's operator mid-call over one bidirectional stream,
//! strictly alternating prompt and reply. Provisioner apply streams each
//! progress line to the host's [`UiOutput`] as it is produced, and ends the
//! stream with the error if the apply fails.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tfbridge_config::Config;
//! use tfbridge_plugin::transport::{Listener, PluginServices};
//! use tfbridge_plugin::ResourceProvider;
//!
//! async fn serve(config: &Config, provider: Arc<dyn ResourceProvider>) -> Result<(), tfbridge_plugin::PluginError> {
//!     let listener = Listener::bind(config.plugin_socket()).await?;
//!     PluginServices::new(config.max_message_bytes())
//!         .with_provider(provider)
//!         .serve(listener, async { tokio::signal::ctrl_c().await.ok(); })
//!         .await
//! }
//! ```

pub mod classify;
pub mod client;
pub mod codec;
pub mod error;
pub mod interface;
pub mod model;
pub mod proto;
pub mod server;
pub mod telemetry;
pub mod translate;
pub mod transport;

#[cfg(test)]
mod tests;

pub use self::client::{GrpcResourceProvider, GrpcResourceProvisioner};
pub use self::codec::CodecError;
pub use self::error::PluginError;
pub use self::interface::{ResourceProvider, ResourceProvisioner, UiInput, UiOutput};
pub use self::model::{
    ConfigMap, DataSource, DiffAttrType, EphemeralState, InputOpts, InstanceDiff, InstanceInfo,
    InstanceState, ProviderSchema, ProviderSchemaRequest, ResourceAttrDiff, ResourceConfig,
    ResourceType, ValidateResult,
};
pub use self::server::{GrpcResourceProviderServer, GrpcResourceProvisionerServer};
