//! Channel and listener plumbing over TCP or Unix domain sockets.
//!
//! Hosts dial with [`connect`] (or the adapter shorthands); plugins bind a
//! [`Listener`] and run a [`PluginServices`] set on it until shutdown. How
//! the plugin process is launched and how the endpoint is agreed on is left
//! to the caller.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tfbridge_config::{Config, SocketEndpoint};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Endpoint, Server};
use tracing::info;

use crate::client::{GrpcResourceProvider, GrpcResourceProvisioner};
use crate::error::PluginError;
use crate::interface::{ResourceProvider, ResourceProvisioner};
use crate::server::{GrpcResourceProviderServer, GrpcResourceProvisionerServer};

const TRANSPORT_TARGET: &str = "tfbridge_plugin::transport";

fn transport_error(endpoint: &SocketEndpoint, source: tonic::transport::Error) -> PluginError {
    PluginError::Transport {
        endpoint: endpoint.to_string(),
        source: Arc::new(source),
    }
}

/// Opens a channel to a plugin listening on `endpoint`.
///
/// # Errors
///
/// Returns [`PluginError::Transport`] if the connection cannot be made.
pub async fn connect(endpoint: &SocketEndpoint) -> Result<Channel, PluginError> {
    let builder = Endpoint::from_shared(endpoint.channel_uri())
        .map_err(|source| transport_error(endpoint, source))?;

    let channel = match endpoint {
        SocketEndpoint::Tcp { .. } => builder.connect().await,
        SocketEndpoint::Unix { path } => connect_unix(builder, path.clone()).await,
    }
    .map_err(|source| transport_error(endpoint, source))?;

    info!(target: TRANSPORT_TARGET, %endpoint, "connected to plugin");
    Ok(channel)
}

#[cfg(unix)]
async fn connect_unix(
    builder: Endpoint,
    path: camino::Utf8PathBuf,
) -> Result<Channel, tonic::transport::Error> {
    use hyper_util::rt::TokioIo;
    use tokio::net::UnixStream;
    use tower::service_fn;

    builder
        .connect_with_connector(service_fn(move |_: tonic::transport::Uri| {
            let socket = path.clone();
            async move {
                let stream = UnixStream::connect(socket.as_std_path()).await?;
                Ok::<_, std::io::Error>(TokioIo::new(stream))
            }
        }))
        .await
}

#[cfg(not(unix))]
async fn connect_unix(
    builder: Endpoint,
    _path: camino::Utf8PathBuf,
) -> Result<Channel, tonic::transport::Error> {
    builder.connect().await
}

/// Connects a [`GrpcResourceProvider`] to the configured plugin socket.
///
/// # Errors
///
/// Returns [`PluginError::Transport`] if the connection cannot be made.
pub async fn connect_provider(config: &Config) -> Result<GrpcResourceProvider, PluginError> {
    let channel = connect(config.plugin_socket()).await?;
    Ok(GrpcResourceProvider::new(channel, config.max_message_bytes()))
}

/// Connects a [`GrpcResourceProvisioner`] to the configured plugin socket.
///
/// # Errors
///
/// Returns [`PluginError::Transport`] if the connection cannot be made.
pub async fn connect_provisioner(config: &Config) -> Result<GrpcResourceProvisioner, PluginError> {
    let channel = connect(config.plugin_socket()).await?;
    Ok(GrpcResourceProvisioner::new(channel, config.max_message_bytes()))
}

/// A bound socket ready to accept host connections.
#[derive(Debug)]
pub enum Listener {
    /// TCP listener.
    Tcp(TcpListener),
    /// Unix domain socket listener.
    #[cfg(unix)]
    Unix {
        /// Bound listener.
        listener: tokio::net::UnixListener,
        /// Socket path, used to describe the endpoint.
        path: camino::Utf8PathBuf,
    },
}

impl Listener {
    /// Binds `endpoint`, preparing the socket directory first for Unix
    /// sockets.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Socket`] if the directory cannot be prepared and
    /// [`PluginError::Io`] if binding fails.
    pub async fn bind(endpoint: &SocketEndpoint) -> Result<Self, PluginError> {
        match endpoint {
            SocketEndpoint::Tcp { host, port } => TcpListener::bind((host.as_str(), *port))
                .await
                .map(Self::Tcp)
                .map_err(|source| PluginError::io(format!("binding {endpoint}"), source)),
            SocketEndpoint::Unix { path } => Self::bind_unix(endpoint, path),
        }
    }

    #[cfg(unix)]
    fn bind_unix(
        endpoint: &SocketEndpoint,
        path: &camino::Utf8Path,
    ) -> Result<Self, PluginError> {
        endpoint.prepare_filesystem()?;
        let listener = tokio::net::UnixListener::bind(path.as_std_path())
            .map_err(|source| PluginError::io(format!("binding {endpoint}"), source))?;
        Ok(Self::Unix {
            listener,
            path: path.to_path_buf(),
        })
    }

    #[cfg(not(unix))]
    fn bind_unix(
        endpoint: &SocketEndpoint,
        _path: &camino::Utf8Path,
    ) -> Result<Self, PluginError> {
        Err(PluginError::io(
            format!("binding {endpoint}"),
            std::io::Error::from(std::io::ErrorKind::Unsupported),
        ))
    }

    /// The endpoint a host should dial, with the OS-assigned port filled in
    /// for TCP listeners bound to port `0`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] if the local address cannot be read.
    pub fn local_endpoint(&self) -> Result<SocketEndpoint, PluginError> {
        match self {
            Self::Tcp(listener) => {
                let address: SocketAddr = listener
                    .local_addr()
                    .map_err(|source| PluginError::io("reading listener address", source))?;
                Ok(SocketEndpoint::tcp(address.ip().to_string(), address.port()))
            }
            #[cfg(unix)]
            Self::Unix { path, .. } => Ok(SocketEndpoint::unix(path.clone())),
        }
    }
}

/// The services a plugin process offers.
#[derive(Clone)]
pub struct PluginServices {
    provider: Option<GrpcResourceProviderServer>,
    provisioner: Option<GrpcResourceProvisionerServer>,
    max_message_bytes: usize,
}

impl PluginServices {
    /// An empty service set whose adapters bound messages to
    /// `max_message_bytes`.
    #[must_use]
    pub const fn new(max_message_bytes: usize) -> Self {
        Self {
            provider: None,
            provisioner: None,
            max_message_bytes,
        }
    }

    /// Adds the `Provider` service backed by `provider`.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.provider = Some(GrpcResourceProviderServer::new(
            provider,
            self.max_message_bytes,
        ));
        self
    }

    /// Adds the `Provisioner` service backed by `provisioner`.
    #[must_use]
    pub fn with_provisioner(mut self, provisioner: Arc<dyn ResourceProvisioner>) -> Self {
        self.provisioner = Some(GrpcResourceProvisionerServer::new(
            provisioner,
            self.max_message_bytes,
        ));
        self
    }

    /// Serves on `listener` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] if the listener address cannot be read and
    /// [`PluginError::Transport`] if the server fails.
    pub async fn serve<F>(self, listener: Listener, shutdown: F) -> Result<(), PluginError>
    where
        F: Future<Output = ()> + Send,
    {
        let endpoint = listener.local_endpoint()?;
        info!(
            target: TRANSPORT_TARGET,
            %endpoint,
            provider = self.provider.is_some(),
            provisioner = self.provisioner.is_some(),
            "serving plugin services"
        );

        let router = Server::builder()
            .add_optional_service(self.provider.map(GrpcResourceProviderServer::into_service))
            .add_optional_service(
                self.provisioner
                    .map(GrpcResourceProvisionerServer::into_service),
            );

        let served = match listener {
            Listener::Tcp(tcp) => {
                router
                    .serve_with_incoming_shutdown(TcpListenerStream::new(tcp), shutdown)
                    .await
            }
            #[cfg(unix)]
            Listener::Unix { listener: unix, .. } => {
                router
                    .serve_with_incoming_shutdown(
                        tokio_stream::wrappers::UnixListenerStream::new(unix),
                        shutdown,
                    )
                    .await
            }
        };
        served.map_err(|source| transport_error(&endpoint, source))?;

        info!(target: TRANSPORT_TARGET, %endpoint, "plugin services stopped");
        Ok(())
    }
}
