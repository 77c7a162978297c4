//! A runnable plugin serving an in-memory provider and an echo provisioner.
//!
//! The provider manages `demo_file` resources held in process memory and a
//! `demo_greeting` data source; it prompts the operator for a greeting when
//! the provider configuration omits one. The provisioner prints the lines it
//! is configured with. Both are served over the bridge on the configured
//! socket until the shutdown future resolves.

pub mod provider;
pub mod provisioner;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use tfbridge_config::Config;
use tfbridge_plugin::PluginError;
use tfbridge_plugin::telemetry::{self, TelemetryError};
use tfbridge_plugin::transport::{Listener, PluginServices};

pub use self::provider::MemoryProvider;
pub use self::provisioner::EchoProvisioner;

const DEMO_TARGET: &str = "tfbridge_demo_plugin";

/// Errors that stop the demo plugin.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Configuration could not be resolved.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The socket could not be bound or the server failed.
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// The service set this plugin offers.
#[must_use]
pub fn services(config: &Config) -> PluginServices {
    PluginServices::new(config.max_message_bytes())
        .with_provider(Arc::new(MemoryProvider::default()))
        .with_provisioner(Arc::new(EchoProvisioner::default()))
}

/// Installs logging, binds the configured socket and serves until
/// `shutdown` resolves.
///
/// # Errors
///
/// Returns [`DemoError::Telemetry`] if logging cannot be installed and
/// [`DemoError::Plugin`] if the socket cannot be bound or serving fails.
pub async fn run<F>(config: &Config, shutdown: F) -> Result<(), DemoError>
where
    F: Future<Output = ()> + Send,
{
    let logging = telemetry::initialise(config)?;
    let listener = Listener::bind(config.plugin_socket()).await?;
    info!(
        target: DEMO_TARGET,
        endpoint = %config.plugin_socket(),
        log_format = %logging.format(),
        "demo plugin starting"
    );
    services(config).serve(listener, shutdown).await?;
    Ok(())
}
