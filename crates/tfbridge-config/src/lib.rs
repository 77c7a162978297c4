//! Layered configuration shared by the host and plugin sides of the bridge.
//!
//! Values resolve in increasing precedence: built-in defaults, the file named
//! by `--config-path` (or `TFBRIDGE_CONFIG_PATH`), `TFBRIDGE_*` environment
//! variables, then command-line flags. Both binaries load the same [`Config`]
//! so the host dials exactly the socket the plugin serves on.

mod defaults;
mod logging;
mod socket;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_TCP_PORT, default_log_filter,
    default_log_filter_string, default_log_format, default_max_message_bytes,
    default_socket_endpoint,
};
pub use self::logging::{LogFormat, LogFormatParseError};
pub use self::socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TFBRIDGE")]
pub struct Config {
    /// Endpoint the plugin listens on and the host connects to.
    #[serde(default = "default_socket_endpoint")]
    #[ortho_config(default = default_socket_endpoint())]
    pub plugin_socket: SocketEndpoint,
    /// `tracing` filter expression, e.g. `info,tfbridge_plugin=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Upper bound on a single encoded wire message, in bytes.
    #[serde(default = "default_max_message_bytes")]
    #[ortho_config(default = default_max_message_bytes())]
    pub max_message_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugin_socket: default_socket_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl Config {
    /// Endpoint shared by the plugin listener and the host connector.
    #[must_use]
    pub const fn plugin_socket(&self) -> &SocketEndpoint {
        &self.plugin_socket
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Maximum encoded message size accepted or produced on the wire.
    #[must_use]
    pub const fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }
}
