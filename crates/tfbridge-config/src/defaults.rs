use camino::Utf8PathBuf;

#[cfg(unix)]
use libc::geteuid;

#[cfg(unix)]
use dirs::runtime_dir;

use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// TCP port used where Unix domain sockets are unavailable.
pub const DEFAULT_TCP_PORT: u16 = 9798;

/// Log filter applied when nothing else is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Largest wire message accepted by default (4 MiB, matching gRPC's default).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value for serde defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default log format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default maximum message size.
#[must_use]
pub const fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}

/// Computes the default plugin socket.
///
/// On Unix this is `<runtime dir>/tfbridge/plugin.sock`, falling back to a
/// per-user directory under the system temp dir when no runtime directory is
/// advertised.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    default_socket_endpoint_inner()
}

#[cfg(unix)]
fn default_socket_endpoint_inner() -> SocketEndpoint {
    let runtime = runtime_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok());
    let (mut base, apply_namespace) = match runtime {
        Some(dir) => (dir, false),
        None => (fallback_base_directory(), true),
    };

    base.push("tfbridge");
    if apply_namespace {
        let uid = unsafe { geteuid() };
        base.push(format!("uid-{uid}"));
    }

    SocketEndpoint::unix(base.join("plugin.sock"))
}

#[cfg(unix)]
fn fallback_base_directory() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(std::env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}

#[cfg(not(unix))]
fn default_socket_endpoint_inner() -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", DEFAULT_TCP_PORT)
}
