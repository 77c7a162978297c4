//! Errors surfaced by the bridge on either side of the wire.
//!
//! Every variant is cheap to clone: non-clone sources are wrapped in `Arc` so
//! errors can be copied into validation results and across tasks.

use std::sync::Arc;

use tfbridge_config::SocketPreparationError;
use thiserror::Error;
use tonic::{Code, Status};

use crate::codec::CodecError;

/// Errors arising from bridge operations.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// A plain application error carrying only its message.
    ///
    /// Errors returned by a remote implementation arrive in this form when
    /// the transport status held nothing beyond the text.
    #[error("{message}")]
    Message {
        /// Error text.
        message: String,
    },

    /// A structured RPC status with a non-generic code or attached details.
    #[error("rpc failed with status {}: {}", .0.code(), .0.message())]
    Status(Box<Status>),

    /// The RPC channel could not be established.
    #[error("failed to connect to plugin at {endpoint}: {source}")]
    Transport {
        /// Endpoint that was dialled.
        endpoint: String,
        /// Underlying transport error.
        #[source]
        source: Arc<tonic::transport::Error>,
    },

    /// A value could not be encoded for, or decoded from, the wire.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The provider schema document could not be serialised or parsed.
    #[error("invalid provider schema document: {source}")]
    Schema {
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// A streaming exchange ended early or carried an unexpected message.
    #[error("protocol violation: {message}")]
    Protocol {
        /// Description of the violation.
        message: String,
    },

    /// The adapter's connection has already been closed.
    #[error("plugin connection is closed")]
    Closed,

    /// The socket's directory could not be prepared.
    #[error(transparent)]
    Socket(Arc<SocketPreparationError>),

    /// An I/O error occurred while binding or accepting on a socket.
    #[error("I/O error on {context}: {source}")]
    Io {
        /// What was being done when the error occurred.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PluginError {
    /// Builds a plain message error.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    /// Builds a protocol violation error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Wraps a structured status.
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self::Status(Box::new(status))
    }

    pub(crate) fn schema(source: serde_json::Error) -> Self {
        Self::Schema {
            source: Arc::new(source),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: Arc::new(source),
        }
    }
}

impl From<PluginError> for Status {
    /// Maps an error onto the status returned to the remote caller.
    ///
    /// Plain messages become `Unknown` with no details, which the caller's
    /// classifier turns back into a plain message.
    fn from(error: PluginError) -> Self {
        match error {
            PluginError::Status(status) => *status,
            PluginError::Message { message } => Self::new(Code::Unknown, message),
            PluginError::Codec(CodecError::MissingField { .. }) => {
                Self::invalid_argument(error.to_string())
            }
            PluginError::Codec(_) | PluginError::Schema { .. } => Self::internal(error.to_string()),
            PluginError::Protocol { .. } => Self::failed_precondition(error.to_string()),
            PluginError::Closed | PluginError::Transport { .. } => {
                Self::unavailable(error.to_string())
            }
            PluginError::Socket(_) | PluginError::Io { .. } => Self::internal(error.to_string()),
        }
    }
}

impl From<SocketPreparationError> for PluginError {
    fn from(error: SocketPreparationError) -> Self {
        Self::Socket(Arc::new(error))
    }
}

impl From<CodecError> for Status {
    fn from(error: CodecError) -> Self {
        PluginError::Codec(error).into()
    }
}
