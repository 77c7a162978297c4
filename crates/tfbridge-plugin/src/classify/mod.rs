//! Separates plain application errors from structured RPC failures.
//!
//! A remote implementation that returns an ordinary error reaches the client
//! as a status with code `Unknown`, the error text as its message and no
//! details. That status says nothing the text does not, so it is unwrapped
//! into [`PluginError::Message`]. Anything else keeps its full status.

use tonic::{Code, Status};

use crate::error::PluginError;

/// Classifies a status returned by the transport.
#[must_use]
pub fn classify(status: Status) -> PluginError {
    if is_plain(&status) {
        PluginError::message(status.message())
    } else {
        PluginError::status(status)
    }
}

/// Applies [`classify`] to the error side of a result.
///
/// # Errors
///
/// Returns the classified error when `result` is an error.
pub fn classify_result<T>(result: Result<T, Status>) -> Result<T, PluginError> {
    result.map_err(classify)
}

fn is_plain(status: &Status) -> bool {
    status.code() == Code::Unknown && status.details().is_empty()
}
