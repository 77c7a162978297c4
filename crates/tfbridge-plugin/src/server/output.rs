use tokio::sync::mpsc;
use tonic::Status;
use tracing::debug;

use super::SERVER_TARGET;
use crate::interface::UiOutput;
use crate::proto;

pub(super) type OutputSender = mpsc::UnboundedSender<Result<proto::UiOutput, Status>>;

/// Forwards provisioner output as items on the apply response stream.
pub(super) struct StreamOutput {
    outbound: OutputSender,
}

impl StreamOutput {
    pub(super) const fn new(outbound: OutputSender) -> Self {
        Self { outbound }
    }
}

impl UiOutput for StreamOutput {
    fn output(&self, message: &str) {
        let item = proto::UiOutput {
            message: message.to_owned(),
        };
        if self.outbound.send(Ok(item)).is_err() {
            debug!(target: SERVER_TARGET, "host stopped reading provisioner output");
        }
    }
}
