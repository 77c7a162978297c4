//! Host side of the interactive input exchange.
//!
//! The host sends the configuration once, then only answers. Each inbound
//! message is either a prompt, which is put to the operator and answered on
//! the same stream, or the finished configuration, which ends the exchange.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::Channel;
use tracing::debug;

use super::CLIENT_TARGET;
use crate::classify::classify_result;
use crate::error::PluginError;
use crate::interface::UiInput;
use crate::model::{InputOpts, ResourceConfig};
use crate::proto::{self, provider_client::ProviderClient};
use crate::translate::{FromWire, ToWire};

/// Strict alternation means at most one reply is ever in flight.
const OUTBOUND_CAPACITY: usize = 1;

pub(super) async fn exchange(
    mut client: ProviderClient<Channel>,
    ui: &dyn UiInput,
    config: &ResourceConfig,
) -> Result<ResourceConfig, PluginError> {
    let (outbound, requests) = mpsc::channel(OUTBOUND_CAPACITY);
    send(
        &outbound,
        proto::InputRequest {
            resource_config: Some(config.to_wire()?),
            reply: String::new(),
        },
    )
    .await?;

    let mut inbound =
        classify_result(client.input(ReceiverStream::new(requests)).await)?.into_inner();
    let mut rounds = 0_usize;

    loop {
        let mut message = classify_result(inbound.message().await)?.ok_or_else(|| {
            PluginError::protocol("input stream closed before the final configuration arrived")
        })?;

        if let Some(finished) = message.resource_config.take() {
            debug!(target: CLIENT_TARGET, rounds, "input exchange finished");
            return Ok(ResourceConfig::from_wire(finished)?);
        }

        let opts = InputOpts::from_wire(message)?;
        debug!(target: CLIENT_TARGET, prompt = %opts.id, "prompting operator");
        let reply = ui.input(&opts).await?;
        send(
            &outbound,
            proto::InputRequest {
                resource_config: None,
                reply,
            },
        )
        .await?;
        rounds += 1;
    }
}

async fn send(
    outbound: &mpsc::Sender<proto::InputRequest>,
    request: proto::InputRequest,
) -> Result<(), PluginError> {
    outbound
        .send(request)
        .await
        .map_err(|_| PluginError::protocol("input stream closed while sending to the plugin"))
}
