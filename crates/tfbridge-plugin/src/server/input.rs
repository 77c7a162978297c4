//! Plugin side of the interactive input exchange.
//!
//! The exchange runs on its own task. It reads the configuration, then
//! hands the local provider a [`UiInput`] whose every prompt is one send
//! followed by one receive on the open stream. The final configuration, or
//! the provider's error, is the last message on the response stream.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Status, Streaming};
use tracing::debug;

use super::SERVER_TARGET;
use crate::classify::classify_result;
use crate::error::PluginError;
use crate::interface::{ResourceProvider, UiInput};
use crate::model::{InputOpts, ResourceConfig};
use crate::proto;
use crate::translate::{ToWire, from_required};

type Outbound = mpsc::Sender<Result<proto::InputResponse, Status>>;

pub(super) fn spawn_exchange(
    provider: Arc<dyn ResourceProvider>,
    inbound: Streaming<proto::InputRequest>,
) -> ReceiverStream<Result<proto::InputResponse, Status>> {
    let (outbound, responses) = mpsc::channel(1);
    tokio::spawn(async move {
        if let Err(error) = run_exchange(provider.as_ref(), inbound, &outbound).await {
            debug!(target: SERVER_TARGET, %error, "input exchange failed");
            if outbound.send(Err(error.into())).await.is_err() {
                debug!(target: SERVER_TARGET, "host left before the input error was delivered");
            }
        }
    });
    ReceiverStream::new(responses)
}

async fn run_exchange(
    provider: &dyn ResourceProvider,
    mut inbound: Streaming<proto::InputRequest>,
    outbound: &Outbound,
) -> Result<(), PluginError> {
    let opening = classify_result(inbound.message().await)?.ok_or_else(|| {
        PluginError::protocol("input stream closed before the configuration arrived")
    })?;
    let config: ResourceConfig = from_required(opening.resource_config, "resource_config")?;

    let ui = StreamInput {
        outbound: outbound.clone(),
        inbound: Mutex::new(inbound),
    };
    let finished = provider.input(&ui, &config).await?;

    let last = proto::InputResponse {
        resource_config: Some(finished.to_wire()?),
        ..proto::InputResponse::default()
    };
    outbound
        .send(Ok(last))
        .await
        .map_err(|_| PluginError::protocol("host left before the final configuration"))
}

/// Prompts the host over the open input stream.
struct StreamInput {
    outbound: Outbound,
    inbound: Mutex<Streaming<proto::InputRequest>>,
}

#[async_trait]
impl UiInput for StreamInput {
    async fn input(&self, opts: &InputOpts) -> Result<String, PluginError> {
        let mut inbound = self.inbound.lock().await;

        debug!(target: SERVER_TARGET, prompt = %opts.id, "sending prompt to host");
        self.outbound
            .send(Ok(opts.to_wire()?))
            .await
            .map_err(|_| PluginError::protocol("host left before the prompt was sent"))?;

        let reply = classify_result(inbound.message().await)?.ok_or_else(|| {
            PluginError::protocol("input stream closed while awaiting the operator's reply")
        })?;
        if reply.resource_config.is_some() {
            return Err(PluginError::protocol(
                "host resent a configuration where a reply was expected",
            ));
        }
        Ok(reply.reply)
    }
}
