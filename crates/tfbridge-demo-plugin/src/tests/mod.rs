//! Drives the demo services through the bridge over a loopback socket.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::json;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use tfbridge_config::{Config, SocketEndpoint};
use tfbridge_plugin::transport::{Listener, connect};
use tfbridge_plugin::{
    GrpcResourceProvider, GrpcResourceProvisioner, InstanceInfo, PluginError, ResourceConfig,
    ResourceProvider, ResourceProvisioner, UiOutput,
};

use super::{run, services};
use crate::provider::FILE_RESOURCE;

struct Plugin {
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<Result<(), PluginError>>,
    provider: GrpcResourceProvider,
    provisioner: GrpcResourceProvisioner,
}

impl Plugin {
    async fn start() -> Self {
        let config = Config::default();
        let listener = Listener::bind(&SocketEndpoint::tcp("127.0.0.1", 0))
            .await
            .expect("bind loopback");
        let endpoint = listener.local_endpoint().expect("local endpoint");
        let (shutdown, signal) = oneshot::channel::<()>();
        let server = tokio::spawn(services(&config).serve(listener, async move {
            signal.await.ok();
        }));
        let channel = connect(&endpoint).await.expect("connect");
        Self {
            shutdown: Some(shutdown),
            server,
            provider: GrpcResourceProvider::new(channel.clone(), config.max_message_bytes()),
            provisioner: GrpcResourceProvisioner::new(channel, config.max_message_bytes()),
        }
    }
}

impl Drop for Plugin {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        self.server.abort();
    }
}

#[derive(Default)]
struct Captured(Mutex<Vec<String>>);

impl UiOutput for Captured {
    fn output(&self, message: &str) {
        self.0.lock().expect("output log").push(message.to_owned());
    }
}

#[tokio::test]
async fn file_lifecycle_over_the_bridge() {
    let plugin = Plugin::start().await;
    let info = InstanceInfo::new("demo_file.notes", FILE_RESOURCE);
    let config = ResourceConfig::new(BTreeMap::from([
        (String::from("path"), json!("/tmp/notes")),
        (String::from("content"), json!("hi")),
    ]));

    let diff = plugin
        .provider
        .diff(&info, None, &config)
        .await
        .expect("diff")
        .expect("creation plans changes");
    let state = plugin
        .provider
        .apply(&info, None, Some(&diff))
        .await
        .expect("apply")
        .expect("created");
    let refreshed = plugin
        .provider
        .refresh(&info, Some(&state))
        .await
        .expect("refresh");

    assert_eq!(state.id, "/tmp/notes");
    assert_eq!(refreshed, Some(state));
}

#[tokio::test]
async fn provider_listings_cross_the_bridge() {
    let plugin = Plugin::start().await;

    let resources = plugin.provider.resources().await.expect("resources");
    let sources = plugin.provider.data_sources().await.expect("data sources");

    assert_eq!(resources.len(), 1);
    assert_eq!(sources.len(), 1);
}

#[tokio::test]
async fn provisioner_echo_reaches_the_host() {
    let plugin = Plugin::start().await;
    let output = Captured::default();
    let config = ResourceConfig::new(BTreeMap::from([(
        String::from("lines"),
        json!(["first", "second"]),
    )]));

    plugin
        .provisioner
        .apply(&output, None, &config)
        .await
        .expect("apply");

    assert_eq!(
        *output.0.lock().expect("output log"),
        vec![String::from("-: first"), String::from("-: second")]
    );
}

#[tokio::test]
async fn provisioner_failure_arrives_as_message() {
    let plugin = Plugin::start().await;
    let output = Captured::default();
    let config = ResourceConfig::new(BTreeMap::from([
        (String::from("lines"), json!(["first"])),
        (String::from("fail_with"), json!("disk full")),
    ]));

    let result = plugin.provisioner.apply(&output, None, &config).await;

    assert_eq!(result.map_err(|error| error.to_string()), Err(String::from("disk full")));
    assert_eq!(output.0.lock().expect("output log").len(), 1);
}

#[tokio::test]
async fn run_serves_until_shutdown() {
    let config = Config {
        plugin_socket: SocketEndpoint::tcp("127.0.0.1", 0),
        ..Config::default()
    };

    run(&config, async {}).await.expect("run returns once shutdown resolves");
}
