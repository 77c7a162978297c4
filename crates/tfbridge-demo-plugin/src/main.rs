//! Binary entrypoint for the demo bridge plugin.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use tfbridge_config::Config;
use tfbridge_demo_plugin::{DemoError, run};

#[tokio::main]
async fn main() -> ExitCode {
    let outcome = match Config::load() {
        Ok(config) => run(&config, shutdown_signal()).await,
        Err(error) => Err(DemoError::LoadConfiguration(error)),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            writeln!(io::stderr().lock(), "tfbridge-demo-plugin: {error}").ok();
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
