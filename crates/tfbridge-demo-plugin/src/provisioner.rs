//! Provisioner that echoes its configured lines.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use tfbridge_plugin::{
    InstanceState, PluginError, ResourceConfig, ResourceProvisioner, UiOutput, ValidateResult,
};

const PROVISIONER_TARGET: &str = "tfbridge_demo_plugin::provisioner";

const LINES: &str = "lines";
const FAIL_WITH: &str = "fail_with";

/// Writes each entry of `lines` to the output, then fails with `fail_with`
/// when that key is set.
#[derive(Debug, Default)]
pub struct EchoProvisioner;

fn lines(config: &ResourceConfig) -> Option<Vec<&str>> {
    config
        .get(LINES)?
        .as_array()?
        .iter()
        .map(Value::as_str)
        .collect()
}

#[async_trait]
impl ResourceProvisioner for EchoProvisioner {
    async fn validate(&self, config: &ResourceConfig) -> ValidateResult {
        if config.get(LINES).is_none() {
            return ValidateResult::from_error(PluginError::message("lines is required"));
        }
        if lines(config).is_none() {
            return ValidateResult::from_error(PluginError::message(
                "lines must be a list of strings",
            ));
        }
        ValidateResult::ok()
    }

    async fn apply(
        &self,
        output: &dyn UiOutput,
        state: Option<&InstanceState>,
        config: &ResourceConfig,
    ) -> Result<(), PluginError> {
        let echoed = lines(config).unwrap_or_default();
        let prefix = state.map(|resource| resource.id.as_str()).unwrap_or("-");
        for line in &echoed {
            output.output(&format!("{prefix}: {line}"));
        }
        debug!(
            target: PROVISIONER_TARGET,
            count = echoed.len(),
            "echoed provisioner lines"
        );
        match config.get(FAIL_WITH).and_then(Value::as_str) {
            Some(reason) => Err(PluginError::message(reason)),
            None => Ok(()),
        }
    }

    async fn stop(&self) -> Result<(), PluginError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Captured(Mutex<Vec<String>>);

    impl UiOutput for Captured {
        fn output(&self, message: &str) {
            self.0.lock().expect("output log").push(message.to_owned());
        }
    }

    fn config(values: Value) -> ResourceConfig {
        let map = values
            .as_object()
            .map(|object| object.clone().into_iter().collect::<BTreeMap<_, _>>())
            .unwrap_or_default();
        ResourceConfig::new(map)
    }

    #[rstest]
    #[case::missing(json!({}), false)]
    #[case::not_strings(json!({"lines": [1, 2]}), false)]
    #[case::strings(json!({"lines": ["a"]}), true)]
    #[tokio::test]
    async fn validation(#[case] values: Value, #[case] valid: bool) {
        let result = EchoProvisioner.validate(&config(values)).await;
        assert_eq!(result.is_valid(), valid);
    }

    #[tokio::test]
    async fn apply_prefixes_lines_with_resource_id() {
        let output = Captured::default();
        let state = InstanceState::new("/tmp/notes", BTreeMap::new());

        EchoProvisioner
            .apply(&output, Some(&state), &config(json!({"lines": ["one", "two"]})))
            .await
            .expect("apply");

        assert_eq!(
            *output.0.lock().expect("output log"),
            vec![String::from("/tmp/notes: one"), String::from("/tmp/notes: two")]
        );
    }

    #[tokio::test]
    async fn apply_fails_after_echoing() {
        let output = Captured::default();

        let result = EchoProvisioner
            .apply(&output, None, &config(json!({"lines": ["one"], "fail_with": "boom"})))
            .await;

        assert_eq!(result.map_err(|error| error.to_string()), Err(String::from("boom")));
        assert_eq!(output.0.lock().expect("output log").len(), 1);
    }
}
