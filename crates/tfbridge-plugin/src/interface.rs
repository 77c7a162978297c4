//! Collaborator traits on both sides of the bridge.
//!
//! The plugin side implements [`ResourceProvider`] and [`ResourceProvisioner`]
//! locally and hands them to the server adapters. The host side receives the
//! same traits from the client adapters, backed by RPC calls. [`UiInput`] and
//! [`UiOutput`] are the operator-facing facilities the host supplies.

use async_trait::async_trait;

use crate::error::PluginError;
use crate::model::{
    DataSource, InputOpts, InstanceDiff, InstanceInfo, InstanceState, ProviderSchema,
    ProviderSchemaRequest, ResourceConfig, ResourceType, ValidateResult,
};

/// Asks the operator for a value.
#[async_trait]
pub trait UiInput: Send + Sync {
    /// Blocks until the operator answers the prompt described by `opts`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown or answered.
    async fn input(&self, opts: &InputOpts) -> Result<String, PluginError>;
}

/// Receives progress text from a running provisioner.
pub trait UiOutput: Send + Sync {
    /// Delivers one progress message.
    fn output(&self, message: &str);
}

/// Manages the lifecycle of one provider's resources.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Returns the schema for the requested resource types and data sources.
    async fn get_schema(
        &self,
        request: &ProviderSchemaRequest,
    ) -> Result<ProviderSchema, PluginError>;

    /// Completes `config` by prompting the operator for missing values.
    async fn input(
        &self,
        ui: &dyn UiInput,
        config: &ResourceConfig,
    ) -> Result<ResourceConfig, PluginError>;

    /// Validates the provider configuration.
    async fn validate(&self, config: &ResourceConfig) -> ValidateResult;

    /// Validates one resource's configuration.
    async fn validate_resource(&self, type_name: &str, config: &ResourceConfig) -> ValidateResult;

    /// Configures the provider.
    async fn configure(&self, config: &ResourceConfig) -> Result<(), PluginError>;

    /// Applies `diff` to the instance, returning the new state, or `None` if
    /// the instance was destroyed.
    async fn apply(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
        diff: Option<&InstanceDiff>,
    ) -> Result<Option<InstanceState>, PluginError>;

    /// Plans the changes needed to reach `config`, or `None` if there are none.
    async fn diff(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
        config: &ResourceConfig,
    ) -> Result<Option<InstanceDiff>, PluginError>;

    /// Re-reads the instance, returning `None` if it no longer exists.
    async fn refresh(
        &self,
        info: &InstanceInfo,
        state: Option<&InstanceState>,
    ) -> Result<Option<InstanceState>, PluginError>;

    /// Imports existing infrastructure identified by `id`.
    async fn import_state(
        &self,
        info: &InstanceInfo,
        id: &str,
    ) -> Result<Vec<InstanceState>, PluginError>;

    /// Lists the resource types the provider supports.
    async fn resources(&self) -> Result<Vec<ResourceType>, PluginError>;

    /// Validates one data source's configuration.
    async fn validate_data_source(
        &self,
        type_name: &str,
        config: &ResourceConfig,
    ) -> ValidateResult;

    /// Plans a data source read.
    async fn read_data_diff(
        &self,
        info: &InstanceInfo,
        config: &ResourceConfig,
    ) -> Result<Option<InstanceDiff>, PluginError>;

    /// Performs a planned data source read.
    async fn read_data_apply(
        &self,
        info: &InstanceInfo,
        diff: Option<&InstanceDiff>,
    ) -> Result<Option<InstanceState>, PluginError>;

    /// Lists the data sources the provider supports.
    async fn data_sources(&self) -> Result<Vec<DataSource>, PluginError>;

    /// Asks in-flight operations to stop.
    async fn stop(&self) -> Result<(), PluginError>;
}

/// Runs provisioning steps against a created resource.
#[async_trait]
pub trait ResourceProvisioner: Send + Sync {
    /// Validates the provisioner configuration.
    async fn validate(&self, config: &ResourceConfig) -> ValidateResult;

    /// Runs the provisioner, reporting progress through `output`.
    async fn apply(
        &self,
        output: &dyn UiOutput,
        state: Option<&InstanceState>,
        config: &ResourceConfig,
    ) -> Result<(), PluginError>;

    /// Asks a running apply to stop.
    async fn stop(&self) -> Result<(), PluginError>;
}
