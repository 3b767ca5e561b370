//! Collaborators the protocol relies on but does not implement.
//!
//! How the bundle manifest is parsed and how a BA gets loaded live outside
//! this crate. [`MetadataProvider`] exposes the package and variable tables
//! read-only; [`ApplicationLoader`] produces a ready
//! [`BootstrapperApplication`] however it is hosted.
//!
//! [`MetadataEngine`] answers the read-only engine operations from a
//! metadata provider, which is enough for an engine stub or a test harness.

use std::collections::HashMap;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::channel::PipeChannel;
use crate::dispatch::{BootstrapperApplication, Dispatcher};
use crate::engine::fill_string;
use crate::error::{BawireError, Result};
use crate::messages::engine::*;
use crate::messages::types::{Action, CacheType};

/// One package from the bundle manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub id: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub permanent: bool,
    pub vital: bool,
    pub cache_type: CacheType,
    pub install_size: u64,
}

impl PackageInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            description: None,
            permanent: false,
            vital: true,
            cache_type: CacheType::default(),
            install_size: 0,
        }
    }
}

/// Value of a bundle variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableValue {
    Numeric(i64),
    String(String),
    Version(String),
}

/// Read-only view of the bundle's packages and variables.
pub trait MetadataProvider: Send + Sync {
    fn packages(&self) -> &[PackageInfo];

    fn variable(&self, name: &str) -> Option<&VariableValue>;

    fn package(&self, id: &str) -> Option<&PackageInfo> {
        self.packages().iter().find(|package| package.id == id)
    }

    fn package_count(&self) -> usize {
        self.packages().len()
    }
}

/// In-memory metadata.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    packages: Vec<PackageInfo>,
    variables: HashMap<String, VariableValue>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package: PackageInfo) -> Self {
        self.packages.push(package);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: VariableValue) -> Self {
        self.variables.insert(name.into(), value);
        self
    }
}

impl MetadataProvider for StaticMetadata {
    fn packages(&self) -> &[PackageInfo] {
        &self.packages
    }

    fn variable(&self, name: &str) -> Option<&VariableValue> {
        self.variables.get(name)
    }
}

/// How the engine was asked to run the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapperCommand {
    pub action: Action,
    pub command_line: String,
    pub layout_directory: Option<String>,
    pub bundle_source_path: Option<String>,
}

impl Default for BootstrapperCommand {
    fn default() -> Self {
        Self {
            action: Action::Install,
            command_line: String::new(),
            layout_directory: None,
            bundle_source_path: None,
        }
    }
}

/// Produces the bootstrapper application.
pub trait ApplicationLoader {
    fn load(&self, command: &BootstrapperCommand) -> Result<Box<dyn BootstrapperApplication>>;
}

impl<F> ApplicationLoader for F
where
    F: Fn(&BootstrapperCommand) -> Result<Box<dyn BootstrapperApplication>>,
{
    fn load(&self, command: &BootstrapperCommand) -> Result<Box<dyn BootstrapperApplication>> {
        self(command)
    }
}

/// Load the BA and pump notifications to it until the engine disconnects.
pub async fn run_application<S, L>(
    loader: &L,
    command: &BootstrapperCommand,
    channel: PipeChannel<S>,
) -> Result<Box<dyn BootstrapperApplication>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    L: ApplicationLoader + ?Sized,
{
    let app = loader.load(command)?;
    tracing::debug!(action = ?command.action, "application loaded");

    let mut dispatcher = Dispatcher::new(channel, app);
    dispatcher.run().await?;

    let (_, app) = dispatcher.into_parts();
    Ok(app)
}

/// Engine callbacks backed by a [`MetadataProvider`].
///
/// Serves the package count and variable reads. Everything else keeps the
/// default behaviour of [`EngineCallbacks`].
pub struct MetadataEngine<M> {
    metadata: M,
}

impl<M: MetadataProvider> MetadataEngine<M> {
    pub fn new(metadata: M) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    fn lookup(&self, variable: Option<&str>) -> Result<&VariableValue> {
        let name = variable.ok_or_else(|| {
            BawireError::InvalidArgument("variable name is required".to_string())
        })?;
        self.metadata.variable(name).ok_or(BawireError::NotFound)
    }
}

impl<M: MetadataProvider> EngineCallbacks for MetadataEngine<M> {
    fn get_package_count(
        &mut self,
        _args: &GetPackageCountArgs,
        results: &mut GetPackageCountResults,
    ) -> Result<()> {
        results.package_count = self.metadata.package_count() as u32;
        Ok(())
    }

    fn get_variable_numeric(
        &mut self,
        args: &GetVariableNumericArgs,
        results: &mut GetVariableNumericResults,
    ) -> Result<()> {
        results.value = match self.lookup(args.variable.as_deref())? {
            VariableValue::Numeric(value) => *value,
            VariableValue::String(value) | VariableValue::Version(value) => {
                value.parse::<i64>().map_err(|_| {
                    BawireError::InvalidArgument(format!("not a number: {}", value))
                })?
            }
        };
        Ok(())
    }

    fn get_variable_string(
        &mut self,
        args: &GetVariableStringArgs,
        results: &mut GetVariableStringResults,
    ) -> Result<()> {
        let value = match self.lookup(args.variable.as_deref())? {
            VariableValue::Numeric(value) => value.to_string(),
            VariableValue::String(value) | VariableValue::Version(value) => value.clone(),
        };
        fill_string(&mut results.cch_value, &mut results.value, &value)
    }

    fn get_variable_version(
        &mut self,
        args: &GetVariableVersionArgs,
        results: &mut GetVariableVersionResults,
    ) -> Result<()> {
        match self.lookup(args.variable.as_deref())? {
            VariableValue::Version(value) => {
                fill_string(&mut results.cch_value, &mut results.value, value)
            }
            _ => Err(BawireError::InvalidArgument(
                "variable is not a version".to_string(),
            )),
        }
    }
}
