//! Brix plugin resolution
//!
//! A plugin identifier is turned into a [`BuildModule`](brix_graph::BuildModule)
//! by a chain of loader strategies:
//!
//! 1. [`BuiltinPluginLoader`]: plugins shipped with the host, imported under
//!    `<namespace>.plugins.<name>_plugin`.
//! 2. [`ThirdPartyPluginLoader`]: already installed `pypi:`/`vcs:` plugins.
//! 3. [`DownloadingPluginLoader`]: installs the plugin with the configured
//!    package installer, then imports it like the third-party loader.
//!
//! [`DispatchingPluginLoader`] walks the chain, falling through on
//! [`LoaderOutcome::Retryable`] and stopping on [`LoaderOutcome::Fatal`].
//! Every loaded module is checked against the host version by [`VersionGate`].

pub mod dispatch;
pub mod errors;
pub mod identifier;
pub mod importer;
pub mod installer;
pub mod loader;
pub mod version_gate;

pub use dispatch::DispatchingPluginLoader;
pub use errors::{ImportError, LoaderOutcome, PluginError, RequirementError};
pub use identifier::{PluginRequest, Protocol, PYPI_PLUGIN_PROTOCOL, VCS_PLUGIN_PROTOCOL};
pub use importer::{ModuleFactory, ModuleImporter, StaticImporter};
pub use installer::{PackageInstaller, ProcessRunner, SystemProcessRunner};
pub use loader::{
    BuiltinPluginLoader, DownloadingPluginLoader, PluginLoader, ThirdPartyPluginLoader,
};
pub use version_gate::{host_version, parse_requirement, HostRequirement, VersionGate};
