//! Loader strategies
//!
//! Each strategy tries one way of turning a [`PluginRequest`] into a
//! [`BuildModule`]. A strategy that cannot find the plugin returns
//! [`LoaderOutcome::Retryable`]; one that finds an unusable plugin returns
//! [`LoaderOutcome::Fatal`].

use std::sync::Arc;

use brix_graph::BuildModule;
use brix_logger as logger;

use crate::errors::{LoaderOutcome, PluginError};
use crate::identifier::{PluginRequest, Protocol};
use crate::importer::ModuleImporter;
use crate::installer::PackageInstaller;
use crate::version_gate::VersionGate;

pub trait PluginLoader {
    fn load(&self, request: &PluginRequest) -> Result<BuildModule, LoaderOutcome>;

    /// Short name used in log output
    fn name(&self) -> &'static str;
}

/// Import `module_name` and check it against the host version
fn import_checked(
    importer: &dyn ModuleImporter,
    gate: &VersionGate,
    request: &PluginRequest,
    module_name: &str,
) -> Result<BuildModule, LoaderOutcome> {
    logger::debug(&format!(
        "Importing module '{}' for plugin '{}'",
        module_name,
        request.identifier()
    ));

    let module = importer
        .import(module_name)
        .map_err(|e| PluginError::missing(request.identifier(), e.to_string()))?;

    gate.check(request.identifier(), module.host_requirement())?;
    Ok(module)
}

/// Loads plugins shipped with the host
#[derive(Clone)]
pub struct BuiltinPluginLoader {
    importer: Arc<dyn ModuleImporter>,
    gate: VersionGate,
    namespace: String,
}

impl BuiltinPluginLoader {
    pub fn new(
        importer: Arc<dyn ModuleImporter>,
        gate: VersionGate,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            importer,
            gate,
            namespace: namespace.into(),
        }
    }

    /// Conventional module name of a builtin plugin
    pub fn module_name_for(&self, plugin: &str) -> String {
        format!("{}.plugins.{}_plugin", self.namespace, plugin)
    }
}

impl PluginLoader for BuiltinPluginLoader {
    fn load(&self, request: &PluginRequest) -> Result<BuildModule, LoaderOutcome> {
        let module_name = match (request.module_name(), request.protocol()) {
            (Some(explicit), _) => explicit.to_string(),
            (None, Protocol::Builtin) => self.module_name_for(request.identifier()),
            (None, _) => {
                return Err(LoaderOutcome::Retryable(PluginError::missing(
                    request.identifier(),
                    "not a builtin plugin",
                )))
            }
        };
        import_checked(self.importer.as_ref(), &self.gate, request, &module_name)
    }

    fn name(&self) -> &'static str {
        "builtin"
    }
}

/// Loads plugins that are already installed
#[derive(Clone)]
pub struct ThirdPartyPluginLoader {
    importer: Arc<dyn ModuleImporter>,
    gate: VersionGate,
}

impl ThirdPartyPluginLoader {
    pub fn new(importer: Arc<dyn ModuleImporter>, gate: VersionGate) -> Self {
        Self { importer, gate }
    }
}

impl PluginLoader for ThirdPartyPluginLoader {
    fn load(&self, request: &PluginRequest) -> Result<BuildModule, LoaderOutcome> {
        let module_name = match (request.module_name(), request.protocol()) {
            (Some(explicit), _) => explicit,
            (None, Protocol::Vcs) => {
                return Err(LoaderOutcome::Fatal(PluginError::UnspecifiedName(
                    request.identifier().to_string(),
                )))
            }
            (None, Protocol::Pypi | Protocol::Builtin) => request.package_name(),
        };
        import_checked(self.importer.as_ref(), &self.gate, request, module_name)
    }

    fn name(&self) -> &'static str {
        "third-party"
    }
}

/// Installs the plugin package, then loads it like [`ThirdPartyPluginLoader`]
#[derive(Clone, Debug)]
pub struct DownloadingPluginLoader {
    installer: PackageInstaller,
    thirdparty: ThirdPartyPluginLoader,
}

impl DownloadingPluginLoader {
    pub fn new(installer: PackageInstaller, thirdparty: ThirdPartyPluginLoader) -> Self {
        Self {
            installer,
            thirdparty,
        }
    }
}

impl PluginLoader for DownloadingPluginLoader {
    fn load(&self, request: &PluginRequest) -> Result<BuildModule, LoaderOutcome> {
        // builtin identifiers have no package to install
        PackageInstaller::package_reference(request)?;

        logger::spinner_start(&format!("Installing plugin {}", request));

        if let Err(e) = self.installer.install(request) {
            logger::spinner_error(&format!("Failed to install plugin {}", request.identifier()));
            return Err(e.into_outcome());
        }
        logger::spinner_success(&format!("Installed plugin {}", request.identifier()));

        self.thirdparty.load(request)
    }

    fn name(&self) -> &'static str {
        "downloading"
    }
}

impl std::fmt::Debug for BuiltinPluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinPluginLoader")
            .field("gate", &self.gate)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ThirdPartyPluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThirdPartyPluginLoader")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
