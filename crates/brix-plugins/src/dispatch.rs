//! Dispatch across loader strategies

use std::sync::Arc;

use brix_config::Config;
use brix_graph::BuildModule;
use brix_logger as logger;

use crate::errors::{LoaderOutcome, PluginError};
use crate::identifier::PluginRequest;
use crate::importer::ModuleImporter;
use crate::installer::PackageInstaller;
use crate::loader::{
    BuiltinPluginLoader, DownloadingPluginLoader, PluginLoader, ThirdPartyPluginLoader,
};
use crate::version_gate::VersionGate;

/// Tries each loader in order until one does not report a missing plugin
pub struct DispatchingPluginLoader {
    loaders: Vec<Box<dyn PluginLoader>>,
}

impl DispatchingPluginLoader {
    pub fn new(loaders: Vec<Box<dyn PluginLoader>>) -> Self {
        Self { loaders }
    }

    /// The canonical chain: builtin, installed third-party, download
    pub fn with_defaults(
        importer: Arc<dyn ModuleImporter>,
        installer: PackageInstaller,
        gate: VersionGate,
        namespace: &str,
    ) -> Self {
        let thirdparty = ThirdPartyPluginLoader::new(Arc::clone(&importer), gate.clone());
        Self::new(vec![
            Box::new(BuiltinPluginLoader::new(
                Arc::clone(&importer),
                gate,
                namespace,
            )),
            Box::new(thirdparty.clone()),
            Box::new(DownloadingPluginLoader::new(installer, thirdparty)),
        ])
    }

    /// The canonical chain using the installer and namespace from `config`
    pub fn from_config(importer: Arc<dyn ModuleImporter>, config: &Config) -> Self {
        Self::with_defaults(
            importer,
            PackageInstaller::from_config(config),
            VersionGate::default(),
            &config.get_plugin_namespace(),
        )
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Load the plugin behind `request`
    ///
    /// A missing plugin moves on to the next loader and only the last such
    /// error is kept. Any other error is returned immediately.
    pub fn load(&self, request: &PluginRequest) -> Result<BuildModule, PluginError> {
        let mut last_error = None;

        for loader in &self.loaders {
            match loader.load(request) {
                Ok(module) => {
                    logger::debug(&format!(
                        "Plugin '{}' loaded by the {} loader",
                        request.identifier(),
                        loader.name()
                    ));
                    return Ok(module);
                }
                Err(LoaderOutcome::Retryable(e)) => {
                    logger::debug(&format!("{} loader: {}", loader.name(), e));
                    last_error = Some(e);
                }
                Err(LoaderOutcome::Fatal(e)) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PluginError::missing(request.identifier(), "no plugin loaders configured")
        }))
    }
}

impl PluginLoader for DispatchingPluginLoader {
    fn load(&self, request: &PluginRequest) -> Result<BuildModule, LoaderOutcome> {
        DispatchingPluginLoader::load(self, request).map_err(PluginError::into_outcome)
    }

    fn name(&self) -> &'static str {
        "dispatching"
    }
}

impl std::fmt::Debug for DispatchingPluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.loaders.iter().map(|l| l.name()).collect();
        f.debug_struct("DispatchingPluginLoader")
            .field("loaders", &names)
            .finish()
    }
}
