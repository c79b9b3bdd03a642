use semver::Version;
use thiserror::Error;

/// Errors that can occur while resolving a plugin
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin '{plugin}' not found: {reason}")]
    Missing { plugin: String, reason: String },

    #[error("Plugin '{plugin}' is not compatible with this host: requires brix {requirement}, but brix {actual} is running")]
    Incompatible {
        plugin: String,
        requirement: String,
        actual: Version,
    },

    #[error("Plugin '{0}' uses the 'vcs:' protocol and needs an explicit module name")]
    UnspecifiedName(String),

    #[error("Plugin '{plugin}' declares an invalid host requirement '{requirement}': {reason}")]
    InvalidRequirement {
        plugin: String,
        requirement: String,
        reason: String,
    },
}

impl PluginError {
    pub fn missing(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        PluginError::Missing {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }

    /// Only a missing plugin lets the next loader strategy try
    pub fn into_outcome(self) -> LoaderOutcome {
        match self {
            PluginError::Missing { .. } => LoaderOutcome::Retryable(self),
            _ => LoaderOutcome::Fatal(self),
        }
    }
}

/// Failure of a single loader strategy
#[derive(Debug)]
pub enum LoaderOutcome {
    /// The strategy could not find the plugin; the next one may
    Retryable(PluginError),
    /// The plugin was found but cannot be used; stop resolving
    Fatal(PluginError),
}

impl LoaderOutcome {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoaderOutcome::Retryable(_))
    }

    pub fn into_error(self) -> PluginError {
        match self {
            LoaderOutcome::Retryable(e) | LoaderOutcome::Fatal(e) => e,
        }
    }
}

impl From<PluginError> for LoaderOutcome {
    fn from(e: PluginError) -> Self {
        e.into_outcome()
    }
}

/// Errors from the module importer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("No module named '{0}'")]
    NotFound(String),

    #[error("Failed to import module '{module}': {reason}")]
    Failed { module: String, reason: String },
}


/// Errors from parsing a host requirement
#[derive(Error, Debug)]
pub enum RequirementError {
    #[error(transparent)]
    Semver(#[from] semver::Error),

    #[error("'~={0}' needs two or three numeric release segments")]
    CompatibleRelease(String),
}
