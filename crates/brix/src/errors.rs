//! Error types for the build lifecycle

use std::path::PathBuf;

use brix_graph::EngineError;
use brix_plugins::PluginError;
use thiserror::Error;

/// Errors that abort build preparation or execution
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Project validation failed: {}", .0.join("; "))]
    ProjectValidation(Vec<String>),

    #[error("No default task given for project '{0}'")]
    NoDefaultTask(String),

    #[error("Project directory {} is not usable: {reason}", path.display())]
    ProjectDirectory { path: PathBuf, reason: String },

    #[error("Build has not been prepared")]
    NotPrepared,
}
