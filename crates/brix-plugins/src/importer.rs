//! Module import
//!
//! Loader strategies turn a module name into a [`BuildModule`] through a
//! [`ModuleImporter`]. [`StaticImporter`] serves modules compiled into the
//! host; each registered factory builds a fresh module on every import.

use ahash::AHashMap;
use brix_graph::BuildModule;

use crate::errors::ImportError;

/// Builds a module's contributions
pub type ModuleFactory = fn() -> BuildModule;

pub trait ModuleImporter {
    fn import(&self, name: &str) -> Result<BuildModule, ImportError>;
}

/// Importer backed by factories linked into the host
#[derive(Debug, Clone, Default)]
pub struct StaticImporter {
    modules: AHashMap<String, ModuleFactory>,
}

impl StaticImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, factory: ModuleFactory) -> &mut Self {
        self.modules.insert(name.into(), factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Registered module names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ModuleImporter for StaticImporter {
    fn import(&self, name: &str) -> Result<BuildModule, ImportError> {
        self.modules
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ImportError::NotFound(name.to_string()))
    }
}
