//! The project being built

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::module::ProjectAttributes;

/// Version assigned to projects that do not declare one
pub const DEFAULT_PROJECT_VERSION: &str = "1.0.dev0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub basedir: PathBuf,
    pub name: String,
    pub version: String,
    pub default_task: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub home_page: Option<String>,
    pub authors: Vec<String>,
    pub license: Option<String>,
    pub url: Option<String>,
    properties: BTreeMap<String, String>,
}

impl Project {
    /// Create a project named after the last component of `basedir`
    pub fn new(basedir: impl AsRef<Path>) -> Self {
        let basedir = basedir.as_ref().to_path_buf();
        let name = basedir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            basedir,
            name,
            version: DEFAULT_PROJECT_VERSION.to_string(),
            default_task: Vec::new(),
            summary: None,
            description: None,
            home_page: None,
            authors: Vec::new(),
            license: None,
            url: None,
            properties: BTreeMap::new(),
        }
    }

    /// Copy the attributes a build descriptor declares onto the project
    pub fn apply_attributes(&mut self, attributes: &ProjectAttributes) {
        if let Some(ref name) = attributes.name {
            self.name.clone_from(name);
        }
        if let Some(ref version) = attributes.version {
            self.version.clone_from(version);
        }
        if !attributes.default_task.is_empty() {
            self.default_task.clone_from(&attributes.default_task);
        }
        if attributes.summary.is_some() {
            self.summary.clone_from(&attributes.summary);
        }
        if attributes.description.is_some() {
            self.description.clone_from(&attributes.description);
        }
        if attributes.home_page.is_some() {
            self.home_page.clone_from(&attributes.home_page);
        }
        if !attributes.authors.is_empty() {
            self.authors.clone_from(&attributes.authors);
        }
        if attributes.license.is_some() {
            self.license.clone_from(&attributes.license);
        }
        if attributes.url.is_some() {
            self.url.clone_from(&attributes.url);
        }
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Properties in key order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Validation messages; empty when the project is valid
    pub fn validate(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if self.name.trim().is_empty() {
            messages.push("Project name must not be empty".to_string());
        }
        if self.version.trim().is_empty() {
            messages.push("Project version must not be empty".to_string());
        }
        messages
    }
}
