//! Plugin identifiers
//!
//! An identifier is `[pypi:|vcs:]<name>[<version-range>]`. Identifiers without
//! a protocol name builtin plugins. A `vcs:` identifier names a remote
//! location, which cannot name the importable module, so it must come with an
//! explicit module name.

use std::fmt;

use crate::errors::PluginError;

pub const PYPI_PLUGIN_PROTOCOL: &str = "pypi:";
pub const VCS_PLUGIN_PROTOCOL: &str = "vcs:";

/// Characters that start a version range embedded in a `pypi:` identifier
const VERSION_RANGE_START: &[char] = &['<', '>', '=', '!', '~', '[', ' ', ';'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Builtin,
    Pypi,
    Vcs,
}

impl Protocol {
    pub fn of(identifier: &str) -> Self {
        if identifier.starts_with(PYPI_PLUGIN_PROTOCOL) {
            Protocol::Pypi
        } else if identifier.starts_with(VCS_PLUGIN_PROTOCOL) {
            Protocol::Vcs
        } else {
            Protocol::Builtin
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Protocol::Builtin => "",
            Protocol::Pypi => PYPI_PLUGIN_PROTOCOL,
            Protocol::Vcs => VCS_PLUGIN_PROTOCOL,
        }
    }
}

/// A request to load one plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRequest {
    identifier: String,
    protocol: Protocol,
    version: Option<String>,
    module_name: Option<String>,
}

impl PluginRequest {
    pub fn new(
        identifier: impl Into<String>,
        version: Option<&str>,
        module_name: Option<&str>,
    ) -> Result<Self, PluginError> {
        let identifier = identifier.into();
        let protocol = Protocol::of(&identifier);
        let module_name = module_name
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        if protocol == Protocol::Vcs && module_name.is_none() {
            return Err(PluginError::UnspecifiedName(identifier));
        }

        Ok(Self {
            identifier,
            protocol,
            version: version
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            module_name,
        })
    }

    /// The identifier exactly as requested
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn module_name(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// The identifier with its protocol prefix removed
    pub fn bare_name(&self) -> &str {
        &self.identifier[self.protocol.prefix().len()..]
    }

    /// The package name without any embedded version range
    pub fn package_name(&self) -> &str {
        let bare = self.bare_name();
        match self.protocol {
            Protocol::Vcs => bare,
            Protocol::Builtin | Protocol::Pypi => bare
                .split(VERSION_RANGE_START)
                .next()
                .unwrap_or(bare)
                .trim(),
        }
    }
}

impl fmt::Display for PluginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(ref version) => write!(f, "{} version {}", self.identifier, version),
            None => write!(f, "{}", self.identifier),
        }
    }
}
