//! Host-version compatibility checks
//!
//! A module may declare the range of host versions it works with, e.g.
//! `">=2.0,<3.0"`. Comparators are separated by commas and follow PEP 440:
//! release numbers are zero padded, `~=X.Y` is a compatible release and `!=`
//! excludes a version or a `.*` prefix. Comparators without an operator are
//! handed to semver unchanged.

use semver::{Version, VersionReq};

use crate::errors::{PluginError, RequirementError};

/// The running host's version
pub fn host_version() -> Version {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 1))
}

/// Checks module requirements against one host version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGate {
    host: Version,
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::new(host_version())
    }
}

impl VersionGate {
    pub fn new(host: Version) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Version {
        &self.host
    }

    /// Pass when there is no requirement or the host satisfies it
    pub fn check(&self, plugin: &str, requirement: Option<&str>) -> Result<(), PluginError> {
        let Some(requirement) = requirement.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(());
        };

        let parsed = parse_requirement(requirement).map_err(|e| PluginError::InvalidRequirement {
            plugin: plugin.to_string(),
            requirement: requirement.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.matches(&self.comparable_host()) {
            Ok(())
        } else {
            Err(PluginError::Incompatible {
                plugin: plugin.to_string(),
                requirement: requirement.to_string(),
                actual: self.host.clone(),
            })
        }
    }

    // Ranges never match pre-releases of other versions, so a pre-release
    // host is compared as its release.
    fn comparable_host(&self) -> Version {
        if self.host.pre.is_empty() {
            self.host.clone()
        } else {
            Version::new(self.host.major, self.host.minor, self.host.patch)
        }
    }
}

/// A parsed host requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRequirement {
    range: VersionReq,
    // semver has no `!=`, exclusions are checked after the range
    excluded: Vec<VersionReq>,
}

impl HostRequirement {
    pub fn matches(&self, version: &Version) -> bool {
        self.range.matches(version) && !self.excluded.iter().any(|e| e.matches(version))
    }
}

/// Parse a requirement string into a semver range plus exclusions
pub fn parse_requirement(requirement: &str) -> Result<HostRequirement, RequirementError> {
    let mut range = Vec::new();
    let mut excluded = Vec::new();

    for comparator in requirement.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if let Some(rest) = comparator.strip_prefix("~=") {
            let (lower, upper) = compatible_release(rest.trim())?;
            range.push(format!(">={}", lower));
            range.push(format!("<{}", upper));
        } else if let Some(rest) = comparator.strip_prefix("!=") {
            excluded.push(VersionReq::parse(&format!("={}", exact(rest.trim())))?);
        } else if let Some(rest) = comparator.strip_prefix("==") {
            range.push(format!("={}", exact(rest.trim())));
        } else if let Some((op, rest)) = split_operator(comparator) {
            range.push(format!("{}{}", op, pad_release(rest.trim())));
        } else {
            range.push(comparator.to_string());
        }
    }

    let range = if range.is_empty() {
        VersionReq::STAR
    } else {
        VersionReq::parse(&range.join(", "))?
    };
    Ok(HostRequirement { range, excluded })
}

fn split_operator(comparator: &str) -> Option<(&'static str, &str)> {
    [">=", "<=", ">", "<"]
        .into_iter()
        .find_map(|op| comparator.strip_prefix(op).map(|rest| (op, rest)))
}

fn release_segments(version: &str) -> Option<Vec<u64>> {
    version
        .split('.')
        .map(|segment| segment.parse::<u64>().ok())
        .collect()
}

/// `1.2` becomes `1.2.0`; anything but a plain release is left alone
fn pad_release(version: &str) -> String {
    match release_segments(version) {
        Some(segments) if segments.len() < 3 => {
            let mut padded = segments;
            padded.resize(3, 0);
            join_release(&padded)
        }
        _ => version.to_string(),
    }
}

/// Operand of `==` and `!=`: a `.*` suffix keeps semver's prefix match
fn exact(version: &str) -> String {
    match version.strip_suffix(".*") {
        Some(prefix) => prefix.to_string(),
        None => pad_release(version),
    }
}

/// Bounds of `~=version`
fn compatible_release(version: &str) -> Result<(String, String), RequirementError> {
    let segments = release_segments(version)
        .filter(|s| (2..=3).contains(&s.len()))
        .ok_or_else(|| RequirementError::CompatibleRelease(version.to_string()))?;

    let mut upper = segments[..segments.len() - 1].to_vec();
    if let Some(last) = upper.last_mut() {
        *last = last.saturating_add(1);
    }
    upper.resize(3, 0);

    let mut lower = segments;
    lower.resize(3, 0);
    Ok((join_release(&lower), join_release(&upper)))
}

fn join_release(segments: &[u64]) -> String {
    segments
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
