//! Plugins required by the current build

/// Identifiers of loaded plugins, unique and in load order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginRegistry {
    plugins: Vec<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.plugins.iter().any(|p| p == identifier)
    }

    /// Add `identifier`; returns `false` if it was already present
    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        let identifier = identifier.into();
        if self.contains(&identifier) {
            return false;
        }
        self.plugins.push(identifier);
        true
    }

    /// Remove `identifier`; returns `false` if it was not present
    pub fn remove(&mut self, identifier: &str) -> bool {
        match self.plugins.iter().position(|p| p == identifier) {
            Some(index) => {
                self.plugins.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every identifier added after the first `len`
    pub fn truncate(&mut self, len: usize) {
        self.plugins.truncate(len);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.plugins
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_unique_and_ordered() {
        let mut registry = PluginRegistry::new();
        assert!(registry.insert("core"));
        assert!(registry.insert("pypi:brix-lint"));
        assert!(!registry.insert("core"));
        assert_eq!(registry.as_slice(), ["core", "pypi:brix-lint"]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut registry = PluginRegistry::new();
        registry.insert("a");
        registry.insert("b");
        registry.insert("c");
        assert!(registry.remove("b"));
        assert!(!registry.remove("b"));
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_truncate_restores_earlier_state() {
        let mut registry = PluginRegistry::new();
        registry.insert("core");
        let mark = registry.len();
        registry.insert("outer");
        registry.insert("lint");
        registry.truncate(mark);
        assert_eq!(registry.as_slice(), ["core"]);
    }
}
