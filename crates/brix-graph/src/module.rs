//! Build modules: the unit a plugin or build descriptor contributes
//!
//! Contributions are registered through explicit calls instead of being
//! discovered on the module:
//!
//! ```
//! use brix_graph::{optional, BuildModule};
//!
//! let mut module = BuildModule::new("acme.plugins.docs_plugin").requires_host(">=0.3");
//! let compile = module.task("compile_docs", |_| Ok(())).handle();
//! module
//!     .task("publish_docs", |_| Ok(()))
//!     .depends_on(&compile)
//!     .depends_on(optional("spellcheck"))
//!     .description("Upload the rendered documentation");
//! module.action("announce", |_| Ok(())).after(["publish_docs"]).only_once();
//! module.initializer("init_docs", |_| Ok(())).environments(["ci"]);
//!
//! assert_eq!(module.candidates().len(), 4);
//! ```

use crate::contribution::{
    ActionMarker, Candidate, Dependency, InitializerMarker, Target, TaskHandle, TaskMarker,
};
use crate::engine::BuildContext;

/// Project attributes a build descriptor may declare
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectAttributes {
    pub name: Option<String>,
    pub version: Option<String>,
    pub default_task: Vec<String>,
    pub summary: Option<String>,
    pub home_page: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub license: Option<String>,
    pub url: Option<String>,
}

/// A plugin a build descriptor asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPlugin {
    pub identifier: String,
    pub version: Option<String>,
    pub module_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BuildModule {
    name: String,
    host_requirement: Option<String>,
    attributes: ProjectAttributes,
    required_plugins: Vec<RequiredPlugin>,
    candidates: Vec<Candidate>,
}

impl BuildModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declare the range of host versions the module is compatible with
    pub fn requires_host(mut self, requirement: impl Into<String>) -> Self {
        self.host_requirement = Some(requirement.into());
        self
    }

    pub fn with_attributes(mut self, attributes: ProjectAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host_requirement(&self) -> Option<&str> {
        self.host_requirement.as_deref()
    }

    pub fn attributes(&self) -> &ProjectAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut ProjectAttributes {
        &mut self.attributes
    }

    pub fn required_plugins(&self) -> &[RequiredPlugin] {
        &self.required_plugins
    }

    /// Candidates in registration order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Ask for a plugin to be loaded before this module's contributions
    pub fn use_plugin(
        &mut self,
        identifier: impl Into<String>,
        version: Option<&str>,
        module_name: Option<&str>,
    ) -> &mut Self {
        self.required_plugins.push(RequiredPlugin {
            identifier: identifier.into(),
            version: version.map(str::to_string),
            module_name: module_name.map(str::to_string),
        });
        self
    }

    pub fn add(&mut self, candidate: Candidate) -> &mut Self {
        self.candidates.push(candidate);
        self
    }

    pub fn task<F>(&mut self, identifier: impl Into<String>, body: F) -> TaskBuilder<'_>
    where
        F: Fn(&BuildContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let candidate = Candidate::new(identifier, body).mark_task(TaskMarker::default());
        TaskBuilder {
            candidate: self.push(candidate),
        }
    }

    pub fn action<F>(&mut self, identifier: impl Into<String>, body: F) -> ActionBuilder<'_>
    where
        F: Fn(&BuildContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let candidate = Candidate::new(identifier, body).mark_action(ActionMarker::default());
        ActionBuilder {
            candidate: self.push(candidate),
        }
    }

    pub fn initializer<F>(
        &mut self,
        identifier: impl Into<String>,
        body: F,
    ) -> InitializerBuilder<'_>
    where
        F: Fn(&BuildContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let candidate =
            Candidate::new(identifier, body).mark_initializer(InitializerMarker::default());
        InitializerBuilder {
            candidate: self.push(candidate),
        }
    }

    fn push(&mut self, candidate: Candidate) -> &mut Candidate {
        let index = self.candidates.len();
        self.candidates.push(candidate);
        &mut self.candidates[index]
    }
}

/// Builder for a task just added to a module
pub struct TaskBuilder<'a> {
    candidate: &'a mut Candidate,
}

impl TaskBuilder<'_> {
    pub fn named(self, name: impl Into<String>) -> Self {
        self.candidate.set_name(name.into());
        self
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.candidate.set_description(description.into());
        self
    }

    /// Add a forward dependency; declaration order is kept
    pub fn depends_on(self, dependency: impl Into<Dependency>) -> Self {
        if let Some(marker) = self.candidate.task_marker_mut() {
            marker.depends.push(dependency.into());
        }
        self
    }

    /// Declare that another task depends on this one
    pub fn dependent(self, dependent: impl Into<Dependency>) -> Self {
        if let Some(marker) = self.candidate.task_marker_mut() {
            marker.dependents.push(dependent.into());
        }
        self
    }

    /// Handle referring to this task under its normalized name
    pub fn handle(self) -> TaskHandle {
        TaskHandle::new(self.candidate.normalized_name())
    }
}

/// Builder for an action just added to a module
pub struct ActionBuilder<'a> {
    candidate: &'a mut Candidate,
}

impl ActionBuilder<'_> {
    pub fn named(self, name: impl Into<String>) -> Self {
        self.candidate.set_name(name.into());
        self
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.candidate.set_description(description.into());
        self
    }

    /// Run the action before each of the given tasks
    pub fn before<I, T>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Target>,
    {
        if let Some(marker) = self.candidate.action_marker_mut() {
            marker.before.extend(targets.into_iter().map(Into::into));
        }
        self
    }

    /// Run the action after each of the given tasks
    pub fn after<I, T>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Target>,
    {
        if let Some(marker) = self.candidate.action_marker_mut() {
            marker.after.extend(targets.into_iter().map(Into::into));
        }
        self
    }

    pub fn only_once(self) -> Self {
        if let Some(marker) = self.candidate.action_marker_mut() {
            marker.only_once = true;
        }
        self
    }

    pub fn teardown(self) -> Self {
        if let Some(marker) = self.candidate.action_marker_mut() {
            marker.teardown = true;
        }
        self
    }
}

/// Builder for an initializer just added to a module
pub struct InitializerBuilder<'a> {
    candidate: &'a mut Candidate,
}

impl InitializerBuilder<'_> {
    pub fn named(self, name: impl Into<String>) -> Self {
        self.candidate.set_name(name.into());
        self
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.candidate.set_description(description.into());
        self
    }

    /// Restrict the initializer to the given environments
    pub fn environments<I, S>(self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(marker) = self.candidate.initializer_marker_mut() {
            marker
                .environments
                .extend(environments.into_iter().map(Into::into));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::Role;

    #[test]
    fn test_task_builder_records_markers() {
        let mut module = BuildModule::new("build");
        module
            .task("package", |_| Ok(()))
            .depends_on("compile")
            .dependent("publish")
            .description("Create the distribution");

        let candidate = &module.candidates()[0];
        assert_eq!(candidate.description(), "Create the distribution");
        let Some(Role::Task(marker)) = candidate.role() else {
            panic!("expected a task");
        };
        assert_eq!(marker.depends, vec![Dependency::from("compile")]);
        assert_eq!(marker.dependents, vec![Dependency::from("publish")]);
    }

    #[test]
    fn test_handle_uses_explicit_name() {
        let mut module = BuildModule::new("build");
        let handle = module.task("do_compile", |_| Ok(())).named("compile").handle();
        assert_eq!(handle.name(), "compile");
    }

    #[test]
    fn test_action_builder_flags() {
        let mut module = BuildModule::new("build");
        module
            .action("cleanup", |_| Ok(()))
            .before(["package"])
            .teardown();

        let Some(Role::Action(marker)) = module.candidates()[0].role() else {
            panic!("expected an action");
        };
        assert_eq!(marker.before, vec![Target::from("package")]);
        assert!(marker.after.is_empty());
        assert!(marker.teardown);
        assert!(!marker.only_once);
    }

    #[test]
    fn test_use_plugin_keeps_order() {
        let mut module = BuildModule::new("build");
        module
            .use_plugin("core", None, None)
            .use_plugin("pypi:brix-lint", Some(">=1.0"), None);

        let identifiers: Vec<&str> = module
            .required_plugins()
            .iter()
            .map(|p| p.identifier.as_str())
            .collect();
        assert_eq!(identifiers, vec!["core", "pypi:brix-lint"]);
        assert_eq!(module.required_plugins()[1].version.as_deref(), Some(">=1.0"));
    }
}
