//! Contributions a build module makes to the task graph
//!
//! A [`Candidate`] is one named, callable unit of behaviour carrying role
//! markers. Once classified by the assembler it is registered as exactly one
//! of [`Task`], [`Action`] or [`Initializer`].

use std::fmt;
use std::sync::Arc;

use crate::engine::BuildContext;

/// Body of a task, action or initializer
pub type Callable = Arc<dyn Fn(&BuildContext<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Reference to a task obtained when the task was added to a module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    name: String,
}

impl TaskHandle {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A task referenced by name or by handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Name(String),
    Handle(TaskHandle),
}

impl Target {
    /// The normalized task name
    pub fn name(&self) -> &str {
        match self {
            Target::Name(name) => name,
            Target::Handle(handle) => handle.name(),
        }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Name(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Name(name)
    }
}

impl From<TaskHandle> for Target {
    fn from(handle: TaskHandle) -> Self {
        Target::Handle(handle)
    }
}

impl From<&TaskHandle> for Target {
    fn from(handle: &TaskHandle) -> Self {
        Target::Handle(handle.clone())
    }
}

/// A declared dependency value, possibly wrapped as optional
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    Direct(Target),
    Optional(Target),
    OptionalList(Vec<Target>),
}

impl Dependency {
    /// Resolve the declaration into graph edges, one per target
    pub fn resolve(&self) -> Vec<TaskDependency> {
        match self {
            Dependency::Direct(target) => vec![TaskDependency::new(target.name(), false)],
            Dependency::Optional(target) => vec![TaskDependency::new(target.name(), true)],
            Dependency::OptionalList(targets) => targets
                .iter()
                .map(|target| TaskDependency::new(target.name(), true))
                .collect(),
        }
    }
}

/// Wrap a single target as an optional dependency
pub fn optional(target: impl Into<Target>) -> Dependency {
    Dependency::Optional(target.into())
}

/// Wrap several targets as optional dependencies
pub fn optional_all<I, T>(targets: I) -> Dependency
where
    I: IntoIterator<Item = T>,
    T: Into<Target>,
{
    Dependency::OptionalList(targets.into_iter().map(Into::into).collect())
}

impl From<&str> for Dependency {
    fn from(name: &str) -> Self {
        Dependency::Direct(name.into())
    }
}

impl From<String> for Dependency {
    fn from(name: String) -> Self {
        Dependency::Direct(name.into())
    }
}

impl From<TaskHandle> for Dependency {
    fn from(handle: TaskHandle) -> Self {
        Dependency::Direct(handle.into())
    }
}

impl From<&TaskHandle> for Dependency {
    fn from(handle: &TaskHandle) -> Self {
        Dependency::Direct(handle.into())
    }
}

/// A directed edge from a task to one of its prerequisites
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskDependency {
    pub name: String,
    pub optional: bool,
}

impl TaskDependency {
    pub fn new(name: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            optional,
        }
    }
}

impl fmt::Display for TaskDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "{}?", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Task role marker: forward dependencies and reverse "dependents"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskMarker {
    pub depends: Vec<Dependency>,
    pub dependents: Vec<Dependency>,
}

/// Action role marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMarker {
    pub before: Vec<Target>,
    pub after: Vec<Target>,
    pub only_once: bool,
    pub teardown: bool,
}

/// Initializer role marker; no environments means all environments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializerMarker {
    pub environments: Vec<String>,
}

/// The role a candidate is classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role<'a> {
    Task(&'a TaskMarker),
    Action(&'a ActionMarker),
    Initializer(&'a InitializerMarker),
}

/// A callable exposed by a build module, with its role markers
#[derive(Clone)]
pub struct Candidate {
    identifier: String,
    name: Option<String>,
    description: String,
    body: Callable,
    task: Option<TaskMarker>,
    action: Option<ActionMarker>,
    initializer: Option<InitializerMarker>,
}

impl Candidate {
    pub fn new<F>(identifier: impl Into<String>, body: F) -> Self
    where
        F: Fn(&BuildContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::from_callable(identifier, Arc::new(body))
    }

    pub fn from_callable(identifier: impl Into<String>, body: Callable) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
            description: String::new(),
            body,
            task: None,
            action: None,
            initializer: None,
        }
    }

    /// Override the name the contribution is registered under
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn mark_task(mut self, marker: TaskMarker) -> Self {
        self.task = Some(marker);
        self
    }

    pub fn mark_action(mut self, marker: ActionMarker) -> Self {
        self.action = Some(marker);
        self
    }

    pub fn mark_initializer(mut self, marker: InitializerMarker) -> Self {
        self.initializer = Some(marker);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The explicit name if set, else the intrinsic identifier
    pub fn normalized_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn body(&self) -> &Callable {
        &self.body
    }

    /// Classify the candidate; task beats action beats initializer
    pub fn role(&self) -> Option<Role<'_>> {
        if let Some(ref marker) = self.task {
            Some(Role::Task(marker))
        } else if let Some(ref marker) = self.action {
            Some(Role::Action(marker))
        } else {
            self.initializer.as_ref().map(Role::Initializer)
        }
    }

    pub(crate) fn task_marker_mut(&mut self) -> Option<&mut TaskMarker> {
        self.task.as_mut()
    }

    pub(crate) fn action_marker_mut(&mut self) -> Option<&mut ActionMarker> {
        self.action.as_mut()
    }

    pub(crate) fn initializer_marker_mut(&mut self) -> Option<&mut InitializerMarker> {
        self.initializer.as_mut()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("identifier", &self.identifier)
            .field("name", &self.name)
            .field("task", &self.task)
            .field("action", &self.action)
            .field("initializer", &self.initializer)
            .finish_non_exhaustive()
    }
}

/// A registered task
#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub body: Callable,
    pub dependencies: Vec<TaskDependency>,
    pub description: String,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A registered action, run before or after the named tasks
#[derive(Clone)]
pub struct Action {
    pub name: String,
    pub body: Callable,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub description: String,
    pub only_once: bool,
    pub teardown: bool,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("before", &self.before)
            .field("after", &self.after)
            .field("only_once", &self.only_once)
            .field("teardown", &self.teardown)
            .finish_non_exhaustive()
    }
}

/// A registered initializer
#[derive(Clone)]
pub struct Initializer {
    pub name: String,
    pub body: Callable,
    pub environments: Vec<String>,
    pub description: String,
}

impl Initializer {
    /// Whether the initializer runs for the activated environments
    pub fn applies_to(&self, environments: &[String]) -> bool {
        self.environments.is_empty()
            || self
                .environments
                .iter()
                .any(|env| environments.contains(env))
    }
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initializer")
            .field("name", &self.name)
            .field("environments", &self.environments)
            .finish_non_exhaustive()
    }
}
