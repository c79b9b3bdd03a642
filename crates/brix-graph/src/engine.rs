//! Interface of the execution engine the assembled graph is handed to
//!
//! Brix does not schedule or run tasks itself. An [`ExecutionEngine`]
//! receives registrations through [`GraphSink`], resolves dependencies,
//! builds execution plans and runs them.

use std::time::Duration;

use crate::contribution::{Action, Initializer, Task};
use crate::errors::EngineError;
use crate::project::Project;

/// Receiver of graph registrations
pub trait GraphSink {
    fn register_task(&mut self, task: Task);
    fn register_action(&mut self, action: Action);
    fn register_initializer(&mut self, initializer: Initializer);
}

/// Explicit context handed to every engine call that runs user code
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub project: &'a Project,
    /// Identifiers of the plugins loaded for this build, in load order
    pub plugins: &'a [String],
    /// Activated environments
    pub environments: &'a [String],
}

/// Options for dependency resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyExclusions {
    /// Optional dependencies on these tasks are dropped
    pub exclude_optional_tasks: Vec<String>,
    /// These tasks are dropped from the graph
    pub exclude_tasks: Vec<String>,
    /// Every optional dependency is dropped
    pub exclude_all_optional: bool,
}

/// Ordered list of task names to execute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    tasks: Vec<String>,
}

impl ExecutionPlan {
    pub fn new(tasks: Vec<String>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Outcome of running one task of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskExecutionSummary {
    pub task: String,
    pub actions_executed: usize,
    pub duration: Duration,
}

/// The scheduler that consumes the assembled graph
pub trait ExecutionEngine: GraphSink {
    /// Registered tasks
    fn tasks(&self) -> Vec<&Task>;

    fn resolve_dependencies(&mut self, exclusions: &DependencyExclusions)
        -> Result<(), EngineError>;

    /// Run the initializers applicable to `context.environments`
    fn execute_initializers(&mut self, context: &BuildContext<'_>) -> Result<(), EngineError>;

    fn build_execution_plan(&self, task_names: &[String]) -> Result<ExecutionPlan, EngineError>;

    /// Plan that skips prerequisites already executed in this build
    fn build_shortest_execution_plan(
        &self,
        task_names: &[String],
    ) -> Result<ExecutionPlan, EngineError>;

    fn execute_execution_plan(
        &mut self,
        plan: &ExecutionPlan,
        context: &BuildContext<'_>,
    ) -> Result<Vec<TaskExecutionSummary>, EngineError>;
}
