//! Brix build graph
//!
//! This crate holds everything needed to turn a build module into a task graph:
//!
//! - [`BuildModule`]: a typed collection of contributions (tasks, actions,
//!   initializers) registered through explicit builder calls, plus the
//!   module's compatibility requirement and project attributes.
//! - [`Dependency`]: direct and optional dependency wrappers, resolved into
//!   [`TaskDependency`] edges by a pure function.
//! - [`collect`]: the two-pass assembler that reconciles forward dependencies
//!   with reverse "dependents" declarations and registers the normalized
//!   graph with a [`GraphSink`].
//! - [`ExecutionEngine`]: the interface of the external scheduler the graph is
//!   handed to.

pub mod assembler;
pub mod contribution;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod module;
pub mod project;

pub use assembler::{collect, CollectSummary};
pub use contribution::{
    optional, optional_all, Action, ActionMarker, Callable, Candidate, Dependency, Initializer,
    InitializerMarker, Role, Target, Task, TaskDependency, TaskHandle, TaskMarker,
};
pub use engine::{
    BuildContext, DependencyExclusions, ExecutionEngine, ExecutionPlan, GraphSink,
    TaskExecutionSummary,
};
pub use errors::EngineError;
pub use graph::TaskGraph;
pub use module::{BuildModule, ProjectAttributes, RequiredPlugin};
pub use project::Project;
