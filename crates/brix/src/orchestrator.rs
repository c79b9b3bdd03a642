//! Build lifecycle
//!
//! The [`Orchestrator`] owns the plugin registry and the execution engine of
//! one build. Plugins are acquired idempotently: an identifier is recorded
//! before its module is loaded and the registry is restored if loading fails,
//! so it only ever lists plugins whose contributions reached the engine.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use brix_graph::{
    collect, BuildContext, BuildModule, CollectSummary, DependencyExclusions, ExecutionEngine,
    Project, Task, TaskExecutionSummary, TaskGraph,
};
use brix_plugins::{DispatchingPluginLoader, PluginRequest};
use tracing::debug;

use crate::errors::BuildError;
use crate::logger;
use crate::registry::PluginRegistry;

/// Inputs to [`Orchestrator::prepare_build`] besides the build descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareOptions {
    pub basedir: PathBuf,
    pub property_overrides: BTreeMap<String, String>,
    pub exclusions: DependencyExclusions,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            basedir: PathBuf::from("."),
            property_overrides: BTreeMap::new(),
            exclusions: DependencyExclusions::default(),
        }
    }
}

/// Result of a completed build
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub project: Project,
    pub task_summaries: Vec<TaskExecutionSummary>,
}

pub struct Orchestrator<E: ExecutionEngine> {
    engine: E,
    loader: DispatchingPluginLoader,
    plugins: PluginRegistry,
    project: Option<Project>,
    environments: Vec<String>,
}

impl<E: ExecutionEngine> Orchestrator<E> {
    pub fn new(engine: E, loader: DispatchingPluginLoader) -> Self {
        Self {
            engine,
            loader,
            plugins: PluginRegistry::new(),
            project: None,
            environments: Vec::new(),
        }
    }

    /// Identifiers of the loaded plugins, in load order
    pub fn plugins(&self) -> &[String] {
        self.plugins.as_slice()
    }

    /// Tasks registered with the engine
    pub fn tasks(&self) -> Vec<&Task> {
        self.engine.tasks()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Load a plugin and register its contributions
    ///
    /// Requiring an identifier that is already loaded does nothing. Plugins
    /// required by the loaded module are acquired first. Contributions are
    /// staged and only reach the engine once every plugin of the call has
    /// loaded; on failure the registry is restored to its previous state.
    pub fn require_plugin(
        &mut self,
        identifier: &str,
        version: Option<&str>,
        module_name: Option<&str>,
    ) -> Result<(), BuildError> {
        let mark = self.plugins.len();
        let mut staged = TaskGraph::new();

        match self.acquire(identifier, version, module_name, &mut staged) {
            Ok(()) => {
                staged.replay_into(&mut self.engine);
                Ok(())
            }
            Err(e) => {
                self.plugins.truncate(mark);
                Err(e)
            }
        }
    }

    fn acquire(
        &mut self,
        identifier: &str,
        version: Option<&str>,
        module_name: Option<&str>,
        staged: &mut TaskGraph,
    ) -> Result<(), BuildError> {
        if self.plugins.contains(identifier) {
            logger::debug(&format!("Plugin '{}' already loaded", identifier));
            return Ok(());
        }

        self.plugins.insert(identifier);
        let previous = logger::get_current_plugin();
        logger::set_current_plugin(Some(identifier.to_string()));

        let result = self.import_plugin(identifier, version, module_name, staged);

        logger::set_current_plugin(previous);
        result
    }

    fn import_plugin(
        &mut self,
        identifier: &str,
        version: Option<&str>,
        module_name: Option<&str>,
        staged: &mut TaskGraph,
    ) -> Result<(), BuildError> {
        let request = PluginRequest::new(identifier, version, module_name)?;
        logger::debug(&format!("Loading plugin '{}'", request));

        let module = self.loader.load(&request)?;
        for plugin in module.required_plugins() {
            self.acquire(
                &plugin.identifier,
                plugin.version.as_deref(),
                plugin.module_name.as_deref(),
                staged,
            )?;
        }

        let summary = collect(&module, staged);
        debug!(
            plugin = identifier,
            tasks = summary.tasks,
            actions = summary.actions,
            initializers = summary.initializers,
            "Collected plugin contributions"
        );
        Ok(())
    }

    fn require_plugins_of(&mut self, module: &BuildModule) -> Result<(), BuildError> {
        for plugin in module.required_plugins() {
            self.require_plugin(
                &plugin.identifier,
                plugin.version.as_deref(),
                plugin.module_name.as_deref(),
            )?;
        }
        Ok(())
    }

    /// Acquire the plugins `module` requires, then register its contributions
    pub fn register_module(&mut self, module: &BuildModule) -> Result<CollectSummary, BuildError> {
        self.require_plugins_of(module)?;
        Ok(collect(module, &mut self.engine))
    }

    /// Create the project from `descriptor` and assemble the task graph
    pub fn prepare_build(
        &mut self,
        descriptor: &BuildModule,
        options: &PrepareOptions,
    ) -> Result<(), BuildError> {
        logger::debug(&format!(
            "Preparing build '{}' in {}",
            descriptor.name(),
            options.basedir.display()
        ));

        let basedir = fs::canonicalize(&options.basedir).map_err(|e| {
            BuildError::ProjectDirectory {
                path: options.basedir.clone(),
                reason: e.to_string(),
            }
        })?;
        if !basedir.is_dir() {
            return Err(BuildError::ProjectDirectory {
                path: basedir,
                reason: "not a directory".to_string(),
            });
        }

        let mut project = Project::new(&basedir);
        project.apply_attributes(descriptor.attributes());
        for (key, value) in &options.property_overrides {
            project.set_property(key, value);
        }
        self.project = Some(project);

        let summary = self.register_module(descriptor)?;
        logger::debug(&format!(
            "Have loaded plugins {}",
            self.plugins.as_slice().join(", ")
        ));
        if !summary.unmatched_dependents.is_empty() {
            logger::debug(&format!(
                "Ignoring dependents that match no task: {}",
                summary.unmatched_dependents.join(", ")
            ));
        }

        self.engine.resolve_dependencies(&options.exclusions)?;
        Ok(())
    }

    /// Run `tasks`, or the project's default tasks when `tasks` is empty
    pub fn build(
        &mut self,
        tasks: &[String],
        environments: &[String],
    ) -> Result<BuildSummary, BuildError> {
        self.environments = environments.to_vec();
        let project = self.project.as_ref().ok_or(BuildError::NotPrepared)?;

        if !environments.is_empty() {
            logger::info(&format!(
                "Activated environments: {}",
                environments.join(", ")
            ));
        }

        let context = BuildContext {
            project,
            plugins: self.plugins.as_slice(),
            environments: &self.environments,
        };
        self.engine.execute_initializers(&context)?;

        log_project_properties(project);

        let messages = project.validate();
        if !messages.is_empty() {
            return Err(BuildError::ProjectValidation(messages));
        }

        let tasks = if tasks.is_empty() {
            if project.default_task.is_empty() {
                return Err(BuildError::NoDefaultTask(project.name.clone()));
            }
            project.default_task.clone()
        } else {
            tasks.to_vec()
        };

        let plan = self.engine.build_execution_plan(&tasks)?;
        logger::debug(&format!("Execution plan is {}", plan.tasks().join(", ")));
        logger::info(&format!(
            "Building {} version {}",
            project.name, project.version
        ));
        logger::info(&format!("Executing build in {}", project.basedir.display()));
        if let [task] = tasks.as_slice() {
            logger::info(&format!("Going to execute task {}", task));
        } else {
            logger::info(&format!("Going to execute tasks: {}", tasks.join(", ")));
        }

        let task_summaries = self.engine.execute_execution_plan(&plan, &context)?;
        Ok(BuildSummary {
            project: project.clone(),
            task_summaries,
        })
    }

    /// Run `task_name` and all of its prerequisites
    pub fn execute_task(
        &mut self,
        task_name: &str,
    ) -> Result<Vec<TaskExecutionSummary>, BuildError> {
        let plan = self
            .engine
            .build_execution_plan(&[task_name.to_string()])?;
        self.execute_plan(&plan)
    }

    /// Run `task_name`, skipping prerequisites already executed in this build
    pub fn execute_task_shortest_plan(
        &mut self,
        task_name: &str,
    ) -> Result<Vec<TaskExecutionSummary>, BuildError> {
        let plan = self
            .engine
            .build_shortest_execution_plan(&[task_name.to_string()])?;
        self.execute_plan(&plan)
    }

    fn execute_plan(
        &mut self,
        plan: &brix_graph::ExecutionPlan,
    ) -> Result<Vec<TaskExecutionSummary>, BuildError> {
        let project = self.project.as_ref().ok_or(BuildError::NotPrepared)?;
        let context = BuildContext {
            project,
            plugins: self.plugins.as_slice(),
            environments: &self.environments,
        };
        Ok(self.engine.execute_execution_plan(plan, &context)?)
    }
}

fn log_project_properties(project: &Project) {
    let formatted: String = project
        .properties()
        .map(|(key, value)| format!("\n{:>40} : {}", key, value))
        .collect();
    logger::debug(&format!("Project properties: {}", formatted));
}

#[cfg(test)]
mod tests {
    use super::*;
    use brix_graph::{
        Action, EngineError, ExecutionPlan, GraphSink, Initializer, ProjectAttributes,
    };
    use brix_plugins::{
        BuiltinPluginLoader, ImportError, ModuleImporter, PluginError, PluginLoader,
        StaticImporter, VersionGate,
    };
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Engine recording calls on top of an in-memory graph
    #[derive(Default)]
    struct RecordingEngine {
        graph: TaskGraph,
        calls: Vec<String>,
        executed: BTreeSet<String>,
    }

    impl GraphSink for RecordingEngine {
        fn register_task(&mut self, task: Task) {
            self.graph.register_task(task);
        }

        fn register_action(&mut self, action: Action) {
            self.graph.register_action(action);
        }

        fn register_initializer(&mut self, initializer: Initializer) {
            self.graph.register_initializer(initializer);
        }
    }

    impl RecordingEngine {
        fn visit(
            &self,
            name: &str,
            skip: &BTreeSet<String>,
            plan: &mut Vec<String>,
        ) -> Result<(), EngineError> {
            if plan.iter().any(|t| t == name) || skip.contains(name) {
                return Ok(());
            }
            let task = self
                .graph
                .task(name)
                .ok_or_else(|| EngineError::UnknownTask(name.to_string()))?;
            for dependency in &task.dependencies {
                if self.graph.task(&dependency.name).is_some() {
                    self.visit(&dependency.name, skip, plan)?;
                } else if !dependency.optional {
                    return Err(EngineError::MissingDependency {
                        task: name.to_string(),
                        dependency: dependency.name.clone(),
                    });
                }
            }
            plan.push(name.to_string());
            Ok(())
        }
    }

    impl ExecutionEngine for RecordingEngine {
        fn tasks(&self) -> Vec<&Task> {
            self.graph.tasks().iter().collect()
        }

        fn resolve_dependencies(
            &mut self,
            _exclusions: &DependencyExclusions,
        ) -> Result<(), EngineError> {
            self.calls.push("resolve_dependencies".to_string());
            Ok(())
        }

        fn execute_initializers(
            &mut self,
            context: &BuildContext<'_>,
        ) -> Result<(), EngineError> {
            self.calls.push("execute_initializers".to_string());
            for initializer in self.graph.initializers() {
                if initializer.applies_to(context.environments) {
                    (initializer.body)(context).map_err(|source| EngineError::TaskFailed {
                        task: initializer.name.clone(),
                        source,
                    })?;
                }
            }
            Ok(())
        }

        fn build_execution_plan(
            &self,
            task_names: &[String],
        ) -> Result<ExecutionPlan, EngineError> {
            let mut plan = Vec::new();
            for name in task_names {
                self.visit(name, &BTreeSet::new(), &mut plan)?;
            }
            Ok(ExecutionPlan::new(plan))
        }

        fn build_shortest_execution_plan(
            &self,
            task_names: &[String],
        ) -> Result<ExecutionPlan, EngineError> {
            let mut plan = Vec::new();
            for name in task_names {
                let skip: BTreeSet<String> = self
                    .executed
                    .iter()
                    .filter(|t| *t != name)
                    .cloned()
                    .collect();
                self.visit(name, &skip, &mut plan)?;
            }
            Ok(ExecutionPlan::new(plan))
        }

        fn execute_execution_plan(
            &mut self,
            plan: &ExecutionPlan,
            context: &BuildContext<'_>,
        ) -> Result<Vec<TaskExecutionSummary>, EngineError> {
            let mut summaries = Vec::new();
            for name in plan.tasks() {
                let task = self
                    .graph
                    .task(name)
                    .ok_or_else(|| EngineError::UnknownTask(name.clone()))?;
                (task.body)(context).map_err(|source| EngineError::TaskFailed {
                    task: name.clone(),
                    source,
                })?;
                summaries.push(TaskExecutionSummary {
                    task: name.clone(),
                    actions_executed: 0,
                    duration: Duration::ZERO,
                });
            }
            self.executed.extend(plan.tasks().iter().cloned());
            Ok(summaries)
        }
    }

    /// Importer counting how often each module is imported
    struct CountingImporter {
        inner: StaticImporter,
        imports: Rc<Cell<usize>>,
    }

    impl ModuleImporter for CountingImporter {
        fn import(&self, name: &str) -> Result<BuildModule, ImportError> {
            self.imports.set(self.imports.get() + 1);
            self.inner.import(name)
        }
    }

    fn lint_plugin() -> BuildModule {
        let mut module = BuildModule::new("brix.plugins.lint_plugin");
        module.task("lint", |_| Ok(())).dependent("package");
        module
    }

    fn broken_plugin() -> BuildModule {
        let mut module = BuildModule::new("brix.plugins.broken_plugin");
        module.use_plugin("does_not_exist", None, None);
        module.task("broken", |_| Ok(()));
        module
    }

    fn outer_plugin() -> BuildModule {
        let mut module = BuildModule::new("brix.plugins.outer_plugin");
        module.use_plugin("lint", None, None);
        module.use_plugin("does_not_exist", None, None);
        module.task("outer", |_| Ok(()));
        module
    }

    fn wrapper_plugin() -> BuildModule {
        let mut module = BuildModule::new("brix.plugins.wrapper_plugin");
        module.use_plugin("lint", None, None);
        module.task("wrapped", |_| Ok(()));
        module
    }

    fn future_plugin() -> BuildModule {
        let mut module = BuildModule::new("brix.plugins.future_plugin").requires_host(">=999.0");
        module.task("future", |_| Ok(()));
        module
    }

    fn orchestrator() -> (Orchestrator<RecordingEngine>, Rc<Cell<usize>>) {
        let mut inner = crate::builtin::default_importer();
        inner
            .register("brix.plugins.lint_plugin", lint_plugin)
            .register("brix.plugins.broken_plugin", broken_plugin)
            .register("brix.plugins.outer_plugin", outer_plugin)
            .register("brix.plugins.wrapper_plugin", wrapper_plugin)
            .register("brix.plugins.future_plugin", future_plugin);
        let imports = Rc::new(Cell::new(0));
        let importer = CountingImporter {
            inner,
            imports: Rc::clone(&imports),
        };
        let builtin: Box<dyn PluginLoader> = Box::new(BuiltinPluginLoader::new(
            Arc::new(importer),
            VersionGate::default(),
            "brix",
        ));
        let loader = DispatchingPluginLoader::new(vec![builtin]);
        (Orchestrator::new(RecordingEngine::default(), loader), imports)
    }

    fn descriptor() -> BuildModule {
        let mut module = BuildModule::new("build").with_attributes(ProjectAttributes {
            name: Some("widgets".to_string()),
            version: Some("2.0.0".to_string()),
            default_task: vec!["package".to_string()],
            ..ProjectAttributes::default()
        });
        module.use_plugin("core", None, None);
        module.task("release", |_| Ok(())).depends_on("publish");
        module
    }

    fn options_in(dir: &tempfile::TempDir) -> PrepareOptions {
        PrepareOptions {
            basedir: dir.path().to_path_buf(),
            ..PrepareOptions::default()
        }
    }

    fn tempdir() -> tempfile::TempDir {
        tempfile::TempDir::new().unwrap_or_else(|e| panic!("tempdir: {}", e))
    }

    fn names(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn test_require_plugin_is_idempotent() {
        let (mut orchestrator, imports) = orchestrator();

        assert!(orchestrator.require_plugin("core", None, None).is_ok());
        assert!(orchestrator.require_plugin("core", None, None).is_ok());

        assert_eq!(imports.get(), 1);
        assert_eq!(orchestrator.plugins(), ["core"]);
        assert_eq!(orchestrator.tasks().len(), 8);
    }

    #[test]
    fn test_failed_plugin_is_rolled_back() {
        let (mut orchestrator, _) = orchestrator();
        orchestrator
            .require_plugin("core", None, None)
            .unwrap_or_else(|e| panic!("core should load: {}", e));

        let result = orchestrator.require_plugin("missing", None, None);
        assert!(matches!(
            result,
            Err(BuildError::Plugin(PluginError::Missing { .. }))
        ));
        assert_eq!(orchestrator.plugins(), ["core"]);
    }

    #[test]
    fn test_nested_failure_rolls_back_outer_plugin() {
        let (mut orchestrator, _) = orchestrator();

        let result = orchestrator.require_plugin("broken", None, None);
        assert!(result.is_err());
        assert!(orchestrator.plugins().is_empty());
        assert!(orchestrator.tasks().is_empty());
    }

    #[test]
    fn test_failed_sibling_rolls_back_loaded_requirements() {
        let (mut orchestrator, _) = orchestrator();
        orchestrator
            .require_plugin("core", None, None)
            .unwrap_or_else(|e| panic!("core should load: {}", e));
        let before = orchestrator.plugins().to_vec();
        let tasks_before = names(&orchestrator.tasks());

        let result = orchestrator.require_plugin("outer", None, None);
        assert!(matches!(
            result,
            Err(BuildError::Plugin(PluginError::Missing { .. }))
        ));
        assert_eq!(orchestrator.plugins(), before.as_slice());
        assert_eq!(names(&orchestrator.tasks()), tasks_before);

        assert!(orchestrator.require_plugin("lint", None, None).is_ok());
        assert_eq!(orchestrator.plugins(), ["core", "lint"]);
    }

    #[test]
    fn test_nested_requirements_register_before_requirer() {
        let (mut orchestrator, imports) = orchestrator();

        assert!(orchestrator.require_plugin("wrapper", None, None).is_ok());
        assert!(orchestrator.require_plugin("lint", None, None).is_ok());

        assert_eq!(imports.get(), 2);
        assert_eq!(orchestrator.plugins(), ["wrapper", "lint"]);
        assert_eq!(names(&orchestrator.tasks()), vec!["lint", "wrapped"]);
    }

    #[test]
    fn test_incompatible_plugin_registers_nothing() {
        let (mut orchestrator, _) = orchestrator();

        let result = orchestrator.require_plugin("future", None, None);
        assert!(matches!(
            result,
            Err(BuildError::Plugin(PluginError::Incompatible { .. }))
        ));
        assert!(orchestrator.plugins().is_empty());
        assert!(orchestrator.tasks().is_empty());
    }

    #[test]
    fn test_vcs_without_module_fails_before_import() {
        let (mut orchestrator, imports) = orchestrator();

        let result = orchestrator.require_plugin("vcs:https://example.com/lint.git", None, None);
        assert!(matches!(
            result,
            Err(BuildError::Plugin(PluginError::UnspecifiedName(_)))
        ));
        assert_eq!(imports.get(), 0);
        assert!(orchestrator.plugins().is_empty());
    }

    #[test]
    fn test_prepare_build_assembles_descriptor_after_plugins() {
        let (mut orchestrator, _) = orchestrator();
        let dir = tempdir();
        let mut options = options_in(&dir);
        options
            .property_overrides
            .insert("dir_target".to_string(), "out".to_string());

        let result = orchestrator.prepare_build(&descriptor(), &options);
        assert!(result.is_ok());

        assert_eq!(orchestrator.plugins(), ["core"]);
        let tasks = names(&orchestrator.tasks());
        assert_eq!(tasks.first().map(String::as_str), Some("clean"));
        assert_eq!(tasks.last().map(String::as_str), Some("release"));
        assert_eq!(orchestrator.engine().calls, vec!["resolve_dependencies"]);

        let project = orchestrator.project();
        assert!(project.is_some_and(|p| p.name == "widgets"
            && p.version == "2.0.0"
            && p.get_property("dir_target") == Some("out")));
    }

    #[test]
    fn test_reverse_dependents_across_plugins_are_not_injected() {
        let (mut orchestrator, _) = orchestrator();
        let mut descriptor = descriptor();
        descriptor.use_plugin("lint", None, None);
        let dir = tempdir();

        assert!(orchestrator
            .prepare_build(&descriptor, &options_in(&dir))
            .is_ok());
        assert_eq!(orchestrator.plugins(), ["core", "lint"]);

        let tasks = orchestrator.tasks();
        let package = tasks.iter().find(|t| t.name == "package");
        assert!(package.is_some_and(|t| t.dependencies.iter().all(|d| d.name != "lint")));
    }

    #[test]
    fn test_build_runs_default_task() {
        let (mut orchestrator, _) = orchestrator();
        let dir = tempdir();
        let options = options_in(&dir);
        assert!(orchestrator.prepare_build(&descriptor(), &options).is_ok());

        let summary = orchestrator
            .build(&[], &[])
            .unwrap_or_else(|e| panic!("build failed: {}", e));
        let executed: Vec<&str> = summary
            .task_summaries
            .iter()
            .map(|s| s.task.as_str())
            .collect();
        assert_eq!(
            executed,
            vec!["prepare", "compile_sources", "run_unit_tests", "package"]
        );
        assert_eq!(summary.project.name, "widgets");
        assert!(dir.path().join("target").is_dir());
    }

    #[test]
    fn test_build_without_default_task_fails() {
        let (mut orchestrator, _) = orchestrator();
        let descriptor = BuildModule::new("build");
        let dir = tempdir();
        assert!(orchestrator
            .prepare_build(&descriptor, &options_in(&dir))
            .is_ok());

        let result = orchestrator.build(&[], &[]);
        assert!(matches!(result, Err(BuildError::NoDefaultTask(_))));
    }

    #[test]
    fn test_build_validates_project() {
        let (mut orchestrator, _) = orchestrator();
        let descriptor = BuildModule::new("build").with_attributes(ProjectAttributes {
            version: Some(String::new()),
            ..ProjectAttributes::default()
        });
        let dir = tempdir();
        assert!(orchestrator
            .prepare_build(&descriptor, &options_in(&dir))
            .is_ok());

        let result = orchestrator.build(&["clean".to_string()], &[]);
        assert!(matches!(result, Err(BuildError::ProjectValidation(ref m)) if m.len() == 1));
    }

    #[test]
    fn test_missing_basedir_is_rejected() {
        let (mut orchestrator, _) = orchestrator();
        let dir = tempdir();
        let options = PrepareOptions {
            basedir: dir.path().join("absent"),
            ..PrepareOptions::default()
        };
        let result = orchestrator.prepare_build(&descriptor(), &options);
        assert!(matches!(result, Err(BuildError::ProjectDirectory { .. })));
        assert!(orchestrator.plugins().is_empty());
    }

    #[test]
    fn test_project_is_named_after_basedir() {
        let (mut orchestrator, _) = orchestrator();
        let dir = tempdir();
        let basedir = dir.path().join("gadgets");
        std::fs::create_dir(&basedir).unwrap_or_else(|e| panic!("mkdir: {}", e));
        let options = PrepareOptions {
            basedir,
            ..PrepareOptions::default()
        };
        assert!(orchestrator
            .prepare_build(&BuildModule::new("build"), &options)
            .is_ok());
        assert!(orchestrator.project().is_some_and(|p| p.name == "gadgets"
            && p.version == brix_graph::project::DEFAULT_PROJECT_VERSION));
    }

    #[test]
    fn test_build_before_prepare_fails() {
        let (mut orchestrator, _) = orchestrator();
        assert!(matches!(
            orchestrator.build(&[], &[]),
            Err(BuildError::NotPrepared)
        ));
    }

    #[test]
    fn test_initializers_receive_context() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let mut descriptor = BuildModule::new("build");
        descriptor.use_plugin("core", None, None);
        descriptor
            .initializer("init_ci", move |context| {
                if let Ok(mut seen) = recorder.lock() {
                    seen.push(format!(
                        "{}:{}",
                        context.plugins.join(","),
                        context.environments.join(",")
                    ));
                }
                Ok(())
            })
            .environments(["ci"]);

        let (mut orchestrator, _) = orchestrator();
        let dir = tempdir();
        assert!(orchestrator
            .prepare_build(&descriptor, &options_in(&dir))
            .is_ok());

        assert!(orchestrator
            .build(&["clean".to_string()], &["dev".to_string()])
            .is_ok());
        assert!(orchestrator
            .build(&["clean".to_string()], &["ci".to_string()])
            .is_ok());

        let seen = seen.lock().map(|s| s.clone()).unwrap_or_default();
        assert_eq!(seen, vec!["core:ci".to_string()]);
    }

    #[test]
    fn test_shortest_plan_skips_executed_prerequisites() {
        let (mut orchestrator, _) = orchestrator();
        let dir = tempdir();
        let options = options_in(&dir);
        assert!(orchestrator.prepare_build(&descriptor(), &options).is_ok());

        assert!(orchestrator.execute_task("compile_sources").is_ok());
        let summaries = orchestrator
            .execute_task_shortest_plan("package")
            .unwrap_or_else(|e| panic!("execution failed: {}", e));
        let executed: Vec<&str> = summaries.iter().map(|s| s.task.as_str()).collect();
        assert_eq!(executed, vec!["run_unit_tests", "package"]);
    }
}
