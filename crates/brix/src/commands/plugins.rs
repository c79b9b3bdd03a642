use crate::builtin::{builtin_importer, BUILTIN_PLUGINS};
use crate::logger;
use crate::orchestrator::Orchestrator;
use crate::GlobalOpts;
use brix_config::Config;
use brix_graph::{
    Action, BuildContext, BuildModule, CollectSummary, DependencyExclusions, EngineError,
    ExecutionEngine, ExecutionPlan, GraphSink, Initializer, Task, TaskExecutionSummary, TaskGraph,
};
use brix_plugins::{
    host_version, DispatchingPluginLoader, PackageInstaller, PluginRequest, VersionGate,
};
use clap::Subcommand;
use colored::Colorize;
use std::sync::Arc;

#[derive(Subcommand, Debug, Clone)]
pub enum PluginsAction {
    /// List the builtin plugins
    List,
    /// Resolve a plugin and show what it contributes, including the
    /// contributions of the plugins it requires
    Show {
        /// Plugin identifier (e.g. core, pypi:brix-lint)
        identifier: String,
        /// Version range to install when the plugin is downloaded
        #[arg(long)]
        version: Option<String>,
        /// Importable module name, required for vcs: identifiers
        #[arg(long)]
        module: Option<String>,
    },
    /// Install a plugin package without loading it
    Install {
        identifier: String,
        #[arg(long)]
        version: Option<String>,
        /// Importable module name, required for vcs: identifiers
        #[arg(long)]
        module: Option<String>,
    },
    /// Check a host version requirement against this brix
    Check { requirement: String },
}

pub fn handle_plugins(action: PluginsAction, opts: &GlobalOpts) -> Result<(), String> {
    match action {
        PluginsAction::List => {
            list_plugins();
            Ok(())
        }
        PluginsAction::Show {
            identifier,
            version,
            module,
        } => show_plugin(&identifier, version.as_deref(), module.as_deref(), opts),
        PluginsAction::Install {
            identifier,
            version,
            module,
        } => install_plugin(&identifier, version.as_deref(), module.as_deref()),
        PluginsAction::Check { requirement } => check_requirement(&requirement),
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            logger::warn(&format!("Failed to load config, using defaults: {}", e));
            Config::default()
        }
    }
}

fn list_plugins() {
    let namespace = load_config().get_plugin_namespace();
    println!("{}", "Builtin plugins:".bold().green());
    for name in BUILTIN_PLUGINS {
        println!(
            "  {} {}",
            name.bold().blue(),
            format!("({}.plugins.{}_plugin)", namespace, name).dimmed()
        );
    }
}

/// Engine that only records registrations, for `plugins show`
#[derive(Default)]
struct InspectionEngine {
    graph: TaskGraph,
}

impl GraphSink for InspectionEngine {
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

impl ExecutionEngine for InspectionEngine {
    fn tasks(&self) -> Vec<&Task> {
        self.graph.tasks().iter().collect()
    }

    fn resolve_dependencies(&mut self, _: &DependencyExclusions) -> Result<(), EngineError> {
        Ok(())
    }

    fn execute_initializers(&mut self, _: &BuildContext<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    fn build_execution_plan(&self, _: &[String]) -> Result<ExecutionPlan, EngineError> {
        Err(not_executable())
    }

    fn build_shortest_execution_plan(&self, _: &[String]) -> Result<ExecutionPlan, EngineError> {
        Err(not_executable())
    }

    fn execute_execution_plan(
        &mut self,
        _: &ExecutionPlan,
        _: &BuildContext<'_>,
    ) -> Result<Vec<TaskExecutionSummary>, EngineError> {
        Err(not_executable())
    }
}

fn not_executable() -> EngineError {
    EngineError::Other("plugin inspection does not execute tasks".to_string())
}

/// Register `module` the way a build would, pulling in its required plugins
fn inspect(
    loader: DispatchingPluginLoader,
    module: &BuildModule,
) -> Result<(Orchestrator<InspectionEngine>, CollectSummary), String> {
    let mut orchestrator = Orchestrator::new(InspectionEngine::default(), loader);
    let summary = orchestrator
        .register_module(module)
        .map_err(|e| e.to_string())?;
    Ok((orchestrator, summary))
}

fn show_plugin(
    identifier: &str,
    version: Option<&str>,
    module: Option<&str>,
    opts: &GlobalOpts,
) -> Result<(), String> {
    let config = load_config();
    let namespace = config.get_plugin_namespace();
    let loader =
        DispatchingPluginLoader::from_config(Arc::new(builtin_importer(&namespace)), &config);

    let request = PluginRequest::new(identifier, version, module).map_err(|e| e.to_string())?;
    logger::set_current_plugin(Some(identifier.to_string()));
    let loaded = loader.load(&request);
    logger::set_current_plugin(None);
    let module = loaded.map_err(|e| e.to_string())?;

    let (orchestrator, summary) = inspect(loader, &module)?;
    let graph = &orchestrator.engine().graph;

    println!(
        "{} {}",
        identifier.bold().green(),
        format!("({})", module.name()).dimmed()
    );
    if !orchestrator.plugins().is_empty() {
        println!("  requires plugins {}", orchestrator.plugins().join(", "));
    }
    if let Some(requirement) = module.host_requirement() {
        println!("  requires brix {}", requirement);
    }

    if !graph.tasks().is_empty() {
        println!("{}", "Tasks:".bold());
        for task in graph.tasks() {
            let dependencies: Vec<String> =
                task.dependencies.iter().map(ToString::to_string).collect();
            if dependencies.is_empty() {
                println!("  {}", task.name.cyan());
            } else {
                println!("  {} <- {}", task.name.cyan(), dependencies.join(", "));
            }
            if opts.verbosity_level() > 0 && !task.description.is_empty() {
                println!("      {}", task.description.dimmed());
            }
        }
    }

    if !graph.actions().is_empty() {
        println!("{}", "Actions:".bold());
        for action in graph.actions() {
            let mut placement = Vec::new();
            if !action.before.is_empty() {
                placement.push(format!("before {}", action.before.join(", ")));
            }
            if !action.after.is_empty() {
                placement.push(format!("after {}", action.after.join(", ")));
            }
            println!("  {} {}", action.name.cyan(), placement.join("; "));
        }
    }

    if !graph.initializers().is_empty() {
        println!("{}", "Initializers:".bold());
        for initializer in graph.initializers() {
            if initializer.environments.is_empty() {
                println!("  {}", initializer.name.cyan());
            } else {
                println!(
                    "  {} [{}]",
                    initializer.name.cyan(),
                    initializer.environments.join(", ")
                );
            }
        }
    }

    for name in &summary.unmatched_dependents {
        logger::warn(&format!(
            "Task '{}' is declared as a dependent but is not defined by {}",
            name, identifier
        ));
    }
    Ok(())
}

fn install_plugin(
    identifier: &str,
    version: Option<&str>,
    module: Option<&str>,
) -> Result<(), String> {
    let config = load_config();
    let installer = PackageInstaller::from_config(&config);
    let request = PluginRequest::new(identifier, version, module).map_err(|e| e.to_string())?;

    logger::spinner_start(&format!("Installing {}", request));
    match installer.install(&request) {
        Ok(log_path) => {
            logger::spinner_success(&format!("Installed {}", identifier));
            logger::debug(&format!("Installer log: {}", log_path.display()));
            Ok(())
        }
        Err(e) => {
            logger::spinner_error(&format!("Failed to install {}", identifier));
            Err(e.to_string())
        }
    }
}

fn check_requirement(requirement: &str) -> Result<(), String> {
    let gate = VersionGate::default();
    gate.check("requirement", Some(requirement))
        .map_err(|e| e.to_string())?;
    println!(
        "{} brix {} satisfies {}",
        "\u{2714}".green().bold(),
        host_version(),
        requirement
    );
    Ok(())
}
