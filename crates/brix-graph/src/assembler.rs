//! Two-pass assembly of a build module into graph registrations
//!
//! Pass 1 harvests reverse dependencies: every task declaring dependents
//! contributes an edge to each dependent, keyed by the dependent's name.
//! Pass 2 classifies every candidate, merges the harvested edges into the
//! matching task after its own declared dependencies, and registers the
//! result with the sink.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::contribution::{Action, Dependency, Initializer, Role, Task, TaskDependency, Target};
use crate::engine::GraphSink;
use crate::module::BuildModule;

/// What a call to [`collect`] registered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub tasks: usize,
    pub actions: usize,
    pub initializers: usize,
    /// Dependent names declared by some task that matched no task in the module
    pub unmatched_dependents: Vec<String>,
}

/// Register every contribution of `module` with `sink`
pub fn collect(module: &BuildModule, sink: &mut dyn GraphSink) -> CollectSummary {
    let injected = harvest_dependents(module);
    let mut matched: BTreeSet<&str> = BTreeSet::new();
    let mut summary = CollectSummary::default();

    for candidate in module.candidates() {
        let name = candidate.normalized_name();

        match candidate.role() {
            Some(Role::Task(marker)) => {
                let mut dependencies = resolve_all(&marker.depends);
                if let Some((key, extra)) = injected.get_key_value(name) {
                    dependencies.extend(extra.iter().cloned());
                    matched.insert(key.as_str());
                }

                debug!(
                    "Found task '{}' with dependencies [{}]",
                    name,
                    format_dependencies(&dependencies)
                );
                sink.register_task(Task {
                    name: name.to_string(),
                    body: candidate.body().clone(),
                    dependencies,
                    description: candidate.description().to_string(),
                });
                summary.tasks += 1;
            }
            Some(Role::Action(marker)) => {
                debug!("Found action '{}'", name);
                sink.register_action(Action {
                    name: name.to_string(),
                    body: candidate.body().clone(),
                    before: target_names(&marker.before),
                    after: target_names(&marker.after),
                    description: candidate.description().to_string(),
                    only_once: marker.only_once,
                    teardown: marker.teardown,
                });
                summary.actions += 1;
            }
            Some(Role::Initializer(marker)) => {
                debug!("Found initializer '{}'", name);
                sink.register_initializer(Initializer {
                    name: name.to_string(),
                    body: candidate.body().clone(),
                    environments: marker.environments.clone(),
                    description: candidate.description().to_string(),
                });
                summary.initializers += 1;
            }
            None => {}
        }
    }

    for key in injected.keys() {
        if !matched.contains(key.as_str()) {
            warn!(
                "Module '{}' declares '{}' as a dependent, but no such task exists in the module",
                module.name(),
                key
            );
            summary.unmatched_dependents.push(key.clone());
        }
    }

    summary
}

/// Pass 1: dependent name -> edges pointing at the declaring tasks
fn harvest_dependents(module: &BuildModule) -> BTreeMap<String, Vec<TaskDependency>> {
    let mut injected: BTreeMap<String, Vec<TaskDependency>> = BTreeMap::new();

    for candidate in module.candidates() {
        let Some(Role::Task(marker)) = candidate.role() else {
            continue;
        };

        for dependent in resolve_all(&marker.dependents) {
            injected
                .entry(dependent.name)
                .or_default()
                .push(TaskDependency::new(
                    candidate.normalized_name(),
                    dependent.optional,
                ));
        }
    }

    injected
}

fn resolve_all(dependencies: &[Dependency]) -> Vec<TaskDependency> {
    dependencies.iter().flat_map(Dependency::resolve).collect()
}

fn target_names(targets: &[Target]) -> Vec<String> {
    targets.iter().map(|t| t.name().to_string()).collect()
}

fn format_dependencies(dependencies: &[TaskDependency]) -> String {
    dependencies
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
