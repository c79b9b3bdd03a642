//! In-memory graph description

use crate::contribution::{Action, Initializer, Task, TaskDependency};
use crate::engine::GraphSink;

/// Registrations recorded in the order they were made
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    actions: Vec<Action>,
    initializers: Vec<Initializer>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn initializers(&self) -> &[Initializer] {
        &self.initializers
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.name == name)
    }

    pub fn dependencies_of(&self, name: &str) -> Option<&[TaskDependency]> {
        self.task(name).map(|task| task.dependencies.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.actions.is_empty() && self.initializers.is_empty()
    }

    /// Hand every recorded registration to `sink`, in recording order
    pub fn replay_into(self, sink: &mut dyn GraphSink) {
        for task in self.tasks {
            sink.register_task(task);
        }
        for action in self.actions {
            sink.register_action(action);
        }
        for initializer in self.initializers {
            sink.register_initializer(initializer);
        }
    }
}

impl GraphSink for TaskGraph {
    fn register_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    fn register_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    fn register_initializer(&mut self, initializer: Initializer) {
        self.initializers.push(initializer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::collect;
    use crate::module::BuildModule;

    #[test]
    fn test_replay_preserves_order() {
        let mut module = BuildModule::new("staged");
        module.task("first", |_| Ok(()));
        module.task("second", |_| Ok(())).depends_on("first");
        module.action("announce", |_| Ok(())).before(["second"]);

        let mut staged = TaskGraph::new();
        collect(&module, &mut staged);

        let mut target = TaskGraph::new();
        staged.replay_into(&mut target);

        let tasks: Vec<&str> = target.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tasks, vec!["first", "second"]);
        assert_eq!(target.actions().len(), 1);
        assert_eq!(
            target.dependencies_of("second"),
            Some(&[TaskDependency::new("first", false)][..])
        );
    }
}
