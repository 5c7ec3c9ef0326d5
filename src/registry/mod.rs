// Task registry - named tasks, task groups, and dotted-path lookup

mod invocation;
mod loader;
mod lookup;

pub use invocation::*;
pub use loader::*;
pub use lookup::*;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::output::errors::RosterError;

/// A task descriptor with its optional host annotations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Task {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Task {
            name: name.into(),
            ..Task::default()
        }
    }

    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = Some(hosts.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declared hosts, empty when undeclared
    pub fn hosts(&self) -> &[String] {
        self.hosts.as_deref().unwrap_or(&[])
    }

    /// Declared roles, empty when undeclared
    pub fn roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or(&[])
    }
}

/// A group of tasks, optionally naming the member to run when the group itself is invoked
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskGroup {
    pub members: BTreeMap<String, Node>,
    pub default: Option<String>,
}

impl TaskGroup {
    pub fn new() -> Self {
        TaskGroup::default()
    }

    pub fn with_member(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.members.insert(name.into(), node.into());
        self
    }

    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.members.get(name)
    }
}

/// A registry entry
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Task(Task),
    Group(TaskGroup),
}

impl Node {
    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Node::Task(task) => Some(task),
            Node::Group(_) => None,
        }
    }
}

impl From<Task> for Node {
    fn from(task: Task) -> Self {
        Node::Task(task)
    }
}

impl From<TaskGroup> for Node {
    fn from(group: TaskGroup) -> Self {
        Node::Group(group)
    }
}

/// Every task known to the command line, addressed by dotted name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskRegistry {
    root: Node,
}

impl Default for Node {
    fn default() -> Self {
        Node::Group(TaskGroup::default())
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        TaskRegistry::default()
    }

    pub fn from_group(group: TaskGroup) -> Self {
        TaskRegistry {
            root: Node::Group(group),
        }
    }

    /// Load a registry from a YAML task file
    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        parse_registry_file(path)
    }

    /// Load a registry from a YAML string
    pub fn parse_str(content: &str) -> Result<Self, RosterError> {
        parse_registry(content)
    }

    /// Look up a node by dotted name, substituting group defaults
    pub fn lookup(&self, name: &str) -> Option<&Node> {
        crawl(name, &self.root)
    }

    /// Look up a runnable task by dotted name
    ///
    /// A group without a default member is not runnable and resolves to `None`.
    pub fn resolve(&self, name: &str) -> Option<&Task> {
        self.lookup(name).and_then(Node::as_task)
    }

    /// Full dotted names of every task, sorted
    pub fn task_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Node::Group(group) = &self.root {
            collect_names(group, "", &mut names);
        }
        names.sort();
        names
    }

    /// Dotted names of groups that declare a default, with the member they run
    pub fn defaults(&self) -> Vec<(String, String)> {
        let mut defaults = Vec::new();
        if let Node::Group(group) = &self.root {
            collect_defaults(group, "", &mut defaults);
        }
        defaults.sort();
        defaults
    }
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn collect_names(group: &TaskGroup, prefix: &str, names: &mut Vec<String>) {
    for (name, node) in &group.members {
        let full = join_name(prefix, name);
        match node {
            Node::Task(_) => names.push(full),
            Node::Group(child) => collect_names(child, &full, names),
        }
    }
}

fn collect_defaults(group: &TaskGroup, prefix: &str, defaults: &mut Vec<(String, String)>) {
    for (name, node) in &group.members {
        if let Node::Group(child) = node {
            let full = join_name(prefix, name);
            if let Some(ref default) = child.default {
                defaults.push((full.clone(), join_name(&full, default)));
            }
            collect_defaults(child, &full, defaults);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_registry() -> TaskRegistry {
        let db = TaskGroup::new()
            .with_member("migrate", Task::new("migrate").with_roles(["db"]))
            .with_member("backup", Task::new("backup").with_pool_size(2))
            .with_default("migrate");

        let tools = TaskGroup::new().with_member("lint", Task::new("lint"));

        TaskRegistry::from_group(
            TaskGroup::new()
                .with_member("deploy", Task::new("deploy").with_hosts(["web1", "web2"]))
                .with_member("db", db)
                .with_member("tools", tools),
        )
    }

    #[test]
    fn test_task_annotations_default_to_empty() {
        let task = Task::new("noop");
        assert!(task.hosts().is_empty());
        assert!(task.roles().is_empty());
        assert_eq!(task.pool_size, None);
        assert_eq!(task.parallel, None);
    }

    #[test]
    fn test_resolve_tasks() {
        let registry = create_test_registry();

        assert_eq!(registry.resolve("deploy").unwrap().hosts(), ["web1", "web2"]);
        assert_eq!(registry.resolve("db.backup").unwrap().pool_size, Some(2));
        assert_eq!(registry.resolve("db").unwrap().name, "migrate");
        assert!(registry.resolve("tools").is_none());
        assert!(registry.lookup("tools").is_some());
        assert!(registry.resolve("deploy.extra").is_none());
        assert!(registry.resolve("missing").is_none());
    }

    #[test]
    fn test_task_names() {
        let registry = create_test_registry();
        assert_eq!(
            registry.task_names(),
            vec!["db.backup", "db.migrate", "deploy", "tools.lint"]
        );
    }

    #[test]
    fn test_defaults() {
        let registry = create_test_registry();
        assert_eq!(
            registry.defaults(),
            vec![("db".to_string(), "db.migrate".to_string())]
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = TaskRegistry::new();
        assert!(registry.task_names().is_empty());
        assert!(registry.resolve("anything").is_none());
    }
}
