// Task file parser
//
// deploy:
//   hosts: [web1, web2]
//   parallel: true
//   pool_size: 5
// db:
//   default: migrate
//   tasks:
//     migrate:
//       roles: [db]
//     backup:

use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value as YamlValue};

use super::{Node, Task, TaskGroup, TaskRegistry};
use crate::output::errors::RosterError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskSpec {
    #[serde(default)]
    hosts: Option<Vec<String>>,
    #[serde(default)]
    roles: Option<Vec<String>>,
    #[serde(default)]
    pool_size: Option<usize>,
    #[serde(default)]
    parallel: Option<bool>,
    #[serde(default)]
    description: Option<String>,
}

/// Parse a task registry from a YAML file
pub fn parse_registry_file(path: &Path) -> Result<TaskRegistry, RosterError> {
    let content = std::fs::read_to_string(path).map_err(|e| RosterError::Io {
        message: format!("Failed to read task file: {}", e),
        path: Some(path.to_path_buf()),
    })?;

    parse_registry(&content)
}

/// Parse a task registry from a YAML string
pub fn parse_registry(content: &str) -> Result<TaskRegistry, RosterError> {
    if content.trim().is_empty() {
        return Ok(TaskRegistry::new());
    }

    let yaml: YamlValue = serde_yaml::from_str(content).map_err(|e| RosterError::Config {
        message: format!("Invalid task YAML: {}", e),
        suggestion: Some("Check task file syntax".to_string()),
    })?;

    match &yaml {
        YamlValue::Mapping(map) => Ok(TaskRegistry::from_group(parse_members(map, "")?)),
        YamlValue::Null => Ok(TaskRegistry::new()),
        _ => Err(RosterError::Config {
            message: "Task file must be a YAML mapping".to_string(),
            suggestion: Some("Start with '<task name>:'".to_string()),
        }),
    }
}

fn parse_members(map: &Mapping, prefix: &str) -> Result<TaskGroup, RosterError> {
    let mut group = TaskGroup::new();

    for (key, value) in map {
        let name = key.as_str().ok_or_else(|| RosterError::Config {
            message: format!("Task names must be strings (under '{}')", display_prefix(prefix)),
            suggestion: None,
        })?;

        if name.is_empty() || name.contains('.') {
            return Err(RosterError::Config {
                message: format!("Invalid task name '{}'", name),
                suggestion: Some("Task names must be non-empty and may not contain '.'".to_string()),
            });
        }

        let full = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        };

        group.members.insert(name.to_string(), parse_node(name, &full, value)?);
    }

    Ok(group)
}

fn parse_node(name: &str, full: &str, value: &YamlValue) -> Result<Node, RosterError> {
    match value {
        YamlValue::Null => Ok(Node::Task(Task::new(name))),
        YamlValue::Mapping(map) if map.contains_key("tasks") => parse_group(full, map).map(Node::Group),
        YamlValue::Mapping(_) => {
            let spec: TaskSpec = serde_yaml::from_value(value.clone()).map_err(|e| RosterError::Config {
                message: format!("Invalid task '{}': {}", full, e),
                suggestion: Some(
                    "Tasks accept hosts, roles, pool_size, parallel, and description".to_string(),
                ),
            })?;

            Ok(Node::Task(Task {
                name: name.to_string(),
                hosts: spec.hosts,
                roles: spec.roles,
                pool_size: spec.pool_size,
                parallel: spec.parallel,
                description: spec.description,
            }))
        }
        _ => Err(RosterError::Config {
            message: format!("Invalid task '{}': expected a mapping", full),
            suggestion: None,
        }),
    }
}

fn parse_group(full: &str, map: &Mapping) -> Result<TaskGroup, RosterError> {
    let mut group = match map.get("tasks") {
        Some(YamlValue::Mapping(tasks)) => parse_members(tasks, full)?,
        Some(YamlValue::Null) | None => TaskGroup::new(),
        Some(_) => {
            return Err(RosterError::Config {
                message: format!("Invalid group '{}': 'tasks' must be a mapping", full),
                suggestion: None,
            })
        }
    };

    for key in map.keys() {
        match key.as_str() {
            Some("tasks") | Some("default") => {}
            _ => {
                return Err(RosterError::Config {
                    message: format!("Invalid group '{}': unexpected key {:?}", full, key),
                    suggestion: Some("Groups accept only 'tasks' and 'default'".to_string()),
                })
            }
        }
    }

    if let Some(default) = map.get("default") {
        let default = default.as_str().ok_or_else(|| RosterError::Config {
            message: format!("Invalid group '{}': 'default' must be a task name", full),
            suggestion: None,
        })?;

        if !group.members.contains_key(default) {
            return Err(RosterError::Config {
                message: format!(
                    "Group '{}' names default '{}', which is not one of its tasks",
                    full, default
                ),
                suggestion: Some(format!(
                    "Choose one of: {}",
                    group.members.keys().cloned().collect::<Vec<_>>().join(", ")
                )),
            });
        }

        group.default = Some(default.to_string());
    }

    Ok(group)
}

fn display_prefix(prefix: &str) -> &str {
    if prefix.is_empty() {
        "<root>"
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TASKS: &str = r#"
deploy:
  hosts: [web1, web2]
  parallel: true
  pool_size: 5
  description: Ship the current build
restart:
db:
  default: migrate
  tasks:
    migrate:
      roles: [db]
    backup:
      pool_size: 1
"#;

    #[test]
    fn test_parse_registry() {
        let registry = TaskRegistry::parse_str(TASKS).unwrap();

        let deploy = registry.resolve("deploy").unwrap();
        assert_eq!(deploy.name, "deploy");
        assert_eq!(deploy.hosts(), ["web1", "web2"]);
        assert_eq!(deploy.parallel, Some(true));
        assert_eq!(deploy.pool_size, Some(5));
        assert_eq!(deploy.description.as_deref(), Some("Ship the current build"));

        let restart = registry.resolve("restart").unwrap();
        assert_eq!(restart, &Task::new("restart"));

        assert_eq!(registry.resolve("db").unwrap().roles(), ["db"]);
        assert_eq!(registry.resolve("db.backup").unwrap().pool_size, Some(1));

        assert_eq!(
            registry.task_names(),
            vec!["db.backup", "db.migrate", "deploy", "restart"]
        );
    }

    #[test]
    fn test_empty_task_file() {
        assert!(TaskRegistry::parse_str("").unwrap().task_names().is_empty());
        assert!(TaskRegistry::parse_str("~").unwrap().task_names().is_empty());
    }

    #[test]
    fn test_dangling_default_is_rejected() {
        let err = TaskRegistry::parse_str("db:\n  default: nope\n  tasks:\n    migrate:\n")
            .unwrap_err();
        let message = err.message();
        assert!(message.contains("db"));
        assert!(message.contains("nope"));
    }

    #[test]
    fn test_unknown_task_key_is_rejected() {
        let err = TaskRegistry::parse_str("deploy:\n  hostz: [a]\n").unwrap_err();
        assert!(err.message().contains("Invalid task 'deploy'"));
    }

    #[test]
    fn test_unknown_group_key_is_rejected() {
        let err = TaskRegistry::parse_str("db:\n  hosts: [a]\n  tasks:\n    m:\n").unwrap_err();
        assert!(err.message().contains("Invalid group 'db'"));
    }

    #[test]
    fn test_dotted_task_name_is_rejected() {
        let err = TaskRegistry::parse_str("a.b:\n  hosts: [x]\n").unwrap_err();
        assert!(err.message().contains("Invalid task name 'a.b'"));
    }

    #[test]
    fn test_non_mapping_task_file() {
        let err = TaskRegistry::parse_str("- deploy\n").unwrap_err();
        assert!(matches!(err, RosterError::Config { .. }));
    }

    #[test]
    fn test_nested_groups() {
        let yaml = "ops:\n  tasks:\n    db:\n      default: dump\n      tasks:\n        dump:\n          hosts: [d1]\n";
        let registry = TaskRegistry::parse_str(yaml).unwrap();

        assert_eq!(registry.resolve("ops.db").unwrap().hosts(), ["d1"]);
        assert_eq!(registry.task_names(), vec!["ops.db.dump"]);
        assert!(registry.resolve("ops").is_none());
    }

    #[test]
    fn test_parse_registry_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tasks.yaml");
        std::fs::write(&path, TASKS).unwrap();

        let registry = TaskRegistry::from_file(&path).unwrap();
        assert!(registry.resolve("deploy").is_some());
    }
}
