// Environment file parser
//
// hosts: [web1, web2]
// roles: [db]
// exclude_hosts: [web2]
// pool_size: 5
// parallel: true
// roledefs:
//   web: [web1, web2]
//   db:
//     command: ./inventory/db.sh
//     args: [--env, prod]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use super::{Environment, RoleDef, ScriptRole};
use crate::output::errors::RosterError;

#[derive(Debug, Default, Deserialize)]
struct EnvironmentFile {
    #[serde(default)]
    hosts: Vec<String>,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    exclude_hosts: Vec<String>,
    #[serde(default)]
    pool_size: Option<usize>,
    #[serde(default)]
    parallel: bool,
    #[serde(default)]
    roledefs: BTreeMap<String, YamlValue>,
}

/// Parse an environment from a YAML file
///
/// Relative role commands are resolved against the file's directory.
pub fn parse_environment_file(path: &Path) -> Result<Environment, RosterError> {
    let content = std::fs::read_to_string(path).map_err(|e| RosterError::Io {
        message: format!("Failed to read environment file: {}", e),
        path: Some(path.to_path_buf()),
    })?;

    parse_environment(&content, path.parent())
}

/// Parse an environment from a YAML string
pub fn parse_environment(content: &str, base_dir: Option<&Path>) -> Result<Environment, RosterError> {
    if content.trim().is_empty() {
        return Ok(Environment::default());
    }

    let file: EnvironmentFile = serde_yaml::from_str(content).map_err(|e| RosterError::Config {
        message: format!("Invalid environment YAML: {}", e),
        suggestion: Some(
            "Expected keys: hosts, roles, exclude_hosts, pool_size, parallel, roledefs".to_string(),
        ),
    })?;

    let mut env = Environment {
        hosts: file.hosts,
        roles: file.roles,
        exclude_hosts: file.exclude_hosts,
        roledefs: BTreeMap::new(),
        pool_size: file.pool_size,
        parallel: file.parallel,
    };

    for (name, value) in &file.roledefs {
        let def = parse_role_def(name, value, base_dir)?;
        env.roledefs.insert(name.clone(), def);
    }

    Ok(env)
}

fn parse_role_def(name: &str, value: &YamlValue, base_dir: Option<&Path>) -> Result<RoleDef, RosterError> {
    match value {
        YamlValue::Sequence(items) => {
            let mut hosts = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(host) => hosts.push(host.to_string()),
                    None => return Err(invalid_role(name, "every host must be a string")),
                }
            }
            Ok(RoleDef::Static(hosts))
        }
        YamlValue::Mapping(map) => {
            let command = map
                .get("command")
                .and_then(|c| c.as_str())
                .ok_or_else(|| invalid_role(name, "a dynamic role needs a 'command'"))?;

            let mut args = Vec::new();
            if let Some(args_val) = map.get("args") {
                let seq = args_val
                    .as_sequence()
                    .ok_or_else(|| invalid_role(name, "'args' must be a list"))?;
                for arg in seq {
                    match arg {
                        YamlValue::String(s) => args.push(s.clone()),
                        YamlValue::Number(n) => args.push(n.to_string()),
                        YamlValue::Bool(b) => args.push(b.to_string()),
                        _ => return Err(invalid_role(name, "'args' entries must be scalars")),
                    }
                }
            }

            let command = resolve_command(command, base_dir);
            Ok(ScriptRole::new(name, command).with_args(args).into_role_def())
        }
        YamlValue::Null => Ok(RoleDef::Static(Vec::new())),
        _ => Err(invalid_role(name, "expected a host list or a command mapping")),
    }
}

/// Relative paths containing a separator are anchored at the environment file
fn resolve_command(command: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(command);
    match base_dir {
        Some(dir) if path.is_relative() && command.contains('/') => dir.join(path),
        _ => path,
    }
}

fn invalid_role(name: &str, reason: &str) -> RosterError {
    RosterError::Config {
        message: format!("Invalid definition for role '{}': {}", name, reason),
        suggestion: Some("Use a list of hosts, or { command: <path>, args: [...] }".to_string()),
    }
}
