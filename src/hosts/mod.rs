// Host resolution - merge explicit hosts, roles, and exclusions into a final host list

mod pool;
mod resolution;

pub use pool::*;
pub use resolution::*;

use std::collections::HashSet;

use serde::Serialize;

use crate::env::{Environment, RoleDefs};
use crate::output::errors::RosterError;
use crate::registry::Task;

/// Which configuration layer supplied a task's hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSource {
    /// Per-task command-line arguments
    Arguments,
    /// The task's own host/role annotations
    Task,
    /// Global environment defaults
    Environment,
}

impl std::fmt::Display for HostSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostSource::Arguments => write!(f, "arguments"),
            HostSource::Task => write!(f, "task"),
            HostSource::Environment => write!(f, "environment"),
        }
    }
}

/// Merge host and role lists into one deduplicated host list.
///
/// Explicit hosts come first, followed by each role's hosts in the order the
/// roles are listed. Entries are trimmed, the first occurrence of each host
/// wins, and anything in `exclude` is dropped. Dynamic roles are evaluated
/// once per call.
pub fn merge<H, R, X>(
    hosts: &[H],
    roles: &[R],
    exclude: &[X],
    roledefs: &RoleDefs,
) -> Result<Vec<String>, RosterError>
where
    H: AsRef<str>,
    R: AsRef<str>,
    X: AsRef<str>,
{
    let bad_roles: Vec<String> = roles
        .iter()
        .map(|role| role.as_ref())
        .filter(|role| !roledefs.contains_key(*role))
        .map(String::from)
        .collect();
    if !bad_roles.is_empty() {
        return Err(RosterError::UnknownRoles { roles: bad_roles });
    }

    let mut role_hosts = Vec::new();
    for role in roles {
        let role = role.as_ref();
        if let Some(def) = roledefs.get(role) {
            role_hosts.extend(def.hosts()?);
        }
    }

    let excluded: HashSet<&str> = exclude.iter().map(|h| h.as_ref().trim()).collect();
    let mut seen = HashSet::new();
    let mut all_hosts = Vec::new();

    let cleaned = hosts
        .iter()
        .map(|h| h.as_ref().trim())
        .chain(role_hosts.iter().map(|h| h.trim()));

    for host in cleaned {
        if excluded.contains(host) || !seen.insert(host.to_string()) {
            continue;
        }
        all_hosts.push(host.to_string());
    }

    Ok(all_hosts)
}

/// Return the host list a task should run against.
///
/// The first layer that names any hosts or roles wins; layers are never
/// combined:
/// 1. per-task command-line hosts/roles
/// 2. the task's own hosts/roles
/// 3. the environment's hosts/roles, with the environment's exclusions
///
/// Command-line exclusions apply to layers 1 and 2. An empty result means the
/// task has no remote hosts.
pub fn get_hosts(
    task: &Task,
    arg_hosts: &[String],
    arg_roles: &[String],
    arg_exclude_hosts: &[String],
    env: &Environment,
) -> Result<Vec<String>, RosterError> {
    get_hosts_with_source(task, arg_hosts, arg_roles, arg_exclude_hosts, env).map(|(hosts, _)| hosts)
}

/// Like [`get_hosts`], also reporting which layer supplied the hosts
pub fn get_hosts_with_source(
    task: &Task,
    arg_hosts: &[String],
    arg_roles: &[String],
    arg_exclude_hosts: &[String],
    env: &Environment,
) -> Result<(Vec<String>, HostSource), RosterError> {
    let roledefs = &env.roledefs;

    if !arg_hosts.is_empty() || !arg_roles.is_empty() {
        let hosts = merge(arg_hosts, arg_roles, arg_exclude_hosts, roledefs)?;
        return Ok((hosts, HostSource::Arguments));
    }

    if !task.hosts().is_empty() || !task.roles().is_empty() {
        let hosts = merge(task.hosts(), task.roles(), arg_exclude_hosts, roledefs)?;
        return Ok((hosts, HostSource::Task));
    }

    let hosts = merge(
        env.hosts.as_slice(),
        env.roles.as_slice(),
        env.exclude_hosts.as_slice(),
        roledefs,
    )?;
    Ok((hosts, HostSource::Environment))
}
