// Resolution of a task invocation into hosts and parallelism

use serde::Serialize;

use super::{get_hosts_with_source, get_pool_size, requires_parallel, HostSource};
use crate::env::Environment;
use crate::output::errors::RosterError;
use crate::registry::{Task, TaskInvocation, TaskRegistry};

/// The hosts and parallelism chosen for one task invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Name as invoked
    pub name: String,
    /// Task that will run (differs from `name` when a group default was used)
    pub task: String,
    pub hosts: Vec<String>,
    pub source: HostSource,
    pub parallel: bool,
    /// Pool size for parallel tasks; `None` when hosts run one at a time
    pub pool_size: Option<usize>,
}

/// Resolve hosts and pool size for an already looked-up task
pub fn resolve_task(
    name: &str,
    task: &Task,
    invocation: &TaskInvocation,
    env: &Environment,
) -> Result<Resolution, RosterError> {
    let (hosts, source) = get_hosts_with_source(
        task,
        &invocation.hosts,
        &invocation.roles,
        &invocation.exclude_hosts,
        env,
    )?;

    let parallel = requires_parallel(task, env);
    let pool_size = if parallel {
        Some(get_pool_size(task, &hosts, env.pool_size))
    } else {
        None
    };

    tracing::debug!(
        task = %name,
        hosts = hosts.len(),
        source = %source,
        parallel,
        "resolved task hosts"
    );

    Ok(Resolution {
        name: name.to_string(),
        task: task.name.clone(),
        hosts,
        source,
        parallel,
        pool_size,
    })
}

/// Look up the invoked task in the registry and resolve it
pub fn resolve_invocation(
    registry: &TaskRegistry,
    invocation: &TaskInvocation,
    env: &Environment,
) -> Result<Resolution, RosterError> {
    let task = registry
        .resolve(&invocation.name)
        .ok_or_else(|| RosterError::TaskNotFound {
            name: invocation.name.clone(),
            suggestion: Some("Run 'roster list' to see available tasks".to_string()),
        })?;

    resolve_task(&invocation.name, task, invocation, env)
}
