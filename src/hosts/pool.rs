// Parallel pool sizing

use crate::env::Environment;
use crate::registry::Task;

/// Number of hosts a parallel task may run against at once.
///
/// Starts from `default` (or one slot per host when unset or zero), lets the
/// task's own `pool_size` override it, then caps it at the host count.
pub fn get_pool_size(task: &Task, hosts: &[String], default: Option<usize>) -> usize {
    let default_pool_size = match default {
        Some(size) if size > 0 => size,
        _ => hosts.len(),
    };

    let pool_size = task.pool_size.unwrap_or(default_pool_size).min(hosts.len());

    tracing::debug!(task = %task.name, "Parallel tasks now using pool size of {}", pool_size);

    pool_size
}

/// Whether a task runs across its hosts in parallel
pub fn requires_parallel(task: &Task, env: &Environment) -> bool {
    task.parallel.unwrap_or(env.parallel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("host{}", i)).collect()
    }

    #[test]
    fn test_task_pool_size_is_clamped() {
        let task = Task::new("deploy").with_pool_size(10);
        assert_eq!(get_pool_size(&task, &hosts(2), Some(5)), 2);
    }

    #[test]
    fn test_default_pool_size() {
        let task = Task::new("deploy");
        assert_eq!(get_pool_size(&task, &hosts(8), Some(3)), 3);
        assert_eq!(get_pool_size(&task, &hosts(2), Some(3)), 2);
    }

    #[test]
    fn test_unset_default_uses_host_count() {
        let task = Task::new("deploy");
        assert_eq!(get_pool_size(&task, &hosts(4), None), 4);
        assert_eq!(get_pool_size(&task, &hosts(4), Some(0)), 4);
    }

    #[test]
    fn test_task_override_below_default() {
        let task = Task::new("deploy").with_pool_size(1);
        assert_eq!(get_pool_size(&task, &hosts(4), Some(3)), 1);
    }

    #[test]
    fn test_no_hosts() {
        let task = Task::new("deploy").with_pool_size(4);
        assert_eq!(get_pool_size(&task, &[], Some(2)), 0);
    }

    #[test]
    fn test_requires_parallel() {
        let serial_env = Environment::new();
        let parallel_env = Environment::new().with_parallel(true);

        assert!(!requires_parallel(&Task::new("a"), &serial_env));
        assert!(requires_parallel(&Task::new("a"), &parallel_env));
        assert!(requires_parallel(&Task::new("a").with_parallel(true), &serial_env));
        assert!(!requires_parallel(&Task::new("a").with_parallel(false), &parallel_env));
    }
}
