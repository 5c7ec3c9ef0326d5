// Roster - host and pool-size resolution for remote tasks
//
// Decides which hosts a task runs against, and how many at once, from
// per-task arguments, task annotations, and global environment defaults.

pub mod env;
pub mod hosts;
pub mod output;
pub mod registry;

pub use env::{EnvOverrides, Environment, RoleDef, RoleDefs};
pub use hosts::{get_hosts, get_pool_size, merge, HostSource, Resolution};
pub use output::{OutputFormat, OutputWriter, RosterError};
pub use registry::{crawl, parse_invocation, Node, Task, TaskGroup, TaskRegistry};

/// Version of the Roster tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::env::{Environment, RoleDef};
    pub use crate::hosts::{get_hosts, get_pool_size, merge, resolve_invocation, Resolution};
    pub use crate::output::RosterError;
    pub use crate::registry::{crawl, parse_invocation, PathNode, Task, TaskGroup, TaskRegistry};
}
