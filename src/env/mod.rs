// Environment module - global host/role defaults and role definitions

mod dynamic;
mod loader;

pub use dynamic::*;
pub use loader::*;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::output::errors::RosterError;

/// Zero-argument producer backing a dynamic role
pub type RoleProducer = Arc<dyn Fn() -> Result<Vec<String>, RosterError> + Send + Sync>;

/// Role definitions keyed by role name
pub type RoleDefs = BTreeMap<String, RoleDef>;

/// How a role's host list is obtained
#[derive(Clone)]
pub enum RoleDef {
    /// Fixed, ordered host list
    Static(Vec<String>),
    /// Host list computed each time the role is expanded
    Dynamic(RoleProducer),
}

impl RoleDef {
    pub fn dynamic<F>(producer: F) -> Self
    where
        F: Fn() -> Result<Vec<String>, RosterError> + Send + Sync + 'static,
    {
        RoleDef::Dynamic(Arc::new(producer))
    }

    /// Expand the role. Dynamic roles are invoked on every call, never cached.
    pub fn hosts(&self) -> Result<Vec<String>, RosterError> {
        match self {
            RoleDef::Static(hosts) => Ok(hosts.clone()),
            RoleDef::Dynamic(producer) => producer(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, RoleDef::Dynamic(_))
    }
}

impl fmt::Debug for RoleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleDef::Static(hosts) => f.debug_tuple("Static").field(hosts).finish(),
            RoleDef::Dynamic(_) => f.write_str("Dynamic(<producer>)"),
        }
    }
}

impl From<Vec<String>> for RoleDef {
    fn from(hosts: Vec<String>) -> Self {
        RoleDef::Static(hosts)
    }
}

impl From<Vec<&str>> for RoleDef {
    fn from(hosts: Vec<&str>) -> Self {
        RoleDef::Static(hosts.into_iter().map(String::from).collect())
    }
}

/// Process-wide configuration consulted when a task declares no hosts of its own.
///
/// Populated once before resolution starts and passed explicitly to every call.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub hosts: Vec<String>,
    pub roles: Vec<String>,
    pub exclude_hosts: Vec<String>,
    pub roledefs: RoleDefs,
    /// Default parallel pool size; `None` or `Some(0)` means one slot per host
    pub pool_size: Option<usize>,
    /// Run every task in parallel unless it opts out
    pub parallel: bool,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// Load an environment from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, RosterError> {
        parse_environment_file(path)
    }

    /// Load an environment from a YAML string
    pub fn parse_str(content: &str) -> Result<Self, RosterError> {
        parse_environment(content, None)
    }

    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_role(mut self, name: impl Into<String>, def: impl Into<RoleDef>) -> Self {
        self.roledefs.insert(name.into(), def.into());
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn get_role(&self, name: &str) -> Option<&RoleDef> {
        self.roledefs.get(name)
    }

    /// Role names in sorted order
    pub fn role_names(&self) -> Vec<&str> {
        self.roledefs.keys().map(|s| s.as_str()).collect()
    }
}

/// Global command-line settings layered over the environment file
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub hosts: Option<String>,
    pub roles: Option<String>,
    pub exclude_hosts: Option<String>,
    pub pool_size: Option<usize>,
    pub parallel: bool,
}

impl EnvOverrides {
    /// Replace environment values with any settings given on the command line
    pub fn apply(&self, env: &mut Environment) {
        if let Some(ref hosts) = self.hosts {
            env.hosts = split_list(hosts);
        }
        if let Some(ref roles) = self.roles {
            env.roles = split_list(roles);
        }
        if let Some(ref exclude) = self.exclude_hosts {
            env.exclude_hosts = split_list(exclude);
        }
        if let Some(pool_size) = self.pool_size {
            env.pool_size = Some(pool_size);
        }
        if self.parallel {
            env.parallel = true;
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empties
///
/// Example: "web1, web2,,db1" => ["web1", "web2", "db1"]
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
