// Output module for Roster

pub mod errors;
pub mod json_output;
pub mod terminal;

pub use errors::*;
pub use json_output::*;
pub use terminal::*;

use serde::Serialize;

use crate::env::Environment;
use crate::hosts::Resolution;
use crate::registry::TaskRegistry;

/// Output format for Roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output with colors
    #[default]
    Text,
    /// Machine-readable JSON output
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(()),
        }
    }
}

/// A role and the hosts it expanded to when listed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleReport {
    pub name: String,
    pub dynamic: bool,
    pub hosts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoleReport {
    /// Expand every role in the environment, recording failures instead of stopping
    pub fn collect(env: &Environment) -> Vec<RoleReport> {
        env.roledefs
            .iter()
            .map(|(name, def)| match def.hosts() {
                Ok(hosts) => RoleReport {
                    name: name.clone(),
                    dynamic: def.is_dynamic(),
                    hosts,
                    error: None,
                },
                Err(e) => RoleReport {
                    name: name.clone(),
                    dynamic: def.is_dynamic(),
                    hosts: Vec::new(),
                    error: Some(e.message()),
                },
            })
            .collect()
    }
}

/// Unified output writer supporting both text and JSON formats
pub enum OutputWriter {
    Text(TerminalOutput),
    Json(JsonOutput),
}

impl OutputWriter {
    pub fn new(format: OutputFormat, verbose: bool, quiet: bool) -> Self {
        match format {
            OutputFormat::Text => OutputWriter::Text(TerminalOutput::new(verbose, quiet)),
            OutputFormat::Json => OutputWriter::Json(JsonOutput::new()),
        }
    }

    pub fn print_resolution(&self, resolution: &Resolution) {
        match self {
            OutputWriter::Text(output) => output.print_resolution(resolution),
            OutputWriter::Json(output) => output.print_resolution(resolution),
        }
    }

    pub fn print_task_list(&self, registry: &TaskRegistry) {
        match self {
            OutputWriter::Text(output) => output.print_task_list(registry),
            OutputWriter::Json(output) => output.print_task_list(registry),
        }
    }

    pub fn print_roles(&self, roles: &[RoleReport]) {
        match self {
            OutputWriter::Text(output) => output.print_roles(roles),
            OutputWriter::Json(output) => output.print_roles(roles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::RoleDef;
    use crate::output::errors::RosterError;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_role_report_collect() {
        let env = Environment::new()
            .with_role("web", vec!["w1"])
            .with_role(
                "broken",
                RoleDef::dynamic(|| {
                    Err(RosterError::Role {
                        role: "broken".to_string(),
                        message: "no inventory".to_string(),
                    })
                }),
            );

        let reports = RoleReport::collect(&env);
        assert_eq!(reports.len(), 2);

        assert_eq!(reports[0].name, "broken");
        assert!(reports[0].dynamic);
        assert!(reports[0].error.as_deref().unwrap().contains("no inventory"));

        assert_eq!(reports[1].name, "web");
        assert_eq!(reports[1].hosts, vec!["w1"]);
        assert_eq!(reports[1].error, None);
    }
}
