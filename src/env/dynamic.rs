// Script-backed roles - run a command to compute a role's hosts
//
// The command is executed each time the role is expanded:
// - stdout starting with `[` is parsed as a JSON array of host strings
// - anything else is read as one host per non-empty line

use std::path::PathBuf;
use std::process::Command;

use super::RoleDef;
use crate::output::errors::RosterError;

/// A role whose membership comes from an external inventory command
#[derive(Debug, Clone)]
pub struct ScriptRole {
    role: String,
    command: PathBuf,
    args: Vec<String>,
}

impl ScriptRole {
    pub fn new(role: impl Into<String>, command: impl Into<PathBuf>) -> Self {
        ScriptRole {
            role: role.into(),
            command: command.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Execute the command and return the hosts it reports
    pub fn run(&self) -> Result<Vec<String>, RosterError> {
        tracing::debug!(
            role = %self.role,
            command = %self.command.display(),
            "expanding dynamic role"
        );

        let output = Command::new(&self.command)
            .args(&self.args)
            .output()
            .map_err(|e| RosterError::Role {
                role: self.role.clone(),
                message: format!(
                    "Failed to execute role command '{}': {}",
                    self.command.display(),
                    e
                ),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RosterError::Role {
                role: self.role.clone(),
                message: format!(
                    "Role command '{}' failed with exit code {}: {}",
                    self.command.display(),
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        self.parse_output(&stdout)
    }

    fn parse_output(&self, stdout: &str) -> Result<Vec<String>, RosterError> {
        let trimmed = stdout.trim();

        if trimmed.starts_with('[') {
            return serde_json::from_str::<Vec<String>>(trimmed).map_err(|e| RosterError::Role {
                role: self.role.clone(),
                message: format!("Invalid JSON from role command: {}", e),
            });
        }

        Ok(trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    pub fn into_role_def(self) -> RoleDef {
        RoleDef::dynamic(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_json_output() {
        let role = ScriptRole::new("web", "/tmp/web.sh");
        let hosts = role.parse_output("[\"web1\", \"web2\"]\n").unwrap();
        assert_eq!(hosts, vec!["web1", "web2"]);
    }

    #[test]
    fn test_parse_line_output() {
        let role = ScriptRole::new("web", "/tmp/web.sh");
        let hosts = role.parse_output("web1\n\n  web2  \n").unwrap();
        assert_eq!(hosts, vec!["web1", "web2"]);
    }

    #[test]
    fn test_parse_invalid_json() {
        let role = ScriptRole::new("web", "/tmp/web.sh");
        let err = role.parse_output("[\"web1\", 3]").unwrap_err();
        assert!(matches!(err, RosterError::Role { ref role, .. } if role == "web"));
    }

    #[test]
    fn test_missing_command() {
        let role = ScriptRole::new("db", "/nonexistent/roster-role-script");
        let err = role.run().unwrap_err();
        assert!(err.message().contains("Failed to execute role command"));
    }

    #[cfg(unix)]
    #[test]
    fn test_script_output_is_read_fresh() {
        let dir = tempfile::TempDir::new().unwrap();
        let data = dir.path().join("hosts.txt");
        std::fs::write(&data, "a1\na2\n").unwrap();

        let def = ScriptRole::new("app", "/bin/cat")
            .with_args(vec![data.display().to_string()])
            .into_role_def();
        assert_eq!(def.hosts().unwrap(), vec!["a1", "a2"]);

        std::fs::write(&data, "b1\n").unwrap();
        assert_eq!(def.hosts().unwrap(), vec!["b1"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_script() {
        let err = ScriptRole::new("app", "/bin/sh")
            .with_args(vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()])
            .run()
            .unwrap_err();
        let message = err.message();
        assert!(message.contains("exit code 3"));
        assert!(message.contains("boom"));
    }
}
