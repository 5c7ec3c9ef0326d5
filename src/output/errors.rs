// Human-readable error messages for Roster

use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;

use colored::*;

/// Initialize color output based on TTY detection and NO_COLOR environment variable
fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    std::io::stderr().is_terminal()
}

/// All error types in Roster
#[derive(Debug)]
pub enum RosterError {
    /// One or more referenced roles are missing from the role definitions
    UnknownRoles { roles: Vec<String> },

    /// A dynamic role failed to produce its host list
    Role { role: String, message: String },

    /// Malformed environment or task file
    Config {
        message: String,
        suggestion: Option<String>,
    },

    /// I/O errors
    Io {
        message: String,
        path: Option<PathBuf>,
    },

    /// Requested task is not in the registry
    TaskNotFound {
        name: String,
        suggestion: Option<String>,
    },

    /// Malformed task invocation string
    Args { message: String },
}

impl RosterError {
    /// The plain message, without the colored heading
    pub fn message(&self) -> String {
        match self {
            RosterError::UnknownRoles { roles } => format!(
                "The following specified roles do not exist:\n{}",
                indent(roles.as_slice(), 4)
            ),
            RosterError::Role { role, message } => {
                format!("Role '{}' could not be expanded: {}", role, message)
            }
            RosterError::Config { message, .. } => message.clone(),
            RosterError::Io { message, .. } => message.clone(),
            RosterError::TaskNotFound { name, .. } => format!("Task '{}' was not found", name),
            RosterError::Args { message } => message.clone(),
        }
    }
}

/// Indent each line by `spaces`, one line per item
pub fn indent<S: AsRef<str>>(lines: &[S], spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    lines
        .iter()
        .map(|line| format!("{}{}", pad, line.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

impl std::error::Error for RosterError {}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !should_use_colors() {
            colored::control::set_override(false);
        }

        match self {
            RosterError::UnknownRoles { .. } => {
                writeln!(f, "{}: {}", "ROLE ERROR".red().bold(), self.message())?;
                writeln!(f)?;
                writeln!(
                    f,
                    "{}: Define the missing roles under 'roledefs' in the environment file",
                    "Hint".yellow().bold()
                )?;
                Ok(())
            }

            RosterError::Role { role, message } => {
                writeln!(f, "{}: {}", "ROLE ERROR".red().bold(), message)?;
                writeln!(f, "  {} {}", "Role:".dimmed(), role)?;
                Ok(())
            }

            RosterError::Config {
                message,
                suggestion,
            } => {
                writeln!(f, "{}: {}", "CONFIG ERROR".red().bold(), message)?;

                if let Some(suggestion) = suggestion {
                    writeln!(f)?;
                    writeln!(f, "{}: {}", "Hint".yellow().bold(), suggestion)?;
                }

                Ok(())
            }

            RosterError::Io { message, path } => {
                writeln!(f, "{}: {}", "I/O ERROR".red().bold(), message)?;
                if let Some(path) = path {
                    writeln!(f, "  {} {}", "Path:".dimmed(), path.display())?;
                }
                Ok(())
            }

            RosterError::TaskNotFound { suggestion, .. } => {
                writeln!(f, "{}: {}", "TASK ERROR".red().bold(), self.message())?;

                if let Some(suggestion) = suggestion {
                    writeln!(f)?;
                    writeln!(f, "{}: {}", "Hint".yellow().bold(), suggestion)?;
                }

                Ok(())
            }

            RosterError::Args { message } => {
                writeln!(f, "{}: {}", "ARGUMENT ERROR".red().bold(), message)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_roles_lists_every_name() {
        let err = RosterError::UnknownRoles {
            roles: vec!["web".to_string(), "dbs".to_string()],
        };

        let output = format!("{}", err);
        let clean_output = console::strip_ansi_codes(&output);

        assert!(clean_output.contains("The following specified roles do not exist:"));
        assert!(clean_output.contains("    web\n    dbs"));
        assert!(clean_output.contains("roledefs"));
    }

    #[test]
    fn test_io_error_display() {
        let err = RosterError::Io {
            message: "Failed to read environment file: No such file".to_string(),
            path: Some(PathBuf::from("/etc/roster/env.yaml")),
        };

        let output = format!("{}", err);
        let clean_output = console::strip_ansi_codes(&output);

        assert!(clean_output.contains("I/O ERROR"));
        assert!(clean_output.contains("/etc/roster/env.yaml"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent(&["a", "b"], 2), "  a\n  b");
        assert_eq!(indent::<&str>(&[], 4), "");
    }
}
