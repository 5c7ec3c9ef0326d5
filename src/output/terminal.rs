// Terminal output for Roster

use std::fmt::Write as _;
use std::io::IsTerminal;

use colored::*;

use super::RoleReport;
use crate::hosts::Resolution;
use crate::registry::TaskRegistry;

/// Terminal output manager
pub struct TerminalOutput {
    verbose: bool,
    quiet: bool,
}

impl TerminalOutput {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        // Respect NO_COLOR (https://no-color.org/) and disable colors off a TTY
        if std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal() {
            colored::control::set_override(false);
        }

        TerminalOutput { verbose, quiet }
    }

    /// Print the hosts and parallelism chosen for a task
    pub fn print_resolution(&self, resolution: &Resolution) {
        print!("{}", self.render_resolution(resolution));
    }

    pub fn render_resolution(&self, resolution: &Resolution) -> String {
        let mut out = String::new();

        if self.quiet {
            for host in &resolution.hosts {
                let _ = writeln!(out, "{}", host);
            }
            return out;
        }

        let _ = write!(out, "{} {}", "TASK".yellow().bold(), resolution.name.cyan());
        if resolution.task != resolution.name {
            let _ = write!(out, " {}", format!("(runs {})", resolution.task).dimmed());
        }
        let _ = writeln!(out);

        if self.verbose {
            let _ = writeln!(out, "  {} {}", "Source:".dimmed(), resolution.source);
        }

        let mode = match resolution.pool_size {
            Some(size) => format!("parallel, pool size {}", size),
            None => "serial".to_string(),
        };
        let _ = writeln!(out, "  {} {}", "Mode:".dimmed(), mode);

        if resolution.hosts.is_empty() {
            let _ = writeln!(out, "  {} none", "Hosts:".dimmed());
            return out;
        }

        let _ = writeln!(out, "  {} ({})", "Hosts:".dimmed(), resolution.hosts.len());
        for host in &resolution.hosts {
            let _ = writeln!(out, "    {}", host.white().bold());
        }

        out
    }

    /// Print every task name, with descriptions and group defaults
    pub fn print_task_list(&self, registry: &TaskRegistry) {
        print!("{}", self.render_task_list(registry));
    }

    pub fn render_task_list(&self, registry: &TaskRegistry) -> String {
        let mut out = String::new();
        let names = registry.task_names();

        if self.quiet {
            for name in &names {
                let _ = writeln!(out, "{}", name);
            }
            return out;
        }

        let _ = writeln!(out, "{}", "Available tasks:".green().bold());
        let _ = writeln!(out);

        let width = names.iter().map(|n| n.len()).max().unwrap_or(0);
        for name in &names {
            let description = registry
                .resolve(name)
                .and_then(|task| task.description.as_deref())
                .unwrap_or("");

            if description.is_empty() {
                let _ = writeln!(out, "    {}", name);
            } else {
                let _ = writeln!(
                    out,
                    "    {:<width$}  {}",
                    name,
                    description.dimmed(),
                    width = width
                );
            }
        }

        let defaults = registry.defaults();
        if !defaults.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", "Group defaults:".green().bold());
            let _ = writeln!(out);
            for (group, target) in defaults {
                let _ = writeln!(out, "    {} {} {}", group, "->".dimmed(), target);
            }
        }

        out
    }

    /// Print each role with the hosts it currently expands to
    pub fn print_roles(&self, roles: &[RoleReport]) {
        print!("{}", self.render_roles(roles));
    }

    pub fn render_roles(&self, roles: &[RoleReport]) -> String {
        let mut out = String::new();

        for role in roles {
            let kind = if role.dynamic { " (dynamic)" } else { "" };
            let _ = writeln!(out, "{}{}", role.name.cyan().bold(), kind.dimmed());

            if let Some(ref error) = role.error {
                let _ = writeln!(out, "    {}", error.red());
                continue;
            }

            if self.quiet {
                continue;
            }

            for host in &role.hosts {
                let _ = writeln!(out, "    {}", host);
            }
        }

        out
    }
}
