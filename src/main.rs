// Roster CLI - resolve target hosts and pool sizes for remote tasks

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster::env::{EnvOverrides, Environment};
use roster::hosts::{resolve_invocation, resolve_task};
use roster::output::{OutputFormat, OutputWriter, RoleReport, RosterError};
use roster::registry::{parse_invocation, Task, TaskRegistry};

#[derive(Parser)]
#[command(
    name = "roster",
    about = "Resolve target hosts and parallel pool sizes for remote tasks",
    version,
    author,
    disable_colored_help = true,
    term_width = 0,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the environment file (hosts, roles, roledefs)
    #[arg(short, long, global = true)]
    env: Option<PathBuf>,

    /// Comma-separated default host list (overrides the environment file)
    #[arg(short = 'H', long, global = true)]
    hosts: Option<String>,

    /// Comma-separated default role list (overrides the environment file)
    #[arg(short = 'R', long, global = true)]
    roles: Option<String>,

    /// Comma-separated hosts to exclude by default
    #[arg(short = 'x', long, global = true)]
    exclude_hosts: Option<String>,

    /// Default parallel pool size
    #[arg(short = 'z', long, global = true)]
    pool_size: Option<usize>,

    /// Run every task in parallel unless it opts out
    #[arg(short = 'P', long, global = true)]
    parallel: bool,

    /// Show debug diagnostics
    #[arg(long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only print host names
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    output_format: String,
}

#[derive(Subcommand)]
#[command(disable_colored_help = true)]
enum Commands {
    /// Show the hosts and pool size each task would use
    Hosts {
        /// Task invocations, e.g. deploy or deploy:hosts=web1;web2,exclude_hosts=web2
        #[arg(required = true)]
        tasks: Vec<String>,

        /// Path to the task file
        #[arg(short = 'f', long)]
        tasks_file: Option<PathBuf>,
    },

    /// List tasks in a task file
    List {
        /// Path to the task file
        #[arg(short = 'f', long)]
        tasks_file: PathBuf,
    },

    /// Show role definitions and the hosts they expand to
    Roles,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.debug);

    let output_format = OutputFormat::from_str(&cli.output_format).unwrap_or_else(|_| {
        eprintln!("Invalid output format: {}. Using 'text'.", cli.output_format);
        OutputFormat::Text
    });
    let output = OutputWriter::new(output_format, cli.verbose, cli.quiet);

    let overrides = EnvOverrides {
        hosts: cli.hosts,
        roles: cli.roles,
        exclude_hosts: cli.exclude_hosts,
        pool_size: cli.pool_size,
        parallel: cli.parallel,
    };

    let result = load_environment(cli.env.as_deref(), &overrides).and_then(|env| match cli.command {
        Commands::Hosts { tasks, tasks_file } => {
            show_hosts(&tasks, tasks_file.as_deref(), &env, &output)
        }
        Commands::List { tasks_file } => list_tasks(&tasks_file, &output),
        Commands::Roles => show_roles(&env, &output),
    });

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Build the environment: file values first, then global command-line overrides
fn load_environment(path: Option<&Path>, overrides: &EnvOverrides) -> Result<Environment, RosterError> {
    let mut env = match path {
        Some(path) => Environment::from_file(path)?,
        None => Environment::new(),
    };
    overrides.apply(&mut env);

    tracing::debug!(
        hosts = env.hosts.len(),
        roles = env.roles.len(),
        roledefs = env.roledefs.len(),
        "loaded environment"
    );

    Ok(env)
}

/// Resolve each invocation in order
///
/// Without a task file every invocation names an ad-hoc task with no annotations.
fn show_hosts(
    invocations: &[String],
    tasks_file: Option<&Path>,
    env: &Environment,
    output: &OutputWriter,
) -> Result<(), RosterError> {
    let registry = tasks_file.map(TaskRegistry::from_file).transpose()?;

    for raw in invocations {
        let invocation = parse_invocation(raw)?;

        let resolution = match registry {
            Some(ref registry) => resolve_invocation(registry, &invocation, env)?,
            None => {
                let task = Task::new(invocation.name.clone());
                resolve_task(&invocation.name, &task, &invocation, env)?
            }
        };

        output.print_resolution(&resolution);
    }

    Ok(())
}

fn list_tasks(tasks_file: &Path, output: &OutputWriter) -> Result<(), RosterError> {
    let registry = TaskRegistry::from_file(tasks_file)?;
    output.print_task_list(&registry);
    Ok(())
}

fn show_roles(env: &Environment, output: &OutputWriter) -> Result<(), RosterError> {
    let reports = RoleReport::collect(env);
    output.print_roles(&reports);
    Ok(())
}
