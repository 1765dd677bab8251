#![forbid(unsafe_code)]

mod cmd;
mod output;
mod store;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, fail};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use ume_core::config::discover_config;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ume: list, filter and bulk-manage UmeEgunero records",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ./ume.toml, then the user config dir).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        OutputMode::resolve(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List records",
        long_about = "Filter, sort and page a JSON snapshot of users, centers, tasks or notifications.",
        after_help = "EXAMPLES:\n    # Active users, first page\n    ume list users -f users.json\n\n    # Teachers whose surname contains garcia, second page of 20\n    ume list users -f users.json --tag teacher --field surname=garcia --page 2 --page-size 20\n\n    # Overdue tasks as JSON\n    ume list tasks -f tasks.json --overdue --format json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Export records as CSV",
        long_about = "Write the visible, selected or all records of a snapshot as CSV.",
        after_help = "EXAMPLES:\n    # Visible users to stdout\n    ume export users -f users.json\n\n    # Two selected centers to a file\n    ume export centers -f centers.json --selected c1 --selected c2 -o centers.csv\n\n    # Every notification, ignoring filters\n    ume export notifications -f notes.json --all"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Write",
        about = "Apply a bulk action to users",
        long_about = "Activate, deactivate, delete or reset the password of selected users, then save the snapshot.",
        after_help = "EXAMPLES:\n    # Deactivate two users\n    ume batch -f users.json --action deactivate 11111111A 22222222B\n\n    # Delete every visible inactive student\n    ume batch -f users.json --action delete --all-visible --include-inactive --tag student\n\n    # Reset a password with a generated one\n    ume batch -f users.json --action reset-password --generate 11111111A"
    )]
    Batch(cmd::batch::BatchArgs),

    #[command(
        next_help_heading = "Tools",
        about = "Generate or score passwords",
        long_about = "Generate passwords from the secure system generator, or score an existing one.",
        after_help = "EXAMPLES:\n    # One password with the configured policy\n    ume password\n\n    # Five 16-character passwords without symbols\n    ume password -n 5 --length 16 --no-symbols\n\n    # Score a password\n    ume password --check 'Secret-123'"
    )]
    Password(cmd::password::PasswordArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("UME_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "ume=debug,ume_core=debug,info"
        } else {
            "ume=info,ume_core=info,warn"
        })
    });

    let format = env::var("UME_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let cwd = env::current_dir()?;
    let config = discover_config(cli.config.as_deref(), &cwd)
        .map_err(|e| fail(output, &CliError::from_code(e.error_code(), e.to_string())))?;

    match cli.command {
        Commands::List(ref args) => cmd::list::run_list(args, &config, output),
        Commands::Export(ref args) => cmd::export::run_export(args, &config, output),
        Commands::Batch(ref args) => cmd::batch::run_batch(args, &config, output),
        Commands::Password(ref args) => cmd::password::run_password(args, &config, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flag_sets_output_mode() {
        let cli = Cli::parse_from(["ume", "--format", "json", "password"]);
        assert_eq!(cli.format, Some(OutputMode::Json));
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["ume", "password", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["ume", "password", "--config", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn list_subcommand_parses() {
        let cli = Cli::parse_from(["ume", "list", "users", "-f", "users.json"]);
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["ume", "list", "centers", "-f", "c.json"],
            vec!["ume", "export", "tasks", "-f", "t.json", "--all"],
            vec!["ume", "batch", "-f", "u.json", "--action", "activate", "A"],
            vec!["ume", "password", "--check", "x"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "failed to parse {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn unknown_collection_is_rejected() {
        assert!(Cli::try_parse_from(["ume", "list", "grades", "-f", "g.json"]).is_err());
    }
}
