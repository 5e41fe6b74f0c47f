use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for the `syx` binary.
#[derive(Debug, Parser)]
#[command(name = "syx", version, about = "Synthex - synthesis-procedure extraction from papers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the extraction chain over a directory of papers
    Extract(ExtractArgs),
    /// Inspect the resolved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect the registered extraction schemas
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Configuration override, `group.key=value`. Comma-separated values
    /// declare a sweep dimension; repeat the flag for more dimensions.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Use the per-point result layout even for a single sweep point
    #[arg(long)]
    pub multirun: bool,

    /// Directory of plain-text papers (overrides data.data_dir)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<String>,

    /// Directory run results land in (overrides result.run_dir)
    #[arg(long, value_name = "DIR")]
    pub run_dir: Option<String>,

    /// Process at most this many papers (overrides data.limit)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the fully resolved configuration as TOML
    Show,
}

#[derive(Debug, Subcommand)]
pub enum SchemaAction {
    /// List the registered schema names
    List,
    /// Print one schema as JSON
    Show { name: String },
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extract_accepts_repeated_overrides() {
        let cli = Cli::try_parse_from([
            "syx",
            "extract",
            "-S",
            "judge.model=gpt-4o,mistral-large",
            "-S",
            "executor.max_attempts=5",
            "--multirun",
            "--data-dir",
            "papers",
        ])
        .expect("cli should parse");

        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.set.len(), 2);
        assert!(args.multirun);
        assert_eq!(args.data_dir.as_deref(), Some("papers"));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["syx", "schema", "list", "--verbose"])
            .expect("cli should parse");
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Schema {
                action: SchemaAction::List
            }
        ));
    }

    #[test]
    fn schema_show_requires_a_name() {
        assert!(Cli::try_parse_from(["syx", "schema", "show"]).is_err());
    }
}
