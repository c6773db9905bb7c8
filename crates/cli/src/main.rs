// rindex - build the unified responsa citation index from per-manuscript tables

mod exit_codes;
mod index;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use responsa_recon::PrefixRule;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rindex")]
#[command(about = "Merge responsa citation tables into one locator-keyed index")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Only log errors (RUST_LOG overrides)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, merge and export every source table named by a run config
    #[command(after_help = "\
Outputs (in output.dir, or --output-dir):
  <prefix>_<version>.csv              merged index, sorted by numeric_key
  output_stats_v<version>.json        per-source and total key statistics
  unmatched_keys_v<version>.txt       fragments no rule accepted, one per line
  handler_summary_v<version>.<fmt>    normalization handler counters

Examples:
  rindex run index.toml
  rindex run index.toml --json --output-dir build/
  rindex run index.toml --fail-under 90")]
    Run {
        /// Run config (TOML)
        config: PathBuf,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write outputs here instead of the config's output.dir
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Exit 5 if total clean-key percentage is below this value
        #[arg(long, value_name = "PCT")]
        fail_under: Option<f64>,
    },

    /// Check a run config and its special-case table without building
    #[command(after_help = "\
Examples:
  rindex validate index.toml")]
    Validate {
        /// Run config (TOML)
        config: PathBuf,
    },

    /// Normalize raw key cells and print the accepted locators
    #[command(after_help = "\
Each accepted locator is printed as: locator, display key, numeric key.

Examples:
  rindex normalize 'א:א + א:ב'
  rindex normalize --special-cases special_cases.json 'א:קנ-קנב'
  rindex normalize --prefix-rule suffix 'א-א:רמט' --json")]
    Normalize {
        /// Raw key cells
        #[arg(required = true)]
        cells: Vec<String>,

        /// Special-case table (JSON: raw text -> locators)
        #[arg(long)]
        special_cases: Option<PathBuf>,

        /// How single-letter prefixed ranges are recognized
        #[arg(long, value_enum, default_value = "whole")]
        prefix_rule: PrefixRuleArg,

        /// Print results as JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PrefixRuleArg {
    Whole,
    Suffix,
}

impl From<PrefixRuleArg> for PrefixRule {
    fn from(arg: PrefixRuleArg) -> Self {
        match arg {
            PrefixRuleArg::Whole => PrefixRule::Whole,
            PrefixRuleArg::Suffix => PrefixRule::Suffix,
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "error" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let result = match cli.command {
        None => {
            // No subcommand = show usage
            eprintln!("Usage: rindex <command> [options]");
            eprintln!("       rindex --help for more information");
            Err(CliError::usage(""))
        }
        Some(Commands::Run { config, json, output_dir, fail_under }) => {
            index::cmd_run(config, json, output_dir, fail_under)
        }
        Some(Commands::Validate { config }) => index::cmd_validate(config),
        Some(Commands::Normalize { cells, special_cases, prefix_rule, json }) => {
            index::cmd_normalize(cells, special_cases, prefix_rule.into(), json)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
