//! depver CLI
//!
//! Entry point for the `depver` command-line tool.

use clap::{Args, Parser, Subcommand};
use depver::config::{default_host_config_path, REPO_CONFIG_FILE};
use depver::{
    apply_to_file, build_table, EffectiveConfig, OutputTarget, OverrideTable, PropertyInputs,
};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "depver")]
#[command(about = "Override dependency versions in a build model", version)]
struct Cli {
    /// Log every override decision (same as RUST_LOG=debug)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a model file's dependency versions
    Apply {
        /// Model file (.json or .toml)
        #[arg(long, short = 'm')]
        model: PathBuf,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Write the rewritten model here instead of in place
        #[arg(long, short = 'o', conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Print the rewritten model to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,

        /// Report what would change without writing anything
        #[arg(long, conflicts_with_all = ["output", "stdout"])]
        dry_run: bool,

        /// Do not append dependencies for unmatched overrides
        #[arg(long)]
        no_inject: bool,

        /// Output the summary in JSON format
        #[arg(long, conflicts_with = "stdout")]
        json: bool,
    },

    /// Show the parsed override table
    Table {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Verify the layered configuration
    Verify {
        /// Path to repo config file (default: .depver.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct OverrideArgs {
    /// Property definition, e.g. -D version:junit:junit=4.10 (repeatable)
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    define: Vec<String>,

    /// Properties file with key=value lines (repeatable)
    #[arg(long, short = 'p')]
    properties: Vec<PathBuf>,

    /// Path to repo config file (default: .depver.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

impl OverrideArgs {
    fn inputs(&self) -> PropertyInputs {
        PropertyInputs {
            files: self.properties.clone(),
            definitions: self.define.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Apply {
            model,
            overrides,
            output,
            stdout,
            dry_run,
            no_inject,
            json,
        } => {
            let target = if dry_run || stdout {
                OutputTarget::None
            } else if let Some(path) = output {
                OutputTarget::File(path)
            } else {
                OutputTarget::InPlace
            };
            run_apply(&model, &overrides, target, stdout, no_inject, json);
        }
        Commands::Table { overrides, json } => run_table(&overrides, json),
        Commands::Verify { config } => run_verify(config),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_config(repo_config: Option<PathBuf>, cli: Option<serde_json::Value>) -> EffectiveConfig {
    let host = default_host_config_path();
    let repo = repo_config.unwrap_or_else(|| PathBuf::from(REPO_CONFIG_FILE));

    match EffectiveConfig::build(host.as_deref(), Some(repo.as_path()), cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    }
}

fn run_apply(
    model: &Path,
    overrides: &OverrideArgs,
    target: OutputTarget,
    stdout: bool,
    no_inject: bool,
    json: bool,
) {
    let cli_overrides = no_inject.then(|| serde_json::json!({ "inject_missing": false }));
    let config = load_config(overrides.config.clone(), cli_overrides);

    let outcome = match apply_to_file(&config, &overrides.inputs(), model, &target) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if stdout {
        match outcome.manifest.render() {
            Ok(rendered) => print!("{}", rendered),
            Err(e) => {
                eprintln!("Error rendering model: {}", e);
                process::exit(1);
            }
        }
        // Keep stdout clean for the model itself.
        eprintln!("{}", outcome.summary.to_human());
        return;
    }

    if json {
        match outcome.summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", outcome.summary.to_human());
    }
}

fn run_table(overrides: &OverrideArgs, json: bool) {
    let config = load_config(overrides.config.clone(), None);
    let table = match build_table(&config, &overrides.inputs()) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&table) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let separator = config.override_settings().separator;
    for line in table_lines(&table, separator) {
        println!("{}", line);
    }
}

/// Human listing of a table, keys written the way they are given as properties
fn table_lines(table: &OverrideTable, separator: char) -> Vec<String> {
    let mut lines = Vec::new();
    if table.is_empty() {
        lines.push("No version overrides.".to_string());
    } else {
        lines.push(format!("Version overrides ({} total):\n", table.len()));
        for entry in table.entries() {
            lines.push(format!(
                "  {} = {}",
                entry.key().to_property_name(separator),
                entry.version()
            ));
        }
    }
    for skipped in table.skipped() {
        lines.push(format!("  skipped: {}", skipped));
    }
    lines
}

fn run_verify(config_path: Option<PathBuf>) {
    let config = load_config(config_path, None);
    let settings = config.override_settings();

    println!("Configuration valid\n");
    println!("  Property prefix: {}", settings.property_prefix);
    println!("  Inject missing: {}", settings.inject_missing);
    println!("  Config properties: {}", settings.properties.len());
    for source in &config.sources {
        match source.path {
            Some(ref path) => println!("  Source: {:?} ({})", source.origin, path),
            None => println!("  Source: {:?}", source.origin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depver::TableBuilder;

    #[test]
    fn test_apply_json_conflicts_with_stdout() {
        let result = Cli::try_parse_from(["depver", "apply", "-m", "m.json", "--stdout", "--json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_json_with_output_file() {
        let cli = Cli::try_parse_from(["depver", "apply", "-m", "m.json", "-o", "out.json", "--json"])
            .unwrap();
        match cli.command {
            Commands::Apply { output, json, stdout, .. } => {
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(json);
                assert!(!stdout);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_table_lines_use_configured_separator() {
        let table = TableBuilder::new('/').build(vec![
            ("org.foo/bar".to_string(), "1.0".to_string()),
            ("bad".to_string(), "x".to_string()),
        ]);

        let lines = table_lines(&table, '/');

        assert_eq!(lines[0], "Version overrides (1 total):\n");
        assert_eq!(lines[1], "  org.foo/bar = 1.0");
        assert!(lines[2].starts_with("  skipped: "));
    }

    #[test]
    fn test_table_lines_empty() {
        let table = TableBuilder::default().build(Vec::<(String, String)>::new());
        assert_eq!(table_lines(&table, ':'), vec!["No version overrides."]);
    }
}
