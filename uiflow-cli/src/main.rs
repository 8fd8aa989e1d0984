//! uiflow CLI
//!
//! Loads and validates layered automation configs and inspects their contents.
//!
//! Usage:
//!   uiflow --config default.json validate
//!   uiflow --config default.json --runtime runtime.json workflows
//!   uiflow show OPEN_BLUETOOTH
//!   uiflow get UI_ELEMENTS BLUETOOTH_TOGGLE

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;
use uiflow::{AutomationConfig, ConfigCategory, ConfigLoader, ConfigValue};

#[derive(Parser)]
#[command(name = "uiflow")]
#[command(about = "Validate and inspect uiflow automation configs")]
#[command(
    long_about = "uiflow loads a base automation config, layers the optional gas and runtime configs over it, validates the result strictly and lets you inspect commands, packages, actions, UI elements and workflows."
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Verbose output
    #[clap(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Base config file
    #[clap(long, short = 'c', env = "UIFLOW_CONFIG", default_value = "uiflow.json")]
    config: PathBuf,

    /// Gas config merged over the base; may add new keys
    #[clap(long, env = "UIFLOW_GAS_CONFIG")]
    gas: Option<PathBuf>,

    /// Runtime config; may only override keys the base already defines
    #[clap(long, short = 'r', env = "UIFLOW_RUNTIME_CONFIG")]
    runtime: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every layer and report what the config defines
    Validate,
    /// List workflows with their task count
    Workflows,
    /// Print a validated workflow as JSON
    Show {
        /// Workflow name
        workflow: String,
    },
    /// Print one value from COMMANDS, PACKAGES, ACTIONS or UI_ELEMENTS
    Get {
        /// Category name, e.g. UI_ELEMENTS
        category: String,
        /// Key within the category
        key: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {e:?}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let default_filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;
    match cli.command {
        Commands::Validate => validate(&config),
        Commands::Workflows => list_workflows(&config),
        Commands::Show { workflow } => show_workflow(&config, &workflow),
        Commands::Get { category, key } => get_value(&config, &category, &key),
    }
}

fn load_config(args: &ConfigArgs) -> Result<AutomationConfig> {
    debug!(?args, "Loading config layers");
    let mut loader = ConfigLoader::new(&args.config);
    if let Some(gas) = &args.gas {
        loader = loader.with_gas(gas);
    }
    if let Some(runtime) = &args.runtime {
        loader = loader.with_runtime(runtime);
    }
    loader
        .load()
        .with_context(|| format!("Failed to load config {}", args.config.display()))?
        .ok_or_else(|| anyhow!("No config available at {}", args.config.display()))
}

fn validate(config: &AutomationConfig) -> Result<()> {
    println!("{}", "Config is valid".green().bold());
    for category in ConfigCategory::STORE {
        println!("  {:<12} {}", category.as_str(), config.store.len(category));
    }
    println!("  {:<12} {}", ConfigCategory::Workflows.as_str(), config.workflows.len());
    for workflow in config.workflows.values() {
        println!("    {} ({} tasks)", workflow.name.cyan(), workflow.tasks.len());
    }
    Ok(())
}

fn list_workflows(config: &AutomationConfig) -> Result<()> {
    if config.workflows.is_empty() {
        println!("{}", "No workflows defined".yellow());
        return Ok(());
    }
    for workflow in config.workflows.values() {
        println!("{}\t{}", workflow.name, workflow.tasks.len());
    }
    Ok(())
}

fn show_workflow(config: &AutomationConfig, name: &str) -> Result<()> {
    let workflow = config.workflow(name)?;
    let json =
        serde_json::to_string_pretty(workflow).context("Failed to serialize workflow")?;
    println!("{json}");
    Ok(())
}

fn get_value(config: &AutomationConfig, category: &str, key: &str) -> Result<()> {
    let category: ConfigCategory = category
        .parse()
        .with_context(|| format!("Unknown category {category}"))?;
    if category == ConfigCategory::Workflows {
        return show_workflow(config, key);
    }
    match config.store.get(category, key)? {
        ConfigValue::Text(text) => println!("{text}"),
        element @ ConfigValue::Element(_) => println!(
            "{}",
            serde_json::to_string_pretty(&element).context("Failed to serialize UI element")?
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_and_layers() {
        let cli = Cli::try_parse_from([
            "uiflow",
            "--config",
            "base.json",
            "--runtime",
            "runtime.json",
            "get",
            "PACKAGES",
            "SETTINGS",
        ])
        .unwrap();
        assert_eq!(cli.config.config, PathBuf::from("base.json"));
        assert_eq!(cli.config.runtime, Some(PathBuf::from("runtime.json")));
        assert!(matches!(
            cli.command,
            Commands::Get { ref category, ref key } if category == "PACKAGES" && key == "SETTINGS"
        ));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["uiflow", "workflows", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let config = AutomationConfig::default();
        assert!(get_value(&config, "SETTINGS", "X").is_err());
        assert!(get_value(&config, "PACKAGES", "X").is_err());
    }
}
