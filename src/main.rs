// SPDX-License-Identifier: AGPL-3.0-or-later
//! hostcheck: acceptance checks for provisioned hosts
//!
//! CLI entry point: resolves hosts from an inventory and runs read-only
//! state checks against each of them.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hostcheck::{
    inventory,
    suite::{self, Outcome, Suite, SuiteReport, SuiteRunner},
    Config,
};

/// hostcheck: host acceptance checks
///
/// Resolves target hosts from an Ansible-style inventory and asserts on
/// their state: file ownership, installed packages, running processes.
/// Exits 0 iff every assertion on every host holds.
#[derive(Parser, Debug)]
#[command(name = "hostcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "hostcheck.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Dry run mode (resolve and report without probing any host)
    #[arg(long)]
    dry_run: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a suite against the inventory hosts
    #[command(alias = "check")]
    Run {
        /// Name or path of the suite to run (defaults to the built-in suite)
        suite: Option<String>,

        /// Inventory file (overrides HOSTCHECK_INVENTORY_FILE)
        #[arg(short, long)]
        inventory: Option<PathBuf>,

        /// Inventory group to target (overrides the suite's group)
        #[arg(long)]
        hosts: Option<String>,
    },

    /// Show the hosts resolved from the inventory
    Hosts {
        /// Inventory file (overrides HOSTCHECK_INVENTORY_FILE)
        #[arg(short, long)]
        inventory: Option<PathBuf>,

        /// Inventory group to resolve
        #[arg(long, default_value = "all")]
        group: String,
    },

    /// List available suites
    #[command(alias = "ls")]
    List,

    /// Validate a suite file
    Validate {
        /// Path to the suite file
        suite: PathBuf,
    },

    /// Show configuration
    Config,

    /// Initialize a new hostcheck configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("hostcheck v{}", env!("CARGO_PKG_VERSION"));
            println!("Acceptance checks for provisioned hosts");
            Ok(())
        }

        Commands::Init { force } => init_config(&cli.config, force).await,

        Commands::Config => show_config(&cli.config).await,

        Commands::List => list_suites(&cli.config).await,

        Commands::Validate { suite } => validate_suite(&suite).await,

        Commands::Hosts { inventory, group } => {
            show_hosts(&cli.config, inventory.as_deref(), &group, cli.format).await
        }

        Commands::Run {
            suite,
            inventory,
            hosts,
        } => {
            run_suite(
                &cli.config,
                suite.as_deref(),
                inventory.as_deref(),
                hosts.as_deref(),
                cli.dry_run,
                cli.format,
            )
            .await
        }
    }
}

/// Load the configuration file, falling back to defaults when absent
fn load_config(config_path: &Path) -> anyhow::Result<Config> {
    if config_path.exists() {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        Ok(Config::default())
    }
}

/// Initialize a new configuration file
async fn init_config(config_path: &Path, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let default_config = r#"# SPDX-License-Identifier: AGPL-3.0-or-later
# hostcheck configuration

name = "hostcheck"
version = "1.0"
suite_dir = "suites"
# inventory_file = "/etc/hostcheck/inventory"

[connection]
command_timeout_secs = 30
connect_timeout_secs = 10
ssh_options = []

[logging]
level = "info"
format = "text"
# file = "/var/log/hostcheck.log"
"#;

    std::fs::write(config_path, default_config)?;
    info!("Created configuration file: {}", config_path.display());
    println!("Created configuration file: {}", config_path.display());
    Ok(())
}

/// Show the current configuration
async fn show_config(config_path: &Path) -> anyhow::Result<()> {
    if !config_path.exists() {
        let config = Config::default();
        println!("No configuration file found. Using defaults:");
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let config = load_config(config_path)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// List available suites
async fn list_suites(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let suites = suite::list_suites(&config.suite_dir)?;

    println!("Built-in suite:");
    println!();
    println!("  - {} (default)", Suite::builtin().name);
    println!();

    if suites.is_empty() {
        println!("No suites found in {}", config.suite_dir.display());
        println!();
        println!("Create a suite file (*.toml) in the suite directory.");
    } else {
        println!("Available suites in {}:", config.suite_dir.display());
        println!();
        for name in suites {
            println!("  - {}", name);
        }
    }

    Ok(())
}

/// Validate a suite file
async fn validate_suite(suite_path: &Path) -> anyhow::Result<()> {
    info!("Validating suite: {}", suite_path.display());

    let suite = suite::load_suite(suite_path)
        .with_context(|| format!("Failed to parse suite: {}", suite_path.display()))?;

    suite.validate().with_context(|| "Suite validation failed")?;

    println!("Suite '{}' is valid", suite.name);
    println!();
    println!("  Description: {}", suite.description);
    println!("  Version: {}", suite.version);
    println!("  Target group: {}", suite.hosts);
    println!("  Checks: {}", suite.checks.len());

    Ok(())
}

/// Show the hosts resolved from the inventory
async fn show_hosts(
    config_path: &Path,
    inventory_flag: Option<&Path>,
    group: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let inventory_path = inventory::locate(inventory_flag, config.inventory_file.as_deref())?;
    let hosts = inventory::resolve(&inventory_path, group)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&hosts)?);
        }
        OutputFormat::Text => {
            if hosts.is_empty() {
                println!(
                    "No hosts in group '{}' of {}",
                    group,
                    inventory_path.display()
                );
            } else {
                println!("Hosts in group '{}' of {}:", group, inventory_path.display());
                println!();
                for host in &hosts {
                    println!("  - {} ({}, {:?})", host.name, host.address, host.connection);
                }
            }
        }
    }

    Ok(())
}

/// Run a suite by name or path against the resolved hosts
async fn run_suite(
    config_path: &Path,
    suite_name: Option<&str>,
    inventory_flag: Option<&Path>,
    group_flag: Option<&str>,
    dry_run: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let suite = match suite_name {
        None => Suite::builtin(),
        Some(name) => {
            let suite_path = if PathBuf::from(name).exists() {
                PathBuf::from(name)
            } else {
                let candidate = config.suite_dir.join(format!("{}.toml", name));
                if candidate.exists() {
                    candidate
                } else {
                    anyhow::bail!(
                        "Suite '{}' not found. Tried:\n  - {}\n  - {}",
                        name,
                        name,
                        candidate.display()
                    );
                }
            };

            info!("Loading suite: {}", suite_path.display());
            suite::load_suite(&suite_path)?
        }
    };

    suite.validate()?;

    let group = group_flag.unwrap_or(suite.hosts.as_str());
    let inventory_path = inventory::locate(inventory_flag, config.inventory_file.as_deref())?;
    let hosts = inventory::resolve(&inventory_path, group)?;

    if dry_run {
        println!("[DRY RUN] Would run suite: {}", suite.name);
    } else {
        println!("Running suite: {}", suite.name);
    }

    let runner = SuiteRunner::new(config.connection.clone(), dry_run);
    let report = runner.run(&suite, &hosts).await;

    match format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => print_report(&report),
    }

    if !report.success {
        std::process::exit(1);
    }

    Ok(())
}

/// Print a text report for a suite run
fn print_report(report: &SuiteReport) {
    println!();

    if report.hosts == 0 {
        println!("No hosts resolved; nothing to check.");
    }

    for result in &report.results {
        match &result.outcome {
            Outcome::Passed => {
                println!(
                    "  pass   {} :: {} ({} ms)",
                    result.host, result.check, result.duration_ms
                );
            }
            Outcome::Failed { failures } => {
                println!(
                    "  FAIL   {} :: {} ({} ms)",
                    result.host, result.check, result.duration_ms
                );
                for failure in failures {
                    println!("         - {}", failure);
                }
            }
            Outcome::Errored { message } => {
                println!(
                    "  ERROR  {} :: {} ({} ms)",
                    result.host, result.check, result.duration_ms
                );
                println!("         - {}", message);
            }
        }
    }

    println!();
    if report.success {
        println!("Suite completed successfully");
    } else {
        println!("Suite completed with failures");
    }

    println!();
    println!("Results:");
    println!("  Hosts: {}", report.hosts);
    println!("  Checks passed: {}", report.checks_passed);
    println!("  Checks failed: {}", report.checks_failed);
    println!("  Check errors: {}", report.checks_errored);
    println!("  Duration: {} ms", report.total_duration_ms);
}
