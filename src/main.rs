// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Olhos da Lei: monitoring console CLI
//!
//! One-shot classification, the detection simulator, backend status and
//! configuration management. The dashboard is served by `olhos-web`.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use olhos::ai::{self, ollama::OllamaClient};
use olhos::classifier::{render_prompt, Classifier, ThreatLevel};
use olhos::config::{AppConfig, Provider};
use olhos::console::Console;
use olhos::{OlhosError, Result};

/// Olhos CLI - AI-assisted monitoring console
#[derive(Parser, Debug)]
#[command(name = "olhos")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Olhos da Lei monitoring console", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the model to assess a camera observation
    Classify {
        /// Observed situation
        scenario: String,

        /// Camera id the observation came from
        #[arg(short, long, default_value = "cam-1")]
        source: String,

        /// Send the scenario verbatim instead of rendering the prompt template
        #[arg(long)]
        raw: bool,

        /// Action to apply if an incident is recorded (e.g. "Dispatch Robot Unit")
        #[arg(long)]
        action: Option<String>,
    },

    /// Show the console message for a simulated threat level
    Simulate {
        /// Threat level, 0-3
        #[arg(value_parser = clap::value_parser!(u8).range(0..=3))]
        level: u8,
    },

    /// Show AI engine status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Write a default configuration
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Classify { scenario, source, raw, action } => {
            run_classify(config, scenario, source, raw, action, &cli.format).await
        }
        Commands::Simulate { level } => run_simulate(level, &cli.format),
        Commands::Status => run_status(config).await,
        Commands::Config { action } => run_config_command(config, action, &cli.config),
        Commands::Init { dir, force } => run_init(dir, force),
    }
}

/// Classify one observation against a fresh console
async fn run_classify(
    config: AppConfig,
    scenario: String,
    source: String,
    raw: bool,
    action: Option<String>,
    format: &str,
) -> Result<()> {
    let classifier = Classifier::new(ai::build_generator(&config.ai_engine)?, config.ai_engine.retries);
    let mut console = Console::new(&config);

    let prompt = if raw {
        scenario
    } else {
        render_prompt(&config.prompts.threat_assessment, config.camera_label(&source), &scenario)
    };

    let result = classifier.classify(&prompt).await?;
    let recorded = console.record_classification(&result, &source)?;

    let outcome = match (&recorded, action) {
        (Some(recorded), Some(label)) => Some(console.dispatch(recorded.incident.id, &label)),
        (None, Some(_)) => {
            warn!("No incident recorded, action skipped");
            None
        }
        _ => None,
    };

    if format == "json" {
        let output = serde_json::json!({
            "text": result.text,
            "level": result.level,
            "recorded": recorded,
            "outcome": outcome,
            "roster": console.roster(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", result.text.trim());
    println!();
    match &recorded {
        Some(recorded) => {
            let incident = &recorded.incident;
            println!(
                "Incident {} recorded: level {} from {} at ({:.4}, {:.4})",
                incident.id, incident.level, incident.source, incident.location.lat, incident.location.lon
            );
            for n in &recorded.notifications {
                println!("  alert: {:?}", n);
            }
            if let Some(auto) = &recorded.auto_dispatch {
                println!("  auto-dispatch: {}", auto.message(incident.id));
            }
            if let Some(outcome) = &outcome {
                println!("  {}", outcome.message(incident.id));
            }
        }
        None => println!("No escalation"),
    }

    Ok(())
}

fn run_simulate(level: u8, format: &str) -> Result<()> {
    let level = ThreatLevel::try_from(level).map_err(OlhosError::InvalidRequest)?;
    if format == "json" {
        let output = serde_json::json!({
            "level": level,
            "label": level.label(),
            "message": level.status_message(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", level.label());
        println!("{}", level.status_message());
    }
    Ok(())
}

/// Run status check
async fn run_status(config: AppConfig) -> Result<()> {
    let classifier = Classifier::new(ai::build_generator(&config.ai_engine)?, 0);

    println!("Olhos v{} Status", env!("CARGO_PKG_VERSION"));
    println!("==================");

    match classifier.health_check().await {
        Ok(()) => println!("{}: Running", classifier.backend()),
        Err(e) => println!("{}: Error - {}", classifier.backend(), e),
    }

    if config.ai_engine.provider == Provider::Ollama {
        let timeout = std::time::Duration::from_secs(config.ai_engine.timeout_secs);
        let client = OllamaClient::new(&config.ai_engine.url, &config.ai_engine.model, timeout)?;
        match client.model_available().await {
            Ok(true) => println!("Model '{}' available", config.ai_engine.model),
            Ok(false) => println!("Model '{}' not pulled", config.ai_engine.model),
            Err(e) => println!("Error listing models: {}", e),
        }
    }

    println!("\nConfiguration:");
    println!("  Provider: {:?}", config.ai_engine.provider);
    println!("  Model: {}", config.ai_engine.model);
    println!("  Timeout: {}s", config.ai_engine.timeout_secs);
    println!("  Units: {}", config.roster.units.len());
    println!("  Cameras: {}", config.cameras.len());

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Provider: {:?}", config.ai_engine.provider);
            println!(
                "  Units: {}",
                config.roster.units.iter().map(|u| u.name.as_str()).collect::<Vec<_>>().join(", ")
            );
        }
    }

    Ok(())
}

/// Initialize a new console directory
fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("config.json");

    if config_path.exists() && !force {
        return Err(OlhosError::Config(
            "config.json already exists. Use --force to overwrite".to_string(),
        ));
    }

    std::fs::create_dir_all(&target)?;
    AppConfig::default().save(&config_path)?;
    info!("Wrote {:?}", config_path);

    println!("Olhos initialized in {:?}", target);
    println!("\nNext steps:");
    println!("  1. export GEMINI_API_KEY=...");
    println!("  2. olhos-web --open");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["olhos"]).is_err());
    }

    #[test]
    fn test_cli_classify_command() {
        let cli = Cli::try_parse_from([
            "olhos", "classify", "dois homens brigando", "--source", "cam-3", "--action", "Dispatch Robot Unit",
        ])
        .unwrap();

        match cli.command {
            Commands::Classify { scenario, source, raw, action } => {
                assert_eq!(scenario, "dois homens brigando");
                assert_eq!(source, "cam-3");
                assert!(!raw);
                assert_eq!(action.as_deref(), Some("Dispatch Robot Unit"));
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_cli_simulate_range() {
        assert!(Cli::try_parse_from(["olhos", "simulate", "3"]).is_ok());
        assert!(Cli::try_parse_from(["olhos", "simulate", "4"]).is_err());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        run_init(Some(dir.path().to_path_buf()), false).unwrap();
        assert!(dir.path().join("config.json").exists());
        assert!(run_init(Some(dir.path().to_path_buf()), false).is_err());
        assert!(run_init(Some(dir.path().to_path_buf()), true).is_ok());
    }
}
