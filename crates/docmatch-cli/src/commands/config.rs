//! Config command - inspect and create the docmatch configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use docmatch_core::models::config::{API_KEY_ENV, DocmatchConfig};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration, API key masked
    Show,

    /// Write a configuration file to the --config path or the default location
    Init(InitArgs),

    /// Print where the configuration lives and check the paths it names
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Reference records JSON file (built-in sample records when omitted)
    #[arg(long)]
    records: Option<PathBuf>,

    /// Directory to spool documents in while they are processed
    #[arg(long)]
    spool_dir: Option<PathBuf>,

    /// OCR.space-compatible endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Replace an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let location = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.action {
        ConfigAction::Show => show(&location),
        ConfigAction::Init(init) => init_file(&location, init),
        ConfigAction::Path => check_paths(&location),
    }
}

/// `<config_dir>/docmatch/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docmatch")
        .join("config.json")
}

fn read_existing(location: &Path) -> anyhow::Result<Option<DocmatchConfig>> {
    if location.is_file() {
        Ok(Some(DocmatchConfig::from_file(location)?))
    } else {
        Ok(None)
    }
}

fn show(location: &Path) -> anyhow::Result<()> {
    let config = match read_existing(location)? {
        Some(config) => config,
        None => {
            eprintln!(
                "{} {} does not exist, showing defaults.",
                style("ℹ").blue(),
                location.display()
            );
            DocmatchConfig::default()
        }
    };

    let mut effective = config.with_env_overrides();
    effective.ocr.api_key = effective.ocr.api_key.as_deref().map(mask_key);

    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}

/// Keep the last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let visible: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{}", visible)
}

fn init_file(location: &Path, init: InitArgs) -> anyhow::Result<()> {
    if location.exists() && !init.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            location.display()
        );
    }

    let mut config = DocmatchConfig::default();
    if let Some(endpoint) = init.endpoint {
        config.ocr.endpoint = endpoint;
    }
    config.reference.records_path = init.records;
    config.pipeline.spool_dir = init.spool_dir;

    if let Some(parent) = location.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(location)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        location.display()
    );
    println!("  Set {} to supply the OCR API key.", API_KEY_ENV);

    Ok(())
}

fn check_paths(location: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", location.display());

    let Some(config) = read_existing(location)? else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'docmatch config init' to create a configuration file.");
        return Ok(());
    };
    println!("Status: {}", style("exists").green());

    match &config.reference.records_path {
        Some(path) => println!("Reference records: {} ({})", path.display(), presence(path.is_file())),
        None => println!("Reference records: built-in sample"),
    }
    if let Some(dir) = &config.pipeline.spool_dir {
        println!("Spool directory: {} ({})", dir.display(), presence(dir.is_dir()));
    }

    Ok(())
}

fn presence(found: bool) -> console::StyledObject<&'static str> {
    if found {
        style("found").green()
    } else {
        style("missing").red()
    }
}
