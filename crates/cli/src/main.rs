use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use comment_attach::AttachConfig;
use comment_diagram::{Diagram, DiagramAttacher};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "comment-attach")]
#[command(about = "Attach diagram comments to the nodes they describe", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach the comments of a diagram and print the applied attachments as JSON
    Run(RunArgs),

    /// Validate a TOML configuration file
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),

    /// Print the default configuration as TOML
    #[command(name = "default-config")]
    DefaultConfig,
}

#[derive(Args)]
struct RunArgs {
    /// Diagram JSON file
    diagram: PathBuf,

    /// Attacher configuration (TOML); defaults apply if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct CheckConfigArgs {
    /// Configuration file to validate
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Run(args) => run_attach(args)?,
        Commands::CheckConfig(args) => run_check_config(&args.config)?,
        Commands::DefaultConfig => print!("{}", AttachConfig::default().to_toml_string()?),
    }

    Ok(())
}

fn run_attach(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AttachConfig::default(),
    };

    let raw = fs::read_to_string(&args.diagram)
        .with_context(|| format!("Failed to read diagram from {}", args.diagram.display()))?;
    let diagram = Diagram::from_json_str(&raw)
        .with_context(|| format!("Invalid diagram in {}", args.diagram.display()))?;
    log::info!(
        "Loaded diagram {} ({} nodes)",
        args.diagram.display(),
        diagram.node_count()
    );

    let mut attacher =
        DiagramAttacher::from_config(&config, diagram).context("Invalid attacher configuration")?;
    let report = attacher.run().context("Comment attachment failed")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}

fn run_check_config(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    log::info!(
        "{} is valid: {} filters, {} matchers",
        path.display(),
        config.filters.len(),
        config.matchers.len()
    );
    println!("ok");
    Ok(())
}

fn load_config(path: &Path) -> Result<AttachConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    AttachConfig::from_toml_str(&raw)
        .with_context(|| format!("Invalid config in {}", path.display()))
}
