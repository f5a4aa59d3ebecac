//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use seoforge_core::pipeline::{ProductStage, ProgressReporter, RunSummary, run_catalog};
use seoforge_shared::{AppConfig, OutputRow, ProductRecord, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// seoforge: product catalog enrichment.
#[derive(Parser)]
#[command(
    name = "seoforge",
    version,
    about = "Enrich a product catalog with generated SEO descriptions and product images.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enrich every product in the input catalog.
    Run {
        /// Config file (defaults to ~/.seoforge/seoforge.toml).
        #[arg(short, long, env = "SEOFORGE_CONFIG")]
        config: Option<PathBuf>,

        /// Input catalog, overriding `[catalog].input_path`.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output catalog, overriding `[catalog].output_path`.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip image resolution; the Image column stays empty.
        #[arg(long)]
        no_images: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration (keys redacted).
    Show {
        /// Config file to show instead of the default one.
        #[arg(short, long, env = "SEOFORGE_CONFIG")]
        config: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "seoforge=info",
        1 => "seoforge=debug",
        _ => "seoforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so they never interleave with the summary on stdout
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            config,
            input,
            output,
            no_images,
        } => cmd_run(config.as_deref(), input, output, no_images).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show { config } => cmd_config_show(config.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

async fn cmd_run(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    no_images: bool,
) -> Result<()> {
    let mut config = resolve_config(config_path)?;

    if let Some(input) = input {
        config.catalog.input_path = Some(input.to_string_lossy().into_owned());
    }
    if let Some(output) = output {
        config.catalog.output_path = output.to_string_lossy().into_owned();
    }
    if no_images {
        config.images.enabled = false;
    }

    info!(
        input = config.catalog.input_path.as_deref().unwrap_or("<unset>"),
        output = %config.catalog.output_path,
        images = config.images.enabled,
        "enriching catalog"
    );

    let reporter = CliProgress::new();
    let result = run_catalog(&config, &reporter).await;
    if result.is_err() {
        reporter.spinner.abandon();
    }
    let summary = result?;

    println!();
    println!("  Catalog enrichment finished!");
    println!("  Products:     {}", summary.processed);
    println!("  Descriptions: {}", summary.descriptions_generated);
    println!("  Placeholders: {}", summary.placeholders);
    println!("  With images:  {}", summary.with_images);
    println!("  Output:       {}", summary.output_path.display());
    println!("  Time:         {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn product_started(&self, index: usize, record: &ProductRecord) {
        self.spinner
            .set_message(format!("[{}] {} ({})", index + 1, record.name, record.sku));
    }

    fn stage(&self, record: &ProductRecord, stage: ProductStage) {
        let action = match stage {
            ProductStage::Pending => "Searching",
            ProductStage::TextCollected => "Describing",
            ProductStage::DescriptionAttempted => "Finding images for",
            ProductStage::ImageResolved => "Saving",
            ProductStage::Persisted => return,
        };
        self.spinner.set_message(format!("{action} {}", record.name));
    }

    fn product_persisted(&self, index: usize, row: &OutputRow) {
        let marker = if row.uses_placeholder() { "placeholder" } else { "ok" };
        self.spinner
            .println(format!("  [{}] {} ... {marker}", index + 1, row.name));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?.redacted();
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
