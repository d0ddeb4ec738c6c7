//! LungScan - simulated chest X-ray screening
//!
//! A CLI that walks through the screening workflow: log in, stage an
//! image, run the simulated analysis and write a risk report.
//!
//! Exit codes:
//!   0 - Success (risk below --fail-on, or no --fail-on set)
//!   1 - Runtime error (bad credentials, unreadable image, config, etc.)
//!   2 - Risk tier at or above the --fail-on threshold

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use lungscan::analysis::{AnalysisSimulator, SimulatorConfig};
use lungscan::app::AppController;
use lungscan::auth::MockAuthGate;
use lungscan::cli::{Args, OutputFormat};
use lungscan::config::{Config, CONFIG_FILE};
use lungscan::models::{AnalysisReport, ReportMetadata, RiskTier};
use lungscan::{report, upload};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("LungScan v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_screening(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Screening failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .lungscan.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize timing, seed, output and report contents.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete screening workflow. Returns exit code (0 or 2).
async fn run_screening(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let simulator = AnalysisSimulator::new(SimulatorConfig::from(&config.simulator));
    let mut app = AppController::new(MockAuthGate, simulator);

    // Step 1: Authenticate
    let session = match (args.signup, args.name.as_deref()) {
        (true, Some(name)) => {
            println!("👤 Creating account for {}", args.email);
            app.signup(name, &args.email, &args.password)?
        }
        _ => {
            println!("🔐 Logging in as {}", args.email);
            app.login(&args.email, &args.password)?
        }
    };

    // Step 2: Stage the image
    let image_path = args
        .image
        .as_deref()
        .context("An image is required for screening")?;
    let image = upload::load_image(image_path)?;
    let image_name = image.name().to_string();
    println!("🖼️  Staged image: {}", image_name);
    session.stage_image(image);

    // Step 3: Run the simulated analysis
    println!("\n🔬 Analyzing image...");
    session.start_analysis()?;

    let progress_bar = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}%")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let result = session
        .run_to_completion(|value| {
            if let Some(ref pb) = progress_bar {
                pb.set_position(u64::from(value));
            }
        })
        .await?
        .clone();

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Analysis complete");
    }

    // Step 4: Build and save the report
    let metadata = ReportMetadata {
        image_name,
        analysis_date: Utc::now(),
        seed: config.simulator.seed,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = AnalysisReport::new(metadata, result);

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report, &config.report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    print_summary(&report);
    println!(
        "\n✅ Screening complete! Report saved to: {}",
        output_path.display()
    );

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        let threshold = RiskTier::from(fail_level);
        if report.result.risk_tier >= threshold {
            eprintln!(
                "\n⛔ Risk tier {} is at or above {}. Failing (exit code 2).",
                report.result.risk_tier, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Print the result summary to stdout.
fn print_summary(report: &AnalysisReport) {
    let result = &report.result;
    let tier = result.risk_tier;

    println!("\n📊 Analysis Summary:");
    println!("   {} {}", tier.status_icon().emoji(), result.prediction_text);
    println!("   Risk level: {} {}", tier.emoji(), tier.badge_label());
    println!("   Model accuracy: {:.2}%", result.accuracy_pct);
    println!("   Prediction confidence: {:.2}%", result.confidence_pct);
    println!("\n   Recommended precautions:");
    for rec in result.recommendations {
        println!("     {} {}", rec.category.emoji(), rec.text);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
