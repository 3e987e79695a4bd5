use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, error};

use diafit::classifier::HttpClassifierClient;
use diafit::config::AppConfig;
use diafit::features::RawHealthMetrics;
use diafit::generation::{DocumentKind, GenerationOrchestrator, HttpGenerationClient};
use diafit::server::ApiServer;
use diafit::workflow::Assessment;

/// Diabetes risk assessment with AI-generated diet plans and reports
#[derive(Parser)]
#[command(name = "diafit")]
#[command(about = "Diabetes risk assessment with AI-generated diet plans and reports", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the assessment API server (default command)
    Serve {
        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one assessment from the command line
    Assess {
        /// Path to a JSON file of raw metrics; omit to use the sample profile
        #[arg(long)]
        metrics: Option<PathBuf>,

        /// Also generate a diet plan
        #[arg(long)]
        diet: bool,

        /// Also generate a full risk report
        #[arg(long)]
        report: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    debug!("diafit started with verbosity level: {}", cli.verbose);

    let result = match cli.command {
        Some(Commands::Serve { port }) => run_serve(cli.config.as_deref(), port).await,
        Some(Commands::Assess {
            metrics,
            diet,
            report,
        }) => run_assess(cli.config.as_deref(), metrics, diet, report).await,
        None => run_serve(cli.config.as_deref(), None).await,
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_serve(config: Option<&Path>, port: Option<u16>) -> anyhow::Result<()> {
    let config = AppConfig::load(config)?;
    let port = port.unwrap_or(config.port);

    let classifier = Arc::new(HttpClassifierClient::new(
        config.classifier_endpoint.clone(),
        config.request_timeout(),
    )?);
    let orchestrator = build_orchestrator(&config)?;

    ApiServer::new(classifier, orchestrator, port).start().await
}

async fn run_assess(
    config: Option<&Path>,
    metrics: Option<PathBuf>,
    diet: bool,
    report: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load(config)?;

    let raw: RawHealthMetrics = match metrics {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => RawHealthMetrics::sample(),
    };

    let classifier = HttpClassifierClient::new(
        config.classifier_endpoint.clone(),
        config.request_timeout(),
    )?;

    let mut assessment = Assessment::new();
    assessment.submit(raw);
    let result = assessment.classify(&classifier).await?;

    println!(
        "{} (probability {}%, risk level: {})",
        result.predicted_class.label(),
        result.probability,
        result.risk_level
    );

    if !diet && !report {
        return Ok(());
    }

    let orchestrator = build_orchestrator(&config)?;

    if diet {
        let state = assessment.begin_diet()?;
        let document = assessment
            .present(DocumentKind::Diet, &state, &orchestrator)
            .await?;
        println!("\n{}", document.markdown);
    }

    if report {
        let state = assessment.begin_report()?;
        let document = assessment
            .present(DocumentKind::Report, &state, &orchestrator)
            .await?;
        println!("\n{}", document.markdown);
    }

    Ok(())
}

fn build_orchestrator(config: &AppConfig) -> anyhow::Result<GenerationOrchestrator> {
    let api_key = config.generation_api_key.clone().ok_or_else(|| {
        anyhow::anyhow!("generation API key is not configured (set DIAFIT_GENERATION_API_KEY)")
    })?;

    let client = Arc::new(HttpGenerationClient::new(
        config.generation_url(),
        api_key,
        config.request_timeout(),
    )?);

    Ok(GenerationOrchestrator::new(client, config.mode)?)
}
