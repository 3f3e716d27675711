use std::path::PathBuf;
use std::str::FromStr;

use apalis::{
    layers::{retry::RetryPolicy, sentry::SentryLayer},
    prelude::*,
};
use apalis_cron::{CronStream, Tick};
use clap::{Parser, Subcommand};
use cron::Schedule;
use reel_pulse::{
    assets::DirCatalog, market::yahoo::YahooFinance, openai::OpenAIClient, render::FfmpegRenderer,
    tracing::init_tracing_subscriber, BriefProcessorBuilder,
};

#[derive(Parser)]
#[command(name = "reel-pulse", about = "Narrated market-brief video generator")]
struct Cli {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_key: String,

    /// Ticker symbol to brief on
    #[arg(long, env = "STOCK_SYMBOL", default_value = "NVDA")]
    symbol: String,

    /// Company name used in prompts
    #[arg(long, env = "COMPANY_NAME", default_value = "NVIDIA Corporation")]
    company: String,

    /// Directory of background video clips
    #[arg(long, env = "ASSETS_DIR", default_value = "assets")]
    assets_dir: PathBuf,

    /// Working directory for audio, caches and output
    #[arg(long, default_value = "/var/tmp/reel-pulse")]
    workdir: PathBuf,

    /// Reuse today's cached market data if present
    #[arg(long)]
    use_cached_market_data: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline once and exit
    Run,
    /// Start the cron scheduler
    Cron {
        /// Cron schedule expression (default: 09:00 weekdays)
        #[arg(long, env = "CRON_SCHEDULE", default_value = "0 0 9 * * MON-FRI")]
        schedule: String,
    },
}

#[derive(Clone)]
struct Config {
    openai_key: String,
    symbol: String,
    company: String,
    assets_dir: PathBuf,
    workdir: PathBuf,
    use_cached_market_data: bool,
}

async fn run_pipeline(config: &Config) -> anyhow::Result<()> {
    let openai = OpenAIClient::new(&config.openai_key);
    let catalog = DirCatalog::new(&config.assets_dir);
    let renderer = FfmpegRenderer::new(DirCatalog::new(&config.assets_dir));

    let processor = BriefProcessorBuilder::new(&config.workdir, &config.symbol, &config.company)
        .provider(YahooFinance::new())
        .analyst(OpenAIClient::new(&config.openai_key))
        .synthesizer(OpenAIClient::new(&config.openai_key))
        .recognizer(OpenAIClient::new(&config.openai_key))
        .matcher(openai)
        .catalog(catalog)
        .renderer(renderer)
        .use_cached_market_data(config.use_cached_market_data)
        .build();

    let rendered = processor.run().await?;
    tracing::info!(path = %rendered.display(), "brief complete");
    Ok(())
}

async fn handle_tick(_tick: Tick, config: Data<Config>) -> anyhow::Result<()> {
    tracing::info!(symbol = %config.symbol, "Running scheduled pipeline...");
    run_pipeline(&config).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let config = Config {
        openai_key: cli.openai_key,
        symbol: cli.symbol,
        company: cli.company,
        assets_dir: cli.assets_dir,
        workdir: cli.workdir,
        use_cached_market_data: cli.use_cached_market_data,
    };

    match cli.command {
        Command::Run => {
            tracing::info!(symbol = %config.symbol, "Running pipeline once...");
            run_pipeline(&config).await?;
        }
        Command::Cron { schedule } => {
            tracing::info!(%schedule, "Starting cron scheduler...");
            let schedule = Schedule::from_str(&schedule)?;

            let worker = WorkerBuilder::new("reel-pulse-cron")
                .backend(CronStream::new(schedule))
                .retry(RetryPolicy::retries(3))
                .layer(SentryLayer::new())
                .data(config)
                .build(handle_tick);

            worker.run().await?;
        }
    }

    Ok(())
}
