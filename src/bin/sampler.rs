use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use metric_sampler::{
    actors::sampler::Sampler,
    backend::{HttpBackend, MetricBackend},
    config::{BackendConfig, read_config_file},
    util,
    views::{JsonView, LogView, TableView},
};
use tracing::{debug, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Glob patterns selecting channels; the default set when omitted
    patterns: Vec<String>,

    /// Config file
    #[arg(short)]
    file: Option<String>,

    /// Backend base URL, e.g. http://127.0.0.1:51411
    #[arg(short, long)]
    url: Option<String>,

    /// Seconds between cycle starts
    #[arg(short, long)]
    interval: Option<u64>,

    /// Shared secret the backend expects
    #[arg(long)]
    token: Option<String>,

    /// How to render each cycle
    #[arg(short, long, value_enum, default_value_t = Output::Table)]
    output: Output,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Output {
    /// Aligned text table on stdout
    Table,
    /// One JSON object per cycle on stdout
    Json,
    /// One summary log line per cycle
    Log,
}

/// Fully resolved settings: command line beats config file beats environment
#[derive(Debug)]
struct Settings {
    backend: BackendConfig,
    patterns: Vec<String>,
    interval: u64,
}

fn resolve(args: Args) -> anyhow::Result<Settings> {
    let file_config = match &args.file {
        Some(path) => Some(read_config_file(path)?),
        None => None,
    };

    let url = args
        .url
        .or_else(|| file_config.as_ref().map(|c| c.backend.url.clone()))
        .or_else(util::get_backend_url)
        .ok_or_else(|| {
            anyhow::anyhow!("no backend URL given (use --url, a config file, or SAMPLER_URL)")
        })?;

    let mut backend = file_config
        .as_ref()
        .map(|c| c.backend.clone())
        .unwrap_or_else(|| BackendConfig::new(url.clone()));
    backend.url = url;

    if args.token.is_some() {
        backend.token = args.token;
    }

    let patterns = if args.patterns.is_empty() {
        file_config
            .as_ref()
            .map(|c| c.patterns.clone())
            .unwrap_or_default()
    } else {
        args.patterns
    };

    let interval = args
        .interval
        .or_else(|| file_config.as_ref().map(|c| c.interval))
        .unwrap_or(1);

    Ok(Settings {
        backend,
        patterns,
        interval,
    })
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("metric_sampler", LevelFilter::INFO),
        ("sampler", LevelFilter::INFO),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let output = args.output;
    let settings = resolve(args)?;

    let backend: Arc<dyn MetricBackend> = Arc::new(HttpBackend::new(&settings.backend));

    let (mut sampler, handle) = Sampler::new(
        backend,
        &settings.patterns,
        Duration::from_secs(settings.interval),
    )
    .await?;

    match output {
        Output::Table => sampler.add_view(Box::new(TableView::new(std::io::stdout()))),
        Output::Json => sampler.add_view(Box::new(JsonView::new(std::io::stdout()))),
        Output::Log => sampler.add_view(Box::new(LogView)),
    }

    let task = tokio::spawn(sampler.run());

    tokio::signal::ctrl_c().await?;
    debug!("interrupt received, stopping");

    handle.stop().await?;
    task.await?;

    Ok(())
}
