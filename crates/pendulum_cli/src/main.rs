use anyhow::Context;
use clap::Parser;
use pendulum_core::{Consciousness, PendulumConfig, RandomSource, StdRandom};
use pendulum_sim::{EventSink, Simulation};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod console;

use console::{ConsoleSink, OutputFormat};

const DEFAULT_LOG_FILTER: &str = "pendulum_cli=info,pendulum_sim=info,pendulum_core=warn";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file (defaults are used when it is missing)
    #[arg(short, long, env = "PENDULUM_CONFIG", default_value = "pendulum.toml")]
    config: PathBuf,

    /// Number of ticks to run
    #[arg(short, long)]
    ticks: Option<u32>,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pause between ticks, in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Skip every pause, including the intro
    #[arg(long)]
    no_pause: bool,

    /// Print events as JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Emit logs (stderr) as JSON
    #[arg(long)]
    log_json: bool,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_json);

    let config = resolve_config(&args)?;
    if args.dump_config {
        print!("{}", config.to_toml());
        return Ok(());
    }

    info!(
        ticks = config.simulation.ticks,
        seed = ?config.simulation.seed,
        interval_ms = config.simulation.tick_interval_ms,
        "Starting pendulum"
    );

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut sink = ConsoleSink::new(std::io::stdout(), format);
    let mut consciousness = Consciousness::new(StdRandom::from_seed(config.simulation.seed));
    open_console(&mut sink, &mut consciousness).context("Failed to write intro banner")?;

    let simulation = Simulation::from_config(&config);
    simulation
        .run(&mut consciousness, &mut sink, shutdown_signal())
        .await;

    Ok(())
}

/// The pendulum announces itself on construction, before the banner goes up.
fn open_console<W: Write, R: RandomSource>(
    sink: &mut ConsoleSink<W>,
    consciousness: &mut Consciousness<R>,
) -> std::io::Result<()> {
    for event in consciousness.drain_events() {
        sink.emit(&event);
    }
    sink.intro()
}

/// Config file (or defaults) with env overrides, then command-line flags on top
fn resolve_config(args: &Args) -> anyhow::Result<PendulumConfig> {
    let mut config = if args.config.exists() {
        PendulumConfig::load(&args.config)
            .with_context(|| format!("Failed to load config from {}", args.config.display()))?
    } else {
        PendulumConfig::load_or_default(&args.config)
    };

    if let Some(ticks) = args.ticks {
        config.simulation.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(interval) = args.interval_ms {
        config.simulation.tick_interval_ms = interval;
    }
    if args.no_pause {
        config.simulation.tick_interval_ms = 0;
        config.simulation.intro_pause_ms = 0;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Logs go to stderr through a non-blocking writer; stdout belongs to the console.
fn init_tracing(json: bool) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(writer))
            .init();
    }
    guard
}

/// Resolves on Ctrl-C. If the handler cannot be installed the run simply completes.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
