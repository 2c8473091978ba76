use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use senmux_daemon::config::{CONTROL_WINDOW_MS, DaemonConfig, MONITOR_WINDOW_MS};
use senmux_daemon::emitter::CommandEmitter;
use senmux_daemon::probe::{run_read_sweep, run_stream_probe, run_udp_probe};
use senmux_daemon::runtime::{ControlLoop, Sampler};
use senmux_daemon::sink::JsonLineSink;

#[derive(Parser)]
#[command(name = "senmux", about = "Multiplexed sensor-stream sampler")]
struct Cli {
    /// TOML config file; defaults cover the reference deployment
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample sources and print one JSON snapshot per window (default)
    Monitor {
        /// Sampling window in milliseconds
        #[arg(long)]
        window_ms: Option<u64>,
    },
    /// Closed-loop variant: drive the generator from one monitored source
    Control {
        /// Sampling window in milliseconds
        #[arg(long)]
        window_ms: Option<u64>,

        /// Threshold the monitored value is classified against
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Tail the raw sensor streams
    Probe,
    /// Decode actuation frames arriving on the control port, or sweep
    /// read commands against it for property discovery
    UdpProbe {
        /// Control port to listen on (or to target with --sweep)
        #[arg(long)]
        port: Option<u16>,

        /// Send a discovery sweep of read commands instead of listening
        #[arg(long)]
        sweep: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing. Respects RUST_LOG env var, defaults to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => DaemonConfig::load(path)?,
        None => DaemonConfig::default(),
    };

    match &cli.command {
        None | Some(Commands::Monitor { .. }) => {
            if let Some(Commands::Monitor {
                window_ms: Some(window_ms),
            }) = &cli.command
            {
                config.window_ms = Some(*window_ms);
            }
            run_monitor(config).await?;
        }
        Some(Commands::Control {
            window_ms,
            threshold,
        }) => {
            if let Some(window_ms) = window_ms {
                config.window_ms = Some(*window_ms);
            }
            if let Some(threshold) = threshold {
                config.control.threshold = *threshold;
            }
            run_control(config).await?;
        }
        Some(Commands::Probe) => run_stream_probe(&config).await?,
        Some(Commands::UdpProbe { port, sweep }) => {
            if let Some(port) = port {
                config.control.port = *port;
            }
            if *sweep {
                run_read_sweep(&config).await?;
            } else {
                run_udp_probe(config.control.port).await?;
            }
        }
    }

    Ok(())
}

async fn run_monitor(mut config: DaemonConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    // The variant default applies only when neither file nor CLI set one.
    config.window_ms.get_or_insert(MONITOR_WINDOW_MS);
    info!(
        sources = config.sources.len(),
        window_ms = config.window_ms_or(MONITOR_WINDOW_MS),
        "starting monitor"
    );
    let sink = JsonLineSink::stdout(config.labels());
    let mut sampler = Sampler::new(&config, None, sink);
    run_until_interrupted(&mut sampler).await
}

async fn run_control(mut config: DaemonConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    // The control loop samples tighter than the monitor by default; a
    // window_ms from the file or CLI always wins.
    config.window_ms.get_or_insert(CONTROL_WINDOW_MS);
    info!(
        monitor = %config.sources[config.control.monitor].label,
        threshold = config.control.threshold,
        target = %config.control_addr(),
        window_ms = config.window_ms_or(CONTROL_WINDOW_MS),
        "starting closed-loop control"
    );
    let emitter = CommandEmitter::bind(
        config.control_addr(),
        Duration::from_millis(config.control.retry_backoff_ms),
    )
    .await?;
    let control = ControlLoop::new(&config, emitter);
    let sink = JsonLineSink::stdout(config.labels());
    let mut sampler = Sampler::new(&config, Some(control), sink);
    run_until_interrupted(&mut sampler).await
}

async fn run_until_interrupted<S: senmux_daemon::sink::SnapshotSink>(
    sampler: &mut Sampler<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    tokio::select! {
        result = sampler.run() => {
            // Only a fatal multiplexer error gets here.
            if let Err(e) = &result {
                error!("sampler terminated: {e}");
            }
            result?;
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            Ok(())
        }
    }
}
