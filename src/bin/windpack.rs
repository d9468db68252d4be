//! Publish or consume simulated weather-station telemetry.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;
use windpack::bus::SpoolBus;
use windpack::sink::SvgChartSink;
use windpack::{Aggregator, CancellationToken, Error, Format, Publisher, SampleGenerator, StationConfig};

#[derive(Parser)]
#[command(name = "windpack")]
#[command(about = "Publish or consume simulated weather-station telemetry")]
#[command(after_help = "OPERATIONS:\n  \
    Without a subcommand an interactive menu offers the four operations:\n  \
    publish verbose, consume verbose, publish compact, consume compact.\n\n\
FORMATS:\n  \
    verbose  JSON object with temperatura, humedad and direccion_viento\n  \
    compact  3 bytes: 14-bit integer temperature, 7-bit humidity, 3-bit wind index\n\n\
BUS:\n  \
    Channels are spool files under --bus-dir. Run the consumer and the\n  \
    publisher in separate terminals against the same directory.")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Spool directory shared by publisher and consumer
    #[arg(long, env = "WINDPACK_BUS_DIR", default_value = "spool", global = true)]
    bus_dir: PathBuf,

    /// Channel for verbose payloads
    #[arg(long, env = "WINDPACK_VERBOSE_CHANNEL", default_value = "station.verbose", global = true)]
    verbose_channel: String,

    /// Channel for compact frames
    #[arg(long, env = "WINDPACK_COMPACT_CHANNEL", default_value = "station.compact", global = true)]
    compact_channel: String,

    /// Messages to publish, or readings to collect before the chart is saved
    #[arg(short = 'n', long, env = "WINDPACK_MESSAGES", default_value_t = 7, global = true)]
    messages: usize,

    /// Milliseconds between two published messages
    #[arg(long, env = "WINDPACK_INTERVAL_MS", default_value_t = 1000, global = true)]
    interval_ms: u64,

    /// Longest single poll, in milliseconds
    #[arg(long, env = "WINDPACK_POLL_TIMEOUT_MS", default_value_t = 500, global = true)]
    poll_timeout_ms: u64,

    /// Abort a consume session after this many seconds (default: wait forever)
    #[arg(long, env = "WINDPACK_DEADLINE_SECS", global = true)]
    deadline_secs: Option<u64>,

    /// Directory the chart is written to
    #[arg(long, env = "WINDPACK_CHART_DIR", default_value = ".", global = true)]
    chart_dir: PathBuf,

    /// Rewrite the chart after every accepted reading
    #[arg(long, global = true)]
    live_chart: bool,

    /// Seed for the reading generator (default: from the OS)
    #[arg(long, env = "WINDPACK_SEED", global = true)]
    seed: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "WINDPACK_LOG", default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Publish generated readings
    Publish {
        #[arg(short, long, value_enum)]
        format: Format,
    },
    /// Collect readings and save them as a chart
    Consume {
        #[arg(short, long, value_enum)]
        format: Format,
    },
}

impl Args {
    fn station_config(&self) -> StationConfig {
        StationConfig {
            bus_dir: self.bus_dir.clone(),
            verbose_channel: self.verbose_channel.clone(),
            compact_channel: self.compact_channel.clone(),
            messages: self.messages,
            publish_interval: Duration::from_millis(self.interval_ms),
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            deadline: self.deadline_secs.map(Duration::from_secs),
            chart_dir: self.chart_dir.clone(),
            live_chart: self.live_chart,
            ..StationConfig::default()
        }
    }
}

/// Show the menu and read a choice; `None` means exit
fn prompt_menu() -> io::Result<Option<Command>> {
    println!("\n====== windpack - weather station ======");
    println!("1) Publish verbose (JSON)");
    println!("2) Consume verbose (JSON)");
    println!("3) Publish compact (3 bytes)");
    println!("4) Consume compact (3 bytes)");
    println!("5) Exit");
    print!("\nChoose an option: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(match line.trim() {
        "1" => Some(Command::Publish { format: Format::Verbose }),
        "2" => Some(Command::Consume { format: Format::Verbose }),
        "3" => Some(Command::Publish { format: Format::Compact }),
        "4" => Some(Command::Consume { format: Format::Compact }),
        _ => None,
    })
}

fn publish(
    config: &StationConfig,
    format: Format,
    seed: Option<u64>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let channel = config.channel(format).to_string();
    let bus = SpoolBus::open(&config.bus_dir).map_err(|source| Error::ChannelOpen {
        channel: channel.clone(),
        source,
    })?;
    let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    println!("\n=== Publisher {format} running ({} messages) ===", config.messages);
    let mut publisher = Publisher::new(format.codec(), SampleGenerator::new(rng), config.publish_config(format))
        .with_cancellation(cancel.clone());
    let report = publisher.run(&mut bus.producer())?;

    println!(
        "Publisher {format} finished: {} messages, {} payload bytes ({:.1} bytes/message)",
        report.sent,
        report.bytes,
        report.bytes as f64 / report.sent.max(1) as f64
    );
    Ok(())
}

fn consume(config: &StationConfig, format: Format, cancel: &CancellationToken) -> Result<(), Error> {
    let channel = config.channel(format).to_string();
    let bus = SpoolBus::open(&config.bus_dir).map_err(|source| Error::ChannelOpen {
        channel: channel.clone(),
        source,
    })?;
    let mut consumer = bus.subscribe(&channel);
    let mut sink = SvgChartSink::new(config.chart_path(format), format!("Weather station ({format})"))
        .live(config.live_chart);

    println!("\n=== Consumer {format} listening ({} messages) ===", config.messages);
    let report = Aggregator::new(format.codec(), config.session_config())
        .with_cancellation(cancel.clone())
        .run(&mut consumer, &mut sink)?;

    println!(
        "Consumer {format} finished: {} accepted, {} transport errors, {} malformed",
        report.stats.accepted, report.stats.transport_errors, report.stats.malformed
    );
    println!("Chart saved as {}", sink.path().display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = windpack::logging::init(&args.log_level) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let command = match args.command {
        Some(command) => command,
        None => match prompt_menu() {
            Ok(Some(command)) => command,
            Ok(None) => {
                println!("Exiting...");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!("Error: failed to read menu choice: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    // The menu keeps the default Ctrl+C behaviour; runs stop cooperatively
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!("Ctrl+C handler not installed: {e}");
    }

    let config = args.station_config();
    let result = match command {
        Command::Publish { format } => publish(&config, format, args.seed, &cancel),
        Command::Consume { format } => consume(&config, format, &cancel),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
