//! Binary entry point for `memory-lane-bot`.
//!
//! Parses flags, wires up tracing output, loads the configuration and hands off
//! to the library's `start`.

use clap::Parser;
use memory_lane_bot::base::{config::Config, types::Void};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Memory-lane-bot – turns Slack mentions into childhood photos.
///
/// Configuration can come from `config.toml` or environment variables
/// (`SLACK_BOT_TOKEN`, `SLACK_SIGNING_SECRET`, `REPLICATE_API_TOKEN`,
/// `REPLICATE_MODEL`, `LORA_WEIGHTS_URL`, `TRIGGER_WORD`, ...).
/// The bot listens for Slack Events API deliveries on `/slack/events`.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// TOML file holding tokens and tuning knobs.
    ///
    /// Falls back to `.hidden/config.toml` when present. Environment variables
    /// of the same (upper-cased) name take precedence over anything in the file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Log more detail: `-v` adds request and generation progress, `-vv` adds
    /// raw HTTP traffic from the Slack and Replicate clients.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans over OTLP/HTTP (configured via the standard `OTEL_*` variables).
    #[arg(long)]
    otlp: bool,
}

/// Runs the webhook server until Ctrl-C.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer.

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("memory-lane-bot");
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let config = Config::load(args.config.as_deref())?;

    memory_lane_bot::start(config).await
}
