mod app;
mod config;
mod engine;
mod topology;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Overrides};

#[derive(Debug, Parser)]
#[command(author, version, about = "Live force-directed map of probe health between hosts")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Status endpoint returning `{nodes, connections}`.
    #[arg(long, conflicts_with_all = ["prometheus", "file"])]
    url: Option<String>,

    /// Query a Prometheus server directly instead of a status endpoint.
    #[arg(long, conflicts_with = "file")]
    prometheus: Option<String>,

    /// Label matcher for `probe_success`, e.g. '{job="icmp"}'.
    #[arg(long)]
    filter: Option<String>,

    /// Saved status JSON to display instead of a live backend.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Aggregation window in minutes (1-60).
    #[arg(long)]
    window: Option<u32>,

    /// Show the worst sample in the window instead of the average.
    #[arg(long)]
    minimum: bool,

    /// Auto-refresh interval in seconds; 0 disables.
    #[arg(long)]
    refresh_secs: Option<u64>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            prometheus: self.prometheus.clone(),
            filter: self.filter.clone(),
            file: self.file.clone(),
            window: self.window,
            minimum: self.minimum,
            refresh_secs: self.refresh_secs,
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    let config = match Config::load(args.config.as_deref(), &args.overrides()) {
        Ok(config) => config,
        Err(err) => {
            error!("{err:#}");
            eprintln!("link-radar: {err:#}");
            std::process::exit(2);
        }
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "link-radar",
        options,
        Box::new(move |cc| Ok(Box::new(app::TopologyApp::new(cc, &config)))),
    )
}
