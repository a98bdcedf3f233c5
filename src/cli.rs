//! Command-line interface components.

use crate::config::{CloudLayerPolicy, MplConfig};
use crate::constants::{DEFAULT_OUTPUT_PATH, DEFAULT_UTC_OFFSET_HOURS};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "mpl_processor")]
#[command(about = "Aggregate Mini-MPL lidar NetCDF captures into a time-ordered CSV")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory holding the capture files (e.g. one month of scans)
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output CSV file
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: PathBuf,

    /// Maximum captures processed concurrently (default: number of CPUs)
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Pad captures with fewer than 3 cloud layers with NaN instead of skipping them
    #[arg(long)]
    pub pad_clouds: bool,

    /// Hours subtracted from UTC to obtain local time
    #[arg(long, default_value_t = DEFAULT_UTC_OFFSET_HOURS, allow_hyphen_values = true)]
    pub utc_offset_hours: i64,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Build the processing configuration from the flags
    pub fn to_config(&self) -> MplConfig {
        let mut config = MplConfig::default().with_utc_offset_hours(self.utc_offset_hours);
        if let Some(workers) = self.workers {
            config = config.with_max_concurrent_files(workers);
        }
        if self.pad_clouds {
            config = config.with_cloud_layer_policy(CloudLayerPolicy::PadWithNan);
        }
        config
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mpl_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}
