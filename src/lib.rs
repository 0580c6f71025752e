pub mod cli;
pub mod error;
pub mod export;
pub mod models;
pub mod sensing;
pub mod session;
pub mod settings;
pub mod stats;
pub mod utils;

use clap::Parser;

pub use error::{Result, TrackError};
pub use export::ExportFormat;
pub use models::{BarometricReading, FusedPoint, RawFix};
pub use sensing::{PassiveSensorHub, SensorHub, SensorPump};
pub use session::{FixOutcome, SessionController, SessionSnapshot, SessionState};
pub use settings::{MinimumDistance, SettingsStore};
pub use stats::SessionStats;

pub async fn run() -> anyhow::Result<()> {
    let debug_mode = std::env::var("ALTITRACK_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    utils::logging::init(if debug_mode {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });

    let args = cli::Args::parse();
    log::info!("altitrack replaying {}", args.events.display());

    let summary = cli::replay(args).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
