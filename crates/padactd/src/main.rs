use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::bounded;

use padactd::{logging, Daemon, FixtureSource};

/// Translates gamepad button events into keyboard/mouse actions according to
/// a YAML profile.
#[derive(Debug, Parser)]
#[command(name = "padactd", version, about)]
struct Cli {
    /// Path to the YAML profile to load.
    #[arg(long)]
    profile: PathBuf,

    /// Poll interval in milliseconds.
    #[arg(long, default_value_t = 10)]
    poll_ms: u64,

    /// Enable debug-level logging.
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("failed to initialize logging: {e}");
        std::process::exit(1);
    }

    // Real controller polling is out of scope for this repository (see the
    // `ControllerSource` trait docs); the binary runs against an empty
    // fixture until a platform backend is wired in.
    let source: Box<dyn padactd::ControllerSource> = Box::new(FixtureSource::new());

    let mut daemon = match Daemon::from_profile_path(&cli.profile, source) {
        Ok(daemon) => daemon,
        Err(e) => {
            log::error!("failed to start padactd: {e}");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("received shutdown signal");
        let _ = shutdown_tx.send(());
    }) {
        log::error!("failed to install signal handler: {e}");
        std::process::exit(1);
    }

    daemon.run(&shutdown_rx, Duration::from_millis(cli.poll_ms));
}
