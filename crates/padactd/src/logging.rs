//! `fern`-backed logging, dispatched once from `main`. Library crates in this
//! workspace never call `log::set_boxed_logger` themselves.

use colored::Colorize;
use log::LevelFilter;

/// Installs a `fern` dispatcher that colors the level tag and timestamps every
/// line, matching the teacher daemon's console output.
pub fn init(verbose: bool) -> Result<(), fern::InitError> {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    fern::Dispatch::new()
        .format(|out, message, record| {
            let level_tag = match record.level() {
                log::Level::Error => "ERROR".red().bold(),
                log::Level::Warn => "WARN ".yellow().bold(),
                log::Level::Info => "INFO ".green(),
                log::Level::Debug => "DEBUG".blue(),
                log::Level::Trace => "TRACE".dimmed(),
            };
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                level_tag,
                message
            ));
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[macro_export]
macro_rules! print_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[macro_export]
macro_rules! print_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => { log::error!($($arg)*) };
}
