//! The daemon binary's library half: logging setup, the `ControllerSource`
//! seam, and the `Daemon` polling loop. `main.rs` is just CLI parsing plus
//! the `ctrlc` shutdown wiring around this.

pub mod logging;

mod daemon;
mod source;

pub use daemon::{Daemon, DaemonError};
pub use source::{ControllerSource, FixtureSource};
