//! Ties a loaded profile, a `Performer`, and a `KeyboardActionTranslator`
//! together into a polling loop, matching the shape of the teacher daemon's
//! `runner`/`app` split.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use thiserror::Error;

use padact_control::Performer;
use padact_translator::{ConfigError, ControllerState, KeyboardActionTranslator};
use padact_workspace::{Profile, ProfileError};

use crate::source::ControllerSource;
use crate::{print_debug, print_info};

/// No real controller ever reports this virtual key; ticks that carry it
/// exist purely to give the translator a chance to fire due repeats and
/// timer resets across the whole mapping table.
const REPEAT_DRIVER_VK: u16 = u16::MAX;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to read profile file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to load profile: {0}")]
    Profile(#[from] ProfileError),
    #[error("failed to build mapping table: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to open input device: {0}")]
    Performer(#[from] enigo::NewConError),
}

pub struct Daemon {
    translator: KeyboardActionTranslator,
    source: Box<dyn ControllerSource>,
}

impl Daemon {
    /// Loads `profile` and builds the translator, performer, and mapping
    /// table in one shot.
    pub fn from_profile(profile: Profile, source: Box<dyn ControllerSource>) -> Result<Self, DaemonError> {
        let performer = Arc::new(Mutex::new(Performer::new()?));
        let mappings = profile.into_mappings(performer);
        let translator = KeyboardActionTranslator::new(mappings)?;
        Ok(Self { translator, source })
    }

    /// Reads and parses a profile file from disk, then delegates to
    /// `from_profile`.
    pub fn from_profile_path(
        path: &std::path::Path,
        source: Box<dyn ControllerSource>,
    ) -> Result<Self, DaemonError> {
        let yaml = std::fs::read_to_string(path)?;
        let profile = Profile::from_yaml(&yaml)?;
        Self::from_profile(profile, source)
    }

    /// Drives the translator until `shutdown_rx` fires or disconnects,
    /// polling `source` every `poll_interval` and applying each resulting
    /// pack immediately. Runs `cleanup_actions()` to completion before
    /// returning. The shutdown signal and the poll wait share a single
    /// `recv_timeout` call, mirroring the teacher daemon's channel-driven
    /// main loop rather than a raw `sleep` plus polled flag.
    pub fn run(&mut self, shutdown_rx: &Receiver<()>, poll_interval: Duration) {
        print_info!("padactd running, poll interval {poll_interval:?}");
        loop {
            for event in self.source.poll() {
                print_debug!("controller event: {event:?}");
                self.translator.translate(event).apply(&mut self.translator);
            }
            self.translator
                .translate(ControllerState::idle(REPEAT_DRIVER_VK))
                .apply(&mut self.translator);

            match shutdown_rx.recv_timeout(poll_interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => continue,
            }
        }
        self.shutdown();
    }

    /// Releases every in-progress mapping and resets the translator to
    /// Initial, applying cleanup batches until one comes back empty.
    pub fn shutdown(&mut self) {
        print_info!("shutting down, releasing in-progress mappings");
        loop {
            let batch = self.translator.cleanup_actions();
            if batch.is_empty() {
                break;
            }
            for result in &batch {
                result.apply(&mut self.translator);
            }
        }
    }
}
