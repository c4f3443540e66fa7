//! Controller polling is out of scope for this repository (no SDL2/XInput
//! binding is implemented); this trait is the seam a real backend would fill.

use smallvec::SmallVec;

use padact_translator::ControllerState;

/// Supplies polled controller events, one batch per tick. An empty batch
/// means nothing changed since the last poll.
pub trait ControllerSource {
    fn poll(&mut self) -> SmallVec<[ControllerState; 4]>;
}

/// A deterministic, in-memory `ControllerSource` backed by a scripted queue
/// of events, for demos and integration tests. Each `poll()` call drains and
/// returns the next scripted batch, or an empty batch once the script runs out.
#[derive(Debug, Default)]
pub struct FixtureSource {
    script: std::collections::VecDeque<SmallVec<[ControllerState; 4]>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one tick's worth of events to the end of the script.
    pub fn push_tick(&mut self, events: impl IntoIterator<Item = ControllerState>) {
        self.script.push_back(events.into_iter().collect());
    }

    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }
}

impl ControllerSource for FixtureSource {
    fn poll(&mut self) -> SmallVec<[ControllerState; 4]> {
        self.script.pop_front().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_source_drains_scripted_ticks_in_order() {
        let mut source = FixtureSource::new();
        source.push_tick([ControllerState::down(0x01)]);
        source.push_tick([ControllerState::up(0x01)]);

        assert_eq!(source.poll().as_slice(), [ControllerState::down(0x01)]);
        assert_eq!(source.poll().as_slice(), [ControllerState::up(0x01)]);
        assert!(source.poll().is_empty());
        assert!(source.is_exhausted());
    }
}
