//! Per-mapping configuration, state, and the callback contract.

use std::fmt;
use std::time::Duration;

use crate::timer::Timer;

/// A zero-argument side effect invoked synchronously from the caller's thread.
/// Must not call back into the `KeyboardActionTranslator` that owns it.
pub type Callback = Box<dyn FnMut() + 'static>;

/// A mapping's phase in the state machine of §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Down,
    Repeat,
    Up,
}

/// An exclusivity group id plus whether new activations overtake (release the
/// incumbent) or are blocked while an incumbent holds the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusivityGroup {
    pub id: i32,
    pub overtake: bool,
}

impl ExclusivityGroup {
    pub fn overtaking(id: i32) -> Self {
        Self { id, overtake: true }
    }

    pub fn blocking(id: i32) -> Self {
        Self { id, overtake: false }
    }
}

/// Mutable per-mapping state: current phase plus the two delay timers.
#[derive(Debug, Clone, Copy)]
pub struct MappingState {
    phase: Phase,
    pub(crate) repeat_timer: Timer,
    pub(crate) first_repeat_delay: Timer,
}

impl MappingState {
    pub(crate) fn new(repeat_timer: Timer, first_repeat_delay: Timer) -> Self {
        Self {
            phase: Phase::Initial,
            repeat_timer,
            first_repeat_delay,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_initial(&self) -> bool {
        self.phase == Phase::Initial
    }

    pub fn is_down(&self) -> bool {
        self.phase == Phase::Down
    }

    pub fn is_repeating(&self) -> bool {
        self.phase == Phase::Repeat
    }

    pub fn is_up(&self) -> bool {
        self.phase == Phase::Up
    }

    pub(crate) fn set_initial(&mut self) {
        self.phase = Phase::Initial;
    }

    pub(crate) fn set_down(&mut self) {
        self.phase = Phase::Down;
    }

    pub(crate) fn set_repeat(&mut self) {
        self.phase = Phase::Repeat;
    }

    pub(crate) fn set_up(&mut self) {
        self.phase = Phase::Up;
    }
}

/// Immutable configuration for a mapping, built with [`MappingConfig::new`] and
/// the `with_*` builder methods, then handed to `KeyboardActionTranslator::new`.
pub struct MappingConfig {
    pub(crate) button_vk: u16,
    pub(crate) uses_infinite_repeat: bool,
    pub(crate) sends_first_repeat_only: bool,
    pub(crate) exclusivity_group: Option<ExclusivityGroup>,
    pub(crate) custom_repeat_delay: Option<Duration>,
    pub(crate) custom_first_repeat_delay: Option<Duration>,
    pub(crate) on_down: Option<Callback>,
    pub(crate) on_up: Option<Callback>,
    pub(crate) on_repeat: Option<Callback>,
    pub(crate) on_reset: Option<Callback>,
}

impl fmt::Debug for MappingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingConfig")
            .field("button_vk", &self.button_vk)
            .field("uses_infinite_repeat", &self.uses_infinite_repeat)
            .field("sends_first_repeat_only", &self.sends_first_repeat_only)
            .field("exclusivity_group", &self.exclusivity_group)
            .field("custom_repeat_delay", &self.custom_repeat_delay)
            .field("custom_first_repeat_delay", &self.custom_first_repeat_delay)
            .finish_non_exhaustive()
    }
}

impl MappingConfig {
    pub fn new(button_vk: u16) -> Self {
        Self {
            button_vk,
            uses_infinite_repeat: false,
            sends_first_repeat_only: false,
            exclusivity_group: None,
            custom_repeat_delay: None,
            custom_first_repeat_delay: None,
            on_down: None,
            on_up: None,
            on_repeat: None,
            on_reset: None,
        }
    }

    pub fn button_vk(&self) -> u16 {
        self.button_vk
    }

    pub fn exclusivity_group(&self) -> Option<ExclusivityGroup> {
        self.exclusivity_group
    }

    pub fn with_infinite_repeat(mut self, enabled: bool) -> Self {
        self.uses_infinite_repeat = enabled;
        self
    }

    pub fn with_first_repeat_only(mut self, enabled: bool) -> Self {
        self.sends_first_repeat_only = enabled;
        self
    }

    pub fn with_exclusivity_group(mut self, group: ExclusivityGroup) -> Self {
        self.exclusivity_group = Some(group);
        self
    }

    pub fn with_repeat_delay(mut self, delay: Duration) -> Self {
        self.custom_repeat_delay = Some(delay);
        self
    }

    pub fn with_first_repeat_delay(mut self, delay: Duration) -> Self {
        self.custom_first_repeat_delay = Some(delay);
        self
    }

    pub fn with_on_down(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_down = Some(Box::new(f));
        self
    }

    pub fn with_on_up(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_up = Some(Box::new(f));
        self
    }

    pub fn with_on_repeat(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_repeat = Some(Box::new(f));
        self
    }

    pub fn with_on_reset(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_reset = Some(Box::new(f));
        self
    }
}

/// Config plus state for one controller-button-to-action binding. Owned
/// exclusively by a `KeyboardActionTranslator`'s mapping table.
pub struct Mapping {
    pub(crate) config: MappingConfig,
    pub(crate) state: MappingState,
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("config", &self.config)
            .field("phase", &self.state.phase())
            .finish()
    }
}

impl Mapping {
    pub(crate) fn new(config: MappingConfig, state: MappingState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn state(&self) -> &MappingState {
        &self.state
    }

    /// Missing callbacks are a no-op, not an error; the caller's state transition
    /// still occurs regardless of whether a callback was registered.
    pub(crate) fn fire_on_down(&mut self) {
        if let Some(cb) = self.config.on_down.as_mut() {
            cb();
        }
    }

    pub(crate) fn fire_on_up(&mut self) {
        if let Some(cb) = self.config.on_up.as_mut() {
            cb();
        }
    }

    pub(crate) fn fire_on_repeat(&mut self) {
        if let Some(cb) = self.config.on_repeat.as_mut() {
            cb();
        }
    }

    pub(crate) fn fire_on_reset(&mut self) {
        if let Some(cb) = self.config.on_reset.as_mut() {
            cb();
        }
    }
}
