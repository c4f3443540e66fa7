//! The engine: validates a mapping table, then turns one `ControllerState` per
//! tick into a `TranslationPack`.

use std::collections::hash_map::Entry;
use std::time::Duration;

use ahash::AHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::mapping::{Mapping, MappingConfig, MappingState};
use crate::overtake::OvertakingPolicy;
use crate::result::{ResultKind, TranslationPack, TranslationResult};
use crate::timer::{Clock, SystemClock, Timer};

/// Default interval between repeat emissions once repeating has started.
/// Matches the teacher daemon's `DEFAULT_REPEAT_INTERVAL_MS`.
pub const DEFAULT_REPEAT_DELAY: Duration = Duration::from_millis(50);

/// Default delay between Down and the first repeat emission. Matches the
/// teacher daemon's `DEFAULT_REPEAT_DELAY_MS`.
pub const DEFAULT_FIRST_REPEAT_DELAY: Duration = Duration::from_millis(400);

/// One polled controller button event. `key_down`, `key_up`, and `key_repeat`
/// are mutually exclusive; all-false represents an idle tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerState {
    pub virtual_key: u16,
    pub key_down: bool,
    pub key_up: bool,
    pub key_repeat: bool,
}

impl ControllerState {
    pub fn idle(virtual_key: u16) -> Self {
        Self {
            virtual_key,
            ..Default::default()
        }
    }

    pub fn down(virtual_key: u16) -> Self {
        Self {
            virtual_key,
            key_down: true,
            ..Default::default()
        }
    }

    pub fn up(virtual_key: u16) -> Self {
        Self {
            virtual_key,
            key_up: true,
            ..Default::default()
        }
    }

    pub fn repeat(virtual_key: u16) -> Self {
        Self {
            virtual_key,
            key_repeat: true,
            ..Default::default()
        }
    }
}

/// Failures surfaced at construction. Per-tick translation never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("button 0x{button_vk:04x} has mappings that disagree on exclusivity grouping")]
    InconsistentExclusivity { button_vk: u16 },
    #[error("mapping for button 0x{button_vk:04x} sets both infinite repeat and first-repeat-only")]
    InvalidRepeatPolicy { button_vk: u16 },
}

fn validate(configs: &[MappingConfig]) -> Result<(), ConfigError> {
    let mut vk_groups = AHashMap::new();
    let mut group_overtake = AHashMap::new();

    for config in configs {
        if config.uses_infinite_repeat && config.sends_first_repeat_only {
            return Err(ConfigError::InvalidRepeatPolicy {
                button_vk: config.button_vk,
            });
        }

        match vk_groups.entry(config.button_vk) {
            Entry::Occupied(existing) if *existing.get() != config.exclusivity_group => {
                return Err(ConfigError::InconsistentExclusivity {
                    button_vk: config.button_vk,
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(config.exclusivity_group);
            }
        }

        if let Some(group) = config.exclusivity_group {
            match group_overtake.entry(group.id) {
                Entry::Occupied(existing) if *existing.get() != group.overtake => {
                    return Err(ConfigError::InconsistentExclusivity {
                        button_vk: config.button_vk,
                    });
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(group.overtake);
                }
            }
        }
    }
    Ok(())
}

/// Owns the mapping table and turns polled controller state into translation
/// packs. Single-threaded per instance; see the crate docs for the concurrency
/// model.
pub struct KeyboardActionTranslator<C: Clock = SystemClock> {
    mappings: Vec<Mapping>,
    overtaking: OvertakingPolicy,
    clock: C,
}

impl KeyboardActionTranslator<SystemClock> {
    /// Builds a translator using the real monotonic clock.
    pub fn new(configs: Vec<MappingConfig>) -> Result<Self, ConfigError> {
        Self::with_clock(configs, SystemClock)
    }
}

impl<C: Clock> KeyboardActionTranslator<C> {
    /// Builds a translator with an injected clock, useful for deterministic
    /// tests via `padact_translator::timer::FakeClock`.
    pub fn with_clock(configs: Vec<MappingConfig>, clock: C) -> Result<Self, ConfigError> {
        if let Err(e) = validate(&configs) {
            log::warn!("rejecting mapping table: {e}");
            return Err(e);
        }

        let now = clock.now();
        let mappings = configs
            .into_iter()
            .map(|config| {
                let repeat_delay = config.custom_repeat_delay.unwrap_or(DEFAULT_REPEAT_DELAY);
                let first_repeat_delay = config
                    .custom_first_repeat_delay
                    .unwrap_or(DEFAULT_FIRST_REPEAT_DELAY);
                let state = MappingState::new(
                    Timer::new(now, repeat_delay),
                    Timer::new(now, first_repeat_delay),
                );
                Mapping::new(config, state)
            })
            .collect::<Vec<_>>();

        let overtaking = OvertakingPolicy::build(&mappings);
        Ok(Self {
            mappings,
            overtaking,
            clock,
        })
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub(crate) fn mapping_mut(&mut self, index: usize) -> &mut Mapping {
        &mut self.mappings[index]
    }

    pub(crate) fn now(&self) -> std::time::Instant {
        self.clock.now()
    }

    /// Consumes one polled controller event and returns the pack of results
    /// it implies. Does not mutate any mapping; the caller commits by calling
    /// `TranslationPack::apply` (or applying individual results) afterwards.
    pub fn translate(&mut self, state: ControllerState) -> TranslationPack {
        log::trace!("translate: vk=0x{:04x} down={} up={} repeat={}", state.virtual_key, state.key_down, state.key_up, state.key_repeat);
        let now = self.clock.now();
        let len = self.mappings.len();
        let mut pack = TranslationPack::default();

        let mut matches: SmallVec<[usize; 4]> = SmallVec::new();
        for i in 0..len {
            if self.mappings[i].config.button_vk == state.virtual_key {
                matches.push(i);
            }
        }

        for i in 0..len {
            let m = &self.mappings[i];
            if !m.state.is_up() {
                continue;
            }
            let permits_reset = !m.config.uses_infinite_repeat || m.state.repeat_timer.is_elapsed(now);
            if permits_reset {
                pack.updates.push(TranslationResult::new(ResultKind::Reset, i));
            }
        }

        let mut repeats_idx: SmallVec<[usize; 8]> = SmallVec::new();
        for i in 0..len {
            let m = &self.mappings[i];
            let infinite = m.config.uses_infinite_repeat;
            let single = m.config.sends_first_repeat_only;
            let down = m.state.is_down();
            let repeating = m.state.is_repeating();
            let repeat_elapsed = m.state.repeat_timer.is_elapsed(now);
            let first_elapsed = m.state.first_repeat_delay.is_elapsed(now);
            let due = (infinite && down && first_elapsed)
                || (infinite && repeating && repeat_elapsed)
                || (!infinite && single && down && first_elapsed);
            if due {
                repeats_idx.push(i);
            }
        }
        if state.key_up {
            repeats_idx.retain(|&mut i| self.mappings[i].config.button_vk != state.virtual_key);
        }

        let mut new_downs: SmallVec<[usize; 4]> = SmallVec::new();
        for &i in &matches {
            if !repeats_idx.contains(&i) {
                new_downs.push(i);
            }
        }

        let mut blocked: SmallVec<[usize; 4]> = SmallVec::new();
        let mut displaced_idx: SmallVec<[usize; 4]> = SmallVec::new();
        for &i in &new_downs {
            if state.key_down && self.mappings[i].state.is_initial() {
                if self.overtaking.is_blocked(&self.mappings, i) {
                    blocked.push(i);
                    continue;
                }
                for displaced in self.overtaking.displaced(&self.mappings, i) {
                    displaced_idx.push(displaced);
                }
            }
        }
        new_downs.retain(|i| !blocked.contains(i));

        // A mapping due for a repeat this tick can also be displaced by a
        // same-tick overtake; it must land in exactly one bucket, and being
        // overtaken (an Up) wins over firing a stale repeat first.
        repeats_idx.retain(|&mut i| !displaced_idx.contains(&i));
        for &i in &repeats_idx {
            pack.repeats.push(TranslationResult::new(ResultKind::Repeat, i));
        }
        for &i in &displaced_idx {
            pack.overtaken.push(TranslationResult::new(ResultKind::Up, i));
        }

        for &i in &new_downs {
            let m = &self.mappings[i];
            if state.key_down && m.state.is_initial() {
                pack.next_state.push(TranslationResult::new(ResultKind::Down, i));
            } else if state.key_up && (m.state.is_down() || m.state.is_repeating()) {
                pack.next_state.push(TranslationResult::new(ResultKind::Up, i));
            }
        }

        pack
    }

    /// Returns the results needed to bring every mapping back to Initial from
    /// its current phase. Down/Repeat mappings get a key-up result first;
    /// mappings already in Up get a reset result. Because Down/Repeat mappings
    /// land in Up (not Initial) after this batch is applied, a fully idle
    /// translator is reached only once a subsequent call (whose results are
    /// then applied) finds nothing left but Initial mappings, at which point
    /// it returns an empty vector.
    pub fn cleanup_actions(&mut self) -> Vec<TranslationResult> {
        let mut results = Vec::new();
        for i in 0..self.mappings.len() {
            let m = &self.mappings[i];
            if m.state.is_down() || m.state.is_repeating() {
                results.push(TranslationResult::new(ResultKind::Up, i));
            } else if m.state.is_up() {
                results.push(TranslationResult::new(ResultKind::Reset, i));
            }
        }
        results
    }
}

impl<C: Clock> std::fmt::Debug for KeyboardActionTranslator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardActionTranslator")
            .field("mappings", &self.mappings)
            .finish_non_exhaustive()
    }
}
