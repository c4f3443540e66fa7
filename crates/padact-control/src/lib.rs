//! Input-synthesis callback target: turns a [`KeyCombo`] or mouse action into
//! real keyboard/mouse events via `enigo`. Wired up as `on_down`/`on_up`/
//! `on_repeat`/`on_reset` callbacks on a `padact_translator::MappingConfig`.

mod performer;

pub use performer::Performer;

use enigo::{Direction, Enigo, InputResult, Key, Keyboard};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A held-modifiers-plus-key combination, e.g. Ctrl+Shift+A.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCombo {
    pub modifiers: SmallVec<[Key; 4]>,
    pub key: Key,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            modifiers: SmallVec::new(),
            key,
        }
    }

    pub fn with_modifier(mut self, modifier: Key) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Presses every modifier, then the key, each in declared order.
    pub fn press(&self, enigo: &mut Enigo) -> InputResult<()> {
        for modifier in &self.modifiers {
            enigo.key(*modifier, Direction::Press)?;
        }
        enigo.key(self.key, Direction::Press)
    }

    /// Releases the key, then every modifier in reverse declared order.
    pub fn release(&self, enigo: &mut Enigo) -> InputResult<()> {
        enigo.key(self.key, Direction::Release)?;
        for modifier in self.modifiers.iter().rev() {
            enigo.key(*modifier, Direction::Release)?;
        }
        Ok(())
    }

    /// Presses then releases, for a tap rather than a held combo.
    pub fn perform(&self, enigo: &mut Enigo) -> InputResult<()> {
        self.press(enigo)?;
        self.release(enigo)
    }
}
