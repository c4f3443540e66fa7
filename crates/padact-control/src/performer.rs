use enigo::{Axis, Button, Coordinate, Direction, Enigo, InputResult, Mouse, NewConError, Settings};

use crate::KeyCombo;

pub struct Performer {
    enigo: Enigo,
}

// SAFETY: Performer's Enigo handle is only ever touched from the single
// thread that owns the translator tick loop; callers sharing a Performer
// across threads are responsible for their own synchronization.
unsafe impl Send for Performer {}
unsafe impl Sync for Performer {}

impl Performer {
    /// Create a new performer.
    pub fn new() -> Result<Self, NewConError> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings)?;
        Ok(Self { enigo })
    }

    /// Press and release the keys in the key combo.
    pub fn perform(&mut self, key_combo: &KeyCombo) -> InputResult<()> {
        key_combo.perform(&mut self.enigo)
    }

    /// Press keys without releasing them.
    pub fn press(&mut self, key_combo: &KeyCombo) -> InputResult<()> {
        key_combo.press(&mut self.enigo)
    }

    /// Release keys pressed by a prior `press` call.
    pub fn release(&mut self, key_combo: &KeyCombo) -> InputResult<()> {
        key_combo.release(&mut self.enigo)
    }

    /// Move mouse by a relative offset.
    pub fn mouse_move(&mut self, x: i32, y: i32) -> InputResult<()> {
        self.enigo.move_mouse(x, y, Coordinate::Rel)
    }

    pub fn scroll_x(&mut self, value: i32) -> InputResult<()> {
        self.enigo.scroll(value, Axis::Horizontal)
    }

    pub fn scroll_y(&mut self, value: i32) -> InputResult<()> {
        self.enigo.scroll(value, Axis::Vertical)
    }

    /// Click a mouse button.
    pub fn mouse_click(&mut self, button: Button) -> InputResult<()> {
        self.enigo.button(button, Direction::Click)
    }

    /// Double-click a mouse button.
    pub fn mouse_double_click(&mut self, button: Button) -> InputResult<()> {
        self.enigo.button(button, Direction::Click)?;
        self.enigo.button(button, Direction::Click)
    }
}
