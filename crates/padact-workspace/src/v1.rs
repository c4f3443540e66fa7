//! Version-1 YAML profile schema: the on-disk shape, parsed with `serde_yaml`
//! and lowered into the crate's [`crate::Profile`].

use ahash::AHashMap;
use enigo::Key;
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use padact_control::KeyCombo;

use crate::{ButtonAction, ButtonRule, MouseButton, MouseClickType, Profile};

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown key name: {0}")]
    UnknownKey(String),
    #[error("unknown mouse button: {0}")]
    UnknownMouseButton(String),
    #[error("keystroke and tap actions need at least one key")]
    EmptyKeystroke,
    #[error("button 0x{0:04x} is defined more than once")]
    DuplicateButton(u16),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawProfile {
    version: u8,
    shell: Option<String>,
    #[serde(default)]
    buttons: Vec<RawButtonRule>,
}

#[derive(Debug, Deserialize)]
struct RawButtonRule {
    button: u16,
    action: RawAction,
    exclusivity_group: Option<i32>,
    #[serde(default = "default_overtake")]
    overtake: bool,
    #[serde(default)]
    infinite_repeat: bool,
    #[serde(default)]
    first_repeat_only: bool,
    repeat_delay_ms: Option<u64>,
    first_repeat_delay_ms: Option<u64>,
}

fn default_overtake() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawAction {
    Keystroke { keys: Vec<String> },
    Tap { keys: Vec<String> },
    Macros { combos: Vec<Vec<String>> },
    Shell { command: String },
    MouseClick { button: String, #[serde(default)] double: bool },
}

pub(crate) fn parse(yaml: &str) -> Result<(u8, Profile), super::ProfileError> {
    let raw: RawProfile = serde_yaml::from_str(yaml)?;
    let version = raw.version;
    let profile = lower(raw).map_err(super::ProfileError::V1Profile)?;
    Ok((version, profile))
}

fn lower(raw: RawProfile) -> Result<Profile, Error> {
    let mut buttons = AHashMap::new();
    for rule in raw.buttons {
        if buttons.contains_key(&rule.button) {
            return Err(Error::DuplicateButton(rule.button));
        }
        let action = lower_action(rule.action)?;
        let exclusivity_group = rule
            .exclusivity_group
            .map(|id| padact_translator::ExclusivityGroup { id, overtake: rule.overtake });
        buttons.insert(
            rule.button,
            ButtonRule {
                action,
                exclusivity_group,
                infinite_repeat: rule.infinite_repeat,
                first_repeat_only: rule.first_repeat_only,
                repeat_delay_ms: rule.repeat_delay_ms,
                first_repeat_delay_ms: rule.first_repeat_delay_ms,
            },
        );
    }

    Ok(Profile {
        shell: raw.shell.map(Into::into),
        buttons,
    })
}

fn lower_action(raw: RawAction) -> Result<ButtonAction, Error> {
    match raw {
        RawAction::Keystroke { keys } => Ok(ButtonAction::Keystroke(lower_combo(&keys)?)),
        RawAction::Tap { keys } => Ok(ButtonAction::TapKeystroke(lower_combo(&keys)?)),
        RawAction::Macros { combos } => {
            let mut out = SmallVec::new();
            for combo in &combos {
                out.push(lower_combo(combo)?);
            }
            Ok(ButtonAction::Macros(out))
        }
        RawAction::Shell { command } => Ok(ButtonAction::Shell(command)),
        RawAction::MouseClick { button, double } => {
            let button = lower_mouse_button(&button)?;
            let click_type = if double { MouseClickType::DoubleClick } else { MouseClickType::Click };
            Ok(ButtonAction::MouseClick { button, click_type })
        }
    }
}

fn lower_combo(keys: &[String]) -> Result<KeyCombo, Error> {
    let (last, modifiers) = keys.split_last().ok_or(Error::EmptyKeystroke)?;
    let mut combo = KeyCombo::new(lower_key(last)?);
    for modifier in modifiers {
        combo = combo.with_modifier(lower_key(modifier)?);
    }
    Ok(combo)
}

fn lower_key(name: &str) -> Result<Key, Error> {
    let key = match name.to_ascii_lowercase().as_str() {
        "shift" => Key::Shift,
        "ctrl" | "control" => Key::Control,
        "alt" | "option" => Key::Alt,
        "meta" | "cmd" | "command" | "super" | "win" => Key::Meta,
        "space" => Key::Space,
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "escape" | "esc" => Key::Escape,
        "backspace" => Key::Backspace,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        single if single.chars().count() == 1 => Key::Unicode(single.chars().next().unwrap()),
        _ => return Err(Error::UnknownKey(name.to_string())),
    };
    Ok(key)
}

fn lower_mouse_button(name: &str) -> Result<MouseButton, Error> {
    match name.to_ascii_lowercase().as_str() {
        "left" => Ok(MouseButton::Left),
        "right" => Ok(MouseButton::Right),
        "middle" => Ok(MouseButton::Middle),
        _ => Err(Error::UnknownMouseButton(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_keystroke_profile() {
        let yaml = r#"
version: 1
buttons:
  - button: 91
    action:
      type: keystroke
      keys: ["ctrl", "c"]
"#;
        let (version, profile) = parse(yaml).unwrap();
        assert_eq!(version, 1);
        let rule = profile.buttons.get(&91).unwrap();
        match &rule.action {
            ButtonAction::Keystroke(combo) => {
                assert_eq!(combo.key, Key::Unicode('c'));
                assert_eq!(combo.modifiers.as_slice(), &[Key::Control]);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_button_ids() {
        let yaml = r#"
version: 1
buttons:
  - button: 1
    action: { type: tap, keys: ["a"] }
  - button: 1
    action: { type: tap, keys: ["b"] }
"#;
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, super::super::ProfileError::V1Profile(Error::DuplicateButton(1))));
    }

    #[test]
    fn rejects_unknown_key_names() {
        let yaml = r#"
version: 1
buttons:
  - button: 1
    action: { type: tap, keys: ["not-a-real-key"] }
"#;
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, super::super::ProfileError::V1Profile(Error::UnknownKey(_))));
    }
}
