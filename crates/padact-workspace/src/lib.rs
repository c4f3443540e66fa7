//! Loads a YAML profile describing gamepad-button-to-action bindings and
//! lowers it into the mapping table a `padact_translator::KeyboardActionTranslator`
//! is constructed from, wiring each rule's action to a `padact_control::Performer`
//! callback.

mod v1;

use std::process::Command;
use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use padact_control::{KeyCombo, Performer};
use padact_translator::{ConfigError, ExclusivityGroup, MappingConfig};

const DEFAULT_SHELL: &str = "/bin/sh";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported profile version: {0}")]
    UnsupportedVersion(u8),
    #[error("v1 profile error: {0}")]
    V1Profile(#[from] v1::Error),
    #[error("invalid mapping configuration: {0}")]
    InvalidMapping(#[from] ConfigError),
}

/// A mouse button an action can click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Whether a mouse click action clicks once or twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseClickType {
    Click,
    DoubleClick,
}

/// What a button rule does when its mapping fires.
#[derive(Debug, Clone)]
pub enum ButtonAction {
    /// Held: pressed on Down, released on Up.
    Keystroke(KeyCombo),
    /// Tapped immediately on Down; no repeat, no hold.
    TapKeystroke(KeyCombo),
    /// A fixed sequence of taps fired in order on Down.
    Macros(SmallVec<[KeyCombo; 4]>),
    /// A shell command run (via the profile's configured shell) on Down.
    Shell(String),
    MouseClick { button: MouseButton, click_type: MouseClickType },
}

/// One button's configuration: action plus the translator-level policy knobs
/// that become a `MappingConfig`.
#[derive(Debug, Clone)]
pub struct ButtonRule {
    pub action: ButtonAction,
    pub exclusivity_group: Option<ExclusivityGroup>,
    pub infinite_repeat: bool,
    pub first_repeat_only: bool,
    pub repeat_delay_ms: Option<u64>,
    pub first_repeat_delay_ms: Option<u64>,
}

/// A loaded profile: every button rule plus the shell used for `Shell` actions.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub shell: Option<Box<str>>,
    pub buttons: AHashMap<u16, ButtonRule>,
}

impl Profile {
    /// Parses a YAML document into a `Profile`. Only schema version 1 is
    /// currently supported.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        let (version, profile) = v1::parse(yaml)?;
        if version != 1 {
            return Err(ProfileError::UnsupportedVersion(version));
        }
        Ok(profile)
    }

    /// Lowers every button rule into a `MappingConfig` wired to fire through
    /// `performer`, ready to hand to `KeyboardActionTranslator::new`.
    ///
    /// `Shell` actions run on the thread the callback is invoked from,
    /// matching the teacher daemon's `ActionRunner::run_shell`.
    pub fn into_mappings(self, performer: Arc<Mutex<Performer>>) -> Vec<MappingConfig> {
        let shell = self.shell.unwrap_or_else(|| DEFAULT_SHELL.into());
        self.buttons
            .into_iter()
            .map(|(button_vk, rule)| build_mapping(button_vk, rule, &performer, shell.clone()))
            .collect()
    }
}

fn apply_policy(mut config: MappingConfig, rule: &ButtonRule) -> MappingConfig {
    config = config
        .with_infinite_repeat(rule.infinite_repeat)
        .with_first_repeat_only(rule.first_repeat_only);

    if let Some(group) = rule.exclusivity_group {
        config = config.with_exclusivity_group(group);
    }
    if let Some(ms) = rule.repeat_delay_ms {
        config = config.with_repeat_delay(std::time::Duration::from_millis(ms));
    }
    if let Some(ms) = rule.first_repeat_delay_ms {
        config = config.with_first_repeat_delay(std::time::Duration::from_millis(ms));
    }
    config
}

fn build_mapping(
    button_vk: u16,
    rule: ButtonRule,
    performer: &Arc<Mutex<Performer>>,
    shell: Box<str>,
) -> MappingConfig {
    let config = apply_policy(MappingConfig::new(button_vk), &rule);

    match rule.action {
        ButtonAction::Keystroke(combo) => {
            let press_performer = performer.clone();
            let press_combo = combo.clone();
            let release_performer = performer.clone();
            config
                .with_on_down(move || {
                    if let Ok(mut p) = press_performer.lock() {
                        if let Err(e) = p.press(&press_combo) {
                            log::error!("keystroke press failed for vk=0x{button_vk:04x}: {e:?}");
                        }
                    }
                })
                .with_on_up(move || {
                    if let Ok(mut p) = release_performer.lock() {
                        if let Err(e) = p.release(&combo) {
                            log::error!("keystroke release failed for vk=0x{button_vk:04x}: {e:?}");
                        }
                    }
                })
        }
        ButtonAction::TapKeystroke(combo) => {
            let performer = performer.clone();
            config.with_on_down(move || {
                if let Ok(mut p) = performer.lock() {
                    if let Err(e) = p.perform(&combo) {
                        log::error!("tap keystroke failed for vk=0x{button_vk:04x}: {e:?}");
                    }
                }
            })
        }
        ButtonAction::Macros(combos) => {
            let performer = performer.clone();
            config.with_on_down(move || {
                if let Ok(mut p) = performer.lock() {
                    for combo in &combos {
                        if let Err(e) = p.perform(combo) {
                            log::error!("macro step failed for vk=0x{button_vk:04x}: {e:?}");
                        }
                    }
                }
            })
        }
        ButtonAction::Shell(command) => config.with_on_down(move || {
            log::info!("running shell command for vk=0x{button_vk:04x}: {command}");
            match Command::new(shell.as_ref()).args(["-c", &command]).output() {
                Ok(output) => log::debug!("shell output: {}", String::from_utf8_lossy(&output.stdout)),
                Err(e) => log::error!("shell command failed: {e}"),
            }
        }),
        ButtonAction::MouseClick { button, click_type } => {
            let performer = performer.clone();
            let enigo_button = match button {
                MouseButton::Left => enigo::Button::Left,
                MouseButton::Right => enigo::Button::Right,
                MouseButton::Middle => enigo::Button::Middle,
            };
            config.with_on_down(move || {
                if let Ok(mut p) = performer.lock() {
                    let result = match click_type {
                        MouseClickType::Click => p.mouse_click(enigo_button),
                        MouseClickType::DoubleClick => p.mouse_double_click(enigo_button),
                    };
                    if let Err(e) = result {
                        log::error!("mouse click failed for vk=0x{button_vk:04x}: {e:?}");
                    }
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule() -> ButtonRule {
        ButtonRule {
            action: ButtonAction::TapKeystroke(KeyCombo::new(enigo::Key::Unicode('a'))),
            exclusivity_group: Some(ExclusivityGroup::overtaking(7)),
            infinite_repeat: true,
            first_repeat_only: false,
            repeat_delay_ms: Some(50),
            first_repeat_delay_ms: Some(250),
        }
    }

    #[test]
    fn apply_policy_carries_repeat_and_exclusivity_settings_onto_the_mapping_config() {
        let config = apply_policy(MappingConfig::new(0x2a), &sample_rule());
        assert_eq!(config.button_vk(), 0x2a);
        assert_eq!(config.exclusivity_group(), Some(ExclusivityGroup::overtaking(7)));
    }

    #[test]
    fn profile_from_yaml_rejects_versions_other_than_one() {
        let yaml = "version: 2\nbuttons: []\n";
        let err = Profile::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ProfileError::UnsupportedVersion(2)));
    }

    #[test]
    fn default_shell_is_used_when_profile_omits_one() {
        let profile = Profile::from_yaml("version: 1\nbuttons: []\n").unwrap();
        assert!(profile.shell.is_none());
    }
}
