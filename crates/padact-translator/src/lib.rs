//! Polls a gamepad button and turns its down/repeat/up edges into keyboard and
//! mouse side effects, each mapping tracked through its own Initial → Down →
//! Repeat → Up state machine.
//!
//! The translator itself never touches a real keyboard or gamepad: callers
//! hand it [`mapping::MappingConfig`]s carrying their own `on_down`/`on_up`/
//! `on_repeat`/`on_reset` closures, poll a [`translator::ControllerState`]
//! per tick, and apply the [`result::TranslationPack`] it returns.

mod mapping;
mod overtake;
mod result;
mod timer;
mod translator;

pub use mapping::{Callback, ExclusivityGroup, Mapping, MappingConfig, MappingState, Phase};
pub use result::{ResultKind, TranslationPack, TranslationResult};
pub use timer::{Clock, SystemClock, Timer};
pub use translator::{
    ConfigError, ControllerState, KeyboardActionTranslator, DEFAULT_FIRST_REPEAT_DELAY,
    DEFAULT_REPEAT_DELAY,
};

#[cfg(any(test, feature = "test-util"))]
pub use timer::FakeClock;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn translator_with(configs: Vec<MappingConfig>) -> (KeyboardActionTranslator<FakeClock>, FakeClock) {
        let clock = FakeClock::new();
        let translator = KeyboardActionTranslator::with_clock(configs, clock.clone()).unwrap();
        (translator, clock)
    }

    #[test]
    fn initial_to_down_fires_on_down_once() {
        use std::cell::Cell;
        use std::rc::Rc;

        let fired = Rc::new(Cell::new(0u32));
        let fired_cb = fired.clone();
        let config = MappingConfig::new(0x01).with_on_down(move || fired_cb.set(fired_cb.get() + 1));
        let (mut translator, _clock) = translator_with(vec![config]);

        let pack = translator.translate(ControllerState::down(0x01));
        assert_eq!(pack.len(), 1);
        assert_eq!(pack.next_state[0].kind(), ResultKind::Down);
        pack.apply(&mut translator);

        assert_eq!(fired.get(), 1);
        assert!(translator.mappings()[0].state().is_down());
    }

    #[test]
    fn down_then_up_fires_on_up_and_lands_in_up_phase() {
        let config = MappingConfig::new(0x02);
        let (mut translator, _clock) = translator_with(vec![config]);

        translator.translate(ControllerState::down(0x02)).apply(&mut translator);
        let pack = translator.translate(ControllerState::up(0x02));
        assert_eq!(pack.next_state.len(), 1);
        assert_eq!(pack.next_state[0].kind(), ResultKind::Up);
        pack.apply(&mut translator);

        assert!(translator.mappings()[0].state().is_up());
    }

    #[test]
    fn repeat_policy_fires_first_repeat_after_delay() {
        let config = MappingConfig::new(0x03).with_first_repeat_delay(Duration::from_millis(100));
        let (mut translator, clock) = translator_with(vec![config]);

        translator.translate(ControllerState::down(0x03)).apply(&mut translator);

        let pack = translator.translate(ControllerState::idle(0x03));
        assert!(pack.repeats.is_empty());

        clock.advance(Duration::from_millis(100));
        let pack = translator.translate(ControllerState::idle(0x03));
        assert_eq!(pack.repeats.len(), 1);
        assert_eq!(pack.repeats[0].kind(), ResultKind::Repeat);
    }

    #[test]
    fn overtaking_group_releases_incumbent_before_activating_new_down() {
        let a = MappingConfig::new(0x10).with_exclusivity_group(ExclusivityGroup::overtaking(1));
        let b = MappingConfig::new(0x11).with_exclusivity_group(ExclusivityGroup::overtaking(1));
        let (mut translator, _clock) = translator_with(vec![a, b]);

        translator.translate(ControllerState::down(0x10)).apply(&mut translator);
        assert!(translator.mappings()[0].state().is_down());

        let pack = translator.translate(ControllerState::down(0x11));
        assert_eq!(pack.overtaken.len(), 1);
        assert_eq!(pack.overtaken[0].mapping_index(), 0);
        pack.apply(&mut translator);

        assert!(translator.mappings()[0].state().is_up());
        assert!(translator.mappings()[1].state().is_down());
    }

    #[test]
    fn no_overtake_group_blocks_new_down_while_incumbent_holds() {
        let a = MappingConfig::new(0x20).with_exclusivity_group(ExclusivityGroup::blocking(2));
        let b = MappingConfig::new(0x21).with_exclusivity_group(ExclusivityGroup::blocking(2));
        let (mut translator, _clock) = translator_with(vec![a, b]);

        translator.translate(ControllerState::down(0x20)).apply(&mut translator);

        let pack = translator.translate(ControllerState::down(0x21));
        assert!(pack.is_empty());
        assert!(translator.mappings()[1].state().is_initial());
    }

    #[test]
    fn mismatched_overtake_flags_on_shared_group_is_a_config_error() {
        let a = MappingConfig::new(0x30).with_exclusivity_group(ExclusivityGroup::overtaking(5));
        let b = MappingConfig::new(0x31).with_exclusivity_group(ExclusivityGroup::blocking(5));

        let err = KeyboardActionTranslator::with_clock(vec![a, b], FakeClock::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InconsistentExclusivity { .. }));
    }

    #[test]
    fn infinite_repeat_and_first_repeat_only_together_is_a_config_error() {
        let config = MappingConfig::new(0x40)
            .with_infinite_repeat(true)
            .with_first_repeat_only(true);

        let err = KeyboardActionTranslator::with_clock(vec![config], FakeClock::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRepeatPolicy { .. }));
    }

    #[test]
    fn cleanup_actions_walks_down_mappings_to_up_then_to_initial() {
        let config = MappingConfig::new(0x50);
        let (mut translator, _clock) = translator_with(vec![config]);
        translator.translate(ControllerState::down(0x50)).apply(&mut translator);

        let first = translator.cleanup_actions();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind(), ResultKind::Up);
        for result in &first {
            result.apply(&mut translator);
        }
        assert!(translator.mappings()[0].state().is_up());

        let second = translator.cleanup_actions();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].kind(), ResultKind::Reset);
        for result in &second {
            result.apply(&mut translator);
        }
        assert!(translator.mappings()[0].state().is_initial());

        assert!(translator.cleanup_actions().is_empty());
    }

    #[test]
    fn cleanup_actions_converges_to_empty_when_repeatedly_applied() {
        let a = MappingConfig::new(0x60);
        let b = MappingConfig::new(0x61);
        let (mut translator, _clock) = translator_with(vec![a, b]);
        translator.translate(ControllerState::down(0x60)).apply(&mut translator);
        translator.translate(ControllerState::down(0x61)).apply(&mut translator);
        translator.translate(ControllerState::up(0x61)).apply(&mut translator);

        let mut guard = 0;
        loop {
            let batch = translator.cleanup_actions();
            if batch.is_empty() {
                break;
            }
            for result in &batch {
                result.apply(&mut translator);
            }
            guard += 1;
            assert!(guard <= 4, "cleanup_actions did not converge");
        }

        for mapping in translator.mappings() {
            assert!(mapping.state().is_initial());
        }
    }
}
