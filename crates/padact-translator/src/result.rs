//! Committed effects produced by a tick: the `(operation, advance)` pairs that
//! make up a [`TranslationPack`].

use crate::translator::KeyboardActionTranslator;

/// Which side effect and state transition a `TranslationResult` carries out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Up → Initial: fires `on_reset`.
    Reset,
    /// Down/Repeat → Repeat: fires `on_repeat`.
    Repeat,
    /// Initial → Down: fires `on_down`.
    Down,
    /// Down/Repeat → Up: fires `on_up`. Used both for a direct release and for
    /// an overtaken mapping being displaced.
    Up,
}

/// A single committed effect: which mapping, and what kind of transition.
///
/// Represented as data rather than a pair of boxed closures (the spec permits
/// either) because the closures would need to borrow `&mut Mapping` out of the
/// translator's own `Vec<Mapping>`, which Rust's borrow checker rejects as
/// self-referential. `operation` and `advance` are instead methods that take
/// the translator they belong to, which preserves the "inspect the pack before
/// committing it" property the spec's design notes call out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationResult {
    kind: ResultKind,
    mapping_index: usize,
}

impl TranslationResult {
    pub(crate) fn new(kind: ResultKind, mapping_index: usize) -> Self {
        Self { kind, mapping_index }
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn mapping_index(&self) -> usize {
        self.mapping_index
    }

    /// Invokes the mapping's callback for this result's kind. A missing
    /// callback is a no-op.
    pub fn operation<C: crate::timer::Clock>(&self, translator: &mut KeyboardActionTranslator<C>) {
        let mapping = translator.mapping_mut(self.mapping_index);
        match self.kind {
            ResultKind::Reset => mapping.fire_on_reset(),
            ResultKind::Repeat => mapping.fire_on_repeat(),
            ResultKind::Down => mapping.fire_on_down(),
            ResultKind::Up => mapping.fire_on_up(),
        }
    }

    /// Transitions the mapping's phase and resets the timers this kind owns.
    pub fn advance<C: crate::timer::Clock>(&self, translator: &mut KeyboardActionTranslator<C>) {
        let now = translator.now();
        let mapping = translator.mapping_mut(self.mapping_index);
        match self.kind {
            ResultKind::Reset => {
                mapping.state.set_initial();
                mapping.state.repeat_timer.reset(now);
            }
            ResultKind::Repeat => {
                mapping.state.repeat_timer.reset(now);
                mapping.state.set_repeat();
            }
            ResultKind::Down => {
                mapping.state.repeat_timer.reset(now);
                mapping.state.first_repeat_delay.reset(now);
                mapping.state.set_down();
            }
            ResultKind::Up => {
                mapping.state.set_up();
                mapping.state.repeat_timer.reset(now);
            }
        }
    }

    /// Invokes `operation` then `advance`, in that order.
    pub fn apply<C: crate::timer::Clock>(&self, translator: &mut KeyboardActionTranslator<C>) {
        self.operation(translator);
        self.advance(translator);
    }
}

/// The four ordered buckets a tick produces. Applying a pack means running
/// `updates`, then `repeats`, then `overtaken`, then `next_state`, each bucket
/// in mapping-table order.
#[derive(Debug, Default)]
pub struct TranslationPack {
    pub updates: Vec<TranslationResult>,
    pub repeats: Vec<TranslationResult>,
    pub overtaken: Vec<TranslationResult>,
    pub next_state: Vec<TranslationResult>,
}

impl TranslationPack {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
            && self.repeats.is_empty()
            && self.overtaken.is_empty()
            && self.next_state.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len() + self.repeats.len() + self.overtaken.len() + self.next_state.len()
    }

    /// Applies all four buckets in the documented order. Callers that want to
    /// inspect or log the pack first should iterate the buckets directly and
    /// call `TranslationResult::apply` themselves instead.
    pub fn apply<C: crate::timer::Clock>(self, translator: &mut KeyboardActionTranslator<C>) {
        for result in self.updates {
            result.apply(translator);
        }
        for result in self.repeats {
            result.apply(translator);
        }
        for result in self.overtaken {
            result.apply(translator);
        }
        for result in self.next_state {
            result.apply(translator);
        }
    }
}
