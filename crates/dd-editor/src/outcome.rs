//! What an event handler asks of its host.
//!
//! The editor never owns timers, file dialogs or the window. Anything it
//! needs from the host comes back as an `Effect` alongside the redraw flag.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Side-panel visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panels {
    pub left: bool,
    pub right: bool,
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start a one-shot timer; deliver `InputEvent::TimerElapsed { token }`.
    StartTimer { token: u64, delay_ms: u64 },
    /// The timer with `token` is no longer wanted.
    CancelTimer { token: u64 },
    /// Snapshot the rendered surface and offer it as a download.
    Export,
    PanelsChanged(Panels),
    /// Ask the user for an image file and pass its bytes to `import_image`.
    OpenImagePicker,
    /// Call `poll_decodes` on a later turn.
    ScheduleDecode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub redraw: bool,
    pub effects: SmallVec<[Effect; 2]>,
}

impl EventOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            redraw: true,
            effects: SmallVec::new(),
        }
    }

    pub fn effect(effect: Effect) -> Self {
        let mut outcome = Self::none();
        outcome.effects.push(effect);
        outcome
    }

    pub fn with_redraw(mut self, redraw: bool) -> Self {
        self.redraw |= redraw;
        self
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn merge(&mut self, other: EventOutcome) {
        self.redraw |= other.redraw;
        self.effects.extend(other.effects);
    }

    pub fn is_empty(&self) -> bool {
        !self.redraw && self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_redraw_and_effects() {
        let mut outcome = EventOutcome::effect(Effect::Export);
        assert!(!outcome.redraw);
        outcome.merge(EventOutcome::redraw());
        outcome.merge(EventOutcome::effect(Effect::ScheduleDecode));
        assert!(outcome.redraw);
        assert_eq!(
            outcome.effects.as_slice(),
            &[Effect::Export, Effect::ScheduleDecode]
        );
    }

    #[test]
    fn none_is_empty() {
        assert!(EventOutcome::none().is_empty());
        assert!(!EventOutcome::none().with_redraw(true).is_empty());
    }
}
