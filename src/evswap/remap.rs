//! Left/right handed button swapping.
//!
//! While switched, the primary and secondary buttons trade places, and so do
//! the two pairs of side buttons. Pressing the toggle button flips between the
//! two orientations.

use crate::foreign::*;
use super::event::Event;
use log::info;

/// Pressing this button toggles between the left and right handed mode.
pub const TOGGLE_BUTTON: u32 = BTN_BACK;

const SWAP_PAIRS: [(u32, u32); 3] = [
    (BTN_LEFT, BTN_RIGHT),
    (BTN_EXTRA, BTN_BACK),
    (BTN_SIDE, BTN_FORWARD),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleState {
    Unswitched,
    Switched,
}

impl ToggleState {
    pub fn flipped(self) -> Self {
        match self {
            ToggleState::Unswitched => ToggleState::Switched,
            ToggleState::Switched => ToggleState::Unswitched,
        }
    }
}

impl Default for ToggleState {
    fn default() -> Self {
        ToggleState::Unswitched
    }
}

/// The partner of `code` in the swap table, or `code` itself.
pub fn swapped_code(code: u32) -> u32 {
    for &(a, b) in SWAP_PAIRS.iter() {
        if code == a {
            return b;
        }
        if code == b {
            return a;
        }
    }
    code
}

/// Computes the event to emit and the state to continue with.
///
/// The toggle condition looks at the incoming code, not the substituted one:
/// the toggle button is itself part of a pair, so checking after substitution
/// would stop it from flipping back once switched.
pub fn remap(event: Event, state: ToggleState) -> (Event, ToggleState) {
    let target = event.target();
    let is_key = target.type_() == EV_KEY;

    let output = if is_key && state == ToggleState::Switched {
        event.with_code(swapped_code(target.code()))
    } else {
        event
    };

    let next = if is_key && target.code() == TOGGLE_BUTTON && event.value() == 1 {
        state.flipped()
    } else {
        state
    };

    (output, next)
}

/// Owns the toggle state across events.
#[derive(Default)]
pub struct Remapper {
    state: ToggleState,
}

impl Remapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn translate(&mut self, event: Event) -> Event {
        let (output, next) = remap(event, self.state);
        if next != self.state {
            info!("button orientation: {:?}", next);
            self.state = next;
        }
        output
    }
}
