//! Notification pairing filter.
//!
//! Each played move produces two structural notifications on the move list.
//! The toggle folds every pair into one logical event: the first of a pair is
//! swallowed, the second is processed.
//!
//! The pairing is not enforced. A lone notification shifts every later pair
//! by one and the filter stays shifted until the next `start()`.

/// Outcome of feeding one notification through the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglePhase {
    /// "On" phase: the first notification of a pair.
    Swallowed,
    /// "Off" phase: proceed with a cycle.
    Process,
}

/// Boolean toggle flipped on every notification.
#[derive(Debug, Clone, Default)]
pub struct MoveToggle {
    moved: bool,
}

impl MoveToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the toggle for one notification.
    pub fn flip(&mut self) -> TogglePhase {
        self.moved = !self.moved;
        if self.moved {
            TogglePhase::Swallowed
        } else {
            TogglePhase::Process
        }
    }

    pub fn reset(&mut self) {
        self.moved = false;
    }
}
