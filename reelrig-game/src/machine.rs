//! Spin phase machine.
//!
//! The phase is a small counter: 0 is idle, `1..=n` means reel `phase - 1` is
//! the next one the player may stop, `n + 1` waits for the remaining reels to
//! lock and `n + 2` shows the settled result. Transitions are pure; the
//! session applies their side effects.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Inputs that may move the phase counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// The single player action button.
    Action,
    /// Every reel reported a lock.
    AllLocked,
    /// The player left the machine; `escape` is true when an escape card is active.
    Exit { escape: bool },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    #[error("{trigger:?} is not accepted in phase {phase}")]
    Illegal { phase: u8, trigger: Trigger },
    #[error("phase {phase} is out of range for {reels} reels")]
    OutOfRange { phase: u8, reels: u8 },
}

/// Spin phase counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GamePhase(u8);

impl GamePhase {
    pub const IDLE: Self = Self(0);

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_idle(self) -> bool {
        self.0 == 0
    }

    /// Reel the next action stops, if the player is still stopping reels.
    #[must_use]
    pub const fn stoppable_reel(self, reels: u8) -> Option<usize> {
        if self.0 >= 1 && self.0 <= reels {
            Some((self.0 - 1) as usize)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_awaiting_locks(self, reels: u8) -> bool {
        self.0 == Self::awaiting(reels).0
    }

    #[must_use]
    pub const fn is_settled(self, reels: u8) -> bool {
        self.0 == Self::settled(reels).0
    }

    /// Phase that waits for every reel to lock.
    #[must_use]
    pub const fn awaiting(reels: u8) -> Self {
        Self(reels.saturating_add(1))
    }

    /// Phase that shows the settled result.
    #[must_use]
    pub const fn settled(reels: u8) -> Self {
        Self(reels.saturating_add(2))
    }

    /// Apply `trigger` for a machine with `reels` reels.
    ///
    /// Exit outside of the stopping window leaves the phase unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::Illegal`] when the trigger has no meaning in the
    /// current phase and [`PhaseError::OutOfRange`] if the counter is corrupt.
    pub fn on(self, trigger: Trigger, reels: u8) -> Result<Self, PhaseError> {
        let settled = Self::settled(reels);
        if self > settled {
            return Err(PhaseError::OutOfRange {
                phase: self.0,
                reels,
            });
        }
        let illegal = Err(PhaseError::Illegal {
            phase: self.0,
            trigger,
        });
        match trigger {
            Trigger::Action => {
                if self.is_awaiting_locks(reels) {
                    illegal
                } else if self == settled {
                    Ok(Self::IDLE)
                } else {
                    Ok(Self(self.0 + 1))
                }
            }
            Trigger::AllLocked => {
                if self.is_awaiting_locks(reels) {
                    Ok(settled)
                } else {
                    illegal
                }
            }
            Trigger::Exit { escape } => match self.stoppable_reel(reels) {
                Some(_) if escape => Ok(Self::awaiting(reels)),
                Some(_) => Ok(Self::IDLE),
                None => Ok(self),
            },
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
