//! Structured events emitted by a slot session for the presentation layer.
//!
//! The kind is the mechanical descriptor; the ui key and surface hint only
//! tell the front end how to render it.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::constants::{
    KEY_ALL_LOCKED, KEY_CARD_GRANTED, KEY_INSUFFICIENT_FUNDS, KEY_JACKPOT, KEY_REEL_LOCKED,
    KEY_RESTART_FORCED, KEY_REWARD_SETTLED, KEY_SPIN_ABORTED, KEY_SPIN_STARTED,
};
use crate::symbols::SymbolId;

/// Stable, deterministic identifier for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// One-based spin counter; 0 for events raised before the first spin.
    pub spin: u32,
    /// Per-spin sequence number (0-based).
    pub seq: u16,
}

impl EventId {
    #[must_use]
    pub const fn new(spin: u32, seq: u16) -> Self {
        Self { spin, seq }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    SpinStarted {
        /// Free re-spins charge no bet.
        free: bool,
    },
    ReelLocked {
        reel: usize,
        symbol: SymbolId,
    },
    AllLocked,
    RewardSettled {
        coin_delta: i64,
        gem_delta: i64,
        jackpot: bool,
        shielded: bool,
    },
    CardGranted {
        card: CardId,
    },
    RestartForced,
    SpinAborted,
    InsufficientFunds {
        coins: i64,
        bet: i64,
    },
}

impl EventKind {
    #[must_use]
    pub fn ui_key(&self) -> &'static str {
        match self {
            Self::SpinStarted { .. } => KEY_SPIN_STARTED,
            Self::ReelLocked { .. } => KEY_REEL_LOCKED,
            Self::AllLocked => KEY_ALL_LOCKED,
            Self::RewardSettled { jackpot: true, .. } => KEY_JACKPOT,
            Self::RewardSettled { .. } => KEY_REWARD_SETTLED,
            Self::CardGranted { .. } => KEY_CARD_GRANTED,
            Self::RestartForced => KEY_RESTART_FORCED,
            Self::SpinAborted => KEY_SPIN_ABORTED,
            Self::InsufficientFunds { .. } => KEY_INSUFFICIENT_FUNDS,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> EventSeverity {
        match self {
            Self::RewardSettled { jackpot: true, .. } | Self::RestartForced => {
                EventSeverity::Critical
            }
            Self::InsufficientFunds { .. } | Self::SpinAborted => EventSeverity::Warning,
            _ => EventSeverity::Info,
        }
    }

    #[must_use]
    pub const fn surface(&self) -> UiSurfaceHint {
        match self {
            Self::InsufficientFunds { .. } | Self::CardGranted { .. } => UiSurfaceHint::Toast,
            Self::RewardSettled { .. } | Self::RestartForced => UiSurfaceHint::Modal,
            _ => UiSurfaceHint::Log,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Info,
    Warning,
    Critical,
}

/// Hint for how the UI should surface an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiSurfaceHint {
    Log,
    Toast,
    Modal,
}

/// Event drained from a session by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub severity: EventSeverity,
    pub ui_surface_hint: UiSurfaceHint,
    pub ui_key: String,
}

impl SlotEvent {
    #[must_use]
    pub fn new(id: EventId, kind: EventKind) -> Self {
        Self {
            id,
            severity: kind.severity(),
            ui_surface_hint: kind.surface(),
            ui_key: kind.ui_key().to_string(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jackpot_settlement_uses_jackpot_key() {
        let kind = EventKind::RewardSettled {
            coin_delta: 888,
            gem_delta: 0,
            jackpot: true,
            shielded: false,
        };
        let event = SlotEvent::new(EventId::new(4, 2), kind);
        assert_eq!(event.ui_key, "slot.reward.jackpot");
        assert_eq!(event.severity, EventSeverity::Critical);
        assert_eq!(event.ui_surface_hint, UiSurfaceHint::Modal);
    }

    #[test]
    fn insufficient_funds_is_a_toast() {
        let event = SlotEvent::new(
            EventId::new(0, 0),
            EventKind::InsufficientFunds { coins: 3, bet: 10 },
        );
        assert_eq!(event.ui_surface_hint, UiSurfaceHint::Toast);
        assert_eq!(event.severity, EventSeverity::Warning);

        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["kind"]["type"], "insufficient_funds");
        let restored: SlotEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, event);
    }
}
