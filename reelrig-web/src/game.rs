//! Web-specific engine implementation
//!
//! This module provides the web implementation of the reelrig-game data
//! traits, a frame-driven controller for the browser loop, and re-exports the
//! core engine types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// Re-export all types from reelrig-game
pub use reelrig_game::*;

/// Milliseconds per simulation tick; the reels are tuned for 60 frames a second.
pub const TICK_MS: f64 = 1000.0 / 60.0;
/// Upper bound on ticks replayed for one frame after the tab was suspended.
pub const MAX_TICKS_PER_FRAME: u32 = 10;

/// Web-specific data loader that reads the embedded static assets
pub struct WebDataLoader;

#[derive(Debug, thiserror::Error)]
pub enum WebDataError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DataLoader for WebDataLoader {
    type Error = WebDataError;

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let json = match config_name {
            CONFIG_ASSET => include_str!("../static/assets/data/config.json"),
            SYMBOL_WEIGHTS_ASSET => include_str!("../static/assets/data/symbol-weights.json"),
            SYMBOL_VALUES_ASSET => include_str!("../static/assets/data/symbol-values.json"),
            CARDS_ASSET => include_str!("../static/assets/data/cards.json"),
            _ => return Err(WebDataError::UnknownAsset(config_name.to_string())),
        };
        serde_json::from_str(json).map_err(WebDataError::Json)
    }
}

/// Create a web-compatible engine with `WebDataLoader`
#[must_use]
pub const fn create_web_engine() -> SlotEngine<WebDataLoader> {
    SlotEngine::new(WebDataLoader)
}

/// Result of feeding one animation frame into the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    pub ticks: u32,
    /// Phase changed during this frame.
    pub phase_changed: bool,
    /// Events are waiting to be drained.
    pub has_events: bool,
}

/// Converts wall-clock frame deltas into session ticks.
#[derive(Debug)]
pub struct MachineController {
    session: SlotSession,
    carry_ms: f64,
}

impl MachineController {
    #[must_use]
    pub const fn new(session: SlotSession) -> Self {
        Self {
            session,
            carry_ms: 0.0,
        }
    }

    /// Controller over a session built from the embedded assets.
    #[must_use]
    pub fn from_assets(seed: u64) -> Self {
        Self::new(create_web_engine().create_session_or_default(seed))
    }

    #[must_use]
    pub const fn session(&self) -> &SlotSession {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut SlotSession {
        &mut self.session
    }

    /// Feed `elapsed_ms` of wall-clock time and run the ticks it covers.
    ///
    /// Leftover time carries into the next frame; long gaps are capped at
    /// [`MAX_TICKS_PER_FRAME`] and the excess dropped.
    pub fn advance(&mut self, elapsed_ms: f64) -> FrameReport {
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.carry_ms += elapsed_ms;
        }
        let before = self.session.phase();
        let mut ticks = 0;
        while self.carry_ms >= TICK_MS && ticks < MAX_TICKS_PER_FRAME {
            self.session.tick();
            self.carry_ms -= TICK_MS;
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_FRAME && self.carry_ms >= TICK_MS {
            log::debug!("dropping {:.0} ms of frame backlog", self.carry_ms);
            self.carry_ms = 0.0;
        }
        FrameReport {
            ticks,
            phase_changed: self.session.phase() != before,
            has_events: self.session.has_pending_events(),
        }
    }

    pub fn action(&mut self) -> SpinOutcome {
        self.session.action()
    }

    pub fn exit(&mut self) -> ExitOutcome {
        self.session.exit()
    }

    pub fn toggle_card(&mut self, index: usize) -> bool {
        self.session.toggle_card(index)
    }

    pub fn drain_events(&mut self) -> Vec<SlotEvent> {
        self.session.drain_events()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Snapshot serialized for hosts that exchange JSON strings.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }

    /// Drained events serialized as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn drain_events_json(&mut self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.drain_events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_serves_every_asset() {
        let loader = WebDataLoader;
        let cfg: MachineConfig = loader.load_config(CONFIG_ASSET).unwrap();
        assert_eq!(cfg.validate(), Ok(()));
        let catalog: CardCatalog = loader.load_config(CARDS_ASSET).unwrap();
        assert!(!catalog.cards.is_empty());
        let values: SymbolValueTable = loader.load_config(SYMBOL_VALUES_ASSET).unwrap();
        assert!(values.get(&SymbolId::new("coin_1")).is_some());
        let weights: serde_json::Value = loader.load_config(SYMBOL_WEIGHTS_ASSET).unwrap();
        assert!(weights["symbols"].is_object());
    }

    #[test]
    fn unknown_asset_is_an_error() {
        let err = WebDataLoader
            .load_config::<serde_json::Value>("fonts")
            .unwrap_err();
        assert!(matches!(err, WebDataError::UnknownAsset(name) if name == "fonts"));
    }

    #[test]
    fn frames_accumulate_into_ticks() {
        let mut controller = MachineController::from_assets(3);
        assert_eq!(controller.advance(10.0).ticks, 0);
        assert_eq!(controller.advance(10.0).ticks, 1);
        assert_eq!(controller.advance(55.0).ticks, 3);
        assert_eq!(controller.advance(f64::NAN).ticks, 0);
        assert_eq!(controller.advance(-5.0).ticks, 0);
    }

    #[test]
    fn long_gaps_are_capped() {
        let mut controller = MachineController::from_assets(3);
        assert_eq!(controller.advance(10_000.0).ticks, MAX_TICKS_PER_FRAME);
        assert_eq!(controller.advance(0.0).ticks, 0);
    }

    #[test]
    fn controller_reports_phase_changes_and_events() {
        let mut controller = MachineController::from_assets(11);
        assert!(matches!(controller.action(), SpinOutcome::Started { .. }));
        let report = controller.advance(TICK_MS);
        assert!(report.has_events);
        assert!(!report.phase_changed);
        let json = controller.drain_events_json().unwrap();
        assert!(json.contains("spin_started"));
        assert_eq!(controller.drain_events_json().unwrap(), "[]");
        let snapshot: serde_json::Value =
            serde_json::from_str(&controller.snapshot_json().unwrap()).unwrap();
        assert_eq!(snapshot["phase"], 1);
        assert_eq!(snapshot["wallet"]["coins"], 90);
    }
}
