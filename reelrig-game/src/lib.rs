//! Reelrig Game Engine
//!
//! Platform-agnostic core of the Reelrig slot machine: weighted strip
//! generation with rigging, spring-damper reel physics, the spin phase
//! machine and settlement. No UI or platform-specific dependencies.

pub mod cards;
pub mod config;
pub mod constants;
pub mod event;
pub mod machine;
pub mod numbers;
pub mod reel;
pub mod request;
pub mod reward;
pub mod rig;
pub mod rng;
pub mod sampler;
pub mod session;
pub mod symbols;
pub mod weights;

// Re-export commonly used types
pub use cards::{
    ActiveCard, CardCatalog, CardDefinition, CardEffect, CardEffects, CardId, Inventory,
    SpinContext,
};
pub use config::{ConfigError, MachineConfig, PhysicsConfig};
pub use event::{EventId, EventKind, EventSeverity, SlotEvent, UiSurfaceHint};
pub use machine::{GamePhase, PhaseError, Trigger};
pub use reel::{Reel, ReelPhase, ReelState};
pub use request::{InitRequest, InitResponse, ReelResponse, StripRequest, generate_reel, init_reels};
pub use reward::{RewardResult, evaluate};
pub use rig::{
    LocalStripSource, RigCompletion, RigError, RigRequest, RigSequencer, RigTicket, StripSource,
};
pub use rng::{CountingRng, RngBundle};
pub use sampler::{ReelStrip, generate_strip, inject_bias, sample, sample_many, weighted_pick};
pub use session::{
    ExitOutcome, SessionData, SessionSnapshot, SlotSession, SpinOutcome, Wallet,
};
pub use symbols::{SymbolCategory, SymbolId, SymbolValue, SymbolValueTable};
pub use weights::{SymbolWeightTable, sanitize_bomb_multiplier};

/// Asset names understood by [`DataLoader::load_config`].
pub const CONFIG_ASSET: &str = "config";
pub const SYMBOL_WEIGHTS_ASSET: &str = "symbol-weights";
pub const SYMBOL_VALUES_ASSET: &str = "symbol-values";
pub const CARDS_ASSET: &str = "cards";

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Main engine for creating slot sessions from platform data
pub struct SlotEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> SlotEngine<L>
where
    L: DataLoader,
{
    /// Create a new engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    /// Load every data asset a session needs.
    ///
    /// # Errors
    ///
    /// Returns an error if any asset cannot be loaded or parsed.
    pub fn load_data(&self) -> Result<SessionData, L::Error> {
        let config: MachineConfig = self.data_loader.load_config(CONFIG_ASSET)?;
        let overrides: serde_json::Value = self.data_loader.load_config(SYMBOL_WEIGHTS_ASSET)?;
        let values: SymbolValueTable = self.data_loader.load_config(SYMBOL_VALUES_ASSET)?;
        let catalog: CardCatalog = self.data_loader.load_config(CARDS_ASSET)?;
        Ok(SessionData {
            config,
            weights: SymbolWeightTable::from_overrides(&overrides),
            values,
            catalog,
        })
    }

    /// Create a session seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data assets cannot be loaded.
    pub fn create_session(&self, seed: u64) -> Result<SlotSession, L::Error> {
        Ok(SlotSession::new(self.load_data()?, seed))
    }

    /// Create a session, falling back to the built-in data if loading fails.
    pub fn create_session_or_default(&self, seed: u64) -> SlotSession {
        let data = self.load_data().unwrap_or_else(|err| {
            log::warn!("data assets unavailable, using built-in defaults: {err}");
            SessionData::default()
        });
        SlotSession::new(data, seed)
    }

    /// Get a reference to the data loader
    pub const fn data_loader(&self) -> &L {
        &self.data_loader
    }
}
