//! Machine configuration: reel geometry, spring tuning and economy.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_BASE_BET, DEFAULT_BOMB_BOOST_MULTIPLIER, DEFAULT_FRICTION, DEFAULT_ITEM_HEIGHT,
    DEFAULT_REEL_COUNT, DEFAULT_SCROLL_SPEED, DEFAULT_SLOW_SPEED_FACTOR, DEFAULT_STARTING_COINS,
    DEFAULT_STRIP_LENGTH, DEFAULT_TENSION, DEFAULT_VISIBLE_HEIGHT, MIN_STRIP_LENGTH,
};

/// Errors raised when machine configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value:.2})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("friction must be strictly between 0 and 1 (got {value:.3})")]
    FrictionOutOfRange { value: f64 },
    #[error("reel_strip_length must be at least {min} (got {value})")]
    StripTooShort { min: usize, value: usize },
    #[error("reel_count must be between 1 and {max} (got {value})")]
    ReelCount { max: usize, value: usize },
    #[error("bet must be at least 1 (got {value})")]
    Bet { value: i64 },
}

/// Geometry and spring tuning shared by every reel of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Pixel height of one symbol cell.
    pub item_height: f64,
    /// Pixel height of the visible reel window.
    pub visible_height: f64,
    /// Velocity applied on spin start, in pixels per step.
    pub scroll_speed: f64,
    /// Spring tension; the per-step force is `displacement * tension / 100`.
    pub tension: f64,
    /// Velocity retained per step while stopping, strictly inside (0, 1).
    pub friction: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            item_height: DEFAULT_ITEM_HEIGHT,
            visible_height: DEFAULT_VISIBLE_HEIGHT,
            scroll_speed: DEFAULT_SCROLL_SPEED,
            tension: DEFAULT_TENSION,
            friction: DEFAULT_FRICTION,
        }
    }
}

impl PhysicsConfig {
    /// Offset at which the result symbol sits, centred in the window.
    #[must_use]
    pub fn center_offset(&self) -> f64 {
        (self.visible_height - self.item_height) / 2.0
    }
}

/// Complete machine configuration as read from `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default = "MachineConfig::default_item_height")]
    pub item_height: f64,
    #[serde(default = "MachineConfig::default_visible_height")]
    pub visible_height: f64,
    #[serde(default = "MachineConfig::default_scroll_speed")]
    pub scroll_speed: f64,
    #[serde(default = "MachineConfig::default_tension")]
    pub tension: f64,
    #[serde(default = "MachineConfig::default_friction")]
    pub friction: f64,
    #[serde(default = "MachineConfig::default_strip_length")]
    pub reel_strip_length: usize,
    #[serde(default = "MachineConfig::default_reel_count")]
    pub reel_count: usize,
    /// Bet the reward table is calibrated for.
    #[serde(default = "MachineConfig::default_base_bet")]
    pub base_bet: i64,
    /// Current bet charged per spin.
    #[serde(default = "MachineConfig::default_base_bet")]
    pub bet: i64,
    #[serde(default = "MachineConfig::default_starting_coins")]
    pub starting_coins: i64,
    #[serde(default)]
    pub starting_gems: i64,
    /// Ticks between issuing a re-rig request and applying its strip; 0
    /// applies it in the tick the previous reel locked.
    #[serde(default)]
    pub rig_latency_ticks: u32,
    /// Spin speed factor applied per active slow card.
    #[serde(default = "MachineConfig::default_slow_speed_factor")]
    pub slow_speed_factor: f64,
    /// Bomb weight multiplier applied per active bomb-boost card.
    #[serde(default = "MachineConfig::default_bomb_boost_multiplier")]
    pub bomb_boost_multiplier: f64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            item_height: Self::default_item_height(),
            visible_height: Self::default_visible_height(),
            scroll_speed: Self::default_scroll_speed(),
            tension: Self::default_tension(),
            friction: Self::default_friction(),
            reel_strip_length: Self::default_strip_length(),
            reel_count: Self::default_reel_count(),
            base_bet: Self::default_base_bet(),
            bet: Self::default_base_bet(),
            starting_coins: Self::default_starting_coins(),
            starting_gems: 0,
            rig_latency_ticks: 0,
            slow_speed_factor: Self::default_slow_speed_factor(),
            bomb_boost_multiplier: Self::default_bomb_boost_multiplier(),
        }
    }
}

impl MachineConfig {
    /// Upper bound on reels so the phase counter fits in a byte.
    pub const MAX_REELS: usize = 16;

    const fn default_item_height() -> f64 {
        DEFAULT_ITEM_HEIGHT
    }

    const fn default_visible_height() -> f64 {
        DEFAULT_VISIBLE_HEIGHT
    }

    const fn default_scroll_speed() -> f64 {
        DEFAULT_SCROLL_SPEED
    }

    const fn default_tension() -> f64 {
        DEFAULT_TENSION
    }

    const fn default_friction() -> f64 {
        DEFAULT_FRICTION
    }

    const fn default_strip_length() -> usize {
        DEFAULT_STRIP_LENGTH
    }

    const fn default_reel_count() -> usize {
        DEFAULT_REEL_COUNT
    }

    const fn default_base_bet() -> i64 {
        DEFAULT_BASE_BET
    }

    const fn default_starting_coins() -> i64 {
        DEFAULT_STARTING_COINS
    }

    const fn default_slow_speed_factor() -> f64 {
        DEFAULT_SLOW_SPEED_FACTOR
    }

    const fn default_bomb_boost_multiplier() -> f64 {
        DEFAULT_BOMB_BOOST_MULTIPLIER
    }

    /// Load configuration from a JSON string. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON string cannot be parsed.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Embedded asset configuration, falling back to defaults on any failure.
    #[must_use]
    pub fn default_config() -> Self {
        Self::from_json(include_str!("../../reelrig-web/static/assets/data/config.json"))
            .map(Self::sanitized)
            .unwrap_or_else(|err| {
                log::warn!("config asset unreadable, using defaults: {err}");
                Self::default()
            })
    }

    /// Validate every invariant the physics and phase machine depend on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("item_height", self.item_height),
            ("visible_height", self.visible_height),
            ("scroll_speed", self.scroll_speed),
            ("tension", self.tension),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(ConfigError::FrictionOutOfRange {
                value: self.friction,
            });
        }
        if self.reel_strip_length < MIN_STRIP_LENGTH {
            return Err(ConfigError::StripTooShort {
                min: MIN_STRIP_LENGTH,
                value: self.reel_strip_length,
            });
        }
        if self.reel_count == 0 || self.reel_count > Self::MAX_REELS {
            return Err(ConfigError::ReelCount {
                max: Self::MAX_REELS,
                value: self.reel_count,
            });
        }
        if self.bet < 1 {
            return Err(ConfigError::Bet { value: self.bet });
        }
        if self.base_bet < 1 {
            return Err(ConfigError::Bet {
                value: self.base_bet,
            });
        }
        Ok(())
    }

    /// Clamp values into their valid ranges, replacing unusable ones with defaults.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        self.item_height = positive(self.item_height, defaults.item_height);
        self.visible_height = positive(self.visible_height, defaults.visible_height);
        self.scroll_speed = positive(self.scroll_speed, defaults.scroll_speed);
        self.tension = positive(self.tension, defaults.tension);
        if !(self.friction > 0.0 && self.friction < 1.0) {
            self.friction = defaults.friction;
        }
        self.reel_strip_length = self.reel_strip_length.max(MIN_STRIP_LENGTH);
        self.reel_count = self.reel_count.clamp(1, Self::MAX_REELS);
        self.base_bet = self.base_bet.max(1);
        self.bet = self.bet.max(1);
        self.starting_coins = self.starting_coins.max(0);
        self.starting_gems = self.starting_gems.max(0);
        self.slow_speed_factor = positive(self.slow_speed_factor, defaults.slow_speed_factor);
        self.bomb_boost_multiplier =
            crate::weights::sanitize_bomb_multiplier(self.bomb_boost_multiplier);
        self
    }

    #[must_use]
    pub const fn physics(&self) -> PhysicsConfig {
        PhysicsConfig {
            item_height: self.item_height,
            visible_height: self.visible_height,
            scroll_speed: self.scroll_speed,
            tension: self.tension,
            friction: self.friction,
        }
    }
}
