//! Centralized balance and tuning constants for the Reelrig engine.
//!
//! The JSON assets shipped with the web crate may override most of these, but
//! every value here is also the fallback used when an asset is missing or
//! malformed.

// Event keys ---------------------------------------------------------------
pub(crate) const KEY_SPIN_STARTED: &str = "slot.spin.started";
pub(crate) const KEY_REEL_LOCKED: &str = "slot.reel.locked";
pub(crate) const KEY_ALL_LOCKED: &str = "slot.reels.all-locked";
pub(crate) const KEY_REWARD_SETTLED: &str = "slot.reward.settled";
pub(crate) const KEY_JACKPOT: &str = "slot.reward.jackpot";
pub(crate) const KEY_CARD_GRANTED: &str = "slot.card.granted";
pub(crate) const KEY_RESTART_FORCED: &str = "slot.restart.forced";
pub(crate) const KEY_SPIN_ABORTED: &str = "slot.spin.aborted";
pub(crate) const KEY_INSUFFICIENT_FUNDS: &str = "slot.error.insufficient-funds";

// Symbol ids ---------------------------------------------------------------
pub const SYMBOL_COIN: &str = "coin_1";
pub const SYMBOL_COIN_STACK: &str = "coin_stack";
pub const SYMBOL_COIN_PILE: &str = "coin_pile";
pub const SYMBOL_GEM: &str = "gem_1";
pub const SYMBOL_GEM_MANY: &str = "gem_many";
pub const SYMBOL_BOMB: &str = "bomb_1";
pub const SYMBOL_BOMB_ATOM: &str = "bomb_atom";
pub const SYMBOL_CARD: &str = "card_item";
pub const SYMBOL_RANDOM: &str = "random_item";

/// Symbols whose weight is scaled by the per-spin bomb multiplier.
pub const BOMB_SYMBOLS: [&str; 2] = [SYMBOL_BOMB, SYMBOL_BOMB_ATOM];

/// Concrete symbols a `random_item` may turn into at settlement.
pub const RANDOM_RESOLUTIONS: [&str; 4] = [SYMBOL_COIN, SYMBOL_COIN_STACK, SYMBOL_GEM, SYMBOL_BOMB];

/// Built-in weight table, in sampling walk order.
pub(crate) const DEFAULT_WEIGHTS: [(&str, f64); 9] = [
    (SYMBOL_COIN, 25.0),
    (SYMBOL_COIN_STACK, 10.0),
    (SYMBOL_COIN_PILE, 5.0),
    (SYMBOL_GEM, 15.0),
    (SYMBOL_GEM_MANY, 5.0),
    (SYMBOL_BOMB, 15.0),
    (SYMBOL_BOMB_ATOM, 5.0),
    (SYMBOL_CARD, 10.0),
    (SYMBOL_RANDOM, 5.0),
];

// Reward tuning ------------------------------------------------------------
pub(crate) const COIN_SAME_CATEGORY_MULTIPLIER: i64 = 2;
pub(crate) const COIN_IDENTICAL_MULTIPLIER: i64 = 3;
pub(crate) const GEM_SAME_CATEGORY_MULTIPLIER: i64 = 3;
pub(crate) const BOMB_ATOM_JACKPOT_PAYOUT: i64 = 888;
pub(crate) const BOMB_SAME_CATEGORY_PAYOUT: i64 = 20;

// Reel physics -------------------------------------------------------------
pub(crate) const LOCK_VELOCITY_EPSILON: f64 = 0.1;
pub(crate) const LOCK_DISPLACEMENT_EPSILON: f64 = 0.5;
pub(crate) const MIN_STRIP_LENGTH: usize = 3;
pub(crate) const DEFAULT_STRIP_LENGTH: usize = 6;
pub(crate) const DEFAULT_REEL_COUNT: usize = 3;
pub(crate) const DEFAULT_ITEM_HEIGHT: f64 = 100.0;
pub(crate) const DEFAULT_VISIBLE_HEIGHT: f64 = 300.0;
pub(crate) const DEFAULT_SCROLL_SPEED: f64 = 30.0;
pub(crate) const DEFAULT_TENSION: f64 = 120.0;
pub(crate) const DEFAULT_FRICTION: f64 = 0.86;

// Economy ------------------------------------------------------------------
pub(crate) const DEFAULT_BASE_BET: i64 = 10;
pub(crate) const DEFAULT_STARTING_COINS: i64 = 100;
pub(crate) const DEFAULT_SLOW_SPEED_FACTOR: f64 = 0.5;
pub(crate) const DEFAULT_BOMB_BOOST_MULTIPLIER: f64 = 2.0;
pub(crate) const UNKNOWN_CARD_NAME: &str = "Unknown Card";
