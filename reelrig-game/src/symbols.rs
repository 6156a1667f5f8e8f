//! Symbol identities, categories and the per-symbol value table.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::constants::{
    BOMB_SYMBOLS, SYMBOL_BOMB, SYMBOL_BOMB_ATOM, SYMBOL_CARD, SYMBOL_COIN, SYMBOL_COIN_PILE,
    SYMBOL_COIN_STACK, SYMBOL_GEM, SYMBOL_GEM_MANY, SYMBOL_RANDOM,
};

/// Identifier of a reel symbol, e.g. `coin_1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub String);

impl SymbolId {
    /// Construct an id from a string slice, trimming whitespace.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the bomb multiplier applies to this symbol.
    #[must_use]
    pub fn is_bomb(&self) -> bool {
        BOMB_SYMBOLS.contains(&self.0.as_str())
    }

    /// Whether this is the atomic bomb variant that pays the bomb jackpot.
    #[must_use]
    pub fn is_atomic_bomb(&self) -> bool {
        self.0 == SYMBOL_BOMB_ATOM
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Grouping used by the uniform-category bonus rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolCategory {
    #[default]
    Coin,
    Gem,
    Bomb,
    Card,
    Random,
}

/// Currency contribution and category of a single symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SymbolValue {
    #[serde(default)]
    pub category: SymbolCategory,
    #[serde(default)]
    pub coin: i64,
    #[serde(default)]
    pub gem: i64,
}

impl SymbolValue {
    #[must_use]
    pub const fn new(category: SymbolCategory, coin: i64, gem: i64) -> Self {
        Self {
            category,
            coin,
            gem,
        }
    }
}

/// Mapping symbol-id -> value used by the reward engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolValueTable {
    pub symbols: HashMap<SymbolId, SymbolValue>,
}

impl Default for SymbolValueTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SymbolValueTable {
    /// Load a value table from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON string cannot be parsed.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Embedded asset table, falling back to the coded table if the asset is unreadable.
    #[must_use]
    pub fn default_config() -> Self {
        Self::from_json(include_str!(
            "../../reelrig-web/static/assets/data/symbol-values.json"
        ))
        .unwrap_or_else(|err| {
            log::warn!("symbol value asset unreadable, using built-in table: {err}");
            Self::builtin()
        })
    }

    /// Coded fallback table.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = [
            (SYMBOL_COIN, SymbolValue::new(SymbolCategory::Coin, 5, 0)),
            (SYMBOL_COIN_STACK, SymbolValue::new(SymbolCategory::Coin, 15, 0)),
            (SYMBOL_COIN_PILE, SymbolValue::new(SymbolCategory::Coin, 40, 0)),
            (SYMBOL_GEM, SymbolValue::new(SymbolCategory::Gem, 0, 1)),
            (SYMBOL_GEM_MANY, SymbolValue::new(SymbolCategory::Gem, 0, 3)),
            (SYMBOL_BOMB, SymbolValue::new(SymbolCategory::Bomb, -10, 0)),
            (SYMBOL_BOMB_ATOM, SymbolValue::new(SymbolCategory::Bomb, -30, 0)),
            (SYMBOL_CARD, SymbolValue::new(SymbolCategory::Card, 0, 0)),
            (SYMBOL_RANDOM, SymbolValue::new(SymbolCategory::Random, 0, 0)),
        ];
        Self {
            symbols: entries
                .into_iter()
                .map(|(id, value)| (SymbolId::new(id), value))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, symbol: &SymbolId) -> Option<&SymbolValue> {
        self.symbols.get(symbol)
    }

    /// Category of a symbol; `None` when the table has no entry for it.
    #[must_use]
    pub fn category_of(&self, symbol: &SymbolId) -> Option<SymbolCategory> {
        self.get(symbol).map(|value| value.category)
    }

    /// Insert or replace a symbol's value.
    pub fn insert(&mut self, symbol: SymbolId, value: SymbolValue) {
        self.symbols.insert(symbol, value);
    }
}
