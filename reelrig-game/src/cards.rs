//! Buff cards: definitions, the card catalog, inventory and spin context.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use crate::config::MachineConfig;
use crate::constants::UNKNOWN_CARD_NAME;
use crate::sampler::weighted_pick;

/// Effect tags a card may carry. Most cards carry exactly one.
pub type CardEffects = SmallVec<[CardEffect; 2]>;

/// Mechanical effect of an active card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardEffect {
    /// Spin the reels slower this round.
    Slow,
    /// Double the round's reward, stacking per card.
    Double,
    /// Zero out a net coin loss.
    Shield,
    /// Refund the bet on top of the reward.
    Cashout,
    /// Exit mid-spin settles immediately instead of aborting.
    Escape,
    /// Scale bomb weights up for this spin.
    #[serde(alias = "bomb-boost")]
    BombBoost,
}

/// Identifier of a card definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static description of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Relative draw weight.
    #[serde(default)]
    pub probability: f64,
    #[serde(default)]
    pub effects: CardEffects,
}

impl CardDefinition {
    /// Neutral stand-in for ids missing from the catalog.
    #[must_use]
    pub fn unknown(id: &CardId) -> Self {
        Self {
            id: id.clone(),
            name: UNKNOWN_CARD_NAME.to_string(),
            description: String::new(),
            probability: 0.0,
            effects: CardEffects::new(),
        }
    }

    #[must_use]
    pub fn has_effect(&self, effect: CardEffect) -> bool {
        self.effects.contains(&effect)
    }
}

/// All card definitions known to a session, in draw-walk order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardCatalog {
    pub cards: Vec<CardDefinition>,
}

impl Default for CardCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CardCatalog {
    /// Load a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON string cannot be parsed.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Embedded asset catalog, falling back to the coded catalog.
    #[must_use]
    pub fn default_config() -> Self {
        Self::from_json(include_str!("../../reelrig-web/static/assets/data/cards.json"))
            .unwrap_or_else(|err| {
                log::warn!("card asset unreadable, using built-in catalog: {err}");
                Self::builtin()
            })
    }

    /// Coded fallback catalog, one card per effect.
    #[must_use]
    pub fn builtin() -> Self {
        let card = |id: &str, name: &str, description: &str, probability: f64, effect| {
            CardDefinition {
                id: CardId::new(id),
                name: name.to_string(),
                description: description.to_string(),
                probability,
                effects: smallvec::smallvec![effect],
            }
        };
        Self {
            cards: vec![
                card("slow_card", "Slow Motion", "Reels spin at half speed.", 25.0, CardEffect::Slow),
                card("double_card", "Double Up", "Doubles this spin's reward.", 20.0, CardEffect::Double),
                card("shield_card", "Shield", "Blocks a coin loss.", 20.0, CardEffect::Shield),
                card("cashout_card", "Cashout", "Refunds the bet.", 15.0, CardEffect::Cashout),
                card("escape_card", "Escape", "Exit settles the spin at once.", 10.0, CardEffect::Escape),
                card("bomb_card", "Bomb Boost", "More bombs on the reels.", 10.0, CardEffect::BombBoost),
            ],
        }
    }

    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&CardDefinition> {
        self.cards.iter().find(|card| &card.id == id)
    }

    /// Definition for `id`, or the neutral unknown card.
    #[must_use]
    pub fn resolve(&self, id: &CardId) -> CardDefinition {
        self.get(id)
            .cloned()
            .unwrap_or_else(|| CardDefinition::unknown(id))
    }

    /// Weighted draw over card probabilities.
    pub fn draw_card<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<CardId> {
        let options: Vec<(&CardId, f64)> = self
            .cards
            .iter()
            .map(|card| (&card.id, card.probability))
            .collect();
        weighted_pick(&options, rng).map(|id| (*id).clone())
    }
}

/// Cards held by the player and which of them are selected for the next spin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    cards: Vec<CardId>,
    selected: BTreeSet<usize>,
}

impl Inventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cards<I: IntoIterator<Item = CardId>>(cards: I) -> Self {
        Self {
            cards: cards.into_iter().collect(),
            selected: BTreeSet::new(),
        }
    }

    pub fn add(&mut self, card: CardId) {
        self.cards.push(card);
    }

    #[must_use]
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Flip the selection of the card at `index`.
    ///
    /// Returns the new selection state; out-of-range indices are ignored and
    /// report `false`.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.cards.len() {
            return false;
        }
        if self.selected.remove(&index) {
            false
        } else {
            self.selected.insert(index);
            true
        }
    }

    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected indices in ascending order.
    #[must_use]
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Remove the cards at `indices`, highest index first so earlier removals
    /// never shift later ones. Unknown indices are skipped. Clears the selection.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Vec<CardId> {
        let mut ordered: Vec<usize> = indices.to_vec();
        ordered.sort_unstable_by(|a, b| b.cmp(a));
        ordered.dedup();
        let mut removed = Vec::new();
        for index in ordered {
            if index < self.cards.len() {
                removed.push(self.cards.remove(index));
            }
        }
        self.selected.clear();
        removed
    }
}

/// A selected card resolved against the catalog at spin start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCard {
    /// Inventory index the card occupied when the spin started.
    pub index: usize,
    pub card: CardDefinition,
}

/// Per-spin parameters derived from the selected cards and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinContext {
    pub active: Vec<ActiveCard>,
    pub bomb_multiplier: f64,
    pub speed_multiplier: f64,
    pub bet: i64,
    pub base_bet: i64,
    pub reel_count: usize,
    /// Free re-spins charge no bet and carry no cards.
    #[serde(default)]
    pub free: bool,
}

impl SpinContext {
    /// Resolve the inventory selection into an active card set.
    #[must_use]
    pub fn from_selection(inventory: &Inventory, catalog: &CardCatalog, cfg: &MachineConfig) -> Self {
        let active: Vec<ActiveCard> = inventory
            .selected_indices()
            .into_iter()
            .filter_map(|index| {
                inventory.cards().get(index).map(|id| ActiveCard {
                    index,
                    card: catalog.resolve(id),
                })
            })
            .collect();
        let mut ctx = Self {
            active,
            bomb_multiplier: 1.0,
            speed_multiplier: 1.0,
            bet: cfg.bet,
            base_bet: cfg.base_bet,
            reel_count: cfg.reel_count,
            free: false,
        };
        for _ in 0..ctx.count(CardEffect::BombBoost) {
            ctx.bomb_multiplier *= cfg.bomb_boost_multiplier;
        }
        for _ in 0..ctx.count(CardEffect::Slow) {
            ctx.speed_multiplier *= cfg.slow_speed_factor;
        }
        ctx
    }

    /// Context for a free re-spin: no bet, no cards.
    #[must_use]
    pub const fn free_spin(cfg: &MachineConfig) -> Self {
        Self {
            active: Vec::new(),
            bomb_multiplier: 1.0,
            speed_multiplier: 1.0,
            bet: cfg.bet,
            base_bet: cfg.base_bet,
            reel_count: cfg.reel_count,
            free: true,
        }
    }

    /// Number of active cards carrying `effect`.
    #[must_use]
    pub fn count(&self, effect: CardEffect) -> usize {
        self.active
            .iter()
            .filter(|active| active.card.has_effect(effect))
            .count()
    }

    #[must_use]
    pub fn has(&self, effect: CardEffect) -> bool {
        self.count(effect) > 0
    }

    /// Inventory indices of the active cards.
    #[must_use]
    pub fn card_indices(&self) -> Vec<usize> {
        self.active.iter().map(|active| active.index).collect()
    }
}
