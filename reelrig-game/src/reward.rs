//! Settlement: turn the locked result symbols into a single reward.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{CardEffect, SpinContext};
use crate::constants::{
    BOMB_ATOM_JACKPOT_PAYOUT, BOMB_SAME_CATEGORY_PAYOUT, COIN_IDENTICAL_MULTIPLIER,
    COIN_SAME_CATEGORY_MULTIPLIER, GEM_SAME_CATEGORY_MULTIPLIER, RANDOM_RESOLUTIONS,
};
use crate::numbers::{i64_to_f64, round_f64_to_i64};
use crate::symbols::{SymbolCategory, SymbolId, SymbolValueTable};

/// Outcome of one spin, applied to the wallet in a single step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardResult {
    pub coin_delta: i64,
    pub gem_delta: i64,
    pub grants_card: bool,
    pub forces_restart: bool,
    /// Every result symbol was identical after random resolution.
    pub jackpot: bool,
    /// A shield card absorbed a coin loss.
    pub shielded: bool,
    /// Result symbols with every `random` symbol replaced by its resolution.
    pub resolved: Vec<SymbolId>,
}

/// Evaluate one row of result symbols against the active cards.
///
/// `random` symbols are resolved first with `rng`; everything after that is
/// deterministic.
pub fn evaluate<R: Rng + ?Sized>(
    symbols: &[SymbolId],
    ctx: &SpinContext,
    values: &SymbolValueTable,
    rng: &mut R,
) -> RewardResult {
    let resolved = resolve_random(symbols, values, rng);
    let mut result = RewardResult {
        jackpot: all_identical(&resolved),
        ..RewardResult::default()
    };

    let mut coin = 0_i64;
    let mut gem = 0_i64;
    for symbol in &resolved {
        let Some(value) = values.get(symbol) else {
            continue;
        };
        if value.category == SymbolCategory::Card {
            result.grants_card = true;
            continue;
        }
        coin = coin.saturating_add(value.coin);
        gem = gem.saturating_add(value.gem);
    }

    if let Some(category) = uniform_category(&resolved, values) {
        match category {
            SymbolCategory::Coin => {
                let factor = if result.jackpot {
                    COIN_IDENTICAL_MULTIPLIER
                } else {
                    COIN_SAME_CATEGORY_MULTIPLIER
                };
                coin = coin.saturating_mul(factor);
            }
            SymbolCategory::Gem => {
                gem = gem.saturating_mul(GEM_SAME_CATEGORY_MULTIPLIER);
            }
            SymbolCategory::Bomb => {
                coin = if result.jackpot && resolved.first().is_some_and(SymbolId::is_atomic_bomb)
                {
                    BOMB_ATOM_JACKPOT_PAYOUT
                } else {
                    BOMB_SAME_CATEGORY_PAYOUT
                };
                gem = 0;
            }
            SymbolCategory::Card => result.forces_restart = true,
            SymbolCategory::Random => {}
        }
    }

    if result.forces_restart {
        coin = 0;
        gem = 0;
    } else {
        for _ in 0..ctx.count(CardEffect::Double) {
            coin = coin.saturating_mul(2);
            gem = gem.saturating_mul(2);
        }
        let scale = bet_scale(ctx.bet, ctx.base_bet);
        coin = round_f64_to_i64(i64_to_f64(coin) * scale);
        gem = round_f64_to_i64(i64_to_f64(gem) * scale);
        if coin < 0 && ctx.has(CardEffect::Shield) {
            coin = 0;
            result.shielded = true;
        }
    }
    if ctx.has(CardEffect::Cashout) {
        coin = coin.saturating_add(ctx.bet);
    }

    result.coin_delta = coin;
    result.gem_delta = gem;
    result.resolved = resolved;
    result
}

fn bet_scale(bet: i64, base_bet: i64) -> f64 {
    if base_bet <= 0 {
        return 1.0;
    }
    i64_to_f64(bet) / i64_to_f64(base_bet)
}

/// Replace every `random` category symbol with a uniform pick from the fixed
/// resolution list. Each one resolves independently.
fn resolve_random<R: Rng + ?Sized>(
    symbols: &[SymbolId],
    values: &SymbolValueTable,
    rng: &mut R,
) -> Vec<SymbolId> {
    symbols
        .iter()
        .map(|symbol| {
            if values.category_of(symbol) == Some(SymbolCategory::Random) {
                let pick = RANDOM_RESOLUTIONS[rng.gen_range(0..RANDOM_RESOLUTIONS.len())];
                log::debug!("random symbol resolved to {pick}");
                SymbolId::new(pick)
            } else {
                symbol.clone()
            }
        })
        .collect()
}

fn all_identical(symbols: &[SymbolId]) -> bool {
    symbols
        .split_first()
        .is_some_and(|(first, rest)| rest.iter().all(|symbol| symbol == first))
}

/// Shared category of the row; a symbol missing from the table shares none.
fn uniform_category(symbols: &[SymbolId], values: &SymbolValueTable) -> Option<SymbolCategory> {
    let (first, rest) = symbols.split_first()?;
    let category = values.category_of(first)?;
    rest.iter()
        .all(|symbol| values.category_of(symbol) == Some(category))
        .then_some(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCatalog, CardId, Inventory};
    use crate::config::MachineConfig;
    use rand::rngs::mock::StepRng;

    fn row(raw: &[&str]) -> Vec<SymbolId> {
        raw.iter().map(|s| SymbolId::new(s)).collect()
    }

    fn ctx_with(cards: &[&str], bet: i64) -> SpinContext {
        let mut inventory = Inventory::with_cards(cards.iter().map(|c| CardId::new(c)));
        for index in 0..inventory.len() {
            inventory.toggle(index);
        }
        let cfg = MachineConfig {
            bet,
            ..MachineConfig::default()
        };
        SpinContext::from_selection(&inventory, &CardCatalog::builtin(), &cfg)
    }

    fn settle(symbols: &[&str], cards: &[&str]) -> RewardResult {
        settle_with_bet(symbols, cards, 10)
    }

    fn settle_with_bet(symbols: &[&str], cards: &[&str], bet: i64) -> RewardResult {
        let mut rng = StepRng::new(0, 0);
        evaluate(
            &row(symbols),
            &ctx_with(cards, bet),
            &SymbolValueTable::builtin(),
            &mut rng,
        )
    }

    #[test]
    fn identical_coins_triple() {
        let result = settle(&["coin_1", "coin_1", "coin_1"], &[]);
        assert_eq!(result.coin_delta, 45);
        assert!(result.jackpot);
    }

    #[test]
    fn mixed_coins_double() {
        let result = settle(&["coin_1", "coin_stack", "coin_pile"], &[]);
        assert_eq!(result.coin_delta, 120);
        assert!(!result.jackpot);
    }

    #[test]
    fn gems_triple_gem_total_only() {
        let result = settle(&["gem_1", "gem_many", "gem_1"], &[]);
        assert_eq!(result.gem_delta, 15);
        assert_eq!(result.coin_delta, 0);
    }

    #[test]
    fn atomic_bomb_row_pays_jackpot() {
        let result = settle(&["bomb_atom", "bomb_atom", "bomb_atom"], &[]);
        assert_eq!(result.coin_delta, 888);
        assert!(result.jackpot);
    }

    #[test]
    fn bomb_rows_pay_flat_twenty() {
        assert_eq!(settle(&["bomb_1", "bomb_1", "bomb_1"], &[]).coin_delta, 20);
        assert_eq!(settle(&["bomb_1", "bomb_atom", "bomb_1"], &[]).coin_delta, 20);
    }

    #[test]
    fn mixed_row_sums_raw_values() {
        let result = settle(&["coin_1", "bomb_1", "gem_1"], &[]);
        assert_eq!(result.coin_delta, -5);
        assert_eq!(result.gem_delta, 1);
        assert!(!result.shielded);
    }

    #[test]
    fn shield_zeroes_a_loss() {
        let result = settle(&["coin_1", "bomb_atom", "gem_1"], &["shield_card"]);
        assert_eq!(result.coin_delta, 0);
        assert_eq!(result.gem_delta, 1);
        assert!(result.shielded);
        let gain = settle(&["coin_1", "coin_1", "coin_1"], &["shield_card"]);
        assert_eq!(gain.coin_delta, 45);
        assert!(!gain.shielded);
    }

    #[test]
    fn shield_leaves_doubled_gems_alone() {
        let result = settle(&["bomb_atom", "gem_many", "gem_1"], &["shield_card", "double_card"]);
        assert!(result.shielded);
        assert_eq!(result.coin_delta, 0);
        assert_eq!(result.gem_delta, 8);
    }

    #[test]
    fn double_cards_stack_multiplicatively() {
        let one = settle(&["coin_1", "coin_1", "coin_1"], &["double_card"]);
        assert_eq!(one.coin_delta, 90);
        let two = settle(&["coin_1", "coin_1", "coin_1"], &["double_card", "double_card"]);
        assert_eq!(two.coin_delta, 180);
    }

    #[test]
    fn bet_scales_totals() {
        let result = settle_with_bet(&["coin_1", "coin_1", "coin_1"], &[], 25);
        // 45 * 2.5 = 112.5 rounds away from zero.
        assert_eq!(result.coin_delta, 113);
    }

    #[test]
    fn card_symbol_grants_a_card() {
        let result = settle(&["coin_1", "card_item", "coin_1"], &[]);
        assert!(result.grants_card);
        assert!(!result.forces_restart);
        assert_eq!(result.coin_delta, 10);
    }

    #[test]
    fn all_cards_force_restart_but_keep_cashout() {
        let result = settle(&["card_item", "card_item", "card_item"], &["double_card", "cashout_card"]);
        assert!(result.forces_restart);
        assert!(result.grants_card);
        assert_eq!(result.coin_delta, 10);
        assert_eq!(result.gem_delta, 0);
    }

    #[test]
    fn cashout_refunds_bet_on_top() {
        let result = settle(&["coin_1", "bomb_1", "gem_1"], &["cashout_card"]);
        assert_eq!(result.coin_delta, 5);
    }

    #[test]
    fn random_symbols_resolve_before_scoring() {
        // A zero roll picks the first resolution, coin_1.
        let result = settle(&["random_item", "coin_1", "random_item"], &[]);
        assert_eq!(result.resolved, row(&["coin_1", "coin_1", "coin_1"]));
        assert!(result.jackpot);
        assert_eq!(result.coin_delta, 45);
    }

    #[test]
    fn unknown_symbols_break_the_category_bonus() {
        let result = settle(&["mystery", "coin_1", "coin_1"], &[]);
        assert_eq!(result.coin_delta, 10);
        assert_eq!(result.gem_delta, 0);
        let all_unknown = settle(&["mystery", "mystery", "mystery"], &[]);
        assert_eq!(all_unknown.coin_delta, 0);
        assert!(all_unknown.jackpot);
    }

    #[test]
    fn empty_row_is_neutral() {
        let result = settle(&[], &[]);
        assert_eq!(result, RewardResult::default());
    }
}
