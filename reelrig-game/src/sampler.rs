//! Weighted symbol sampling and strip rigging.
use rand::Rng;

use crate::constants::MIN_STRIP_LENGTH;
use crate::symbols::SymbolId;
use crate::weights::SymbolWeightTable;

/// Ordered sequence of symbols assigned to one reel for the current spin.
pub type ReelStrip = Vec<SymbolId>;

/// Weighted random selection over a float-weighted population.
///
/// Draws a uniform roll in `[0, total)` and walks the options in order,
/// consuming each weight until the roll falls inside one. Options with a
/// weight of zero or below are never selected. Returns `None` when no option
/// carries positive weight.
pub fn weighted_pick<'a, T, R>(options: &'a [(T, f64)], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    let total: f64 = options
        .iter()
        .map(|(_, weight)| *weight)
        .filter(|weight| *weight > 0.0)
        .sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }

    let mut remainder = rng.r#gen::<f64>() * total;
    let mut last_positive = None;
    for (item, weight) in options {
        if *weight <= 0.0 {
            continue;
        }
        if remainder < *weight {
            return Some(item);
        }
        remainder -= weight;
        last_positive = Some(item);
    }
    // Floating-point drift can exhaust the walk; the last live entry absorbs it.
    last_positive
}

/// Draw one symbol from the table.
///
/// A table without positive weight is replaced by the default table.
pub fn sample<R: Rng + ?Sized>(table: &SymbolWeightTable, rng: &mut R) -> SymbolId {
    if let Some(symbol) = weighted_pick(table.entries(), rng) {
        return symbol.clone();
    }
    let fallback = SymbolWeightTable::default();
    weighted_pick(fallback.entries(), rng)
        .cloned()
        .unwrap_or_else(|| SymbolId::new(crate::constants::SYMBOL_COIN))
}

/// Draw `count` independent symbols, with replacement.
pub fn sample_many<R: Rng + ?Sized>(
    table: &SymbolWeightTable,
    count: usize,
    rng: &mut R,
) -> ReelStrip {
    (0..count).map(|_| sample(table, rng)).collect()
}

/// Overwrite strip positions so every bias symbol appears at least once.
///
/// Each bias symbol, in order, replaces one uniformly-chosen position whose
/// current symbol is not any of the requested bias symbols. When no such
/// position is left the remaining bias symbols are dropped silently.
pub fn inject_bias<R: Rng + ?Sized>(strip: &mut [SymbolId], bias: &[SymbolId], rng: &mut R) {
    for bias_symbol in bias {
        let available: Vec<usize> = strip
            .iter()
            .enumerate()
            .filter(|(_, symbol)| !bias.contains(symbol))
            .map(|(idx, _)| idx)
            .collect();
        if available.is_empty() {
            log::debug!("no free position left for bias symbol {bias_symbol}");
            continue;
        }
        let idx = available[rng.gen_range(0..available.len())];
        strip[idx] = bias_symbol.clone();
    }
}

/// Produce a fresh strip: bomb-scaled weights, i.i.d. draws, then rigging.
pub fn generate_strip<R: Rng + ?Sized>(
    table: &SymbolWeightTable,
    length: usize,
    bias: &[SymbolId],
    bomb_multiplier: f64,
    rng: &mut R,
) -> ReelStrip {
    let weights = table.with_bomb_multiplier(bomb_multiplier);
    let mut strip = sample_many(&weights, length.max(MIN_STRIP_LENGTH), rng);
    if !bias.is_empty() {
        inject_bias(&mut strip, bias, rng);
    }
    strip
}
