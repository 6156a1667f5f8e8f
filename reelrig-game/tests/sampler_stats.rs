use rand::SeedableRng;
use rand::rngs::SmallRng;
use reelrig_game::{SymbolId, SymbolWeightTable, generate_strip, sample};
use std::collections::HashMap;

const SAMPLE_SIZE: usize = 20_000;
const TOLERANCE: f64 = 0.02;

fn frequencies(table: &SymbolWeightTable, seed: u64) -> HashMap<SymbolId, usize> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut counts = HashMap::new();
    for _ in 0..SAMPLE_SIZE {
        *counts.entry(sample(table, &mut rng)).or_insert(0) += 1;
    }
    counts
}

fn share(count: usize) -> f64 {
    let count = u32::try_from(count).expect("count fits");
    let total = u32::try_from(SAMPLE_SIZE).expect("sample size fits");
    f64::from(count) / f64::from(total)
}

#[test]
fn draws_track_configured_weights() {
    let table = SymbolWeightTable::default();
    let counts = frequencies(&table, 0x5107);
    let total = table.total_weight();
    for (symbol, weight) in table.entries() {
        let observed = share(counts.get(symbol).copied().unwrap_or(0));
        let expected = weight / total;
        assert!(
            (observed - expected).abs() <= TOLERANCE,
            "{symbol} drifted: observed {observed:.4}, expected {expected:.4}"
        );
    }
}

#[test]
fn zero_weight_symbols_never_appear() {
    let table = SymbolWeightTable::from_entries([("A", 0.0), ("B", 3.0), ("C", 0.0), ("D", 1.0)]);
    let counts = frequencies(&table, 99);
    assert!(!counts.contains_key(&SymbolId::new("A")));
    assert!(!counts.contains_key(&SymbolId::new("C")));
    assert!((share(counts[&SymbolId::new("B")]) - 0.75).abs() <= TOLERANCE);
}

#[test]
fn bomb_boost_raises_bomb_share() {
    let table = SymbolWeightTable::default();
    let mut rng = SmallRng::seed_from_u64(3);
    let count_bombs = |multiplier: f64, rng: &mut SmallRng| -> usize {
        (0..2_000)
            .flat_map(|_| generate_strip(&table, 6, &[], multiplier, rng))
            .filter(SymbolId::is_bomb)
            .count()
    };
    let plain = count_bombs(1.0, &mut rng);
    let boosted = count_bombs(3.0, &mut rng);
    let none = count_bombs(0.0, &mut rng);
    assert!(boosted > plain, "boosted {boosted} <= plain {plain}");
    assert_eq!(none, 0);
}
