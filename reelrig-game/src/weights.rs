//! Symbol weight tables and the designer override format.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::DEFAULT_WEIGHTS;
use crate::symbols::SymbolId;

/// Ordered symbol -> weight mapping. The order is the sampling walk order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolWeightTable {
    entries: Vec<(SymbolId, f64)>,
}

impl Default for SymbolWeightTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_WEIGHTS
                .iter()
                .map(|(id, weight)| (SymbolId::new(id), *weight))
                .collect(),
        }
    }
}

impl SymbolWeightTable {
    /// Build a table from explicit entries, falling back to the defaults when
    /// the resulting total weight is not positive.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<SymbolId>,
    {
        let mut table = Self {
            entries: Vec::new(),
        };
        for (symbol, weight) in entries {
            table.set(symbol.into(), weight);
        }
        table.or_default()
    }

    /// Merge a `symbol-weights.json` document onto the default table.
    ///
    /// The document shape is `{"symbols": {"<id>": {"probability": w}}}`;
    /// `weight` is accepted in place of `probability`. Entries that are not
    /// objects, whose weight is not numeric, or whose weight is negative are
    /// skipped. Unknown symbols are appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON string cannot be parsed.
    pub fn from_overrides_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let doc: Value = serde_json::from_str(json_str)?;
        Ok(Self::from_overrides(&doc))
    }

    /// Merge an already-parsed override document onto the default table.
    #[must_use]
    pub fn from_overrides(doc: &Value) -> Self {
        let mut merged = Self::default();
        let Some(symbols) = doc.get("symbols").and_then(Value::as_object) else {
            return merged;
        };
        for (symbol, cfg) in symbols {
            let Some(cfg) = cfg.as_object() else {
                continue;
            };
            let raw = cfg.get("probability").or_else(|| cfg.get("weight"));
            let Some(weight) = raw.and_then(parse_weight) else {
                continue;
            };
            if weight < 0.0 {
                continue;
            }
            merged.set(SymbolId::new(symbol), weight);
        }
        merged.or_default()
    }

    /// Embedded asset table, falling back to the defaults if the asset is unreadable.
    #[must_use]
    pub fn default_config() -> Self {
        Self::from_overrides_json(include_str!(
            "../../reelrig-web/static/assets/data/symbol-weights.json"
        ))
        .unwrap_or_else(|err| {
            log::warn!("symbol weight asset unreadable, using defaults: {err}");
            Self::default()
        })
    }

    fn or_default(self) -> Self {
        if self.total_weight() > 0.0 {
            self
        } else {
            log::warn!("symbol weight table has no positive weight, using defaults");
            Self::default()
        }
    }

    /// Insert or overwrite a weight, keeping the original position of known symbols.
    fn set(&mut self, symbol: SymbolId, weight: f64) {
        let weight = if weight.is_finite() { weight } else { 0.0 };
        if let Some(entry) = self.entries.iter_mut().find(|(id, _)| *id == symbol) {
            entry.1 = weight;
        } else {
            self.entries.push((symbol, weight));
        }
    }

    /// Copy of this table with the bomb subset scaled by `multiplier`.
    ///
    /// The multiplier is sanitized first, see [`sanitize_bomb_multiplier`].
    #[must_use]
    pub fn with_bomb_multiplier(&self, multiplier: f64) -> Self {
        let multiplier = sanitize_bomb_multiplier(multiplier);
        let mut scaled = self.clone();
        if (multiplier - 1.0).abs() > f64::EPSILON {
            for (symbol, weight) in &mut scaled.entries {
                if symbol.is_bomb() {
                    *weight *= multiplier;
                }
            }
        }
        scaled
    }

    /// Sum of all positive weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w.max(0.0)).sum()
    }

    #[must_use]
    pub fn weight_of(&self, symbol: &SymbolId) -> Option<f64> {
        self.entries
            .iter()
            .find(|(id, _)| id == symbol)
            .map(|(_, weight)| *weight)
    }

    #[must_use]
    pub fn entries(&self) -> &[(SymbolId, f64)] {
        &self.entries
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolId> {
        self.entries.iter().map(|(id, _)| id)
    }

    #[must_use]
    pub fn contains(&self, symbol: &SymbolId) -> bool {
        self.entries.iter().any(|(id, _)| id == symbol)
    }
}

/// Negative or non-finite multipliers reset to 1.0; zero is kept and excludes bombs.
#[must_use]
pub fn sanitize_bomb_multiplier(multiplier: f64) -> f64 {
    if multiplier.is_finite() && multiplier >= 0.0 {
        multiplier
    } else {
        1.0
    }
}

fn parse_weight(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
    .filter(|weight| weight.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_merge_onto_defaults() {
        let table = SymbolWeightTable::from_overrides_json(
            r#"{"symbols": {
                "coin_1": {"probability": 40},
                "gem_1": {"weight": "2.5"},
                "star": {"probability": 3},
                "bomb_1": {"probability": -4},
                "bomb_atom": {"probability": "lots"},
                "card_item": 12
            }}"#,
        )
        .unwrap();
        assert_eq!(table.weight_of(&"coin_1".into()), Some(40.0));
        assert_eq!(table.weight_of(&"gem_1".into()), Some(2.5));
        assert_eq!(table.weight_of(&"star".into()), Some(3.0));
        assert_eq!(table.weight_of(&"bomb_1".into()), Some(15.0));
        assert_eq!(table.weight_of(&"bomb_atom".into()), Some(5.0));
        assert_eq!(table.weight_of(&"card_item".into()), Some(10.0));
        assert_eq!(table.entries().first().map(|(id, _)| id.as_str()), Some("coin_1"));
        assert_eq!(table.entries().last().map(|(id, _)| id.as_str()), Some("star"));
    }

    #[test]
    fn zeroed_table_falls_back_to_defaults() {
        let mut symbols = serde_json::Map::new();
        for (id, _) in DEFAULT_WEIGHTS {
            symbols.insert(id.to_string(), serde_json::json!({"probability": 0}));
        }
        let doc = serde_json::json!({ "symbols": symbols });
        assert_eq!(SymbolWeightTable::from_overrides(&doc), SymbolWeightTable::default());
    }

    #[test]
    fn missing_symbols_section_keeps_defaults() {
        let table = SymbolWeightTable::from_overrides_json("{}").unwrap();
        assert_eq!(table, SymbolWeightTable::default());
        assert!(SymbolWeightTable::from_overrides_json("not json").is_err());
    }

    #[test]
    fn bomb_multiplier_scales_only_bombs() {
        let base = SymbolWeightTable::default();
        let boosted = base.with_bomb_multiplier(3.0);
        assert_eq!(boosted.weight_of(&"bomb_1".into()), Some(45.0));
        assert_eq!(boosted.weight_of(&"bomb_atom".into()), Some(15.0));
        assert_eq!(boosted.weight_of(&"coin_1".into()), Some(25.0));

        let removed = base.with_bomb_multiplier(0.0);
        assert_eq!(removed.weight_of(&"bomb_1".into()), Some(0.0));
        assert!(removed.contains(&"bomb_1".into()));

        assert_eq!(base.with_bomb_multiplier(-2.0), base);
        assert_eq!(base.with_bomb_multiplier(f64::NAN), base);
    }

    #[test]
    fn from_entries_rejects_empty_weight() {
        let table = SymbolWeightTable::from_entries([("A", 0.0)]);
        assert_eq!(table, SymbolWeightTable::default());
        let single = SymbolWeightTable::from_entries([("A", 100.0)]);
        assert_eq!(single.entries().len(), 1);
        assert!((single.total_weight() - 100.0).abs() < f64::EPSILON);
    }
}
