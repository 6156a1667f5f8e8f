//! Query-string strip requests for hosts that serve strips over HTTP.
use rand::Rng;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::config::MachineConfig;
use crate::constants::DEFAULT_REEL_COUNT;
use crate::sampler::{ReelStrip, generate_strip};
use crate::symbols::SymbolId;
use crate::weights::{SymbolWeightTable, sanitize_bomb_multiplier};

/// Request for a single rigged strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripRequest {
    #[serde(default)]
    pub bias_symbols: Vec<SymbolId>,
    #[serde(default = "default_multiplier")]
    pub bomb_multiplier: f64,
}

impl Default for StripRequest {
    fn default() -> Self {
        Self {
            bias_symbols: Vec::new(),
            bomb_multiplier: 1.0,
        }
    }
}

impl StripRequest {
    /// Parse `bias_symbols=a,b&bomb_multiplier=2`.
    ///
    /// Bias entries are trimmed and empty ones dropped; an unparsable
    /// multiplier falls back to 1.0.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut request = Self::default();
        for (key, value) in query_pairs(query) {
            match key.as_str() {
                "bias_symbols" => {
                    request.bias_symbols = value
                        .split(',')
                        .map(str::trim)
                        .filter(|symbol| !symbol.is_empty())
                        .map(SymbolId::new)
                        .collect();
                }
                "bomb_multiplier" => request.bomb_multiplier = parse_multiplier(&value),
                _ => {}
            }
        }
        request
    }
}

/// Request for a fresh, unbiased set of strips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitRequest {
    #[serde(default = "default_reel_count")]
    pub reel_count: usize,
    #[serde(default = "default_multiplier")]
    pub bomb_multiplier: f64,
}

impl Default for InitRequest {
    fn default() -> Self {
        Self {
            reel_count: DEFAULT_REEL_COUNT,
            bomb_multiplier: 1.0,
        }
    }
}

impl InitRequest {
    /// Parse `reel_count=3&bomb_multiplier=1.5`.
    ///
    /// An unparsable or zero reel count falls back to the default; counts
    /// above the machine maximum are clamped.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut request = Self::default();
        for (key, value) in query_pairs(query) {
            match key.as_str() {
                "reel_count" => {
                    request.reel_count = value
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .filter(|count| *count > 0)
                        .map_or(DEFAULT_REEL_COUNT, |count| count.min(MachineConfig::MAX_REELS));
                }
                "bomb_multiplier" => request.bomb_multiplier = parse_multiplier(&value),
                _ => {}
            }
        }
        request
    }
}

/// Response body carrying one strip, serialized as `{"strip": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelResponse {
    pub strip: ReelStrip,
}

/// Response body carrying the initial strips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    pub reels: Vec<ReelStrip>,
}

/// Fresh unbiased strips, one per reel.
pub fn init_reels<R: Rng + ?Sized>(
    request: &InitRequest,
    table: &SymbolWeightTable,
    strip_length: usize,
    rng: &mut R,
) -> InitResponse {
    let reels = (0..request.reel_count)
        .map(|_| generate_strip(table, strip_length, &[], request.bomb_multiplier, rng))
        .collect();
    InitResponse { reels }
}

/// One strip rigged towards the request's bias symbols.
pub fn generate_reel<R: Rng + ?Sized>(
    request: &StripRequest,
    table: &SymbolWeightTable,
    strip_length: usize,
    rng: &mut R,
) -> ReelResponse {
    ReelResponse {
        strip: generate_strip(
            table,
            strip_length,
            &request.bias_symbols,
            request.bomb_multiplier,
            rng,
        ),
    }
}

const fn default_multiplier() -> f64 {
    1.0
}

const fn default_reel_count() -> usize {
    DEFAULT_REEL_COUNT
}

fn parse_multiplier(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .map_or(1.0, sanitize_bomb_multiplier)
}

fn query_pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn strip_request_trims_bias_and_drops_empties() {
        let request = StripRequest::from_query("bias_symbols=coin_1,%20gem_1,,+bomb_1&bomb_multiplier=2.5");
        let bias: Vec<&str> = request.bias_symbols.iter().map(SymbolId::as_str).collect();
        assert_eq!(bias, vec!["coin_1", "gem_1", "bomb_1"]);
        assert!((request.bomb_multiplier - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_multiplier_falls_back_to_one() {
        for query in ["bomb_multiplier=abc", "bomb_multiplier=-3", "bomb_multiplier=NaN", ""] {
            let request = StripRequest::from_query(query);
            assert!((request.bomb_multiplier - 1.0).abs() < f64::EPSILON, "{query}");
        }
        let zero = StripRequest::from_query("bomb_multiplier=0");
        assert!(zero.bomb_multiplier.abs() < f64::EPSILON);
    }

    #[test]
    fn init_request_reel_count_falls_back_to_three() {
        assert_eq!(InitRequest::from_query("reel_count=five").reel_count, 3);
        assert_eq!(InitRequest::from_query("reel_count=0").reel_count, 3);
        assert_eq!(InitRequest::from_query("?reel_count=5").reel_count, 5);
        assert_eq!(InitRequest::from_query("reel_count=400").reel_count, MachineConfig::MAX_REELS);
    }

    #[test]
    fn init_reels_returns_one_strip_per_reel() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let request = InitRequest::from_query("reel_count=4");
        let response = init_reels(&request, &SymbolWeightTable::default(), 6, &mut rng);
        assert_eq!(response.reels.len(), 4);
        assert!(response.reels.iter().all(|strip| strip.len() == 6));
        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json["reels"].is_array());
    }

    #[test]
    fn generate_reel_includes_every_bias_symbol() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let request = StripRequest::from_query("bias_symbols=gem_many,bomb_atom");
        let response = generate_reel(&request, &SymbolWeightTable::default(), 6, &mut rng);
        for symbol in &request.bias_symbols {
            assert!(response.strip.contains(symbol));
        }
        let json = serde_json::to_value(&response).expect("serialize");
        let keys: Vec<&String> = json.as_object().expect("object").keys().collect();
        assert_eq!(keys, vec!["strip"]);
        assert_eq!(json["strip"].as_array().map(Vec::len), Some(6));
    }

    #[test]
    fn query_values_are_form_decoded() {
        let request = StripRequest::from_query("bias_symbols=coin_1%2Cgem_1&bomb_multiplier=%32");
        let bias: Vec<&str> = request.bias_symbols.iter().map(SymbolId::as_str).collect();
        assert_eq!(bias, vec!["coin_1", "gem_1"]);
        assert!((request.bomb_multiplier - 2.0).abs() < f64::EPSILON);
        let init = InitRequest::from_query("reel_count=4&reel_count=%zz");
        assert_eq!(init.reel_count, 3);
    }
}
