//! Re-rigging of the reels that are still spinning.
//!
//! Each time reel `i` locks, reel `i + 1` gets a fresh strip biased towards
//! the symbols already showing. Requests are tickets carrying a per-reel
//! generation; only the newest ticket for a reel may replace its strip.
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::MIN_STRIP_LENGTH;
use crate::reel::Reel;
use crate::sampler::{ReelStrip, generate_strip};
use crate::symbols::SymbolId;
use crate::weights::SymbolWeightTable;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RigError {
    #[error("reel {reel} does not exist")]
    UnknownReel { reel: usize },
    #[error("generated strip has {len} symbols, need at least {min}")]
    ShortStrip { len: usize, min: usize },
    #[error("strip source failed: {0}")]
    Source(String),
}

/// Handle for one outstanding rig request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RigTicket {
    pub reel: usize,
    pub generation: u64,
}

/// Parameters of a rig request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigRequest {
    pub ticket: RigTicket,
    /// Result symbols of every locked reel so far, in reel order.
    pub bias: Vec<SymbolId>,
    pub bomb_multiplier: f64,
}

/// Produces strips for rig requests.
pub trait StripSource {
    /// Generate the replacement strip for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`RigError`] if no strip can be produced.
    fn generate(&self, request: &RigRequest, rng: &mut dyn RngCore) -> Result<ReelStrip, RigError>;
}

/// In-process strip source backed by a weight table.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalStripSource {
    pub weights: SymbolWeightTable,
    pub strip_length: usize,
}

impl LocalStripSource {
    #[must_use]
    pub const fn new(weights: SymbolWeightTable, strip_length: usize) -> Self {
        Self {
            weights,
            strip_length,
        }
    }
}

impl StripSource for LocalStripSource {
    fn generate(&self, request: &RigRequest, rng: &mut dyn RngCore) -> Result<ReelStrip, RigError> {
        Ok(generate_strip(
            &self.weights,
            self.strip_length,
            &request.bias,
            request.bomb_multiplier,
            rng,
        ))
    }
}

/// What became of a completed rig request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RigCompletion {
    Applied,
    /// A newer request for the same reel was issued.
    Stale,
    /// The target reel locked before the strip arrived.
    AlreadyLocked,
    Failed(RigError),
}

#[derive(Debug, Clone)]
struct PendingRig {
    request: RigRequest,
    ticks_left: u32,
}

/// Tracks rig tickets and their simulated latency.
#[derive(Debug, Clone, Default)]
pub struct RigSequencer {
    generations: Vec<u64>,
    pending: Vec<PendingRig>,
    latency_ticks: u32,
}

impl RigSequencer {
    #[must_use]
    pub fn new(reel_count: usize, latency_ticks: u32) -> Self {
        Self {
            generations: vec![0; reel_count],
            pending: Vec::new(),
            latency_ticks,
        }
    }

    /// Build the request that follows a lock of reel `locked`.
    ///
    /// Returns `None` for the last reel. `bias` holds the result symbols of
    /// reels `0..=locked`.
    pub fn on_lock(
        &mut self,
        locked: usize,
        bias: Vec<SymbolId>,
        bomb_multiplier: f64,
    ) -> Option<RigTicket> {
        let next = locked + 1;
        if next >= self.generations.len() {
            return None;
        }
        Some(self.request(next, bias, bomb_multiplier))
    }

    /// Issue a request for `reel`, superseding any earlier one.
    pub fn request(&mut self, reel: usize, bias: Vec<SymbolId>, bomb_multiplier: f64) -> RigTicket {
        if reel >= self.generations.len() {
            self.generations.resize(reel + 1, 0);
        }
        self.generations[reel] += 1;
        let ticket = RigTicket {
            reel,
            generation: self.generations[reel],
        };
        log::debug!(
            "rig request for reel {reel} (generation {}) with bias {:?}",
            ticket.generation,
            bias.iter().map(SymbolId::as_str).collect::<Vec<_>>()
        );
        self.pending.push(PendingRig {
            request: RigRequest {
                ticket,
                bias,
                bomb_multiplier,
            },
            ticks_left: self.latency_ticks,
        });
        ticket
    }

    #[must_use]
    pub fn is_current(&self, ticket: RigTicket) -> bool {
        self.generations.get(ticket.reel) == Some(&ticket.generation)
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Advance one tick and hand back every request whose latency elapsed.
    ///
    /// A request issued with latency `L` is returned by the `L`-th poll after
    /// it was made; with zero latency the next poll returns it.
    pub fn poll(&mut self) -> Vec<RigRequest> {
        let mut ready = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for mut pending in self.pending.drain(..) {
            pending.ticks_left = pending.ticks_left.saturating_sub(1);
            if pending.ticks_left == 0 {
                ready.push(pending.request);
            } else {
                waiting.push(pending);
            }
        }
        self.pending = waiting;
        ready
    }

    /// Apply a finished request to its reel, discarding stale or late results.
    pub fn complete(
        &self,
        ticket: RigTicket,
        outcome: Result<ReelStrip, RigError>,
        reel: &mut Reel,
    ) -> RigCompletion {
        if !self.is_current(ticket) {
            log::debug!("discarding stale rig result for reel {}", ticket.reel);
            return RigCompletion::Stale;
        }
        if reel.is_locked() {
            log::debug!("reel {} locked before its rig result arrived", ticket.reel);
            return RigCompletion::AlreadyLocked;
        }
        let strip = match outcome.and_then(|strip| {
            if strip.len() < MIN_STRIP_LENGTH {
                Err(RigError::ShortStrip {
                    len: strip.len(),
                    min: MIN_STRIP_LENGTH,
                })
            } else {
                Ok(strip)
            }
        }) {
            Ok(strip) => strip,
            Err(err) => {
                log::warn!("rig for reel {} failed, keeping current strip: {err}", ticket.reel);
                return RigCompletion::Failed(err);
            }
        };
        reel.set_strip(strip);
        RigCompletion::Applied
    }

    /// Drop every outstanding request and invalidate issued tickets.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        for generation in &mut self.generations {
            *generation += 1;
        }
    }
}
