//! Per-reel motion: constant-velocity spin, spring-damper stop, lock.
//!
//! A reel is advanced one fixed step per call to [`Reel::step`]; there is no
//! wall-clock involved, so tests drive it deterministically.
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::constants::{LOCK_DISPLACEMENT_EPSILON, LOCK_VELOCITY_EPSILON};
use crate::numbers::{usize_to_f64, wrap_slot_index};
use crate::sampler::ReelStrip;
use crate::symbols::SymbolId;

/// Motion phase of a single reel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReelPhase {
    #[default]
    Idle,
    Spinning,
    Stopping,
    Locked,
}

/// Continuous motion state of a reel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelState {
    /// Pixel offset of strip slot 0 from the top of the window.
    pub position: f64,
    pub velocity: f64,
    pub phase: ReelPhase,
    /// Resting position the spring pulls toward while stopping.
    pub target: f64,
    pub strip: ReelStrip,
}

/// One reel of the machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Reel {
    index: usize,
    physics: PhysicsConfig,
    state: ReelState,
}

impl Reel {
    /// Create an idle reel with slot 0 centred in the window.
    #[must_use]
    pub fn new(index: usize, physics: PhysicsConfig, strip: ReelStrip) -> Self {
        let centre = physics.center_offset();
        Self {
            index,
            physics,
            state: ReelState {
                position: centre,
                velocity: 0.0,
                phase: ReelPhase::Idle,
                target: centre,
                strip,
            },
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn state(&self) -> &ReelState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> ReelPhase {
        self.state.phase
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self.state.phase, ReelPhase::Locked)
    }

    #[must_use]
    pub fn strip(&self) -> &[SymbolId] {
        &self.state.strip
    }

    /// Replace the strip in place. Phase, position and velocity are untouched.
    pub fn set_strip(&mut self, strip: ReelStrip) {
        self.state.strip = strip;
    }

    /// Begin spinning at `speed` pixels per step. Valid from idle or locked.
    pub fn start(&mut self, speed: f64) -> bool {
        if !matches!(self.state.phase, ReelPhase::Idle | ReelPhase::Locked) {
            return false;
        }
        self.state.velocity = speed;
        self.state.phase = ReelPhase::Spinning;
        true
    }

    /// Request a stop at the nearest symbol boundary. No-op unless spinning.
    pub fn stop(&mut self) -> bool {
        if self.state.phase != ReelPhase::Spinning {
            return false;
        }
        self.state.target = self.nearest_boundary();
        self.state.phase = ReelPhase::Stopping;
        true
    }

    /// Snap straight to the nearest boundary and lock, skipping the spring.
    ///
    /// Returns `true` when this call performed the lock transition.
    pub fn force_lock(&mut self) -> bool {
        match self.state.phase {
            ReelPhase::Spinning => {
                self.state.target = self.nearest_boundary();
                self.lock();
                true
            }
            ReelPhase::Stopping => {
                self.lock();
                true
            }
            ReelPhase::Idle | ReelPhase::Locked => false,
        }
    }

    /// Return to idle, keeping the current position.
    pub fn reset(&mut self) {
        self.state.phase = ReelPhase::Idle;
        self.state.velocity = 0.0;
        self.state.target = self.state.position;
    }

    /// Advance one simulation step.
    ///
    /// Returns `true` only on the step that caused the lock transition.
    pub fn step(&mut self) -> bool {
        self.wrap();
        match self.state.phase {
            ReelPhase::Idle | ReelPhase::Locked => false,
            ReelPhase::Spinning => {
                self.state.position += self.state.velocity;
                false
            }
            ReelPhase::Stopping => {
                let displacement = self.state.target - self.state.position;
                let force = displacement * (self.physics.tension / 100.0);
                self.state.velocity = (self.state.velocity + force) * self.physics.friction;
                self.state.position += self.state.velocity;

                let remaining = self.state.target - self.state.position;
                if self.state.velocity.abs() < LOCK_VELOCITY_EPSILON
                    && remaining.abs() < LOCK_DISPLACEMENT_EPSILON
                {
                    self.lock();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Symbol currently centred in the window.
    #[must_use]
    pub fn result_symbol(&self) -> Option<&SymbolId> {
        self.symbol_at_row(0.0)
    }

    /// Symbols visible in the window, top to bottom.
    #[must_use]
    pub fn visible_symbols(&self) -> Vec<SymbolId> {
        let rows = (self.physics.visible_height / self.physics.item_height)
            .round()
            .max(1.0);
        let above = ((rows - 1.0) / 2.0).floor();
        let mut out = Vec::new();
        let mut row = -above;
        while row < rows - above {
            if let Some(symbol) = self.symbol_at_row(row) {
                out.push(symbol.clone());
            }
            row += 1.0;
        }
        out
    }

    fn symbol_at_row(&self, row: f64) -> Option<&SymbolId> {
        let len = self.state.strip.len();
        if len == 0 {
            return None;
        }
        let slot = ((self.physics.center_offset() - self.state.position)
            / self.physics.item_height)
            .round()
            + row;
        self.state.strip.get(wrap_slot_index(slot, len))
    }

    fn nearest_boundary(&self) -> f64 {
        let centre = self.physics.center_offset();
        let relative = self.state.position - centre;
        let slot = (-relative / self.physics.item_height).round();
        centre - slot * self.physics.item_height
    }

    fn lock(&mut self) {
        self.state.position = self.state.target;
        self.state.velocity = 0.0;
        self.state.phase = ReelPhase::Locked;
    }

    /// Keep the position within one strip cycle of zero, carrying the target along.
    fn wrap(&mut self) {
        let cycle = usize_to_f64(self.state.strip.len()) * self.physics.item_height;
        if !(cycle > 0.0 && cycle.is_finite() && self.state.position.is_finite()) {
            return;
        }
        while self.state.position > cycle {
            self.state.position -= cycle;
            self.state.target -= cycle;
        }
        while self.state.position < -cycle {
            self.state.position += cycle;
            self.state.target += cycle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(raw: &[&str]) -> ReelStrip {
        raw.iter().map(|s| SymbolId::new(s)).collect()
    }

    fn abcdef() -> ReelStrip {
        strip(&["a", "b", "c", "d", "e", "f"])
    }

    fn run_until_locked(reel: &mut Reel, limit: usize) -> Option<usize> {
        (1..=limit).find(|_| reel.step())
    }

    #[test]
    fn new_reel_centres_first_slot() {
        let reel = Reel::new(0, PhysicsConfig::default(), abcdef());
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert_eq!(reel.result_symbol().map(SymbolId::as_str), Some("a"));
        let window: Vec<_> = reel.visible_symbols().iter().map(|s| s.0.clone()).collect();
        assert_eq!(window, vec!["f", "a", "b"]);
    }

    #[test]
    fn stop_is_noop_unless_spinning() {
        let mut reel = Reel::new(0, PhysicsConfig::default(), abcdef());
        assert!(!reel.stop());
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert!(reel.start(30.0));
        assert!(!reel.start(30.0));
        assert!(reel.stop());
        assert!(!reel.stop());
        assert_eq!(reel.phase(), ReelPhase::Stopping);
    }

    #[test]
    fn stopping_converges_and_lock_fires_once() {
        let mut reel = Reel::new(1, PhysicsConfig::default(), abcdef());
        reel.start(30.0);
        for _ in 0..17 {
            reel.step();
        }
        reel.stop();
        let target = reel.state().target;
        let steps = run_until_locked(&mut reel, 2_000).expect("reel never locked");
        assert!(steps > 1);
        assert!(reel.is_locked());
        assert!(reel.state().velocity.abs() < f64::EPSILON);
        let offset = (reel.state().position - target).abs();
        // Wrapping may have shifted position and target together by whole cycles.
        assert!(offset < f64::EPSILON || (offset % 600.0).abs() < 1e-9);
        assert!(!reel.step());
        assert!(!reel.step());
    }

    #[test]
    fn spring_converges_for_sane_tunings() {
        for tension in [40.0, 80.0, 120.0, 160.0] {
            for friction in [0.5, 0.7, 0.86, 0.9] {
                for displacement in [-49.0, -10.0, 0.3, 25.0, 49.0] {
                    let physics = PhysicsConfig {
                        tension,
                        friction,
                        ..PhysicsConfig::default()
                    };
                    let mut reel = Reel::new(0, physics, abcdef());
                    reel.start(0.0);
                    reel.state.position += displacement;
                    reel.stop();
                    assert!(
                        run_until_locked(&mut reel, 5_000).is_some(),
                        "no lock for tension {tension} friction {friction} displacement {displacement}"
                    );
                }
            }
        }
    }

    #[test]
    fn result_symbol_handles_negative_positions() {
        let mut reel = Reel::new(0, PhysicsConfig::default(), abcdef());
        // One cell down shows the previous slot; far negative wraps forward.
        reel.state.position = reel.physics.center_offset() + 100.0;
        assert_eq!(reel.result_symbol().map(SymbolId::as_str), Some("f"));
        reel.state.position = reel.physics.center_offset() - 700.0;
        assert_eq!(reel.result_symbol().map(SymbolId::as_str), Some("b"));
        reel.state.position = -1_234.0;
        assert!(reel.result_symbol().is_some());
    }

    #[test]
    fn wrapping_preserves_result_and_target_displacement() {
        let mut reel = Reel::new(0, PhysicsConfig::default(), abcdef());
        reel.start(250.0);
        for _ in 0..40 {
            reel.step();
            assert!(reel.state().position <= 600.0 + 250.0);
        }
        reel.stop();
        let before = reel.state().target - reel.state().position;
        let expected = reel.result_symbol().cloned();
        reel.state.position += 600.0;
        reel.state.target += 600.0;
        reel.wrap();
        let after = reel.state().target - reel.state().position;
        assert!((before - after).abs() < 1e-9);
        assert_eq!(reel.result_symbol().cloned(), expected);
    }

    #[test]
    fn locked_symbol_matches_stop_target() {
        let mut reel = Reel::new(0, PhysicsConfig::default(), abcdef());
        reel.start(30.0);
        for _ in 0..5 {
            reel.step();
        }
        // 160 px past the centre rounds to two cells down, slot -2 => "e".
        reel.state.position = reel.physics.center_offset() + 160.0;
        reel.stop();
        run_until_locked(&mut reel, 2_000).expect("lock");
        assert_eq!(reel.result_symbol().map(SymbolId::as_str), Some("e"));
    }

    #[test]
    fn force_lock_snaps_without_animation() {
        let mut reel = Reel::new(0, PhysicsConfig::default(), abcdef());
        assert!(!reel.force_lock());
        reel.start(30.0);
        reel.step();
        assert!(reel.force_lock());
        assert!(reel.is_locked());
        assert!(!reel.force_lock());
        assert!(!reel.step());
    }

    #[test]
    fn set_strip_keeps_motion_state() {
        let mut reel = Reel::new(2, PhysicsConfig::default(), abcdef());
        reel.start(30.0);
        reel.step();
        reel.stop();
        let position = reel.state().position;
        reel.set_strip(strip(&["z", "z", "z"]));
        assert_eq!(reel.phase(), ReelPhase::Stopping);
        assert!((reel.state().position - position).abs() < f64::EPSILON);
        run_until_locked(&mut reel, 2_000).expect("lock");
        assert_eq!(reel.result_symbol().map(SymbolId::as_str), Some("z"));
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut reel = Reel::new(0, PhysicsConfig::default(), abcdef());
        reel.start(30.0);
        reel.force_lock();
        reel.reset();
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert!(reel.start(30.0));
    }
}
