use anyhow::{Context, Result, bail, ensure};
use reelrig_game::{RewardResult, SlotSession, SpinOutcome};

/// Drives a session the way a player at the machine would.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedPlayer {
    /// Frames to wait before pressing stop on each reel.
    pub stop_delay_ticks: u32,
    /// Frames allowed for every reel to settle after the last stop.
    pub max_settle_ticks: u32,
}

impl Default for ScriptedPlayer {
    fn default() -> Self {
        Self {
            stop_delay_ticks: 12,
            max_settle_ticks: 5_000,
        }
    }
}

impl ScriptedPlayer {
    /// Start a paid spin and play it to settlement.
    pub fn play_spin(&self, session: &mut SlotSession) -> Result<RewardResult> {
        match session.action() {
            SpinOutcome::Started { .. } => {}
            other => bail!("spin did not start: {other:?}"),
        }
        self.finish_spin(session)
    }

    /// Stop every reel in order and wait for settlement.
    pub fn finish_spin(&self, session: &mut SlotSession) -> Result<RewardResult> {
        for _ in 0..session.reels().len() {
            wait(session, self.stop_delay_ticks);
            let outcome = session.action();
            ensure!(
                matches!(outcome, SpinOutcome::Stopping { .. }),
                "stop press returned {outcome:?} in phase {}",
                session.phase()
            );
        }
        self.await_settlement(session)
    }

    /// Tick until the spin settles.
    pub fn await_settlement(&self, session: &mut SlotSession) -> Result<RewardResult> {
        let reels = u8::try_from(session.reels().len()).context("reel count exceeds u8")?;
        let mut ticks = 0;
        while !session.phase().is_settled(reels) {
            ensure!(
                ticks < self.max_settle_ticks,
                "reels did not settle within {} ticks",
                self.max_settle_ticks
            );
            session.tick();
            ticks += 1;
        }
        session
            .last_reward()
            .cloned()
            .context("settled spin carries no reward")
    }
}

fn wait(session: &mut SlotSession, ticks: u32) {
    for _ in 0..ticks {
        session.tick();
    }
}
