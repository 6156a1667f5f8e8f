//! Named logic scenarios run against headless sessions.
use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result, ensure};
use rand::RngCore;
use reelrig_game::{
    CardId, EventKind, ExitOutcome, Inventory, LocalStripSource, ReelStrip, RewardResult,
    RigError, RigRequest, SessionData, SlotSession, SpinOutcome, StripSource, SymbolCategory,
    SymbolValue, SymbolWeightTable,
};
use reelrig_web::game::create_web_engine;

use crate::logic::player::ScriptedPlayer;

type ScenarioFn = fn(u64) -> Result<()>;

/// A named check executed once per iteration seed.
#[derive(Clone, Copy)]
pub struct LogicScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    run: ScenarioFn,
}

impl LogicScenario {
    /// Run the scenario for one seed.
    pub fn run(&self, seed: u64) -> Result<()> {
        (self.run)(seed)
    }
}

impl std::fmt::Debug for LogicScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicScenario")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

const SCENARIOS: [LogicScenario; 7] = [
    LogicScenario {
        key: "smoke",
        name: "Smoke",
        description: "One paid spin from the shipped assets settles and balances the wallet",
        run: smoke,
    },
    LogicScenario {
        key: "jackpot",
        name: "Jackpot",
        description: "A single-symbol weight table always lands an identical row",
        run: jackpot,
    },
    LogicScenario {
        key: "shield",
        name: "Shield",
        description: "A shield card absorbs a guaranteed coin loss",
        run: shield,
    },
    LogicScenario {
        key: "escape",
        name: "Escape",
        description: "Exit with an escape card settles on the next tick",
        run: escape,
    },
    LogicScenario {
        key: "abort",
        name: "Abort",
        description: "Exit without an escape card forfeits the bet and the selected cards",
        run: abort,
    },
    LogicScenario {
        key: "rigging",
        name: "Rigging",
        description: "Every lock re-rigs the next reel towards the symbols already showing",
        run: rigging,
    },
    LogicScenario {
        key: "payout",
        name: "Payout",
        description: "Wallet deltas match settled rewards across a run of spins",
        run: payout,
    },
];

/// Every scenario key with its description.
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

/// Look up a scenario by key, case-insensitively.
pub fn get_scenario(key: &str) -> Option<LogicScenario> {
    let key = key.trim().to_ascii_lowercase();
    SCENARIOS.iter().copied().find(|scenario| scenario.key == key)
}

/// Expand `all` into every scenario key, keeping the order otherwise.
pub fn expand_keys(keys: &[String]) -> Vec<String> {
    let mut expanded = Vec::new();
    for key in keys {
        if key.eq_ignore_ascii_case("all") {
            expanded.extend(SCENARIOS.iter().map(|scenario| scenario.key.to_string()));
        } else {
            expanded.push(key.clone());
        }
    }
    expanded
}

fn shipped_session(seed: u64) -> Result<SlotSession> {
    create_web_engine()
        .create_session(seed)
        .context("embedded assets failed to load")
}

fn session_with(seed: u64, configure: impl FnOnce(&mut SessionData)) -> Result<SlotSession> {
    let mut data = create_web_engine()
        .load_data()
        .context("embedded assets failed to load")?;
    configure(&mut data);
    Ok(SlotSession::new(data, seed))
}

fn selected(cards: &[&str]) -> Inventory {
    let mut inventory = Inventory::with_cards(cards.iter().map(|card| CardId::new(card)));
    for index in 0..inventory.len() {
        inventory.toggle(index);
    }
    inventory
}

fn smoke(seed: u64) -> Result<()> {
    let mut session = shipped_session(seed)?;
    let before = session.wallet();
    let bet = session.config().bet;
    let reward = ScriptedPlayer::default().play_spin(&mut session)?;
    let expected = (before.coins - bet + reward.coin_delta).max(0);
    ensure!(
        session.wallet().coins == expected,
        "wallet holds {} coins, expected {expected}",
        session.wallet().coins
    );
    ensure!(
        reward.resolved.len() == session.reels().len(),
        "settled row has {} symbols",
        reward.resolved.len()
    );
    Ok(())
}

fn jackpot(seed: u64) -> Result<()> {
    let mut session = session_with(seed, |data| {
        data.weights = SymbolWeightTable::from_entries([("coin_1", 1.0)]);
    })?;
    let reward = ScriptedPlayer::default().play_spin(&mut session)?;
    ensure!(reward.jackpot, "row {:?} is not a jackpot", reward.resolved);
    ensure!(
        reward.coin_delta == 45,
        "identical coin row paid {}, expected 45",
        reward.coin_delta
    );
    Ok(())
}

fn shield(seed: u64) -> Result<()> {
    let mut session = session_with(seed, |data| {
        data.weights = SymbolWeightTable::from_entries([("coin_1", 1.0)]);
        data.values
            .insert("coin_1".into(), SymbolValue::new(SymbolCategory::Coin, -50, 0));
    })?
    .with_inventory(selected(&["shield_card"]));
    let reward = ScriptedPlayer::default().play_spin(&mut session)?;
    ensure!(reward.shielded, "shield did not trigger");
    ensure!(reward.coin_delta == 0, "shielded spin paid {}", reward.coin_delta);
    ensure!(
        session.wallet().coins == session.config().starting_coins - session.config().bet,
        "shielded spin changed the wallet beyond the bet"
    );
    Ok(())
}

fn escape(seed: u64) -> Result<()> {
    let mut session = shipped_session(seed)?.with_inventory(selected(&["escape_card"]));
    ensure!(
        matches!(session.action(), SpinOutcome::Started { .. }),
        "spin did not start"
    );
    session.tick();
    let outcome = session.exit();
    ensure!(outcome == ExitOutcome::Escaped, "exit returned {outcome:?}");
    session.tick();
    let reels = u8::try_from(session.reels().len())?;
    ensure!(
        session.phase().is_settled(reels),
        "escape left the machine in phase {}",
        session.phase()
    );
    let reward = session
        .last_reward()
        .context("escaped spin carries no reward")?;
    ensure!(
        session.inventory().len() == usize::from(reward.grants_card),
        "escape card was not consumed"
    );
    Ok(())
}

fn abort(seed: u64) -> Result<()> {
    let mut session = shipped_session(seed)?.with_inventory(selected(&["double_card"]));
    let coins = session.wallet().coins;
    session.action();
    session.action();
    let outcome = session.exit();
    ensure!(outcome == ExitOutcome::Aborted, "exit returned {outcome:?}");
    ensure!(session.phase().is_idle(), "abort did not return to idle");
    ensure!(
        session.wallet().coins == coins - session.config().bet,
        "abort refunded the bet"
    );
    ensure!(session.inventory().is_empty(), "selected card survived the abort");
    ensure!(
        session
            .drain_events()
            .iter()
            .any(|event| event.kind == EventKind::SpinAborted),
        "no abort event"
    );
    Ok(())
}

struct RecordingSource {
    inner: LocalStripSource,
    requests: Rc<RefCell<Vec<RigRequest>>>,
}

impl StripSource for RecordingSource {
    fn generate(
        &self,
        request: &RigRequest,
        rng: &mut dyn RngCore,
    ) -> Result<ReelStrip, RigError> {
        self.requests.borrow_mut().push(request.clone());
        self.inner.generate(request, rng)
    }
}

fn rigging(seed: u64) -> Result<()> {
    let data = create_web_engine().load_data()?;
    let requests = Rc::new(RefCell::new(Vec::new()));
    let source = RecordingSource {
        inner: LocalStripSource::new(data.weights.clone(), data.config.reel_strip_length),
        requests: Rc::clone(&requests),
    };
    let mut session = SlotSession::new(data, seed).with_strip_source(Box::new(source));
    let reward = ScriptedPlayer::default().play_spin(&mut session)?;

    let requests = requests.borrow();
    ensure!(!requests.is_empty(), "no rig requests were issued");
    for request in requests.iter() {
        let reel = request.ticket.reel;
        ensure!(reel >= 1, "reel 0 was re-rigged");
        ensure!(
            !request.bias.is_empty() && request.bias.len() <= reel,
            "reel {reel} rigged with {} bias symbols",
            request.bias.len()
        );
        for symbol in &request.bias {
            ensure!(
                session
                    .reels()
                    .iter()
                    .take(reel)
                    .any(|locked| locked.result_symbol() == Some(symbol)),
                "bias symbol {symbol} is not showing on an earlier reel"
            );
        }
    }
    ensure!(reward.resolved.len() == session.reels().len(), "short settled row");
    Ok(())
}

fn payout(seed: u64) -> Result<()> {
    const SPINS: usize = 25;
    let mut session = shipped_session(seed)?;
    let player = ScriptedPlayer::default();
    let bet = session.config().bet;
    for spin in 0..SPINS {
        let before = session.wallet();
        if before.coins < bet {
            ensure!(
                matches!(session.action(), SpinOutcome::Rejected { .. }),
                "spin {spin} started without funds"
            );
            return Ok(());
        }
        let reward = player.play_spin(&mut session)?;
        check_wallet(&session, before.coins - bet, before.gems, &reward, spin)?;
        let mut ack = session.action();
        while ack == SpinOutcome::Respin {
            let before = session.wallet();
            let reward = player.finish_spin(&mut session)?;
            check_wallet(&session, before.coins, before.gems, &reward, spin)?;
            ack = session.action();
        }
        ensure!(ack == SpinOutcome::Acknowledged, "spin {spin} acknowledged with {ack:?}");
    }
    Ok(())
}

fn check_wallet(
    session: &SlotSession,
    coins_before: i64,
    gems_before: i64,
    reward: &RewardResult,
    spin: usize,
) -> Result<()> {
    let wallet = session.wallet();
    let coins = (coins_before + reward.coin_delta).max(0);
    let gems = (gems_before + reward.gem_delta).max(0);
    ensure!(
        wallet.coins == coins && wallet.gems == gems,
        "spin {spin}: wallet {wallet:?}, expected {coins} coins and {gems} gems"
    );
    Ok(())
}
