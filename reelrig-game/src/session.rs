//! Slot session: the single owner of phase, reels, wallet and inventory.
//!
//! A session is driven by one player action button, an exit button and a
//! frame tick. Every mutation flows through these entry points; the
//! presentation layer only reads state and drains events.
use serde::{Deserialize, Serialize};

use crate::cards::{CardCatalog, CardEffect, CardId, Inventory, SpinContext};
use crate::config::MachineConfig;
use crate::event::{EventId, EventKind, SlotEvent};
use crate::machine::{GamePhase, Trigger};
use crate::reel::{Reel, ReelPhase};
use crate::request::{
    InitRequest, InitResponse, ReelResponse, StripRequest, generate_reel, init_reels,
};
use crate::reward::{RewardResult, evaluate};
use crate::rig::{LocalStripSource, RigCompletion, RigError, RigSequencer, StripSource};
use crate::rng::RngBundle;
use crate::sampler::generate_strip;
use crate::symbols::{SymbolId, SymbolValueTable};
use crate::weights::SymbolWeightTable;

/// Player currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub coins: i64,
    pub gems: i64,
}

impl Wallet {
    /// Apply a reward in one step, clamping each balance at zero.
    ///
    /// A loss larger than the balance empties it; the unpaid remainder is
    /// forgiven rather than carried as debt. The full `RewardResult` is still
    /// reported in `RewardSettled`.
    pub const fn apply(&mut self, coin_delta: i64, gem_delta: i64) {
        self.coins = self.coins.saturating_add(coin_delta);
        if self.coins < 0 {
            self.coins = 0;
        }
        self.gems = self.gems.saturating_add(gem_delta);
        if self.gems < 0 {
            self.gems = 0;
        }
    }
}

/// Result of the player action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinOutcome {
    Started { free: bool },
    Stopping { reel: usize },
    /// Every reel is stopping; the action waits for the locks.
    Waiting,
    Acknowledged,
    /// The settled spin forced a restart; a free spin is already running.
    Respin,
    Rejected { coins: i64, bet: i64 },
}

/// Result of the exit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitOutcome {
    /// An escape card locked every reel; settlement follows on the next tick.
    Escaped,
    /// The spin was abandoned with no refund.
    Aborted,
    Ignored,
}

/// Read-only view of a session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: u8,
    pub reel_count: usize,
    pub wallet: Wallet,
    pub inventory: Vec<CardId>,
    pub selected: Vec<usize>,
    pub positions: Vec<f64>,
    pub reel_phases: Vec<ReelPhase>,
    pub strips: Vec<Vec<SymbolId>>,
    pub last_reward: Option<RewardResult>,
}

/// Loaded data a session plays with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionData {
    pub config: MachineConfig,
    pub weights: SymbolWeightTable,
    pub values: SymbolValueTable,
    pub catalog: CardCatalog,
}

impl SessionData {
    /// Embedded assets, each with its coded fallback.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            config: MachineConfig::default_config(),
            weights: SymbolWeightTable::default_config(),
            values: SymbolValueTable::default_config(),
            catalog: CardCatalog::default_config(),
        }
    }
}

pub struct SlotSession {
    config: MachineConfig,
    weights: SymbolWeightTable,
    values: SymbolValueTable,
    catalog: CardCatalog,
    source: Box<dyn StripSource>,
    rngs: RngBundle,
    reels: Vec<Reel>,
    phase: GamePhase,
    sequencer: RigSequencer,
    wallet: Wallet,
    inventory: Inventory,
    spin: Option<SpinContext>,
    last_reward: Option<RewardResult>,
    spin_count: u32,
    event_seq: u16,
    events: Vec<SlotEvent>,
}

impl std::fmt::Debug for SlotSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotSession")
            .field("seed", &self.rngs.seed())
            .field("phase", &self.phase)
            .field("wallet", &self.wallet)
            .field("spin_count", &self.spin_count)
            .finish_non_exhaustive()
    }
}

impl SlotSession {
    /// Build a session; the configuration is sanitized before use.
    #[must_use]
    pub fn new(data: SessionData, seed: u64) -> Self {
        let config = data.config.sanitized();
        let source = LocalStripSource::new(data.weights.clone(), config.reel_strip_length);
        let rngs = RngBundle::from_user_seed(seed);
        let reels = {
            let mut rng = rngs.strip();
            (0..config.reel_count)
                .map(|index| {
                    let strip = generate_strip(
                        &data.weights,
                        config.reel_strip_length,
                        &[],
                        1.0,
                        &mut *rng,
                    );
                    Reel::new(index, config.physics(), strip)
                })
                .collect()
        };
        Self {
            sequencer: RigSequencer::new(config.reel_count, config.rig_latency_ticks),
            wallet: Wallet {
                coins: config.starting_coins,
                gems: config.starting_gems,
            },
            config,
            weights: data.weights,
            values: data.values,
            catalog: data.catalog,
            source: Box::new(source),
            rngs,
            reels,
            phase: GamePhase::IDLE,
            inventory: Inventory::new(),
            spin: None,
            last_reward: None,
            spin_count: 0,
            event_seq: 0,
            events: Vec::new(),
        }
    }

    /// Replace the strip source used for re-rigging.
    #[must_use]
    pub fn with_strip_source(mut self, source: Box<dyn StripSource>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub const fn wallet(&self) -> Wallet {
        self.wallet
    }

    #[must_use]
    pub const fn config(&self) -> &MachineConfig {
        &self.config
    }

    #[must_use]
    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[must_use]
    pub const fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn last_reward(&self) -> Option<&RewardResult> {
        self.last_reward.as_ref()
    }

    #[must_use]
    pub const fn spin_count(&self) -> u32 {
        self.spin_count
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rngs.seed()
    }

    /// Active card context of the running spin.
    #[must_use]
    pub const fn spin_context(&self) -> Option<&SpinContext> {
        self.spin.as_ref()
    }

    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Take every event raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<SlotEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase.value(),
            reel_count: self.reels.len(),
            wallet: self.wallet,
            inventory: self.inventory.cards().to_vec(),
            selected: self.inventory.selected_indices(),
            positions: self.reels.iter().map(|reel| reel.state().position).collect(),
            reel_phases: self.reels.iter().map(Reel::phase).collect(),
            strips: self.reels.iter().map(|reel| reel.strip().to_vec()).collect(),
            last_reward: self.last_reward.clone(),
        }
    }

    /// Answer a strip request against this session's weights and rig stream.
    #[must_use]
    pub fn serve_strip(&self, request: &StripRequest) -> ReelResponse {
        let mut rng = self.rngs.rig();
        generate_reel(request, &self.weights, self.config.reel_strip_length, &mut *rng)
    }

    /// Answer an init request against this session's weights and strip stream.
    #[must_use]
    pub fn serve_init(&self, request: &InitRequest) -> InitResponse {
        let mut rng = self.rngs.strip();
        init_reels(request, &self.weights, self.config.reel_strip_length, &mut *rng)
    }

    /// Give the player a card.
    pub fn grant_card(&mut self, card: CardId) {
        self.inventory.add(card);
    }

    /// Flip the selection of an inventory card. Only possible while idle.
    pub fn toggle_card(&mut self, index: usize) -> bool {
        if !self.phase.is_idle() {
            log::debug!("card selection is locked during a spin");
            return self.inventory.is_selected(index);
        }
        self.inventory.toggle(index)
    }

    fn reel_count_u8(&self) -> u8 {
        u8::try_from(self.reels.len()).unwrap_or(u8::MAX)
    }

    fn push_event(&mut self, kind: EventKind) {
        let id = EventId::new(self.spin_count, self.event_seq);
        self.event_seq = self.event_seq.saturating_add(1);
        self.events.push(SlotEvent::new(id, kind));
    }

    /// The single action button.
    pub fn action(&mut self) -> SpinOutcome {
        let reels = self.reel_count_u8();
        if self.phase.is_idle() {
            return self.start();
        }
        if self.phase.is_settled(reels) {
            return self.acknowledge();
        }
        let Some(index) = self.phase.stoppable_reel(reels) else {
            return SpinOutcome::Waiting;
        };
        match self.phase.on(Trigger::Action, reels) {
            Ok(next) => {
                if let Some(reel) = self.reels.get_mut(index) {
                    reel.stop();
                }
                self.phase = next;
                SpinOutcome::Stopping { reel: index }
            }
            Err(err) => {
                log::warn!("stop action rejected: {err}");
                SpinOutcome::Waiting
            }
        }
    }

    /// Charge the bet and start a paid spin with the selected cards.
    pub fn start(&mut self) -> SpinOutcome {
        if !self.phase.is_idle() {
            return SpinOutcome::Waiting;
        }
        let bet = self.config.bet;
        if self.wallet.coins < bet {
            let coins = self.wallet.coins;
            log::debug!("spin rejected: {coins} coins for a bet of {bet}");
            self.push_event(EventKind::InsufficientFunds { coins, bet });
            return SpinOutcome::Rejected { coins, bet };
        }
        self.wallet.coins -= bet;
        let ctx = SpinContext::from_selection(&self.inventory, &self.catalog, &self.config);
        self.begin_spin(ctx)
    }

    fn begin_spin(&mut self, ctx: SpinContext) -> SpinOutcome {
        let free = ctx.free;
        self.spin_count = self.spin_count.saturating_add(1);
        self.event_seq = 0;
        self.last_reward = None;
        self.sequencer.cancel_all();

        let speed = self.config.scroll_speed * ctx.speed_multiplier;
        {
            let mut rng = self.rngs.strip();
            for reel in &mut self.reels {
                reel.reset();
                reel.set_strip(generate_strip(
                    &self.weights,
                    self.config.reel_strip_length,
                    &[],
                    ctx.bomb_multiplier,
                    &mut *rng,
                ));
                reel.start(speed);
            }
        }
        self.spin = Some(ctx);
        self.phase = self
            .phase
            .on(Trigger::Action, self.reel_count_u8())
            .unwrap_or(self.phase);
        self.push_event(EventKind::SpinStarted { free });
        SpinOutcome::Started { free }
    }

    /// Return to idle after a settled spin; a forced restart starts a free spin.
    pub fn acknowledge(&mut self) -> SpinOutcome {
        let reels = self.reel_count_u8();
        if !self.phase.is_settled(reels) {
            return SpinOutcome::Waiting;
        }
        self.phase = self.phase.on(Trigger::Action, reels).unwrap_or(GamePhase::IDLE);
        for reel in &mut self.reels {
            reel.reset();
        }
        self.spin = None;
        let restart = self
            .last_reward
            .as_ref()
            .is_some_and(|reward| reward.forces_restart);
        if restart {
            self.push_event(EventKind::RestartForced);
            let ctx = SpinContext::free_spin(&self.config);
            self.begin_spin(ctx);
            return SpinOutcome::Respin;
        }
        SpinOutcome::Acknowledged
    }

    /// The exit button.
    pub fn exit(&mut self) -> ExitOutcome {
        let reels = self.reel_count_u8();
        if self.phase.stoppable_reel(reels).is_none() {
            return ExitOutcome::Ignored;
        }
        let escape = self
            .spin
            .as_ref()
            .is_some_and(|ctx| ctx.has(CardEffect::Escape));
        let Ok(next) = self.phase.on(Trigger::Exit { escape }, reels) else {
            return ExitOutcome::Ignored;
        };
        self.phase = next;
        if escape {
            self.sequencer.cancel_all();
            for index in 0..self.reels.len() {
                if self.reels[index].force_lock() {
                    self.on_reel_locked(index, false);
                }
            }
            log::debug!("escape card locked every reel");
            ExitOutcome::Escaped
        } else {
            self.abort();
            ExitOutcome::Aborted
        }
    }

    fn abort(&mut self) {
        self.sequencer.cancel_all();
        for reel in &mut self.reels {
            reel.reset();
        }
        if let Some(ctx) = self.spin.take() {
            let removed = self.inventory.remove_indices(&ctx.card_indices());
            log::debug!("spin aborted, {} selected cards discarded", removed.len());
        }
        self.push_event(EventKind::SpinAborted);
    }

    /// Advance one frame: deliver rig results, step every reel, settle.
    pub fn tick(&mut self) {
        self.deliver_rigs();

        for index in 0..self.reels.len() {
            if self.reels[index].step() {
                self.on_reel_locked(index, true);
            }
        }

        let reels = self.reel_count_u8();
        if self.phase.is_awaiting_locks(reels) && self.reels.iter().all(Reel::is_locked) {
            self.push_event(EventKind::AllLocked);
            if let Ok(next) = self.phase.on(Trigger::AllLocked, reels) {
                self.phase = next;
                self.settle();
            }
        }
    }

    /// Tick until the phase changes or `max_ticks` elapse. Returns ticks used.
    pub fn run_until_phase_change(&mut self, max_ticks: u32) -> u32 {
        let start = self.phase;
        for used in 1..=max_ticks {
            self.tick();
            if self.phase != start {
                return used;
            }
        }
        max_ticks
    }

    fn deliver_rigs(&mut self) {
        for request in self.sequencer.poll() {
            let ticket = request.ticket;
            let Some(reel) = self.reels.get_mut(ticket.reel) else {
                log::warn!("{}", RigError::UnknownReel { reel: ticket.reel });
                continue;
            };
            let outcome = {
                let mut rng = self.rngs.rig();
                self.source.generate(&request, &mut *rng)
            };
            if self.sequencer.complete(ticket, outcome, reel) == RigCompletion::Applied {
                log::debug!("reel {} re-rigged", ticket.reel);
            }
        }
    }

    fn on_reel_locked(&mut self, index: usize, rig_next: bool) {
        let Some(symbol) = self.reels[index].result_symbol().cloned() else {
            return;
        };
        log::debug!("reel {index} locked on {symbol}");
        self.push_event(EventKind::ReelLocked {
            reel: index,
            symbol,
        });
        if !rig_next {
            return;
        }
        let bias: Vec<SymbolId> = self.reels[..=index]
            .iter()
            .filter(|reel| reel.is_locked())
            .filter_map(|reel| reel.result_symbol().cloned())
            .collect();
        let multiplier = self.spin.as_ref().map_or(1.0, |ctx| ctx.bomb_multiplier);
        self.sequencer.on_lock(index, bias, multiplier);
        if self.config.rig_latency_ticks == 0 {
            self.deliver_rigs();
        }
    }

    fn settle(&mut self) {
        let Some(ctx) = self.spin.take() else {
            return;
        };
        let symbols: Vec<SymbolId> = self
            .reels
            .iter()
            .filter_map(|reel| reel.result_symbol().cloned())
            .collect();
        let reward = {
            let mut rng = self.rngs.reward();
            evaluate(&symbols, &ctx, &self.values, &mut *rng)
        };
        self.wallet.apply(reward.coin_delta, reward.gem_delta);
        log::info!(
            "spin {} settled: {:+} coins, {:+} gems, jackpot={}, shielded={}",
            self.spin_count,
            reward.coin_delta,
            reward.gem_delta,
            reward.jackpot,
            reward.shielded
        );
        self.push_event(EventKind::RewardSettled {
            coin_delta: reward.coin_delta,
            gem_delta: reward.gem_delta,
            jackpot: reward.jackpot,
            shielded: reward.shielded,
        });

        self.inventory.remove_indices(&ctx.card_indices());
        if reward.grants_card {
            let drawn = {
                let mut rng = self.rngs.cards();
                self.catalog.draw_card(&mut *rng)
            };
            if let Some(card) = drawn {
                self.inventory.add(card.clone());
                self.push_event(EventKind::CardGranted { card });
            }
        }
        self.spin = Some(ctx);
        self.last_reward = Some(reward);
    }
}
