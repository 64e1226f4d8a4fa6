//! The tick loop.

use crate::error::{EngineError, EngineResult};
use crate::events::EngineEvent;
use crate::settings::{EngineSettings, OperatingMode};
use crate::state::{EngineState, TickPhase};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use vigil_core::{Direction, MarketSnapshot, TradeIntent};
use vigil_exec::{EnqueueResult, ExecutionQueue};
use vigil_persistence::{EngineSnapshot, SnapshotStore};
use vigil_position::{Position, PositionLedger};
use vigil_risk::{CircuitBreaker, CircuitBreakerState, RiskFactorScores, RiskGate, RiskLimits, RiskState, Verdict};
use vigil_strategy::StrategySet;
use vigil_telemetry::Metrics;
use vigil_venue::{with_retry, ExecutionVenue, MarketDataSource};

const EVENT_CHANNEL_CAPACITY: usize = 256;

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::EnterLong => "enter_long",
        Direction::Exit => "exit",
    }
}

/// Control surface handed to the host.
///
/// `get_state` reflects the last successfully completed tick; a failed
/// tick never publishes partial state.
#[derive(Clone)]
pub struct EngineHandle {
    settings: Arc<RwLock<EngineSettings>>,
    state: Arc<RwLock<EngineState>>,
    events: broadcast::Sender<EngineEvent>,
    shutdown: CancellationToken,
}

impl EngineHandle {
    pub fn state(&self) -> EngineState {
        self.state.read().clone()
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings.read().clone()
    }

    /// Swap in new settings after validation. An invalid block is
    /// rejected and the previous configuration stays in force.
    pub fn update_settings(&self, new: EngineSettings) -> EngineResult<()> {
        new.validate().map_err(EngineError::InvalidSettings)?;
        *self.settings.write() = new;
        let _ = self.events.send(EngineEvent::SettingsUpdated);
        info!("settings updated");
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Request shutdown. Honored between ticks; an in-flight drain
    /// finishes first.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }
}

/// The decision engine. Owns all mutable trading state; every mutation
/// happens on the single tick task.
pub struct Engine {
    settings: Arc<RwLock<EngineSettings>>,
    strategies: StrategySet,
    ledger: PositionLedger,
    risk_state: RiskState,
    breaker: CircuitBreaker,
    queue: ExecutionQueue,
    data_source: Arc<dyn MarketDataSource>,
    venue: Arc<dyn ExecutionVenue>,
    snapshot_store: Option<SnapshotStore>,
    observable: Arc<RwLock<EngineState>>,
    events: broadcast::Sender<EngineEvent>,
    shutdown: CancellationToken,
    tick: u64,
    phase: TickPhase,
    breaker_was_tripped: bool,
}

impl Engine {
    pub fn new(
        settings: EngineSettings,
        strategies: StrategySet,
        data_source: Arc<dyn MarketDataSource>,
        venue: Arc<dyn ExecutionVenue>,
        snapshot_store: Option<SnapshotStore>,
    ) -> EngineResult<Self> {
        settings.validate().map_err(EngineError::InvalidSettings)?;
        let now = Utc::now();
        let cooldown = settings.limits.breaker_cooldown();

        // Resume from the last snapshot when one exists.
        let restored = match &snapshot_store {
            Some(store) => store.load()?,
            None => None,
        };
        let (risk_state, ledger, breaker) = match restored {
            Some(snapshot) => {
                info!(
                    taken_at = %snapshot.taken_at,
                    positions = snapshot.positions.len(),
                    "restored engine snapshot"
                );
                (
                    snapshot.risk_state,
                    PositionLedger::restore(snapshot.positions),
                    CircuitBreaker::restore(snapshot.breaker),
                )
            }
            None => (
                RiskState::new(now),
                PositionLedger::new(),
                CircuitBreaker::new(),
            ),
        };

        let queue = ExecutionQueue::new(settings.max_queue_size)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let breaker_was_tripped = breaker.is_tripped(now, cooldown);
        let observable = Arc::new(RwLock::new(EngineState::initial(
            risk_state.clone(),
            breaker.state(now, cooldown),
        )));

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            strategies,
            ledger,
            risk_state,
            breaker,
            queue,
            data_source,
            venue,
            snapshot_store,
            observable,
            events,
            shutdown: CancellationToken::new(),
            tick: 0,
            phase: TickPhase::Idle,
            breaker_was_tripped,
        })
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            settings: Arc::clone(&self.settings),
            state: Arc::clone(&self.observable),
            events: self.events.clone(),
            shutdown: self.shutdown.clone(),
        }
    }

    /// Run until shutdown. A failed tick is logged and the loop keeps
    /// going; only `stop()` terminates it.
    pub async fn run(mut self) {
        info!("engine started");
        let shutdown = self.shutdown.clone();
        loop {
            let interval_ms = self.settings.read().tick_interval_ms;
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_millis(interval_ms)) => {
                    if let Err(err) = self.run_tick(Utc::now()).await {
                        error!(%err, "tick aborted");
                    }
                }
            }
        }
        info!("engine stopped");
    }

    fn set_phase(&mut self, phase: TickPhase) {
        trace!(%phase, tick = self.tick, "phase");
        self.phase = phase;
    }

    /// One full pass of the tick state machine.
    ///
    /// `Err` means the tick was aborted with no state published; the
    /// caller resumes scheduling as usual.
    pub(crate) async fn run_tick(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        let started = std::time::Instant::now();
        let settings = self.settings.read().clone();
        self.refresh_queue_capacity(&settings)?;
        let gate = RiskGate::new(settings.limits.clone());
        let cooldown = settings.limits.breaker_cooldown();

        self.set_phase(TickPhase::FetchingData);
        let data_source = Arc::clone(&self.data_source);
        let snapshot = with_retry(&settings.retry, "market_snapshot", || {
            data_source.snapshot(&settings.watchlist)
        })
        .await
        .map_err(|err| {
            self.set_phase(TickPhase::Idle);
            EngineError::DataSource(err.to_string())
        })?;

        self.set_phase(TickPhase::GeneratingSignals);
        // While tripped, providers are not invoked at all; exits keep
        // flowing from the monitoring pass.
        let mut signals = if self.breaker.is_tripped(now, cooldown) {
            debug!("breaker tripped, skipping signal generation");
            Vec::new()
        } else {
            self.strategies.evaluate(&snapshot)
        };
        for signal in &signals {
            Metrics::signal_generated(&signal.strategy, direction_label(signal.direction));
        }
        if settings.mode == OperatingMode::Observation {
            let before = signals.len();
            signals.retain(|s| s.is_exit());
            if before > signals.len() {
                debug!(discarded = before - signals.len(), "observation mode, enters discarded");
            }
        }

        self.set_phase(TickPhase::RiskEvaluating);
        let mut accepted = Vec::new();
        for signal in &signals {
            let Some(asset) = snapshot.get(&signal.symbol) else {
                warn!(symbol = %signal.symbol, "no market data for signal, skipped this tick");
                continue;
            };
            match gate.evaluate(signal, &self.risk_state, &self.ledger, asset, &self.breaker, now) {
                Verdict::Accepted(intent) => accepted.push(intent),
                Verdict::Rejected(reason) => {
                    Metrics::gate_rejected(reason.as_str());
                    let _ = self.events.send(EngineEvent::SignalRejected {
                        symbol: signal.symbol.clone(),
                        strategy: signal.strategy.clone(),
                        reason,
                    });
                }
            }
        }
        // The daily-loss check inside the gate can trip the breaker.
        self.sync_breaker_events(now, cooldown);

        self.set_phase(TickPhase::Queueing);
        for intent in accepted {
            let symbol = intent.symbol.clone();
            let direction = intent.direction;
            match self.queue.enqueue(intent) {
                EnqueueResult::Queued => Metrics::intent_queued(direction_label(direction)),
                EnqueueResult::QueueFull => {
                    Metrics::queue_dropped(direction_label(direction));
                    let _ = self.events.send(EngineEvent::IntentDropped { symbol });
                }
            }
        }

        self.set_phase(TickPhase::Executing);
        for intent in self.queue.drain() {
            self.execute_intent(&settings, intent, now).await.map_err(|err| {
                self.set_phase(TickPhase::Idle);
                err
            })?;
        }

        self.set_phase(TickPhase::Monitoring);
        for request in self.ledger.monitor(&snapshot) {
            info!(
                symbol = %request.symbol,
                trigger = ?request.trigger,
                unrealized_return = %request.unrealized_return,
                "exit threshold breached"
            );
            let intent = TradeIntent::new(
                request.symbol.clone(),
                Direction::Exit,
                request.size,
                request.current_price,
                "monitor",
            );
            match self.queue.enqueue(intent) {
                EnqueueResult::Queued => {
                    self.ledger.mark_exit_pending(&request.symbol);
                    Metrics::intent_queued("exit");
                }
                EnqueueResult::QueueFull => {
                    Metrics::queue_dropped("exit");
                    let _ = self.events.send(EngineEvent::IntentDropped {
                        symbol: request.symbol,
                    });
                }
            }
        }

        self.set_phase(TickPhase::AssessingRisk);
        self.risk_state.maybe_roll_window(now);
        self.risk_state.factor_scores = compute_factor_scores(
            &snapshot,
            self.ledger.len(),
            &settings.limits,
        );
        self.breaker.assess(&self.risk_state, &settings.limits, now);
        self.sync_breaker_events(now, cooldown);

        self.tick += 1;
        if settings.snapshot_interval_ticks > 0
            && self.tick % settings.snapshot_interval_ticks == 0
        {
            self.persist(now, cooldown);
        }

        *self.observable.write() = EngineState {
            tick: self.tick,
            phase: TickPhase::Idle,
            breaker: self.breaker.state(now, cooldown),
            open_positions: self.ledger.snapshot(),
            risk_state: self.risk_state.clone(),
            last_tick_at: Some(now),
        };
        Metrics::open_positions(self.ledger.len() as i64);
        Metrics::daily_pnl(
            self.risk_state
                .daily_realized_pnl
                .inner()
                .to_f64()
                .unwrap_or(0.0),
        );
        Metrics::tick_duration(started.elapsed().as_secs_f64() * 1000.0);
        let _ = self.events.send(EngineEvent::TickCompleted { tick: self.tick });
        self.set_phase(TickPhase::Idle);
        Ok(())
    }

    /// Submit one intent and fold the fill into the ledger and risk
    /// state. Submission failures are isolated; an exit intent with no
    /// matching position aborts the tick.
    async fn execute_intent(
        &mut self,
        settings: &EngineSettings,
        intent: TradeIntent,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        if intent.direction == Direction::Exit && !self.ledger.contains(&intent.symbol) {
            return Err(EngineError::Invariant(format!(
                "exit intent for {} with no open position",
                intent.symbol
            )));
        }

        let direction = direction_label(intent.direction);
        let submitted =
            tokio::time::timeout(settings.retry.call_timeout(), self.venue.submit(&intent)).await;
        let fill = match submitted {
            Ok(Ok(fill)) => fill,
            Ok(Err(err)) => {
                warn!(symbol = %intent.symbol, direction, error = %err, "submission failed");
                self.submission_failed(&intent, err.to_string());
                return Ok(());
            }
            Err(_) => {
                warn!(symbol = %intent.symbol, direction, "submission timed out");
                self.submission_failed(&intent, "timeout".to_string());
                return Ok(());
            }
        };

        Metrics::fill(direction);
        match intent.direction {
            Direction::EnterLong => {
                let position = Position::from_fill(
                    intent.symbol.clone(),
                    &fill,
                    settings.stop_loss_pct,
                    settings.take_profit_pct,
                    intent.strategy.clone(),
                    now,
                );
                let _ = self.events.send(EngineEvent::PositionOpened {
                    symbol: position.symbol.clone(),
                    entry_price: position.entry_price,
                    notional: position.notional,
                });
                self.ledger.open(position);
            }
            Direction::Exit => {
                if let Some(trade) = self.ledger.close(&intent.symbol, &fill, now) {
                    self.risk_state.record_close(trade.realized_pnl, now);
                    let _ = self.events.send(EngineEvent::PositionClosed {
                        symbol: trade.symbol.clone(),
                        realized_pnl: trade.realized_pnl,
                    });
                    // A loss can breach the limit or the streak at once.
                    self.breaker.assess(&self.risk_state, &settings.limits, now);
                    self.sync_breaker_events(now, settings.limits.breaker_cooldown());
                }
            }
        }
        Ok(())
    }

    fn submission_failed(&mut self, intent: &TradeIntent, reason: String) {
        Metrics::submit_failed(direction_label(intent.direction));
        let _ = self.events.send(EngineEvent::SubmissionFailed {
            symbol: intent.symbol.clone(),
            reason,
        });
        // Let the next monitoring pass re-queue the exit.
        if intent.direction == Direction::Exit {
            self.ledger.clear_exit_pending(&intent.symbol);
        }
    }

    /// Emit trip/re-arm events on breaker transitions, wherever they
    /// originated.
    fn sync_breaker_events(&mut self, now: DateTime<Utc>, cooldown: chrono::Duration) {
        let state = self.breaker.state(now, cooldown);
        let tripped = state.is_tripped();
        if tripped && !self.breaker_was_tripped {
            if let CircuitBreakerState::Tripped { at, reason } = &state {
                Metrics::breaker_tripped(reason.label());
                let _ = self.events.send(EngineEvent::BreakerTripped {
                    reason: reason.to_string(),
                    at: *at,
                });
            }
        } else if !tripped && self.breaker_was_tripped {
            info!("circuit breaker re-armed");
            let _ = self.events.send(EngineEvent::BreakerRearmed { at: now });
        }
        self.breaker_was_tripped = tripped;
    }

    /// Apply a queue capacity change without losing queued exits.
    fn refresh_queue_capacity(&mut self, settings: &EngineSettings) -> EngineResult<()> {
        if self.queue.capacity() == settings.max_queue_size {
            return Ok(());
        }
        let pending = self.queue.drain();
        let mut queue = ExecutionQueue::new(settings.max_queue_size)?;
        for intent in pending {
            if queue.enqueue(intent) == EnqueueResult::QueueFull {
                Metrics::queue_dropped("resize");
            }
        }
        self.queue = queue;
        Ok(())
    }

    fn persist(&self, now: DateTime<Utc>, cooldown: chrono::Duration) {
        let Some(store) = &self.snapshot_store else {
            return;
        };
        let snapshot = EngineSnapshot {
            taken_at: now,
            risk_state: self.risk_state.clone(),
            positions: self.ledger.snapshot(),
            breaker: self.breaker.state(now, cooldown),
        };
        if let Err(err) = store.save(&snapshot) {
            // Persistence is best-effort; trading continues.
            warn!(%err, "snapshot save failed");
        }
    }
}

/// Derive factor scores from this tick's snapshot and ledger load.
fn compute_factor_scores(
    snapshot: &MarketSnapshot,
    open_positions: usize,
    limits: &RiskLimits,
) -> RiskFactorScores {
    let clamp01 = |v: Decimal| v.clamp(Decimal::ZERO, Decimal::ONE);

    let portfolio = if limits.max_active_positions == 0 {
        Decimal::ZERO
    } else {
        clamp01(Decimal::from(open_positions as u64) / Decimal::from(limits.max_active_positions as u64))
    };

    if snapshot.is_empty() {
        return RiskFactorScores {
            portfolio,
            ..RiskFactorScores::default()
        };
    }

    let n = Decimal::from(snapshot.len() as u64);
    let mut vol_sum = Decimal::ZERO;
    let mut vol_max = Decimal::ZERO;
    let mut corr_sum = Decimal::ZERO;
    let mut liq_sum = Decimal::ZERO;
    for asset in snapshot.assets.values() {
        let vol = clamp01(asset.volatility);
        vol_sum += vol;
        vol_max = vol_max.max(vol);
        corr_sum += clamp01(asset.correlation.abs());
        // 1.0 at (or below) the minimum liquidity, falling toward 0 as
        // depth improves.
        let liq = if asset.liquidity.is_positive() {
            clamp01(limits.min_liquidity.inner() / asset.liquidity.inner())
        } else {
            Decimal::ONE
        };
        liq_sum += liq;
    }

    RiskFactorScores {
        portfolio,
        market: vol_max,
        volatility: vol_sum / n,
        correlation: corr_sum / n,
        liquidity: liq_sum / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use vigil_core::{AssetSnapshot, Price, Quote, RejectReason, Signal, Symbol};
    use vigil_risk::TripReason;
    use vigil_strategy::SignalProvider;
    use vigil_venue::{PaperVenue, PaperVenueConfig, ReplayDataSource, RetryPolicy};

    /// Emits a fixed list of signals per tick, then nothing.
    struct ScriptedStrategy {
        script: Vec<Vec<Signal>>,
        tick: usize,
    }

    impl ScriptedStrategy {
        fn new(script: Vec<Vec<Signal>>) -> Self {
            Self { script, tick: 0 }
        }
    }

    impl SignalProvider for ScriptedStrategy {
        fn name(&self) -> &str {
            "scripted"
        }

        fn evaluate(&mut self, _snapshot: &MarketSnapshot) -> Vec<Signal> {
            let signals = self.script.get(self.tick).cloned().unwrap_or_default();
            self.tick += 1;
            signals
        }
    }

    fn enter(symbol: &str) -> Signal {
        Signal::new(
            Symbol::from(symbol),
            Direction::EnterLong,
            dec!(0.9),
            Vec::new(),
            "scripted",
        )
    }

    fn exit(symbol: &str) -> Signal {
        Signal::new(
            Symbol::from(symbol),
            Direction::Exit,
            dec!(0.9),
            Vec::new(),
            "scripted",
        )
    }

    fn asset(symbol: &str, price: rust_decimal::Decimal) -> AssetSnapshot {
        AssetSnapshot {
            symbol: Symbol::from(symbol),
            price: Price::new(price),
            volume_24h: Quote::new(dec!(1_000_000)),
            liquidity: Quote::new(dec!(500_000)),
            volatility: dec!(0.10),
            correlation: dec!(0.10),
        }
    }

    fn snapshot(prices: &[(&str, rust_decimal::Decimal)]) -> MarketSnapshot {
        prices.iter().map(|(s, p)| asset(s, *p)).collect()
    }

    fn test_settings() -> EngineSettings {
        EngineSettings {
            mode: OperatingMode::Trading,
            watchlist: vec![Symbol::from("SOL")],
            retry: RetryPolicy {
                max_attempts: 1,
                base_delay_ms: 1,
                max_delay_ms: 1,
                call_timeout_ms: 1_000,
            },
            snapshot_interval_ticks: 0,
            ..Default::default()
        }
    }

    fn build_engine(
        settings: EngineSettings,
        script: Vec<Vec<Signal>>,
        snapshots: Vec<MarketSnapshot>,
    ) -> Engine {
        let strategies = StrategySet::new(vec![Box::new(ScriptedStrategy::new(script))]);
        let data_source = Arc::new(ReplayDataSource::new(snapshots, false));
        let venue = Arc::new(PaperVenue::new(PaperVenueConfig::default()));
        Engine::new(settings, strategies, data_source, venue, None).unwrap()
    }

    #[tokio::test]
    async fn test_enter_then_stop_loss_lifecycle() {
        let mut engine = build_engine(
            test_settings(),
            vec![vec![enter("SOL")]],
            vec![
                snapshot(&[("SOL", dec!(100))]),
                snapshot(&[("SOL", dec!(89))]),
                snapshot(&[("SOL", dec!(89))]),
            ],
        );
        let handle = engine.handle();
        let now = Utc::now();

        // Tick 1: enter accepted, filled, position opened.
        engine.run_tick(now).await.unwrap();
        assert_eq!(engine.ledger.len(), 1);
        assert_eq!(handle.state().tick, 1);

        // Tick 2: price breaches the stop, exit queued for next tick.
        engine.run_tick(now + chrono::Duration::seconds(5)).await.unwrap();
        assert_eq!(engine.ledger.len(), 1);
        assert!(engine.ledger.get(&Symbol::from("SOL")).unwrap().exit_pending);
        assert_eq!(engine.queue.len(), 1);

        // Tick 3: exit executes; the loss is recorded.
        engine.run_tick(now + chrono::Duration::seconds(10)).await.unwrap();
        assert!(engine.ledger.is_empty());
        assert!(engine.risk_state.daily_realized_pnl.is_negative());
        assert_eq!(engine.risk_state.consecutive_losses, 1);

        let state = handle.state();
        assert_eq!(state.tick, 3);
        assert!(state.open_positions.is_empty());
    }

    #[tokio::test]
    async fn test_strategy_exit_while_exit_pending_is_rejected() {
        let mut engine = build_engine(
            test_settings(),
            vec![vec![enter("SOL")], vec![], vec![exit("SOL")]],
            vec![
                snapshot(&[("SOL", dec!(100))]),
                snapshot(&[("SOL", dec!(89))]),
                snapshot(&[("SOL", dec!(89))]),
            ],
        );
        let handle = engine.handle();
        let mut events = handle.subscribe();
        let now = Utc::now();

        // Tick 1 opens, tick 2 breaches the stop and queues the exit.
        engine.run_tick(now).await.unwrap();
        engine.run_tick(now + chrono::Duration::seconds(5)).await.unwrap();
        assert!(engine.ledger.get(&Symbol::from("SOL")).unwrap().exit_pending);

        // Tick 3: the strategy asks for the same exit while the queued
        // one is still pending; only the queued exit fills.
        engine.run_tick(now + chrono::Duration::seconds(10)).await.unwrap();
        assert!(engine.ledger.is_empty());
        assert_eq!(handle.state().tick, 3);

        let mut rejected = None;
        while let Ok(event) = events.try_recv() {
            if let EngineEvent::SignalRejected { reason, .. } = event {
                rejected = Some(reason);
            }
        }
        assert_eq!(rejected, Some(RejectReason::ExitAlreadyPending));
    }

    #[tokio::test]
    async fn test_no_enter_while_breaker_tripped() {
        let mut engine = build_engine(
            test_settings(),
            vec![vec![enter("SOL")], vec![enter("SOL")]],
            vec![
                snapshot(&[("SOL", dec!(100))]),
                snapshot(&[("SOL", dec!(100))]),
            ],
        );
        let now = Utc::now();
        engine.breaker.trip(TripReason::LossStreak { count: 3 }, now);

        engine.run_tick(now).await.unwrap();
        engine.run_tick(now + chrono::Duration::seconds(5)).await.unwrap();
        assert!(engine.ledger.is_empty());
        assert!(engine.handle().state().breaker.is_tripped());
    }

    #[tokio::test]
    async fn test_observation_mode_never_opens() {
        let settings = EngineSettings {
            mode: OperatingMode::Observation,
            ..test_settings()
        };
        let mut engine = build_engine(
            settings,
            vec![vec![enter("SOL")]],
            vec![snapshot(&[("SOL", dec!(100))])],
        );

        engine.run_tick(Utc::now()).await.unwrap();
        assert!(engine.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_data_source_failure_aborts_tick() {
        let mut engine = build_engine(
            test_settings(),
            vec![vec![enter("SOL")], vec![enter("SOL")]],
            vec![snapshot(&[("SOL", dec!(100))])],
        );
        let handle = engine.handle();
        let now = Utc::now();

        engine.run_tick(now).await.unwrap();
        assert_eq!(handle.state().tick, 1);

        // Replay exhausted: the tick aborts and publishes nothing.
        let result = engine.run_tick(now + chrono::Duration::seconds(5)).await;
        assert!(matches!(result, Err(EngineError::DataSource(_))));
        assert_eq!(handle.state().tick, 1);
    }

    #[tokio::test]
    async fn test_queue_full_drops_second_intent() {
        let settings = EngineSettings {
            max_queue_size: 1,
            ..test_settings()
        };
        let mut engine = build_engine(
            EngineSettings {
                watchlist: vec![Symbol::from("ETH"), Symbol::from("SOL")],
                ..settings
            },
            vec![vec![enter("ETH"), enter("SOL")]],
            vec![snapshot(&[("ETH", dec!(100)), ("SOL", dec!(100))])],
        );
        let mut events = engine.handle().subscribe();

        engine.run_tick(Utc::now()).await.unwrap();
        assert_eq!(engine.ledger.len(), 1);

        let mut saw_drop = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, EngineEvent::IntentDropped { .. }) {
                saw_drop = true;
            }
        }
        assert!(saw_drop);
    }

    #[tokio::test]
    async fn test_update_settings_keeps_previous_on_invalid() {
        let engine = build_engine(
            test_settings(),
            vec![],
            vec![snapshot(&[("SOL", dec!(100))])],
        );
        let handle = engine.handle();
        let original_interval = handle.settings().tick_interval_ms;

        let invalid = EngineSettings {
            tick_interval_ms: 0,
            ..test_settings()
        };
        assert!(handle.update_settings(invalid).is_err());
        assert_eq!(handle.settings().tick_interval_ms, original_interval);

        let valid = EngineSettings {
            tick_interval_ms: 1_000,
            ..test_settings()
        };
        handle.update_settings(valid).unwrap();
        assert_eq!(handle.settings().tick_interval_ms, 1_000);
    }

    #[tokio::test]
    async fn test_loss_streak_trips_and_blocks_enters() {
        // Take-profit far away, stop-loss tight, streak limit of 1.
        let mut settings = test_settings();
        settings.limits.max_consecutive_losses = 1;
        settings.limits.loss_cooldown_secs = 0;
        let mut engine = build_engine(
            settings,
            vec![vec![enter("SOL")], vec![], vec![], vec![enter("SOL")]],
            vec![
                snapshot(&[("SOL", dec!(100))]),
                snapshot(&[("SOL", dec!(85))]),
                snapshot(&[("SOL", dec!(85))]),
                snapshot(&[("SOL", dec!(85))]),
            ],
        );
        let now = Utc::now();

        engine.run_tick(now).await.unwrap();
        engine.run_tick(now + chrono::Duration::seconds(5)).await.unwrap();
        engine.run_tick(now + chrono::Duration::seconds(10)).await.unwrap();
        // The losing close tripped the breaker on the streak.
        let cooldown = engine.handle().settings().limits.breaker_cooldown();
        assert!(engine
            .breaker
            .is_tripped(now + chrono::Duration::seconds(10), cooldown));

        engine.run_tick(now + chrono::Duration::seconds(15)).await.unwrap();
        assert!(engine.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_shorter_breaker_cooldown_applies_next_tick() {
        let mut engine = build_engine(
            test_settings(),
            vec![vec![enter("SOL")]],
            vec![
                snapshot(&[("SOL", dec!(100))]),
                snapshot(&[("SOL", dec!(100))]),
            ],
        );
        let handle = engine.handle();
        let now = Utc::now();
        engine.breaker.trip(TripReason::LossStreak { count: 3 }, now);

        // Default cooldown is an hour; ten seconds in, still blocked
        // and the script's enter is never requested.
        engine.run_tick(now + chrono::Duration::seconds(5)).await.unwrap();
        assert!(engine.ledger.is_empty());

        let mut settings = test_settings();
        settings.limits.breaker_cooldown_secs = 1;
        handle.update_settings(settings).unwrap();

        // The next tick reads the new window, re-arms, and the held
        // back enter goes through.
        engine.run_tick(now + chrono::Duration::seconds(10)).await.unwrap();
        assert!(!handle.state().breaker.is_tripped());
        assert_eq!(engine.ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_restart_restores_positions_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine-snapshot.json");
        let settings = EngineSettings {
            snapshot_interval_ticks: 1,
            ..test_settings()
        };

        let mut engine = Engine::new(
            settings.clone(),
            StrategySet::new(vec![Box::new(ScriptedStrategy::new(vec![vec![enter("SOL")]]))]),
            Arc::new(ReplayDataSource::new(vec![snapshot(&[("SOL", dec!(100))])], false)),
            Arc::new(PaperVenue::new(PaperVenueConfig::default())),
            Some(SnapshotStore::new(&path)),
        )
        .unwrap();
        engine.run_tick(Utc::now()).await.unwrap();
        assert_eq!(engine.ledger.len(), 1);
        drop(engine);

        let restored = Engine::new(
            settings,
            StrategySet::new(vec![]),
            Arc::new(ReplayDataSource::new(vec![], false)),
            Arc::new(PaperVenue::new(PaperVenueConfig::default())),
            Some(SnapshotStore::new(&path)),
        )
        .unwrap();
        assert_eq!(restored.ledger.len(), 1);
        assert!(restored.ledger.contains(&Symbol::from("SOL")));
    }

    #[test]
    fn test_factor_scores_from_snapshot() {
        let limits = RiskLimits {
            min_liquidity: Quote::new(dec!(50_000)),
            max_active_positions: 4,
            ..Default::default()
        };
        let snap = snapshot(&[("SOL", dec!(100))]);
        let scores = compute_factor_scores(&snap, 2, &limits);
        assert_eq!(scores.portfolio, dec!(0.5));
        assert_eq!(scores.volatility, dec!(0.10));
        assert_eq!(scores.market, dec!(0.10));
        assert_eq!(scores.liquidity, dec!(0.1)); // 50k / 500k
    }
}
