//! Settlement worker: drives the wager ledger at round boundaries.
//!
//! Listens on the game topic and, for each boundary, spawns a short pipeline
//! of ledger calls. Pipelines run detached from the worker so a slow ledger
//! never blocks the event stream, and they are not cancelled on shutdown.
//! Every step may fail; a failure logs and abandons the rest of that pipeline.
//! Results that arrive after the round has moved on are discarded.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, warn};

use game_core::{EngineEvent, Side};

use crate::events::{Event, EventBus, Topic};
use crate::providers::{LedgerError, MarketId, WagerLedger};

/// One ledger call in a settlement pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Stop quietly unless someone has staked.
    CheckStakes,
    Seed,
    Lock,
    Settle(Side),
}

/// Pipeline run when ACTION starts.
const ON_LOCK: [Step; 3] = [Step::CheckStakes, Step::Seed, Step::Lock];

/// How far a pipeline got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every step ran.
    Completed,
    /// Nobody staked; nothing was written.
    NoStakes,
}

/// Run `steps` in order against `market`.
pub async fn run_pipeline(
    ledger: &dyn WagerLedger,
    market: MarketId,
    steps: &[Step],
) -> Result<PipelineOutcome, LedgerError> {
    for step in steps {
        match *step {
            Step::CheckStakes => {
                if !ledger.has_stakes(market).await? {
                    return Ok(PipelineOutcome::NoStakes);
                }
            }
            Step::Seed => ledger.seed(market).await?,
            Step::Lock => ledger.lock(market).await?,
            Step::Settle(winner) => ledger.settle(market, winner).await?,
        }
    }
    Ok(PipelineOutcome::Completed)
}

/// Ledger-side view of the current round.
#[derive(Debug, Default)]
struct MarketState {
    round: u64,
    market: Option<MarketId>,
    /// Seeded and locked; only a settle remains.
    locked: bool,
}

/// Background worker that settles wagers.
pub struct SettlementWorker {
    ledger: Arc<dyn WagerLedger>,
    state: Arc<Mutex<MarketState>>,
    event_rx: broadcast::Receiver<Event>,
    shutdown: watch::Receiver<bool>,
}

impl SettlementWorker {
    pub fn new(
        ledger: Arc<dyn WagerLedger>,
        event_bus: &EventBus,
        first_round: u64,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            ledger,
            state: Arc::new(Mutex::new(MarketState {
                round: first_round,
                ..MarketState::default()
            })),
            event_rx: event_bus.subscribe(Topic::Game),
            shutdown,
        }
    }

    pub async fn run(mut self) {
        self.request_market(self.state.lock().await.round);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                received = self.event_rx.recv() => match received {
                    Ok(Event::Game(event)) => self.on_event(event).await,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(target: "runtime::settlement", skipped, "settlement lagged behind game events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        debug!(target: "runtime::settlement", "SettlementWorker stopped");
    }

    async fn on_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::WageringLocked { round } => self.on_action_start(round).await,
            EngineEvent::RoundEnded { round, outcome } => {
                self.on_round_end(round, outcome.winner).await
            }
            EngineEvent::RoundReset { round } => {
                {
                    let mut state = self.state.lock().await;
                    *state = MarketState {
                        round,
                        ..MarketState::default()
                    };
                }
                self.request_market(round);
            }
            _ => {}
        }
    }

    /// Fetch the market for `round` in the background.
    fn request_market(&self, round: u64) {
        let ledger = Arc::clone(&self.ledger);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            match ledger.next_market().await {
                Ok(market) => {
                    let mut state = state.lock().await;
                    if state.round != round {
                        debug!(target: "runtime::settlement", round, "discarding stale market");
                        return;
                    }
                    info!(target: "runtime::settlement", round, ?market, "market ready");
                    state.market = market;
                }
                Err(error) => {
                    warn!(target: "runtime::settlement", round, %error, "failed to fetch market");
                }
            }
        });
    }

    async fn on_action_start(&self, round: u64) {
        let Some(market) = self.market_for(round).await else {
            debug!(target: "runtime::settlement", round, "no market, skipping lock");
            return;
        };

        let ledger = Arc::clone(&self.ledger);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            match run_pipeline(ledger.as_ref(), market, &ON_LOCK).await {
                Ok(PipelineOutcome::Completed) => {
                    let mut state = state.lock().await;
                    if state.round == round {
                        state.locked = true;
                    }
                    info!(target: "runtime::settlement", round, market, "market locked");
                }
                Ok(PipelineOutcome::NoStakes) => {
                    debug!(target: "runtime::settlement", round, market, "no stakes, skipping seed and lock");
                }
                Err(error) => {
                    warn!(target: "runtime::settlement", round, market, %error, "lock pipeline failed");
                }
            }
        });
    }

    async fn on_round_end(&self, round: u64, winner: Side) {
        let (market, locked) = {
            let state = self.state.lock().await;
            if state.round != round {
                return;
            }
            (state.market, state.locked)
        };
        let Some(market) = market else {
            debug!(target: "runtime::settlement", round, "no market, skipping settle");
            return;
        };

        let steps: Vec<Step> = if locked {
            vec![Step::Settle(winner)]
        } else {
            vec![
                Step::CheckStakes,
                Step::Seed,
                Step::Lock,
                Step::Settle(winner),
            ]
        };

        let ledger = Arc::clone(&self.ledger);
        tokio::spawn(async move {
            match run_pipeline(ledger.as_ref(), market, &steps).await {
                Ok(PipelineOutcome::Completed) => {
                    info!(target: "runtime::settlement", round, market, %winner, "market settled");
                }
                Ok(PipelineOutcome::NoStakes) => {
                    debug!(target: "runtime::settlement", round, market, "no stakes, skipping settle");
                }
                Err(error) => {
                    warn!(target: "runtime::settlement", round, market, %error, "settle pipeline failed");
                }
            }
        });
    }

    async fn market_for(&self, round: u64) -> Option<MarketId> {
        let state = self.state.lock().await;
        (state.round == round).then_some(state.market).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{InMemoryLedger, LedgerCall, LedgerOp};

    #[tokio::test]
    async fn pipeline_runs_every_step_in_order() {
        let ledger = InMemoryLedger::new().with_stakes(true);
        let steps = [
            Step::CheckStakes,
            Step::Seed,
            Step::Lock,
            Step::Settle(Side::Impostors),
        ];

        let outcome = run_pipeline(&ledger, 3, &steps).await.unwrap();

        assert_eq!(outcome, PipelineOutcome::Completed);
        assert_eq!(
            ledger.calls(),
            [
                LedgerCall::HasStakes(3),
                LedgerCall::Seed(3),
                LedgerCall::Lock(3),
                LedgerCall::Settle(3, Side::Impostors),
            ]
        );
    }

    #[tokio::test]
    async fn no_stakes_stops_before_writing() {
        let ledger = InMemoryLedger::new();
        let outcome = run_pipeline(&ledger, 1, &ON_LOCK).await.unwrap();
        assert_eq!(outcome, PipelineOutcome::NoStakes);
        assert_eq!(ledger.calls(), [LedgerCall::HasStakes(1)]);
    }

    #[tokio::test]
    async fn failed_step_short_circuits() {
        let ledger = InMemoryLedger::new().with_stakes(true);
        ledger.fail_on(Some(LedgerOp::Seed));

        let result = run_pipeline(&ledger, 2, &ON_LOCK).await;

        assert!(matches!(
            result,
            Err(LedgerError::Rejected {
                op: LedgerOp::Seed,
                market: 2
            })
        ));
        assert_eq!(
            ledger.calls(),
            [LedgerCall::HasStakes(2), LedgerCall::Seed(2)]
        );
    }
}
