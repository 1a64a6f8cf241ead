//! Wager ledger: the external betting pool settled at round boundaries.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use strum::Display;
use thiserror::Error;

use game_core::Side;

/// Identifier of one round's betting pool.
pub type MarketId = u64;

/// Ledger operation names, used in errors, call records and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LedgerOp {
    NextMarket,
    HasStakes,
    Seed,
    Lock,
    Settle,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("ledger rejected {op} for market {market}")]
    Rejected { op: LedgerOp, market: MarketId },
}

/// External betting pool keyed by market.
///
/// Every call may fail; callers log and give up for the round.
#[async_trait]
pub trait WagerLedger: Send + Sync {
    /// Market that the next round's wagers go into, if the ledger has one.
    async fn next_market(&self) -> Result<Option<MarketId>, LedgerError>;

    /// Whether anyone besides the house has staked on `market`.
    async fn has_stakes(&self, market: MarketId) -> Result<bool, LedgerError>;

    /// Fund the house side of `market`.
    async fn seed(&self, market: MarketId) -> Result<(), LedgerError>;

    /// Close `market` to new wagers.
    async fn lock(&self, market: MarketId) -> Result<(), LedgerError>;

    /// Pay out `market` to the `winner` side.
    async fn settle(&self, market: MarketId, winner: Side) -> Result<(), LedgerError>;
}

/// One call observed by [`InMemoryLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCall {
    NextMarket,
    HasStakes(MarketId),
    Seed(MarketId),
    Lock(MarketId),
    Settle(MarketId, Side),
}

#[derive(Debug)]
struct LedgerInner {
    calls: Mutex<Vec<LedgerCall>>,
    next_market: AtomicU64,
    staked: AtomicBool,
    fail_on: Mutex<Option<LedgerOp>>,
}

/// Ledger that keeps everything in memory and records each call.
///
/// Clones share state, so a test can keep one clone and hand the other to the
/// runtime.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    inner: Arc<LedgerInner>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    /// Markets are numbered from 1; nobody has staked.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                calls: Mutex::new(Vec::new()),
                next_market: AtomicU64::new(1),
                staked: AtomicBool::new(false),
                fail_on: Mutex::new(None),
            }),
        }
    }

    pub fn with_stakes(self, staked: bool) -> Self {
        self.set_staked(staked);
        self
    }

    pub fn set_staked(&self, staked: bool) {
        self.inner.staked.store(staked, Ordering::SeqCst);
    }

    /// Make every future `op` call fail.
    pub fn fail_on(&self, op: Option<LedgerOp>) {
        *self
            .inner
            .fail_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = op;
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: LedgerCall, op: LedgerOp, market: MarketId) -> Result<(), LedgerError> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        let failing = *self
            .inner
            .fail_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if failing == Some(op) {
            return Err(LedgerError::Rejected { op, market });
        }
        Ok(())
    }
}

#[async_trait]
impl WagerLedger for InMemoryLedger {
    async fn next_market(&self) -> Result<Option<MarketId>, LedgerError> {
        let market = self.inner.next_market.load(Ordering::SeqCst);
        self.record(LedgerCall::NextMarket, LedgerOp::NextMarket, market)?;
        self.inner.next_market.fetch_add(1, Ordering::SeqCst);
        Ok(Some(market))
    }

    async fn has_stakes(&self, market: MarketId) -> Result<bool, LedgerError> {
        self.record(LedgerCall::HasStakes(market), LedgerOp::HasStakes, market)?;
        Ok(self.inner.staked.load(Ordering::SeqCst))
    }

    async fn seed(&self, market: MarketId) -> Result<(), LedgerError> {
        self.record(LedgerCall::Seed(market), LedgerOp::Seed, market)
    }

    async fn lock(&self, market: MarketId) -> Result<(), LedgerError> {
        self.record(LedgerCall::Lock(market), LedgerOp::Lock, market)
    }

    async fn settle(&self, market: MarketId, winner: Side) -> Result<(), LedgerError> {
        self.record(LedgerCall::Settle(market, winner), LedgerOp::Settle, market)
    }
}
