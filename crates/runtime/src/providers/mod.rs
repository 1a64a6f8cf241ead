//! Collaborators the runtime talks to at the edges of a round.
//!
//! Both are trait objects so hosts can plug in real services while tests and
//! headless runs use the in-memory versions.

mod identity;
mod ledger;

pub use identity::{ChatLine, FeedError, IdentityFeed, StaticIdentityFeed};
pub use ledger::{InMemoryLedger, LedgerCall, LedgerError, LedgerOp, MarketId, WagerLedger};
