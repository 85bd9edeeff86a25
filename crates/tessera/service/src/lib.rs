//! Tessera Service - the configured data-sharing ledger.
//!
//! Wires the Attribute Access Registry and the Reputation & Arbitration
//! Ledger to one controller, one clock and one event log, and accepts
//! authenticated calls in the shape the substrate delivers them.

#![deny(unsafe_code)]

pub mod call;
pub mod config;
pub mod error;
pub mod ledger;
pub mod tiers;

pub use call::{CallOutcome, LedgerCall, SignedCall};
pub use config::{AuthorityConfig, LoggingConfig, ReputationConfig, TesseraConfig, TokenConfig};
pub use error::ConfigError;
pub use ledger::TesseraLedger;
pub use tiers::{ReputationTier, ReputationTiers};
