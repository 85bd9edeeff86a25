//! Tessera Reputation - the Reputation & Arbitration Ledger (RAL).
//!
//! Tracks data uploads, binary access flags and a settable reputation score
//! per principal, and hosts the dispute lifecycle from `tessera-arbitration`.
//! Access flags, reputation and dispute resolution are controller-gated;
//! uploads and opening a dispute are open to any caller.

#![deny(unsafe_code)]

mod bounds;
mod ledger;
mod record;

pub use bounds::ReputationBounds;
pub use ledger::ReputationLedger;
pub use record::{DataRecord, ReputationRecord};
pub use tessera_arbitration::{Arbitration, ArbitrationStatus, ArbitrationView};
