//! Tessera Types - the shared vocabulary of the data-sharing ledger.
//!
//! Both subsystems (the Attribute Access Registry and the Reputation &
//! Arbitration Ledger) speak in these types, but they never share state.

#![deny(unsafe_code)]

pub mod error;
pub mod event;
pub mod ids;
pub mod level;

pub use error::{DenialReason, ErrorKind, LedgerError, Operation};
pub use event::{EventRecord, LedgerEvent};
pub use ids::{ArbitrationId, DataId, PrincipalId};
pub use level::{Clearance, Sensitivity, SensitivityTier};
