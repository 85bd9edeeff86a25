//! # tessera-core
//!
//! Building blocks shared by the Attribute Access Registry and the
//! Reputation & Arbitration Ledger.
//!
//! - **ControllerAuthority**: the explicit identity allowed to perform gated
//!   operations, checked at the top of every gated call
//! - **PrincipalTable**: per-subsystem principal storage with staged updates
//! - **PrincipalRegistry**: read capability set (clearance, credential,
//!   reputation) implemented by both subsystems over their own state
//! - **EventSink**: exactly-once delivery of committed events
//! - **Clock**: injectable time source for token expiry and timestamps

#![deny(unsafe_code)]

pub mod authority;
pub mod clock;
pub mod registry;
pub mod sink;
pub mod table;

pub use authority::ControllerAuthority;
pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::{PrincipalRegistry, PrincipalSummary};
pub use sink::{EventSink, MemoryEventLog, TracingEventSink};
pub use table::PrincipalTable;
