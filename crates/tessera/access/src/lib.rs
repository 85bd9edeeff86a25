//! Tessera Access - the Attribute Access Registry (AAR).
//!
//! Principals are registered with a clearance level and issued access
//! tokens; data items are registered with a required sensitivity. A request
//! succeeds iff the caller holds a valid token and its clearance covers the
//! item's sensitivity. Requests are read-only.

#![deny(unsafe_code)]

mod record;
mod registry;

pub use record::{AttributeRecord, DataItem, TokenState};
pub use registry::AttributeAccessRegistry;
