use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ArbitrationId, DataId, PrincipalId};
use crate::level::{Clearance, Sensitivity};

/// A committed state change, emitted exactly once per successful call.
///
/// Each variant carries the post-mutation values and the acting principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    PrincipalRegistered {
        principal: PrincipalId,
        clearance: Clearance,
        actor: PrincipalId,
    },
    TokenGranted {
        principal: PrincipalId,
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
        actor: PrincipalId,
    },
    TokenRevoked {
        principal: PrincipalId,
        actor: PrincipalId,
    },
    DataItemAdded {
        id: DataId,
        required_sensitivity: Sensitivity,
        description: String,
        actor: PrincipalId,
    },
    DataUploaded {
        id: DataId,
        metadata: String,
        owner: PrincipalId,
    },
    AccessGranted {
        principal: PrincipalId,
        actor: PrincipalId,
    },
    AccessRevoked {
        principal: PrincipalId,
        actor: PrincipalId,
    },
    ReputationUpdated {
        principal: PrincipalId,
        reputation: i64,
        actor: PrincipalId,
    },
    ArbitrationInitiated {
        id: ArbitrationId,
        description: String,
        initiator: PrincipalId,
    },
    ArbitrationResolved {
        id: ArbitrationId,
        resolution: String,
        arbiter: PrincipalId,
    },
}

impl LedgerEvent {
    /// The event name as observed by external consumers.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::PrincipalRegistered { .. } => "PrincipalRegistered",
            LedgerEvent::TokenGranted { .. } => "TokenGranted",
            LedgerEvent::TokenRevoked { .. } => "TokenRevoked",
            LedgerEvent::DataItemAdded { .. } => "DataItemAdded",
            LedgerEvent::DataUploaded { .. } => "DataUploaded",
            LedgerEvent::AccessGranted { .. } => "AccessGranted",
            LedgerEvent::AccessRevoked { .. } => "AccessRevoked",
            LedgerEvent::ReputationUpdated { .. } => "ReputationUpdated",
            LedgerEvent::ArbitrationInitiated { .. } => "ArbitrationInitiated",
            LedgerEvent::ArbitrationResolved { .. } => "ArbitrationResolved",
        }
    }
}

/// Envelope assigned to an event when it is committed to a sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: uuid::Uuid,
    pub sequence: u64,
    pub emitted_at: DateTime<Utc>,
    pub event: LedgerEvent,
}

impl EventRecord {
    pub fn new(sequence: u64, emitted_at: DateTime<Utc>, event: LedgerEvent) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4(),
            sequence,
            emitted_at,
            event,
        }
    }

    pub fn name(&self) -> &'static str {
        self.event.name()
    }
}
