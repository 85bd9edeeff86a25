use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_types::{Clearance, DataId, DenialReason, Sensitivity};

/// A principal as tracked by the attribute registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub clearance: Clearance,
    pub token: TokenState,
}

/// Possession of the access credential.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TokenState {
    #[default]
    Absent,
    Held {
        issued_at: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
    },
}

impl TokenState {
    /// Why the token does not authorize a request at `now`, if it doesn't.
    pub fn denial_at(&self, now: DateTime<Utc>) -> Option<DenialReason> {
        match self {
            TokenState::Absent => Some(DenialReason::MissingToken),
            TokenState::Held {
                expires_at: Some(expiry),
                ..
            } if now >= *expiry => Some(DenialReason::TokenExpired),
            TokenState::Held { .. } => None,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.denial_at(now).is_none()
    }
}

/// A registered piece of data. Immutable once added.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    pub id: DataId,
    pub required_sensitivity: Sensitivity,
    pub description: String,
}

impl AttributeRecord {
    /// Full access check for this principal against `item` at `now`.
    pub fn evaluate(&self, item: &DataItem, now: DateTime<Utc>) -> Result<(), DenialReason> {
        if let Some(reason) = self.token.denial_at(now) {
            return Err(reason);
        }
        if !self.clearance.covers(item.required_sensitivity) {
            return Err(DenialReason::InsufficientClearance {
                clearance: self.clearance,
                required: item.required_sensitivity,
            });
        }
        Ok(())
    }
}
