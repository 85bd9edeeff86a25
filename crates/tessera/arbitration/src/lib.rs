//! Tessera Arbitration - the dispute lifecycle.
//!
//! An arbitration is opened with a complaint and resolved exactly once by the
//! arbiter. `Open --resolve--> Resolved` is the only transition; there is no
//! reopening, partial resolution or timeout.
//!
//! The complaint and the outcome are stored in separate fields.
//! [`ArbitrationView`] exposes the single `resolution` field callers observe:
//! the complaint while open, the outcome once resolved.

#![deny(unsafe_code)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_types::{ArbitrationId, LedgerError, PrincipalId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationStatus {
    Open,
    Resolved,
}

/// A dispute record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arbitration {
    pub id: ArbitrationId,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub status: ArbitrationStatus,
    pub initiator: PrincipalId,
    pub opened_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<PrincipalId>,
}

impl Arbitration {
    pub fn is_resolved(&self) -> bool {
        self.status == ArbitrationStatus::Resolved
    }

    pub fn view(&self) -> ArbitrationView {
        ArbitrationView {
            resolution: self
                .resolution
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            resolved: self.is_resolved(),
        }
    }
}

/// The `{resolution, resolved}` pair exposed by the `arbitrations(id)` accessor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrationView {
    pub resolution: String,
    pub resolved: bool,
}

/// All arbitrations of one ledger, keyed by sequential id.
///
/// Transitions are staged (validated, returned by value) and committed
/// separately so the owner can emit its event in between.
#[derive(Clone, Debug)]
pub struct ArbitrationBook {
    next_id: ArbitrationId,
    entries: BTreeMap<ArbitrationId, Arbitration>,
}

impl ArbitrationBook {
    pub fn new() -> Self {
        Self {
            next_id: ArbitrationId::FIRST,
            entries: BTreeMap::new(),
        }
    }

    /// The id the next opened arbitration will receive.
    pub fn next_id(&self) -> ArbitrationId {
        self.next_id
    }

    pub fn stage_open(
        &self,
        description: impl Into<String>,
        initiator: PrincipalId,
        at: DateTime<Utc>,
    ) -> Arbitration {
        Arbitration {
            id: self.next_id,
            description: description.into(),
            resolution: None,
            status: ArbitrationStatus::Open,
            initiator,
            opened_at: at,
            resolved_at: None,
            resolved_by: None,
        }
    }

    pub fn stage_resolution(
        &self,
        id: ArbitrationId,
        resolution: impl Into<String>,
        arbiter: PrincipalId,
        at: DateTime<Utc>,
    ) -> Result<Arbitration, LedgerError> {
        let current = self
            .entries
            .get(&id)
            .ok_or(LedgerError::ArbitrationNotFound(id))?;
        if current.is_resolved() {
            return Err(LedgerError::AlreadyResolved(id));
        }

        Ok(Arbitration {
            resolution: Some(resolution.into()),
            status: ArbitrationStatus::Resolved,
            resolved_at: Some(at),
            resolved_by: Some(arbiter),
            ..current.clone()
        })
    }

    /// Store a staged arbitration, advancing the id counter past it.
    pub fn commit(&mut self, arbitration: Arbitration) {
        if arbitration.id >= self.next_id {
            self.next_id = arbitration.id.next();
        }
        self.entries.insert(arbitration.id, arbitration);
    }

    pub fn get(&self, id: ArbitrationId) -> Option<&Arbitration> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn open(&self) -> impl Iterator<Item = &Arbitration> {
        self.entries.values().filter(|a| !a.is_resolved())
    }

    pub fn initiated_by<'a>(
        &'a self,
        initiator: &'a PrincipalId,
    ) -> impl Iterator<Item = &'a Arbitration> + 'a {
        self.entries
            .values()
            .filter(move |a| a.initiator == *initiator)
    }
}

impl Default for ArbitrationBook {
    fn default() -> Self {
        Self::new()
    }
}
