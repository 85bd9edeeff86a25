//! Authenticated calls as delivered by the substrate.
//!
//! A [`SignedCall`] pairs the authenticated caller with one operation. The
//! ledger applies it as a single all-or-nothing transition and answers with a
//! [`CallOutcome`].

use serde::{Deserialize, Serialize};
use tessera_access::{AttributeRecord, DataItem};
use tessera_arbitration::ArbitrationView;
use tessera_core::PrincipalSummary;
use tessera_reputation::DataRecord;
use tessera_types::{ArbitrationId, Clearance, DataId, PrincipalId, Sensitivity};

/// One call with its authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    pub caller: PrincipalId,
    #[serde(flatten)]
    pub call: LedgerCall,
}

/// Every operation and accessor the ledger exposes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerCall {
    RegisterUser {
        principal: PrincipalId,
        clearance: Clearance,
    },
    GrantToken {
        principal: PrincipalId,
    },
    RevokeToken {
        principal: PrincipalId,
    },
    AddData {
        data_id: DataId,
        sensitivity: Sensitivity,
        description: String,
    },
    RequestDataAccess {
        data_id: DataId,
    },
    UploadData {
        data_id: DataId,
        metadata: String,
    },
    GrantAccess {
        principal: PrincipalId,
    },
    RevokeAccess {
        principal: PrincipalId,
    },
    UpdateReputation {
        principal: PrincipalId,
        value: i64,
    },
    InitiateArbitration {
        description: String,
    },
    ResolveArbitration {
        arbitration_id: ArbitrationId,
        resolution: String,
    },
    SyncClearance {
        principal: PrincipalId,
    },
    DataRegistry {
        data_id: DataId,
    },
    AccessControl {
        principal: PrincipalId,
    },
    Reputation {
        principal: PrincipalId,
    },
    Arbitrations {
        arbitration_id: ArbitrationId,
    },
    Principal {
        principal: PrincipalId,
    },
}

impl LedgerCall {
    /// Accessors never change state.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            LedgerCall::RequestDataAccess { .. }
                | LedgerCall::DataRegistry { .. }
                | LedgerCall::AccessControl { .. }
                | LedgerCall::Reputation { .. }
                | LedgerCall::Arbitrations { .. }
                | LedgerCall::Principal { .. }
        )
    }
}

/// Successful answer to a call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CallOutcome {
    Committed,
    AccessGranted {
        item: DataItem,
    },
    ArbitrationOpened {
        arbitration_id: ArbitrationId,
    },
    ClearanceSynced {
        clearance: Clearance,
    },
    DataRecord {
        record: Option<DataRecord>,
    },
    AccessFlag {
        has_access: bool,
    },
    Reputation {
        reputation: i64,
    },
    Arbitration {
        view: Option<ArbitrationView>,
    },
    Principal {
        summary: PrincipalSummary,
        #[serde(skip_serializing_if = "Option::is_none")]
        attributes: Option<AttributeRecord>,
    },
}
