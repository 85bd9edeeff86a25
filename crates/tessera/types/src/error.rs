use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{ArbitrationId, DataId, PrincipalId};
use crate::level::{Clearance, Sensitivity};

/// Errors surfaced by every ledger operation.
///
/// An error always means the call was aborted: no state changed and no event
/// was emitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("duplicate id: {0} is already registered")]
    DuplicateId(DataId),

    #[error("data not found: {0}")]
    DataNotFound(DataId),

    #[error("principal not registered: {0}")]
    PrincipalNotRegistered(PrincipalId),

    #[error("arbitration not found: {0}")]
    ArbitrationNotFound(ArbitrationId),

    #[error("unauthorized: {caller} may not {operation}")]
    Unauthorized {
        caller: PrincipalId,
        operation: Operation,
    },

    #[error("access denied: {principal} on data {data_id}: {reason}")]
    AccessDenied {
        principal: PrincipalId,
        data_id: DataId,
        reason: DenialReason,
    },

    #[error("arbitration already resolved: {0}")]
    AlreadyResolved(ArbitrationId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::DuplicateId(_) => ErrorKind::DuplicateId,
            LedgerError::DataNotFound(_)
            | LedgerError::PrincipalNotRegistered(_)
            | LedgerError::ArbitrationNotFound(_) => ErrorKind::NotFound,
            LedgerError::Unauthorized { .. } => ErrorKind::Unauthorized,
            LedgerError::AccessDenied { .. } => ErrorKind::AccessDenied,
            LedgerError::AlreadyResolved(_) => ErrorKind::AlreadyResolved,
            LedgerError::InvalidInput(_) => ErrorKind::InvalidInput,
            LedgerError::LockPoisoned(_) => ErrorKind::Internal,
        }
    }
}

/// Coarse error classification reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    DuplicateId,
    NotFound,
    Unauthorized,
    AccessDenied,
    AlreadyResolved,
    InvalidInput,
    Internal,
}

/// Why a clearance/token check refused a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    MissingToken,
    TokenExpired,
    InsufficientClearance {
        clearance: Clearance,
        required: Sensitivity,
    },
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::MissingToken => write!(f, "no access token held"),
            DenialReason::TokenExpired => write!(f, "access token expired"),
            DenialReason::InsufficientClearance {
                clearance,
                required,
            } => write!(f, "clearance {} below required {}", clearance, required),
        }
    }
}

/// Gated operations, named for authorization failures and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    RegisterUser,
    GrantToken,
    RevokeToken,
    AddData,
    GrantAccess,
    RevokeAccess,
    UpdateReputation,
    ResolveArbitration,
    SyncClearance,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::RegisterUser => "register_user",
            Operation::GrantToken => "grant_token",
            Operation::RevokeToken => "revoke_token",
            Operation::AddData => "add_data",
            Operation::GrantAccess => "grant_access",
            Operation::RevokeAccess => "revoke_access",
            Operation::UpdateReputation => "update_reputation",
            Operation::ResolveArbitration => "resolve_arbitration",
            Operation::SyncClearance => "sync_clearance",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
