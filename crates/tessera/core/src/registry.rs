use serde::{Deserialize, Serialize};
use tessera_types::{Clearance, LedgerError, PrincipalId};

/// Read capability set over a subsystem's principal records.
///
/// Each subsystem implements the capabilities it actually tracks over its own
/// storage. Capabilities a subsystem does not track report `None`.
pub trait PrincipalRegistry {
    fn is_known(&self, principal: &PrincipalId) -> Result<bool, LedgerError>;

    /// Whether the principal currently holds this subsystem's credential
    /// (an unexpired token in the AAR, the access flag in the RAL).
    fn holds_credential(&self, principal: &PrincipalId) -> Result<bool, LedgerError>;

    fn clearance_of(&self, principal: &PrincipalId) -> Result<Option<Clearance>, LedgerError> {
        let _ = principal;
        Ok(None)
    }

    fn reputation_of(&self, principal: &PrincipalId) -> Result<Option<i64>, LedgerError> {
        let _ = principal;
        Ok(None)
    }

    fn require_known(&self, principal: &PrincipalId) -> Result<(), LedgerError> {
        if self.is_known(principal)? {
            Ok(())
        } else {
            Err(LedgerError::PrincipalNotRegistered(principal.clone()))
        }
    }
}

/// A principal as seen across both subsystems.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalSummary {
    pub principal: PrincipalId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearance: Option<Clearance>,
    pub has_token: bool,
    pub has_access: bool,
    pub reputation: i64,
}

impl PrincipalSummary {
    /// Merge the capability sets of an attribute registry and a reputation
    /// ledger without either one seeing the other's state.
    pub fn collect(
        principal: &PrincipalId,
        attributes: &impl PrincipalRegistry,
        reputation: &impl PrincipalRegistry,
    ) -> Result<Self, LedgerError> {
        Ok(Self {
            principal: principal.clone(),
            clearance: attributes.clearance_of(principal)?,
            has_token: attributes.holds_credential(principal)?,
            has_access: reputation.holds_credential(principal)?,
            reputation: reputation.reputation_of(principal)?.unwrap_or_default(),
        })
    }
}
