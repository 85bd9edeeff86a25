use serde::{Deserialize, Serialize};
use tessera_types::{LedgerError, Operation, PrincipalId};
use tracing::warn;

/// The single identity allowed to perform gated operations on a subsystem.
///
/// Configured once at construction; there is no ambient "deployer" state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerAuthority {
    controller: PrincipalId,
}

impl ControllerAuthority {
    pub fn new(controller: PrincipalId) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &PrincipalId {
        &self.controller
    }

    pub fn is_controller(&self, caller: &PrincipalId) -> bool {
        *caller == self.controller
    }

    /// Reject `caller` unless it is the controller.
    pub fn authorize(&self, caller: &PrincipalId, operation: Operation) -> Result<(), LedgerError> {
        if self.is_controller(caller) {
            return Ok(());
        }

        warn!(caller = %caller, operation = %operation, "Gated call rejected");
        Err(LedgerError::Unauthorized {
            caller: caller.clone(),
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::ErrorKind;

    #[test]
    fn controller_is_authorized() {
        let authority = ControllerAuthority::new(PrincipalId::new("admin"));
        assert!(authority
            .authorize(&PrincipalId::new("admin"), Operation::GrantAccess)
            .is_ok());
    }

    #[test]
    fn anyone_else_is_unauthorized() {
        let authority = ControllerAuthority::new(PrincipalId::new("admin"));
        let err = authority
            .authorize(&PrincipalId::new("bob"), Operation::UpdateReputation)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(matches!(
            err,
            LedgerError::Unauthorized {
                operation: Operation::UpdateReputation,
                ..
            }
        ));
    }
}
