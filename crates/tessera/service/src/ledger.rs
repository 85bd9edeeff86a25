use std::sync::Arc;

use tessera_access::{AttributeAccessRegistry, AttributeRecord, DataItem};
use tessera_arbitration::{Arbitration, ArbitrationView};
use tessera_core::{
    Clock, ControllerAuthority, EventSink, MemoryEventLog, PrincipalSummary, SystemClock,
};
use tessera_reputation::{DataRecord, ReputationLedger};
use tessera_types::{
    ArbitrationId, Clearance, DataId, EventRecord, LedgerError, Operation, PrincipalId,
    Sensitivity,
};
use tracing::{debug, info};

use crate::call::{CallOutcome, LedgerCall, SignedCall};
use crate::config::TesseraConfig;
use crate::error::ConfigError;
use crate::tiers::ReputationTiers;

/// Both subsystems behind one configuration, one clock and one event log.
///
/// The attribute registry and the reputation ledger keep separate state; the
/// facade only routes calls and owns the shared event log.
pub struct TesseraLedger {
    access: AttributeAccessRegistry,
    reputation: ReputationLedger,
    tiers: ReputationTiers,
    events: Arc<MemoryEventLog>,
}

impl TesseraLedger {
    pub fn from_config(config: &TesseraConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &TesseraConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        let authority = ControllerAuthority::new(config.controller());
        let events = Arc::new(MemoryEventLog::new());
        let sink: Arc<dyn EventSink> = events.clone();

        let access = AttributeAccessRegistry::new(authority.clone())
            .with_clock(clock.clone())
            .with_sink(sink.clone())
            .with_token_ttl(config.token_ttl());
        let reputation = ReputationLedger::new(authority)
            .with_clock(clock)
            .with_sink(sink)
            .with_bounds(config.reputation_bounds());

        info!(
            controller = %config.authority.controller,
            token_ttl_secs = ?config.token.ttl_secs,
            "Tessera ledger initialized"
        );

        Ok(Self {
            access,
            reputation,
            tiers: config.tiers()?,
            events,
        })
    }

    pub fn access(&self) -> &AttributeAccessRegistry {
        &self.access
    }

    pub fn reputation_ledger(&self) -> &ReputationLedger {
        &self.reputation
    }

    pub fn tiers(&self) -> &ReputationTiers {
        &self.tiers
    }

    // ── Attribute Access Registry ─────────────────────────────────────

    pub fn register_user(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
        clearance: Clearance,
    ) -> Result<(), LedgerError> {
        self.access.register_user(caller, principal, clearance)
    }

    pub fn grant_token(&self, caller: &PrincipalId, principal: PrincipalId) -> Result<(), LedgerError> {
        self.access.grant_token(caller, principal)
    }

    pub fn revoke_token(&self, caller: &PrincipalId, principal: PrincipalId) -> Result<(), LedgerError> {
        self.access.revoke_token(caller, principal)
    }

    pub fn add_data(
        &self,
        caller: &PrincipalId,
        data_id: DataId,
        required_sensitivity: Sensitivity,
        description: impl Into<String>,
    ) -> Result<(), LedgerError> {
        self.access
            .add_data(caller, data_id, required_sensitivity, description)
    }

    pub fn request_data_access(
        &self,
        caller: &PrincipalId,
        data_id: DataId,
    ) -> Result<DataItem, LedgerError> {
        self.access.request_data_access(caller, data_id)
    }

    // ── Reputation & Arbitration Ledger ───────────────────────────────

    pub fn upload_data(
        &self,
        caller: &PrincipalId,
        id: DataId,
        metadata: impl Into<String>,
    ) -> Result<(), LedgerError> {
        self.reputation.upload_data(caller, id, metadata)
    }

    pub fn grant_access(&self, caller: &PrincipalId, principal: PrincipalId) -> Result<(), LedgerError> {
        self.reputation.grant_access(caller, principal)
    }

    pub fn revoke_access(&self, caller: &PrincipalId, principal: PrincipalId) -> Result<(), LedgerError> {
        self.reputation.revoke_access(caller, principal)
    }

    pub fn update_reputation(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
        value: i64,
    ) -> Result<(), LedgerError> {
        self.reputation.update_reputation(caller, principal, value)
    }

    pub fn initiate_arbitration(
        &self,
        caller: &PrincipalId,
        description: impl Into<String>,
    ) -> Result<ArbitrationId, LedgerError> {
        self.reputation.initiate_arbitration(caller, description)
    }

    pub fn resolve_arbitration(
        &self,
        caller: &PrincipalId,
        id: ArbitrationId,
        resolution: impl Into<String>,
    ) -> Result<(), LedgerError> {
        self.reputation.resolve_arbitration(caller, id, resolution)
    }

    pub fn data_registry(&self, id: DataId) -> Result<Option<DataRecord>, LedgerError> {
        self.reputation.data_registry(id)
    }

    pub fn access_control(&self, principal: &PrincipalId) -> Result<bool, LedgerError> {
        self.reputation.access_control(principal)
    }

    pub fn reputation(&self, principal: &PrincipalId) -> Result<i64, LedgerError> {
        self.reputation.reputation(principal)
    }

    pub fn arbitrations(&self, id: ArbitrationId) -> Result<Option<ArbitrationView>, LedgerError> {
        self.reputation.arbitrations(id)
    }

    pub fn arbitration(&self, id: ArbitrationId) -> Result<Option<Arbitration>, LedgerError> {
        self.reputation.arbitration(id)
    }

    // ── Cross-subsystem ───────────────────────────────────────────────

    /// Register `principal` in the attribute registry at the clearance its
    /// current reputation earns under the configured tiers.
    pub fn sync_clearance_from_reputation(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
    ) -> Result<Clearance, LedgerError> {
        self.access
            .authority()
            .authorize(caller, Operation::SyncClearance)?;

        let score = self.reputation.reputation(&principal)?;
        let clearance = self.tiers.clearance_for(score);
        debug!(principal = %principal, reputation = score, clearance = clearance.0, "Clearance derived");

        self.access.register_user(caller, principal, clearance)?;
        Ok(clearance)
    }

    /// Both subsystems' view of `principal`.
    pub fn principal_summary(&self, principal: &PrincipalId) -> Result<PrincipalSummary, LedgerError> {
        PrincipalSummary::collect(principal, &self.access, &self.reputation)
    }

    /// Committed events in order.
    pub fn events(&self) -> Result<Vec<EventRecord>, LedgerError> {
        self.events.records()
    }

    pub fn events_since(&self, sequence: u64) -> Result<Vec<EventRecord>, LedgerError> {
        self.events.since(sequence)
    }

    /// Apply one authenticated call.
    pub fn execute(&self, signed: &SignedCall) -> Result<CallOutcome, LedgerError> {
        let caller = &signed.caller;
        match signed.call.clone() {
            LedgerCall::RegisterUser {
                principal,
                clearance,
            } => self
                .register_user(caller, principal, clearance)
                .map(|_| CallOutcome::Committed),
            LedgerCall::GrantToken { principal } => self
                .grant_token(caller, principal)
                .map(|_| CallOutcome::Committed),
            LedgerCall::RevokeToken { principal } => self
                .revoke_token(caller, principal)
                .map(|_| CallOutcome::Committed),
            LedgerCall::AddData {
                data_id,
                sensitivity,
                description,
            } => self
                .add_data(caller, data_id, sensitivity, description)
                .map(|_| CallOutcome::Committed),
            LedgerCall::RequestDataAccess { data_id } => self
                .request_data_access(caller, data_id)
                .map(|item| CallOutcome::AccessGranted { item }),
            LedgerCall::UploadData { data_id, metadata } => self
                .upload_data(caller, data_id, metadata)
                .map(|_| CallOutcome::Committed),
            LedgerCall::GrantAccess { principal } => self
                .grant_access(caller, principal)
                .map(|_| CallOutcome::Committed),
            LedgerCall::RevokeAccess { principal } => self
                .revoke_access(caller, principal)
                .map(|_| CallOutcome::Committed),
            LedgerCall::UpdateReputation { principal, value } => self
                .update_reputation(caller, principal, value)
                .map(|_| CallOutcome::Committed),
            LedgerCall::InitiateArbitration { description } => self
                .initiate_arbitration(caller, description)
                .map(|arbitration_id| CallOutcome::ArbitrationOpened { arbitration_id }),
            LedgerCall::ResolveArbitration {
                arbitration_id,
                resolution,
            } => self
                .resolve_arbitration(caller, arbitration_id, resolution)
                .map(|_| CallOutcome::Committed),
            LedgerCall::SyncClearance { principal } => self
                .sync_clearance_from_reputation(caller, principal)
                .map(|clearance| CallOutcome::ClearanceSynced { clearance }),
            LedgerCall::DataRegistry { data_id } => self
                .data_registry(data_id)
                .map(|record| CallOutcome::DataRecord { record }),
            LedgerCall::AccessControl { principal } => self
                .access_control(&principal)
                .map(|has_access| CallOutcome::AccessFlag { has_access }),
            LedgerCall::Reputation { principal } => self
                .reputation(&principal)
                .map(|reputation| CallOutcome::Reputation { reputation }),
            LedgerCall::Arbitrations { arbitration_id } => self
                .arbitrations(arbitration_id)
                .map(|view| CallOutcome::Arbitration { view }),
            LedgerCall::Principal { principal } => {
                let summary = self.principal_summary(&principal)?;
                let attributes: Option<AttributeRecord> = self.access.principal(&principal)?;
                Ok(CallOutcome::Principal {
                    summary,
                    attributes,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::ErrorKind;

    fn ledger() -> (TesseraLedger, PrincipalId) {
        let config = TesseraConfig::default();
        let admin = config.controller();
        (TesseraLedger::from_config(&config).unwrap(), admin)
    }

    #[test]
    fn both_subsystems_share_one_event_log() {
        let (ledger, admin) = ledger();
        let u = PrincipalId::new("u");
        ledger.register_user(&admin, u.clone(), Clearance(1)).unwrap();
        ledger.grant_access(&admin, u).unwrap();

        let events = ledger.events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);
        assert_eq!(events[1].name(), "AccessGranted");
    }

    #[test]
    fn events_since_returns_the_unseen_tail() {
        let (ledger, admin) = ledger();
        let u = PrincipalId::new("u");
        ledger.register_user(&admin, u.clone(), Clearance(1)).unwrap();
        ledger.update_reputation(&admin, u.clone(), 7).unwrap();
        ledger.grant_access(&admin, u).unwrap();

        let tail = ledger.events_since(1).unwrap();
        let names: Vec<_> = tail.iter().map(|record| record.name()).collect();
        assert_eq!(names, vec!["ReputationUpdated", "AccessGranted"]);
        assert!(ledger.events_since(3).unwrap().is_empty());
    }

    #[test]
    fn subsystems_do_not_share_principals() {
        let (ledger, admin) = ledger();
        let u = PrincipalId::new("u");
        ledger.grant_access(&admin, u.clone()).unwrap();

        let summary = ledger.principal_summary(&u).unwrap();
        assert!(summary.has_access);
        assert!(!summary.has_token);
        assert_eq!(summary.clearance, None);
    }

    #[test]
    fn clearance_follows_reputation_tiers() {
        let (ledger, admin) = ledger();
        let u = PrincipalId::new("u");

        assert_eq!(ledger.tiers(), &ReputationTiers::standard());
        ledger.update_reputation(&admin, u.clone(), 55).unwrap();
        let clearance = ledger
            .sync_clearance_from_reputation(&admin, u.clone())
            .unwrap();
        assert_eq!(clearance, Clearance(2));
        assert_eq!(ledger.principal_summary(&u).unwrap().clearance, Some(Clearance(2)));
        assert_eq!(ledger.events().unwrap().last().unwrap().name(), "PrincipalRegistered");
    }

    #[test]
    fn sync_is_gated() {
        let (ledger, _) = ledger();
        let u = PrincipalId::new("u");
        let err = ledger
            .sync_clearance_from_reputation(&u, u.clone())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(ledger.events().unwrap().is_empty());
    }

    #[test]
    fn execute_routes_calls() {
        let (ledger, admin) = ledger();
        let opened = ledger
            .execute(&SignedCall {
                caller: PrincipalId::new("anyone"),
                call: LedgerCall::InitiateArbitration {
                    description: "Dispute description".into(),
                },
            })
            .unwrap();
        assert_eq!(
            opened,
            CallOutcome::ArbitrationOpened {
                arbitration_id: ArbitrationId(1)
            }
        );

        let view = ledger
            .execute(&SignedCall {
                caller: admin,
                call: LedgerCall::Arbitrations {
                    arbitration_id: ArbitrationId(1),
                },
            })
            .unwrap();
        assert_eq!(
            view,
            CallOutcome::Arbitration {
                view: Some(ArbitrationView {
                    resolution: "Dispute description".into(),
                    resolved: false,
                })
            }
        );
    }
}
