use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tessera_arbitration::{Arbitration, ArbitrationBook, ArbitrationView};
use tessera_core::{
    Clock, ControllerAuthority, EventSink, PrincipalRegistry, PrincipalTable, SystemClock,
    TracingEventSink,
};
use tessera_types::{ArbitrationId, DataId, LedgerError, LedgerEvent, Operation, PrincipalId};
use tracing::{info, warn};

use crate::bounds::ReputationBounds;
use crate::record::{DataRecord, ReputationRecord};

/// The Reputation & Arbitration Ledger.
pub struct ReputationLedger {
    authority: ControllerAuthority,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    bounds: ReputationBounds,
    state: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    principals: PrincipalTable<ReputationRecord>,
    data: BTreeMap<DataId, DataRecord>,
    arbitrations: ArbitrationBook,
}

impl ReputationLedger {
    pub fn new(authority: ControllerAuthority) -> Self {
        Self {
            authority,
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingEventSink::new()),
            bounds: ReputationBounds::unbounded(),
            state: RwLock::new(LedgerState::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_bounds(mut self, bounds: ReputationBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn authority(&self) -> &ControllerAuthority {
        &self.authority
    }

    /// Record metadata for `id`, owned by the caller.
    pub fn upload_data(
        &self,
        caller: &PrincipalId,
        id: DataId,
        metadata: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let mut state = self.write()?;

        if state.data.contains_key(&id) {
            warn!(data_id = id.0, owner = %caller, "Duplicate upload rejected");
            return Err(LedgerError::DuplicateId(id));
        }

        let now = self.clock.now();
        let record = DataRecord {
            id,
            metadata: metadata.into(),
            owner: caller.clone(),
            uploaded_at: now,
        };

        self.sink.emit(
            now,
            LedgerEvent::DataUploaded {
                id,
                metadata: record.metadata.clone(),
                owner: caller.clone(),
            },
        )?;

        info!(data_id = id.0, owner = %caller, "Data uploaded");
        state.data.insert(id, record);
        Ok(())
    }

    pub fn grant_access(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
    ) -> Result<(), LedgerError> {
        self.set_access(caller, principal, true)
    }

    pub fn revoke_access(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
    ) -> Result<(), LedgerError> {
        self.set_access(caller, principal, false)
    }

    fn set_access(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
        has_access: bool,
    ) -> Result<(), LedgerError> {
        let operation = if has_access {
            Operation::GrantAccess
        } else {
            Operation::RevokeAccess
        };
        self.authority.authorize(caller, operation)?;
        let mut state = self.write()?;

        let record = state
            .principals
            .staged(&principal, |r| r.has_access = has_access);

        let event = if has_access {
            LedgerEvent::AccessGranted {
                principal: principal.clone(),
                actor: caller.clone(),
            }
        } else {
            LedgerEvent::AccessRevoked {
                principal: principal.clone(),
                actor: caller.clone(),
            }
        };
        self.sink.emit(self.clock.now(), event)?;

        info!(principal = %principal, has_access, "Access flag set");
        state.principals.commit(principal, record);
        Ok(())
    }

    /// Overwrite `principal`'s reputation with `value`.
    pub fn update_reputation(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
        value: i64,
    ) -> Result<(), LedgerError> {
        self.authority.authorize(caller, Operation::UpdateReputation)?;
        self.bounds.check(value)?;
        let mut state = self.write()?;

        let record = state
            .principals
            .staged(&principal, |r| r.reputation = value);

        self.sink.emit(
            self.clock.now(),
            LedgerEvent::ReputationUpdated {
                principal: principal.clone(),
                reputation: value,
                actor: caller.clone(),
            },
        )?;

        info!(principal = %principal, reputation = value, "Reputation updated");
        state.principals.commit(principal, record);
        Ok(())
    }

    /// Open a dispute. Any principal may initiate one.
    pub fn initiate_arbitration(
        &self,
        caller: &PrincipalId,
        description: impl Into<String>,
    ) -> Result<ArbitrationId, LedgerError> {
        let mut state = self.write()?;

        let now = self.clock.now();
        let arbitration = state
            .arbitrations
            .stage_open(description, caller.clone(), now);
        let id = arbitration.id;

        self.sink.emit(
            now,
            LedgerEvent::ArbitrationInitiated {
                id,
                description: arbitration.description.clone(),
                initiator: caller.clone(),
            },
        )?;

        info!(arbitration_id = id.0, initiator = %caller, "Arbitration initiated");
        state.arbitrations.commit(arbitration);
        Ok(id)
    }

    /// Close an open dispute with the arbiter's outcome.
    pub fn resolve_arbitration(
        &self,
        caller: &PrincipalId,
        id: ArbitrationId,
        resolution: impl Into<String>,
    ) -> Result<(), LedgerError> {
        self.authority
            .authorize(caller, Operation::ResolveArbitration)?;
        let mut state = self.write()?;

        let now = self.clock.now();
        let arbitration = state
            .arbitrations
            .stage_resolution(id, resolution, caller.clone(), now)
            .inspect_err(|err| warn!(arbitration_id = id.0, %err, "Resolution rejected"))?;

        self.sink.emit(
            now,
            LedgerEvent::ArbitrationResolved {
                id,
                resolution: arbitration.resolution.clone().unwrap_or_default(),
                arbiter: caller.clone(),
            },
        )?;

        info!(arbitration_id = id.0, arbiter = %caller, "Arbitration resolved");
        state.arbitrations.commit(arbitration);
        Ok(())
    }

    /// `dataRegistry(id)`: the uploaded record, if any.
    pub fn data_registry(&self, id: DataId) -> Result<Option<DataRecord>, LedgerError> {
        Ok(self.read()?.data.get(&id).cloned())
    }

    /// `accessControl(principal)`: `false` for principals never granted.
    pub fn access_control(&self, principal: &PrincipalId) -> Result<bool, LedgerError> {
        Ok(self
            .read()?
            .principals
            .get(principal)
            .is_some_and(|r| r.has_access))
    }

    /// `reputation(principal)`: `0` for principals never scored.
    pub fn reputation(&self, principal: &PrincipalId) -> Result<i64, LedgerError> {
        Ok(self
            .read()?
            .principals
            .get(principal)
            .map(|r| r.reputation)
            .unwrap_or_default())
    }

    /// `arbitrations(id)`: the `{resolution, resolved}` view.
    pub fn arbitrations(&self, id: ArbitrationId) -> Result<Option<ArbitrationView>, LedgerError> {
        Ok(self.read()?.arbitrations.get(id).map(Arbitration::view))
    }

    /// The full dispute record, including complaint and outcome.
    pub fn arbitration(&self, id: ArbitrationId) -> Result<Option<Arbitration>, LedgerError> {
        Ok(self.read()?.arbitrations.get(id).cloned())
    }

    pub fn open_arbitrations(&self) -> Result<Vec<Arbitration>, LedgerError> {
        Ok(self.read()?.arbitrations.open().cloned().collect())
    }

    pub fn arbitrations_by(&self, initiator: &PrincipalId) -> Result<Vec<Arbitration>, LedgerError> {
        Ok(self
            .read()?
            .arbitrations
            .initiated_by(initiator)
            .cloned()
            .collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.state
            .read()
            .map_err(|_| LedgerError::LockPoisoned("reputation ledger"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.state
            .write()
            .map_err(|_| LedgerError::LockPoisoned("reputation ledger"))
    }
}

impl PrincipalRegistry for ReputationLedger {
    fn is_known(&self, principal: &PrincipalId) -> Result<bool, LedgerError> {
        Ok(self.read()?.principals.contains(principal))
    }

    fn holds_credential(&self, principal: &PrincipalId) -> Result<bool, LedgerError> {
        self.access_control(principal)
    }

    fn reputation_of(&self, principal: &PrincipalId) -> Result<Option<i64>, LedgerError> {
        Ok(self
            .read()?
            .principals
            .get(principal)
            .map(|r| r.reputation))
    }
}
