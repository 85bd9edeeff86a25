use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Duration;
use tessera_core::{
    Clock, ControllerAuthority, EventSink, PrincipalRegistry, PrincipalTable, SystemClock,
    TracingEventSink,
};
use tessera_types::{
    Clearance, DataId, LedgerError, LedgerEvent, Operation, PrincipalId, Sensitivity,
};
use tracing::{debug, info, warn};

use crate::record::{AttributeRecord, DataItem, TokenState};

/// The Attribute Access Registry.
///
/// Every mutating call validates under the write lock, emits its event, and
/// only then commits. Access requests take the read lock and never mutate.
pub struct AttributeAccessRegistry {
    authority: ControllerAuthority,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    token_ttl: Option<Duration>,
    state: RwLock<AccessState>,
}

#[derive(Default)]
struct AccessState {
    principals: PrincipalTable<AttributeRecord>,
    data: BTreeMap<DataId, DataItem>,
}

impl AttributeAccessRegistry {
    /// Create a registry administered by `authority`, using wall-clock time
    /// and logging events through tracing.
    pub fn new(authority: ControllerAuthority) -> Self {
        Self {
            authority,
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingEventSink::new()),
            token_ttl: None,
            state: RwLock::new(AccessState::default()),
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

    /// Issue tokens that lapse `ttl` after being granted.
    pub fn with_token_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn authority(&self) -> &ControllerAuthority {
        &self.authority
    }

    /// Insert or update `principal`'s clearance. New principals hold no token.
    pub fn register_user(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
        clearance: Clearance,
    ) -> Result<(), LedgerError> {
        self.authority.authorize(caller, Operation::RegisterUser)?;
        let mut state = self.write()?;

        let record = state
            .principals
            .staged(&principal, |r| r.clearance = clearance);

        self.sink.emit(
            self.clock.now(),
            LedgerEvent::PrincipalRegistered {
                principal: principal.clone(),
                clearance,
                actor: caller.clone(),
            },
        )?;

        info!(principal = %principal, clearance = clearance.0, "Principal registered");
        state.principals.commit(principal, record);
        Ok(())
    }

    /// Issue the access token to `principal`, creating the record if needed.
    ///
    /// Granting again re-issues the token, which only changes state when a
    /// token lifetime is configured.
    pub fn grant_token(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
    ) -> Result<(), LedgerError> {
        self.authority.authorize(caller, Operation::GrantToken)?;
        let mut state = self.write()?;

        let now = self.clock.now();
        let expires_at = match self.token_ttl {
            Some(ttl) => Some(now.checked_add_signed(ttl).ok_or_else(|| {
                LedgerError::InvalidInput(format!("token lifetime {} overflows the clock", ttl))
            })?),
            None => None,
        };
        let record = state.principals.staged(&principal, |r| {
            let permanent = matches!(r.token, TokenState::Held { expires_at: None, .. });
            if !(permanent && expires_at.is_none()) {
                r.token = TokenState::Held {
                    issued_at: now,
                    expires_at,
                };
            }
        });

        self.sink.emit(
            now,
            LedgerEvent::TokenGranted {
                principal: principal.clone(),
                expires_at,
                actor: caller.clone(),
            },
        )?;

        info!(principal = %principal, expires_at = ?expires_at, "Token granted");
        state.principals.commit(principal, record);
        Ok(())
    }

    /// Withdraw the access token. Revoking an absent token is a no-op success.
    pub fn revoke_token(
        &self,
        caller: &PrincipalId,
        principal: PrincipalId,
    ) -> Result<(), LedgerError> {
        self.authority.authorize(caller, Operation::RevokeToken)?;
        let mut state = self.write()?;

        let record = state
            .principals
            .staged(&principal, |r| r.token = TokenState::Absent);

        self.sink.emit(
            self.clock.now(),
            LedgerEvent::TokenRevoked {
                principal: principal.clone(),
                actor: caller.clone(),
            },
        )?;

        info!(principal = %principal, "Token revoked");
        state.principals.commit(principal, record);
        Ok(())
    }

    /// Register a data item. Ids are never reused or overwritten.
    pub fn add_data(
        &self,
        caller: &PrincipalId,
        data_id: DataId,
        required_sensitivity: Sensitivity,
        description: impl Into<String>,
    ) -> Result<(), LedgerError> {
        self.authority.authorize(caller, Operation::AddData)?;
        let mut state = self.write()?;

        if state.data.contains_key(&data_id) {
            warn!(data_id = data_id.0, "Duplicate data item rejected");
            return Err(LedgerError::DuplicateId(data_id));
        }

        let item = DataItem {
            id: data_id,
            required_sensitivity,
            description: description.into(),
        };

        self.sink.emit(
            self.clock.now(),
            LedgerEvent::DataItemAdded {
                id: data_id,
                required_sensitivity,
                description: item.description.clone(),
                actor: caller.clone(),
            },
        )?;

        info!(
            data_id = data_id.0,
            sensitivity = required_sensitivity.0,
            "Data item added"
        );
        state.data.insert(data_id, item);
        Ok(())
    }

    /// Evaluate `caller`'s access to `data_id` and return the item on success.
    ///
    /// Read-only: neither a grant nor a denial changes state or emits events.
    pub fn request_data_access(
        &self,
        caller: &PrincipalId,
        data_id: DataId,
    ) -> Result<DataItem, LedgerError> {
        let state = self.read()?;

        let item = state
            .data
            .get(&data_id)
            .ok_or(LedgerError::DataNotFound(data_id))?;
        let record = state
            .principals
            .get(caller)
            .ok_or_else(|| LedgerError::PrincipalNotRegistered(caller.clone()))?;

        match record.evaluate(item, self.clock.now()) {
            Ok(()) => {
                debug!(principal = %caller, data_id = data_id.0, "Access granted");
                Ok(item.clone())
            }
            Err(reason) => {
                warn!(principal = %caller, data_id = data_id.0, %reason, "Access denied");
                Err(LedgerError::AccessDenied {
                    principal: caller.clone(),
                    data_id,
                    reason,
                })
            }
        }
    }

    pub fn principal(&self, principal: &PrincipalId) -> Result<Option<AttributeRecord>, LedgerError> {
        Ok(self.read()?.principals.get(principal).cloned())
    }

    pub fn data_item(&self, data_id: DataId) -> Result<Option<DataItem>, LedgerError> {
        Ok(self.read()?.data.get(&data_id).cloned())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, AccessState>, LedgerError> {
        self.state
            .read()
            .map_err(|_| LedgerError::LockPoisoned("attribute registry"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, AccessState>, LedgerError> {
        self.state
            .write()
            .map_err(|_| LedgerError::LockPoisoned("attribute registry"))
    }
}

impl PrincipalRegistry for AttributeAccessRegistry {
    fn is_known(&self, principal: &PrincipalId) -> Result<bool, LedgerError> {
        Ok(self.read()?.principals.contains(principal))
    }

    fn holds_credential(&self, principal: &PrincipalId) -> Result<bool, LedgerError> {
        let now = self.clock.now();
        Ok(self
            .read()?
            .principals
            .get(principal)
            .is_some_and(|record| record.token.is_valid_at(now)))
    }

    fn clearance_of(&self, principal: &PrincipalId) -> Result<Option<Clearance>, LedgerError> {
        Ok(self
            .read()?
            .principals
            .get(principal)
            .map(|record| record.clearance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tessera_core::{ManualClock, MemoryEventLog};
    use tessera_types::{DenialReason, ErrorKind};

    struct Fixture {
        registry: AttributeAccessRegistry,
        events: Arc<MemoryEventLog>,
        clock: Arc<ManualClock>,
        admin: PrincipalId,
    }

    fn fixture(token_ttl: Option<Duration>) -> Fixture {
        let admin = PrincipalId::new("admin");
        let events = Arc::new(MemoryEventLog::new());
        let clock = Arc::new(ManualClock::default());
        let registry = AttributeAccessRegistry::new(ControllerAuthority::new(admin.clone()))
            .with_clock(clock.clone())
            .with_sink(events.clone())
            .with_token_ttl(token_ttl);
        Fixture {
            registry,
            events,
            clock,
            admin,
        }
    }

    #[test]
    fn cleared_token_holder_reads_then_loses_access_when_downgraded() {
        let fx = fixture(None);
        let user = PrincipalId::new("user");

        fx.registry
            .register_user(&fx.admin, user.clone(), Clearance(3))
            .unwrap();
        fx.registry.grant_token(&fx.admin, user.clone()).unwrap();
        fx.registry
            .add_data(&fx.admin, DataId(1), Sensitivity(3), "High sensitivity data")
            .unwrap();

        let item = fx.registry.request_data_access(&user, DataId(1)).unwrap();
        assert_eq!(item.description, "High sensitivity data");

        fx.registry
            .register_user(&fx.admin, user.clone(), Clearance(2))
            .unwrap();
        let err = fx
            .registry
            .request_data_access(&user, DataId(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[test]
    fn re_registration_keeps_the_token() {
        let fx = fixture(None);
        let user = PrincipalId::new("user");
        fx.registry
            .register_user(&fx.admin, user.clone(), Clearance(1))
            .unwrap();
        fx.registry.grant_token(&fx.admin, user.clone()).unwrap();
        fx.registry
            .register_user(&fx.admin, user.clone(), Clearance(5))
            .unwrap();

        let record = fx.registry.principal(&user).unwrap().unwrap();
        assert_eq!(record.clearance, Clearance(5));
        assert!(fx.registry.holds_credential(&user).unwrap());
    }

    #[test]
    fn new_principals_start_without_a_token() {
        let fx = fixture(None);
        let user = PrincipalId::new("user");
        fx.registry
            .register_user(&fx.admin, user.clone(), Clearance(9))
            .unwrap();
        fx.registry
            .add_data(&fx.admin, DataId(1), Sensitivity(1), "low")
            .unwrap();

        let err = fx
            .registry
            .request_data_access(&user, DataId(1))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AccessDenied {
                reason: DenialReason::MissingToken,
                ..
            }
        ));
    }

    #[test]
    fn grant_token_is_idempotent() {
        let fx = fixture(None);
        let user = PrincipalId::new("user");
        fx.registry.grant_token(&fx.admin, user.clone()).unwrap();
        let once = fx.registry.principal(&user).unwrap();
        fx.registry.grant_token(&fx.admin, user.clone()).unwrap();
        let twice = fx.registry.principal(&user).unwrap();

        assert_eq!(once, twice);
        assert!(fx.registry.holds_credential(&user).unwrap());
    }

    #[test]
    fn revoked_token_denies_access() {
        let fx = fixture(None);
        let user = PrincipalId::new("user");
        fx.registry
            .register_user(&fx.admin, user.clone(), Clearance(3))
            .unwrap();
        fx.registry.grant_token(&fx.admin, user.clone()).unwrap();
        fx.registry
            .add_data(&fx.admin, DataId(1), Sensitivity(1), "d")
            .unwrap();
        fx.registry.revoke_token(&fx.admin, user.clone()).unwrap();
        fx.registry.revoke_token(&fx.admin, user.clone()).unwrap();

        assert!(!fx.registry.holds_credential(&user).unwrap());
        assert!(fx.registry.request_data_access(&user, DataId(1)).is_err());
    }

    #[test]
    fn token_lapses_after_its_lifetime() {
        let fx = fixture(Some(Duration::seconds(3600)));
        let user = PrincipalId::new("user");
        fx.registry
            .register_user(&fx.admin, user.clone(), Clearance(2))
            .unwrap();
        fx.registry.grant_token(&fx.admin, user.clone()).unwrap();
        fx.registry
            .add_data(&fx.admin, DataId(4), Sensitivity(2), "medium")
            .unwrap();

        assert!(fx.registry.request_data_access(&user, DataId(4)).is_ok());

        fx.clock.advance(Duration::seconds(3600));
        let err = fx
            .registry
            .request_data_access(&user, DataId(4))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AccessDenied {
                reason: DenialReason::TokenExpired,
                ..
            }
        ));

        fx.registry.grant_token(&fx.admin, user.clone()).unwrap();
        assert!(fx.registry.request_data_access(&user, DataId(4)).is_ok());
    }

    #[test]
    fn duplicate_data_id_is_rejected_and_original_kept() {
        let fx = fixture(None);
        fx.registry
            .add_data(&fx.admin, DataId(1), Sensitivity(1), "original")
            .unwrap();
        let err = fx
            .registry
            .add_data(&fx.admin, DataId(1), Sensitivity(5), "replacement")
            .unwrap_err();

        assert_eq!(err, LedgerError::DuplicateId(DataId(1)));
        let item = fx.registry.data_item(DataId(1)).unwrap().unwrap();
        assert_eq!(item.description, "original");
        assert_eq!(item.required_sensitivity, Sensitivity(1));
        assert_eq!(fx.events.len().unwrap(), 1);
    }

    #[test]
    fn lookup_failures_are_reported_in_order() {
        let fx = fixture(None);
        let stranger = PrincipalId::new("stranger");

        let err = fx
            .registry
            .request_data_access(&stranger, DataId(42))
            .unwrap_err();
        assert_eq!(err, LedgerError::DataNotFound(DataId(42)));

        fx.registry
            .add_data(&fx.admin, DataId(42), Sensitivity(0), "public")
            .unwrap();
        let err = fx
            .registry
            .request_data_access(&stranger, DataId(42))
            .unwrap_err();
        assert_eq!(err, LedgerError::PrincipalNotRegistered(stranger));
    }

    #[test]
    fn administration_is_gated_to_the_controller() {
        let fx = fixture(None);
        let mallory = PrincipalId::new("mallory");

        let attempts = [
            fx.registry
                .register_user(&mallory, mallory.clone(), Clearance(9)),
            fx.registry.grant_token(&mallory, mallory.clone()),
            fx.registry.revoke_token(&mallory, mallory.clone()),
            fx.registry
                .add_data(&mallory, DataId(1), Sensitivity(0), "x"),
        ];
        for result in attempts {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::Unauthorized);
        }
        assert!(!fx.registry.is_known(&mallory).unwrap());
        assert!(fx.events.is_empty().unwrap());
    }

    #[test]
    fn unrepresentable_expiry_is_rejected_without_poisoning() {
        let fx = fixture(Some(Duration::days(100_000_000)));
        let user = PrincipalId::new("user");
        fx.registry
            .register_user(&fx.admin, user.clone(), Clearance(1))
            .unwrap();

        let err = fx.registry.grant_token(&fx.admin, user.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(fx.registry.principal(&user).unwrap().unwrap().token, TokenState::Absent);
        assert_eq!(fx.events.len().unwrap(), 1);

        // The registry stays usable after the rejection.
        fx.registry.revoke_token(&fx.admin, user.clone()).unwrap();
        assert!(fx.registry.data_item(DataId(1)).unwrap().is_none());
    }

    #[test]
    fn each_mutation_emits_one_event() {
        let fx = fixture(None);
        let user = PrincipalId::new("user");
        fx.registry
            .register_user(&fx.admin, user.clone(), Clearance(1))
            .unwrap();
        fx.registry.grant_token(&fx.admin, user.clone()).unwrap();
        fx.registry.revoke_token(&fx.admin, user.clone()).unwrap();
        fx.registry
            .add_data(&fx.admin, DataId(3), Sensitivity(1), "d")
            .unwrap();
        let _ = fx.registry.request_data_access(&user, DataId(3));

        let names: Vec<_> = fx
            .events
            .records()
            .unwrap()
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "PrincipalRegistered",
                "TokenGranted",
                "TokenRevoked",
                "DataItemAdded"
            ]
        );
    }

    proptest! {
        #[test]
        fn request_succeeds_iff_token_and_clearance_cover(
            clearance in 0u32..6,
            sensitivity in 0u32..6,
            has_token in any::<bool>(),
        ) {
            let fx = fixture(None);
            let user = PrincipalId::new("user");
            fx.registry.register_user(&fx.admin, user.clone(), Clearance(clearance)).unwrap();
            if has_token {
                fx.registry.grant_token(&fx.admin, user.clone()).unwrap();
            }
            fx.registry.add_data(&fx.admin, DataId(1), Sensitivity(sensitivity), "d").unwrap();

            let before = fx.registry.principal(&user).unwrap();
            let events_before = fx.events.len().unwrap();
            let result = fx.registry.request_data_access(&user, DataId(1));

            prop_assert_eq!(result.is_ok(), has_token && clearance >= sensitivity);
            prop_assert_eq!(fx.registry.principal(&user).unwrap(), before);
            prop_assert_eq!(fx.events.len().unwrap(), events_before);
        }
    }
}
