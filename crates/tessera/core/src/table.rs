use std::collections::HashMap;

use tessera_types::PrincipalId;

/// Principal records owned by one subsystem.
///
/// Records are created implicitly on first write and never deleted. Writers
/// stage the post-mutation record with [`PrincipalTable::staged`], emit their
/// event, and only then [`commit`](PrincipalTable::commit) it, so a failed
/// emission leaves the table untouched.
#[derive(Clone, Debug)]
pub struct PrincipalTable<R> {
    records: HashMap<PrincipalId, R>,
}

impl<R> PrincipalTable<R> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    pub fn get(&self, principal: &PrincipalId) -> Option<&R> {
        self.records.get(principal)
    }

    pub fn contains(&self, principal: &PrincipalId) -> bool {
        self.records.contains_key(principal)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn commit(&mut self, principal: PrincipalId, record: R) {
        self.records.insert(principal, record);
    }
}

impl<R: Clone + Default> PrincipalTable<R> {
    /// The record `principal` would have after applying `update`, without
    /// touching the table. Unknown principals start from `R::default()`.
    pub fn staged(&self, principal: &PrincipalId, update: impl FnOnce(&mut R)) -> R {
        let mut record = self.records.get(principal).cloned().unwrap_or_default();
        update(&mut record);
        record
    }
}

impl<R> Default for PrincipalTable<R> {
    fn default() -> Self {
        Self::new()
    }
}
