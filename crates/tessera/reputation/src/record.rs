use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_types::{DataId, PrincipalId};

/// A principal as tracked by the reputation ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub has_access: bool,
    pub reputation: i64,
}

/// Uploaded data metadata. Immutable once uploaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRecord {
    pub id: DataId,
    pub metadata: String,
    pub owner: PrincipalId,
    pub uploaded_at: DateTime<Utc>,
}
