//! Clearance and sensitivity levels.
//!
//! Both are non-negative integers on the same fixed total order. A principal
//! may read a data item only when its clearance covers the item's sensitivity.

use serde::{Deserialize, Serialize};

/// How far a principal has been cleared.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Clearance(pub u32);

/// How restricted a data item is.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sensitivity(pub u32);

impl Clearance {
    /// `true` when this clearance is at or above `required`.
    pub fn covers(self, required: Sensitivity) -> bool {
        self.0 >= required.0
    }
}

impl std::fmt::Display for Clearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named sensitivity tiers used by operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityTier {
    Low,
    Medium,
    High,
}

impl SensitivityTier {
    pub fn sensitivity(self) -> Sensitivity {
        match self {
            SensitivityTier::Low => Sensitivity(1),
            SensitivityTier::Medium => Sensitivity(2),
            SensitivityTier::High => Sensitivity(3),
        }
    }

    /// Clearance needed to read data at this tier.
    pub fn clearance(self) -> Clearance {
        Clearance(self.sensitivity().0)
    }
}

impl From<SensitivityTier> for Sensitivity {
    fn from(tier: SensitivityTier) -> Self {
        tier.sensitivity()
    }
}
