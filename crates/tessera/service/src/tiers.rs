use serde::{Deserialize, Serialize};
use tessera_types::{Clearance, SensitivityTier};

use crate::error::ConfigError;

/// Minimum reputation needed for a clearance level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationTier {
    pub min_reputation: i64,
    pub clearance: Clearance,
}

/// Ascending reputation thresholds. Reputation below the first threshold
/// maps to clearance `0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReputationTiers {
    tiers: Vec<ReputationTier>,
}

impl ReputationTiers {
    /// Tiers must ascend strictly in both reputation and clearance.
    pub fn new(tiers: Vec<ReputationTier>) -> Result<Self, ConfigError> {
        for pair in tiers.windows(2) {
            if pair[1].min_reputation <= pair[0].min_reputation
                || pair[1].clearance <= pair[0].clearance
            {
                return Err(ConfigError::Invalid(format!(
                    "reputation tiers must ascend: {:?} then {:?}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { tiers })
    }

    /// Low, medium and high sensitivity unlocked at 10, 50 and 100.
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                ReputationTier {
                    min_reputation: 10,
                    clearance: SensitivityTier::Low.clearance(),
                },
                ReputationTier {
                    min_reputation: 50,
                    clearance: SensitivityTier::Medium.clearance(),
                },
                ReputationTier {
                    min_reputation: 100,
                    clearance: SensitivityTier::High.clearance(),
                },
            ],
        }
    }

    pub fn clearance_for(&self, reputation: i64) -> Clearance {
        self.tiers
            .iter()
            .rev()
            .find(|tier| reputation >= tier.min_reputation)
            .map(|tier| tier.clearance)
            .unwrap_or_default()
    }

    pub fn into_vec(self) -> Vec<ReputationTier> {
        self.tiers
    }
}
