use serde::{Deserialize, Serialize};
use tessera_types::LedgerError;

/// Optional inclusive limits on reputation values. Unbounded by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl ReputationBounds {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn non_negative() -> Self {
        Self {
            min: Some(0),
            max: None,
        }
    }

    pub fn check(&self, value: i64) -> Result<(), LedgerError> {
        if let Some(min) = self.min {
            if value < min {
                return Err(LedgerError::InvalidInput(format!(
                    "reputation {} below minimum {}",
                    value, min
                )));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(LedgerError::InvalidInput(format!(
                    "reputation {} above maximum {}",
                    value, max
                )));
            }
        }
        Ok(())
    }
}
