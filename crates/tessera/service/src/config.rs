//! Configuration for the Tessera ledger

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tessera_reputation::ReputationBounds;
use tessera_types::PrincipalId;

use crate::error::ConfigError;
use crate::tiers::{ReputationTier, ReputationTiers};

/// Main ledger configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TesseraConfig {
    /// Who may perform gated operations
    #[serde(default)]
    pub authority: AuthorityConfig,

    /// Access token issuance
    #[serde(default)]
    pub token: TokenConfig,

    /// Reputation bounds and clearance tiers
    #[serde(default)]
    pub reputation: ReputationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Authority configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Controller identity for both subsystems
    #[serde(default = "default_controller")]
    pub controller: String,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            controller: default_controller(),
        }
    }
}

/// Token configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token lifetime in seconds; tokens never expire when unset
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

/// Reputation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Inclusive lower bound on reputation values
    #[serde(default)]
    pub min: Option<i64>,

    /// Inclusive upper bound on reputation values
    #[serde(default)]
    pub max: Option<i64>,

    /// Reputation thresholds mapped to clearance levels, ascending
    #[serde(default = "default_tiers")]
    pub tiers: Vec<ReputationTier>,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            tiers: default_tiers(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_controller() -> String {
    "admin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tiers() -> Vec<ReputationTier> {
    ReputationTiers::standard().into_vec()
}

fn ttl_from_secs(secs: u64) -> Option<Duration> {
    i64::try_from(secs).ok().and_then(Duration::try_seconds)
}

impl TesseraConfig {
    /// Load configuration from defaults, an optional file, and `TESSERA__*`
    /// environment variables (e.g. `TESSERA__TOKEN__TTL_SECS=3600`).
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&TesseraConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TESSERA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: TesseraConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.authority.controller = controller.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authority.controller.trim().is_empty() {
            return Err(ConfigError::Invalid("authority.controller is empty".into()));
        }
        if let Some(secs) = self.token.ttl_secs {
            if secs == 0 {
                return Err(ConfigError::Invalid("token.ttl_secs must be positive".into()));
            }
            if ttl_from_secs(secs).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "token.ttl_secs {} is out of range",
                    secs
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.reputation.min, self.reputation.max) {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "reputation.min {} exceeds reputation.max {}",
                    min, max
                )));
            }
        }
        self.tiers().map(|_| ())
    }

    pub fn controller(&self) -> PrincipalId {
        PrincipalId::new(self.authority.controller.clone())
    }

    /// Token lifetime; `None` when unset or not representable, which
    /// `validate` rejects.
    pub fn token_ttl(&self) -> Option<Duration> {
        self.token.ttl_secs.and_then(ttl_from_secs)
    }

    pub fn reputation_bounds(&self) -> ReputationBounds {
        ReputationBounds {
            min: self.reputation.min,
            max: self.reputation.max,
        }
    }

    pub fn tiers(&self) -> Result<ReputationTiers, ConfigError> {
        ReputationTiers::new(self.reputation.tiers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::Clearance;

    #[test]
    fn test_default_config() {
        let config = TesseraConfig::default();
        assert_eq!(config.authority.controller, "admin");
        assert!(config.token_ttl().is_none());
        assert_eq!(config.reputation_bounds(), ReputationBounds::unbounded());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_ttl_conversion() {
        let mut config = TesseraConfig::default();
        config.token.ttl_secs = Some(3600);
        assert_eq!(config.token_ttl(), Some(Duration::hours(1)));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut config = TesseraConfig::default();
        config.reputation.min = Some(10);
        config.reputation.max = Some(5);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_ttl_and_blank_controller() {
        let mut config = TesseraConfig::default();
        config.token.ttl_secs = Some(0);
        assert!(config.validate().is_err());

        let config = TesseraConfig::default().with_controller("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unrepresentable_ttl() {
        for secs in [u64::MAX, i64::MAX as u64, 10_000_000_000_000_000] {
            let mut config = TesseraConfig::default();
            config.token.ttl_secs = Some(secs);
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
            assert!(config.token_ttl().is_none());
        }

        let mut config = TesseraConfig::default();
        config.token.ttl_secs = Some(9_000_000_000_000);
        assert!(config.validate().is_ok());
        assert_eq!(config.token_ttl(), Some(Duration::seconds(9_000_000_000_000)));
    }

    #[test]
    fn test_rejects_unordered_tiers() {
        let mut config = TesseraConfig::default();
        config.reputation.tiers = vec![
            ReputationTier {
                min_reputation: 50,
                clearance: Clearance(2),
            },
            ReputationTier {
                min_reputation: 10,
                clearance: Clearance(1),
            },
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = TesseraConfig::load(None).unwrap();
        assert_eq!(config.controller(), PrincipalId::new("admin"));
        assert_eq!(config.reputation.tiers.len(), 3);
    }

    #[test]
    fn test_load_demo_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../../demos/tessera.toml");
        let config = TesseraConfig::load(Some(path)).unwrap();
        assert_eq!(config.token_ttl(), Some(Duration::hours(1)));
        assert_eq!(config.reputation_bounds(), ReputationBounds::non_negative());
        assert_eq!(config.tiers().unwrap(), ReputationTiers::standard());
    }
}
