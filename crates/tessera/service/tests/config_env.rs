//! Environment layering for `TesseraConfig::load`.
//!
//! Kept in its own test binary with a single test: environment variables are
//! process-wide and would leak into the config tests in `src/config.rs`.

use chrono::Duration;
use tessera_reputation::ReputationBounds;
use tessera_service::{ReputationTiers, TesseraConfig};
use tessera_types::PrincipalId;

const DEMO_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../../demos/tessera.toml");

#[test]
fn environment_overrides_file_and_defaults() {
    std::env::set_var("TESSERA__TOKEN__TTL_SECS", "7200");
    std::env::set_var("TESSERA__AUTHORITY__CONTROLLER", "root");

    // File sets ttl 3600 and controller "admin"; the environment wins.
    let config = TesseraConfig::load(Some(DEMO_CONFIG)).unwrap();
    assert_eq!(config.token_ttl(), Some(Duration::hours(2)));
    assert_eq!(config.controller(), PrincipalId::new("root"));
    assert_eq!(config.reputation_bounds(), ReputationBounds::non_negative());
    assert_eq!(config.tiers().unwrap(), ReputationTiers::standard());

    // Without a file the environment layers over the defaults.
    let config = TesseraConfig::load(None).unwrap();
    assert_eq!(config.token_ttl(), Some(Duration::hours(2)));
    assert_eq!(config.controller(), PrincipalId::new("root"));
    assert_eq!(config.reputation_bounds(), ReputationBounds::unbounded());

    // Out-of-range values from the environment are rejected, not truncated.
    std::env::set_var("TESSERA__TOKEN__TTL_SECS", "18446744073709551615");
    assert!(TesseraConfig::load(None).is_err());

    std::env::remove_var("TESSERA__TOKEN__TTL_SECS");
    std::env::remove_var("TESSERA__AUTHORITY__CONTROLLER");
}
