//! Configuration file and environment handling
//!
//! Kept in one test so the process-wide environment is never touched
//! concurrently.

use fairodds::config::{generate_sample_config, ConfigLoader};
use fairodds::{EngineConfig, EngineError};
use std::env;
use tempfile::TempDir;

#[test]
fn file_then_environment_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fairodds.toml");
    let path_str = path.to_string_lossy().to_string();

    generate_sample_config(&path_str).unwrap();
    let loaded = ConfigLoader::new().with_path(&path).load().unwrap();
    assert_eq!(loaded, EngineConfig::default());

    std::fs::write(
        &path,
        "[rules]\ndice_house_edge = 0.01\n\n[history]\nretention = 25\n",
    )
    .unwrap();
    let partial = ConfigLoader::new().with_path(&path).load().unwrap();
    assert_eq!(partial.rules.dice_house_edge, 0.01);
    assert_eq!(partial.history.retention, 25);
    assert_eq!(partial.rules.mines_tiles, 25);
    assert_eq!(partial.session.reset_delay_ms, 3000);

    env::set_var("FAIRODDS_HISTORY_RETENTION", "4");
    env::set_var("FAIRODDS_STARTING_BALANCE", "250");
    let overridden = ConfigLoader::new().with_path(&path).load().unwrap();
    assert_eq!(overridden.history.retention, 4);
    assert_eq!(overridden.accounts.starting_balance, 250.0);
    assert_eq!(overridden.rules.dice_house_edge, 0.01);

    env::set_var("FAIRODDS_DICE_HOUSE_EDGE", "not-a-number");
    assert!(matches!(
        ConfigLoader::new().load(),
        Err(EngineError::Configuration(_))
    ));

    env::set_var("FAIRODDS_DICE_HOUSE_EDGE", "1.5");
    assert!(ConfigLoader::new().load().is_err());

    env::remove_var("FAIRODDS_DICE_HOUSE_EDGE");
    env::remove_var("FAIRODDS_HISTORY_RETENTION");
    env::remove_var("FAIRODDS_STARTING_BALANCE");
    assert_eq!(ConfigLoader::new().load().unwrap(), EngineConfig::default());

    assert!(ConfigLoader::new().with_path(dir.path().join("missing.toml")).load().is_err());
}
