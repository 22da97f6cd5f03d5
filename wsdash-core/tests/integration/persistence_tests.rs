//! Endpoint and settings persistence across manager instances

use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use wsdash_core::config::{AppSettings, ConfigManager};
use wsdash_core::connection::ReconnectPolicy;
use wsdash_core::endpoint::EndpointManager;
use wsdash_core::models::Endpoint;

fn config_in(temp: &TempDir) -> ConfigManager {
    ConfigManager::with_config_dir(temp.path().join("wsdash"))
}

#[test]
fn test_endpoints_survive_reload() {
    let temp = TempDir::new().unwrap();
    {
        let mut endpoints = EndpointManager::new(config_in(&temp)).unwrap();
        endpoints
            .add(Endpoint::new("Greenhouse", "ws://10.0.0.5:8080/sensors"))
            .unwrap();
        endpoints
            .add(Endpoint::new("Garage", "wss://garage.local/live"))
            .unwrap();
        endpoints.select(0).unwrap();
    }

    let reloaded = EndpointManager::new(config_in(&temp)).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.active_index(), Some(0));
    assert_eq!(reloaded.active().unwrap().name, "Greenhouse");
    assert_eq!(reloaded.get(1).unwrap().address, "wss://garage.local/live");
}

#[test]
fn test_out_of_range_selection_is_repaired_on_load() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    fs::create_dir_all(config.config_dir()).unwrap();
    fs::write(
        config.endpoints_path(),
        r#"active = 7

[[endpoints]]
name = "Lab"
address = "ws://lab:9000"
"#,
    )
    .unwrap();

    let endpoints = EndpointManager::new(config.clone()).unwrap();
    assert_eq!(endpoints.active_index(), Some(0));

    // the repair was written back
    let file = config.load_endpoints().unwrap();
    assert_eq!(file.active, Some(0));
}

#[test]
fn test_hand_edited_duplicates_are_dropped_on_load() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    fs::create_dir_all(config.config_dir()).unwrap();
    fs::write(
        config.endpoints_path(),
        r#"active = 1

[[endpoints]]
name = "A"
address = "ws://same:1"

[[endpoints]]
name = "B"
address = "ws://same:1"

[[endpoints]]
name = ""
address = "http://bad"
"#,
    )
    .unwrap();

    let endpoints = EndpointManager::new(config.clone()).unwrap();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints.active().unwrap().name, "A");

    let file = config.load_endpoints().unwrap();
    assert_eq!(file.endpoints, vec![Endpoint::new("A", "ws://same:1")]);
    assert_eq!(file.active, Some(0));
}

#[test]
fn test_delete_last_endpoint_clears_selection_on_disk() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    let mut endpoints = EndpointManager::new(config.clone()).unwrap();
    endpoints.add(Endpoint::new("Lab", "ws://lab:9000")).unwrap();
    endpoints.delete(0).unwrap();

    let file = config.load_endpoints().unwrap();
    assert!(file.endpoints.is_empty());
    assert_eq!(file.active, None);
}

#[test]
fn test_settings_round_trip() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);

    let mut settings = AppSettings::default();
    settings.reconnect =
        ReconnectPolicy::fixed(Duration::from_secs(2)).with_backoff_multiplier(1.5);
    settings.log.max_entries = 200;
    settings.logging.level = "debug".to_string();
    config.save_settings(&settings).unwrap();

    assert_eq!(config.load_settings().unwrap(), settings);
}

#[test]
fn test_partial_settings_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    fs::create_dir_all(config.config_dir()).unwrap();
    fs::write(config.settings_path(), "[reconnect]\ndelay_ms = 1500\n").unwrap();

    let settings = config.load_settings().unwrap();
    assert_eq!(settings.reconnect.delay_ms, 1500);
    assert!(settings.reconnect.enabled);
    assert_eq!(settings.log.max_entries, 50);
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn test_invalid_settings_are_rejected() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    fs::create_dir_all(config.config_dir()).unwrap();
    fs::write(config.settings_path(), "[log]\nmax_entries = 0\n").unwrap();

    let err = config.load_settings().unwrap_err();
    assert!(err.to_string().contains("log.max_entries"));
}
