use super::*;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_config_loads_defaults() {
    let config = ThreadworkConfig::load().expect("Should load default config");
    assert!(config.validate().is_ok());
    assert!(config.threads.count <= crate::parallel::MAX_THREADS);
}

#[test]
fn test_embedded_defaults_match_struct_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "empty.toml", "");
    let config = ThreadworkConfig::load_with_custom_config(Some(&path)).unwrap();

    assert_eq!(config, ThreadworkConfig::default());
    assert_eq!(config.thread_count(), None);
    assert_eq!(config.stack_size(), Some(8 * 1024 * 1024));
}

#[test]
fn test_custom_toml_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "custom.toml",
        r#"
[threads]
count = 3
stack_size_mb = 0

[workload]
kind = "primes"
units = 42
"#,
    );
    let config = ThreadworkConfig::load_with_custom_config(Some(&path)).unwrap();

    assert_eq!(config.thread_count(), Some(3));
    assert_eq!(config.stack_size(), None);
    assert_eq!(config.workload.kind, WorkloadKind::Primes);
    assert_eq!(config.workload.units, 42);
    // Untouched keys keep their defaults
    assert_eq!(config.workload.rounds, 2000);
    assert!(config.pacifier.enabled);
}

#[test]
fn test_custom_yaml_and_json() {
    let dir = TempDir::new().unwrap();

    let yaml = write_config(&dir, "custom.yml", "pacifier:\n  enabled: false\n");
    let config = ThreadworkConfig::load_with_custom_config(Some(&yaml)).unwrap();
    assert!(!config.pacifier.enabled);

    let json = write_config(&dir, "custom.json", r#"{"threads": {"count": 2}}"#);
    let config = ThreadworkConfig::load_with_custom_config(Some(&json)).unwrap();
    assert_eq!(config.thread_count(), Some(2));
}

#[test]
fn test_custom_config_missing_falls_back_to_defaults() {
    let config = ThreadworkConfig::load_with_custom_config(Some("non_existent.toml"));
    assert!(config.is_ok(), "Should handle missing custom config gracefully");
}

#[test]
fn test_thread_count_above_capacity_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "big.toml", "[threads]\ncount = 1000\n");
    let err = ThreadworkConfig::load_with_custom_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("pool capacity"));
}

#[test]
fn test_oversized_stack_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "stack.toml", "[threads]\nstack_size_mb = 17592186044416\n");

    let err = ThreadworkConfig::load_with_custom_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("stack_size_mb"));

    // Unvalidated values still never overflow
    let config = ThreadworkConfig::load_unchecked(Some(&path)).unwrap();
    assert_eq!(config.stack_size(), None);
    assert!(config.dispatcher().is_err());
}

#[test]
fn test_stack_size_at_limit_is_accepted() {
    let mut config = ThreadworkConfig::default();
    config.threads.stack_size_mb = super::core::MAX_STACK_SIZE_MB;
    assert!(config.validate().is_ok());
    assert_eq!(config.stack_size(), Some(1024 * 1024 * 1024));
}

#[test]
fn test_dispatcher_from_config() {
    let mut config = ThreadworkConfig::default();
    assert_eq!(config.dispatcher().unwrap().threads(), None);

    config.threads.count = 5;
    assert_eq!(config.dispatcher().unwrap().threads(), Some(5));
}

#[test]
fn test_render_round_trips_through_toml() {
    let config = ThreadworkConfig::default();
    let rendered = config.to_toml().unwrap();
    assert!(rendered.contains("[threads]"));
    let parsed: ThreadworkConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, config);
}
