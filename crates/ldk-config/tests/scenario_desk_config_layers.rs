use ldk_config::{
    load_layered_yaml, load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy,
};

const BASE_YAML: &str = r#"
pricing:
  freight_base: 450
  mbf_per_tl: 23
  state_rates:
    AR: 2.25
    MS: 2.5
auto_match:
  min_score: 60
mileage:
  geocode_url: "https://nominatim.openstreetmap.org/search"
  route_url: "https://router.project-osrm.org"
"#;

const BASE_YAML_REORDERED: &str = r#"
mileage:
  route_url: "https://router.project-osrm.org"
  geocode_url: "https://nominatim.openstreetmap.org/search"
auto_match:
  min_score: 60
pricing:
  state_rates:
    MS: 2.5
    AR: 2.25
  mbf_per_tl: 23
  freight_base: 450
"#;

const OVERLAY_YAML: &str = r#"
pricing:
  state_rates:
    AR: 2.4
quote:
  margin_range: [25, 40]
mileage:
  server_url: "http://mileage.desk.local:5000"
  lane_delay_ms: 0
"#;

#[test]
fn scenario_hash_is_stable_and_order_independent() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let c = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();

    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.config_hash, c.config_hash);
    assert_eq!(a.canonical_json, c.canonical_json);
    assert_eq!(a.config_hash.len(), 64);

    let layered = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(a.config_hash, layered.config_hash);
}

#[test]
fn scenario_overlay_wins_and_typed_view_reflects_it() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    let desk = loaded.desk().unwrap();

    assert_eq!(desk.pricing.freight_base, 450.0);
    assert_eq!(desk.pricing.state_rates.get("AR"), Some(&2.4));
    assert_eq!(desk.pricing.state_rates.get("MS"), Some(&2.5));
    assert_eq!(desk.quote.margin_range, Some((25.0, 40.0)));
    assert_eq!(
        desk.mileage.server_url.as_deref(),
        Some("http://mileage.desk.local:5000")
    );
    assert_eq!(desk.mileage.lane_delay_ms, 0);
    assert_eq!(desk.mileage.origin_geocode_delay_ms, 500);
}

#[test]
fn scenario_empty_layer_changes_nothing() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, ""]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}

#[test]
fn scenario_secret_literal_aborts_load() {
    let leaky = r#"
mileage:
  geocode_url: "https://maps.example.com/geocode"
  api_key: "AIzaSyA-1234567890abcdef"
"#;
    let err = load_layered_yaml_from_strings(&[BASE_YAML, leaky]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("CONFIG_SECRET_DETECTED"), "{msg}");
    assert!(msg.contains("/mileage/api_key"), "{msg}");
    assert!(!msg.contains("AIzaSy"), "secret value must not be echoed: {msg}");
}

#[test]
fn scenario_unused_keys_warn_or_fail() {
    let typo = r#"
pricng:
  freight_base: 500
auto_match:
  min_score: 70
"#;
    let loaded = load_layered_yaml_from_strings(&[typo]).unwrap();

    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(report.unused_leaf_pointers, vec!["/pricng/freight_base".to_string()]);

    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    assert!(err.to_string().contains("CONFIG_UNUSED_KEYS"));

    let clean = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert!(report_unused_keys(&clean.config_json, UnusedKeyPolicy::Fail)
        .unwrap()
        .is_clean());
}

#[test]
fn scenario_invalid_layer_fails_typed_view_not_load() {
    let bad = "auto_match:\n  volume_tolerance: 2\n";
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML, bad]).unwrap();
    let err = loaded.desk().unwrap_err();
    assert!(format!("{err:#}").contains("volume_tolerance"));
}

#[test]
fn scenario_layers_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let local = dir.path().join("local.yaml");
    std::fs::write(&base, BASE_YAML).unwrap();
    std::fs::write(&local, OVERLAY_YAML).unwrap();

    let base_s = base.to_str().unwrap();
    let local_s = local.to_str().unwrap();
    let from_files = load_layered_yaml(&[base_s, local_s]).unwrap();
    let from_strings = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(from_files.config_hash, from_strings.config_hash);

    let missing = dir.path().join("nope.yaml");
    let err = load_layered_yaml(&[missing.to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().contains("nope.yaml"));
}
