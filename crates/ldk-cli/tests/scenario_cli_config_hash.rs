use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[allow(deprecated)]
fn ldk() -> Command {
    let mut cmd = Command::cargo_bin("ldk").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

fn hash_line(stdout: &[u8]) -> String {
    let text = String::from_utf8_lossy(stdout);
    text.lines()
        .find_map(|l| l.strip_prefix("config_hash="))
        .expect("config_hash line")
        .to_string()
}

#[test]
fn config_hash_is_stable_across_key_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.yaml");
    let b = dir.path().join("b.yaml");
    std::fs::write(&a, "pricing:\n  freight_base: 450\n  mbf_per_tl: 23\n").unwrap();
    std::fs::write(&b, "pricing:\n  mbf_per_tl: 23\n  freight_base: 450\n").unwrap();

    let out_a = ldk().arg("config-hash").arg(&a).output().unwrap();
    let out_b = ldk().arg("config-hash").arg(&b).output().unwrap();
    assert!(out_a.status.success());
    assert!(out_b.status.success());

    let h = hash_line(&out_a.stdout);
    assert_eq!(h.len(), 64);
    assert_eq!(h, hash_line(&out_b.stdout));
    assert!(String::from_utf8_lossy(&out_a.stdout).contains(r#"{"pricing":{"freight_base":450,"mbf_per_tl":23}}"#));
}

#[test]
fn invalid_config_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.yaml");
    std::fs::write(&bad, "auto_match:\n  volume_tolerance: 2\n").unwrap();

    ldk()
        .arg("config-hash")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("volume_tolerance"));

    ldk()
        .arg("--state-dir")
        .arg(dir.path())
        .arg("--config")
        .arg(&bad)
        .arg("positions")
        .assert()
        .failure();
}

#[test]
fn secret_literal_in_config_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let leaky = dir.path().join("leaky.yaml");
    std::fs::write(&leaky, "mileage:\n  api_key: \"sk-live-0123456789abcdef\"\n").unwrap();

    ldk()
        .arg("config-hash")
        .arg(&leaky)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"))
        .stderr(predicate::str::contains("0123456789abcdef").not());
}
