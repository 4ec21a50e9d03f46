//! ldk-config
//!
//! Layered YAML configuration for the desk.
//!
//! Documents are merged in order (later layers override earlier ones, objects
//! merge key by key, everything else is replaced). The merged tree is checked
//! for secret-looking literals, rendered as canonical JSON and hashed, then
//! read into a typed, validated [`DeskConfig`].

mod desk;

use std::collections::BTreeSet;
use std::fs;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub use desk::{DeskConfig, KNOWN_SECTIONS};

/// Leaf strings starting with one of these abort the load. Credentials belong
/// in the environment, not in YAML.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",
    "sk_live",
    "sk_test",
    "AKIA",
    "AIza",
    "-----BEGIN",
    "ghp_",
    "glpat-",
    "xoxb-",
];

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Hex SHA-256 of `canonical_json`.
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed view of the merged tree, validated.
    pub fn desk(&self) -> Result<DeskConfig> {
        DeskConfig::from_json(&self.config_json)
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("failed to read config layer: {p}")))
        .collect::<Result<Vec<String>>>()?;
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Default::default());
    for (i, raw) in yaml_docs.iter().enumerate() {
        let layer: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml in layer {i}"))?;
        let layer = serde_json::to_value(layer)
            .with_context(|| format!("layer {i} is not representable as json"))?;
        // An empty document parses as null; treat it as "no overrides".
        if !layer.is_null() {
            merged = deep_merge(merged, layer);
        }
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json =
        serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Objects merge recursively; any other overlay value replaces the base.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut into), Value::Object(from)) => {
            for (k, v) in from {
                let prev = into.remove(&k).unwrap_or(Value::Null);
                into.insert(k, deep_merge(prev, v));
            }
            Value::Object(into)
        }
        (_, overlay) => overlay,
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// ---------------------------------------------------------------------------
// Leaf walking
// ---------------------------------------------------------------------------

fn leaves<'a>(v: &'a Value, pointer: String, out: &mut Vec<(String, &'a Value)>) {
    match v {
        Value::Object(map) => {
            for (k, child) in map {
                let token = k.replace('~', "~0").replace('/', "~1");
                leaves(child, format!("{pointer}/{token}"), out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                leaves(child, format!("{pointer}/{i}"), out);
            }
        }
        _ => out.push((if pointer.is_empty() { "/".into() } else { pointer }, v)),
    }
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    t.len() >= 8 && SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut all = Vec::new();
    leaves(v, String::new(), &mut all);
    for (pointer, leaf) in all {
        if leaf.as_str().map(looks_like_secret).unwrap_or(false) {
            bail!("CONFIG_SECRET_DETECTED leaf={pointer} value=REDACTED");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unused keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnusedKeyReport {
    /// Sorted leaf pointers outside every known section.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Leaves that no [`DeskConfig`] section reads, usually a typo in a section
/// name. `Fail` turns a non-empty report into an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut all = Vec::new();
    leaves(config_json, String::new(), &mut all);

    let unused: BTreeSet<String> = all
        .into_iter()
        .map(|(p, _)| p)
        .filter(|p| {
            !KNOWN_SECTIONS.iter().any(|s| {
                let prefix = format!("/{s}");
                p == &prefix || p.starts_with(&format!("{prefix}/"))
            })
        })
        .collect();

    let report = UnusedKeyReport {
        unused_leaf_pointers: unused.into_iter().collect(),
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        let first: Vec<&String> = report.unused_leaf_pointers.iter().take(12).collect();
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s). First few: {:?}",
            report.unused_leaf_pointers.len(),
            first
        );
    }
    Ok(report)
}
