//! Command handler modules for ldk-cli.
//!
//! Shared state access lives here; `book` covers trades and P&L, `pricing`
//! covers lanes, freight and quotes.

pub mod book;
pub mod pricing;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use ldk_config::{DeskConfig, UnusedKeyPolicy};
use ldk_mileage::LaneCache;
use ldk_reconcile::TradeBook;
use ldk_schemas::{Buy, MillQuote, Sell};
use ldk_store::{load_as, save_as, JsonDirStore};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

const BUYS_KEY: &str = "buys";
const SELLS_KEY: &str = "sells";
const QUOTES_KEY: &str = "quotes";

// ---------------------------------------------------------------------------
// Desk state
// ---------------------------------------------------------------------------

/// State directory plus the effective config for one invocation.
pub struct Desk {
    store: JsonDirStore,
    cfg: DeskConfig,
}

impl Desk {
    pub fn open(state_dir: PathBuf, config_paths: &[String]) -> Result<Self> {
        let cfg = if config_paths.is_empty() {
            DeskConfig::default()
        } else {
            let refs: Vec<&str> = config_paths.iter().map(String::as_str).collect();
            let loaded = ldk_config::load_layered_yaml(&refs)?;
            let unused = ldk_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
            for p in &unused.unused_leaf_pointers {
                warn!(pointer = %p, "config key is not read by any section");
            }
            info!(config_hash = %loaded.config_hash, "config loaded");
            loaded.desk()?
        };

        Ok(Self {
            store: JsonDirStore::new(state_dir),
            cfg,
        })
    }

    pub fn cfg(&self) -> &DeskConfig {
        &self.cfg
    }

    pub fn load_book(&self) -> Result<TradeBook> {
        let buys: Vec<Buy> = load_as(&self.store, BUYS_KEY)
            .context("load buys failed")?
            .unwrap_or_default();
        let sells: Vec<Sell> = load_as(&self.store, SELLS_KEY)
            .context("load sells failed")?
            .unwrap_or_default();
        Ok(TradeBook::new(buys, sells))
    }

    pub fn save_book(&mut self, book: &TradeBook) -> Result<()> {
        save_as(&mut self.store, BUYS_KEY, &book.buys).context("save buys failed")?;
        save_as(&mut self.store, SELLS_KEY, &book.sells).context("save sells failed")?;
        Ok(())
    }

    pub fn load_lanes(&self) -> Result<LaneCache> {
        LaneCache::load(&self.store).context("load lanes failed")
    }

    pub fn save_lanes(&mut self, lanes: &LaneCache) -> Result<()> {
        lanes.save(&mut self.store).context("save lanes failed")
    }

    pub fn load_quotes(&self) -> Result<Vec<MillQuote>> {
        Ok(load_as(&self.store, QUOTES_KEY)
            .context("load quotes failed")?
            .unwrap_or_default())
    }

    pub fn save_quotes(&mut self, quotes: &[MillQuote]) -> Result<()> {
        save_as(&mut self.store, QUOTES_KEY, quotes).context("save quotes failed")
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// `ldk config-hash`: merged config hash, then the canonical JSON it was taken over.
pub fn config_hash(paths: &[String]) -> Result<()> {
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    let loaded = ldk_config::load_layered_yaml(&refs)?;
    loaded.desk()?;
    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}

/// Read a JSON array export. A UTF-8 BOM is tolerated.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read failed: {}", path.display()))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    serde_json::from_slice(bytes)
        .with_context(|| format!("invalid JSON in {}", path.display()))
}

/// `--today` as `YYYY-MM-DD`, or the current UTC date.
pub fn parse_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid --today '{s}'. expected YYYY-MM-DD")),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output json failed")?;
    println!("{json}");
    Ok(())
}
