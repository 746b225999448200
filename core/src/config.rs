use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::category::{category_for_birth_year_in, CategorySpec, REFERENCE_YEAR};
use crate::remote::{HttpStore, DEFAULT_TIMEOUT_SECS};
use crate::session::Session;
use crate::store::{FileStore, MemoryStore, ResultStore};

/// Environment variable pointing at the config file.
pub const CONFIG_ENV: &str = "JUDOFED_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "judofed.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    Memory,
    File {
        dir: PathBuf,
    },
    Http {
        base_url: String,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub federation_name: String,
    pub reference_year: i32,
    /// 0 → each test's own default.
    pub placeholder_rows: usize,
    pub store: StoreConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        PortalConfig {
            federation_name: "الاتحادية الجزائرية للجيدو".to_string(),
            reference_year: REFERENCE_YEAR,
            placeholder_rows: 0,
            store: StoreConfig::Memory,
        }
    }
}

impl PortalConfig {
    /// Birth-year lookup for the configured season.
    pub fn category_for_birth_year(&self, year: i32) -> &'static CategorySpec {
        category_for_birth_year_in(year, self.reference_year)
    }
}

/// Reads the config (JSON). Missing file → defaults.
pub fn load_config(path: &Path) -> anyhow::Result<PortalConfig> {
    if !path.exists() {
        warn!("⚠️ no config at {}, using defaults", path.display());
        return Ok(PortalConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: PortalConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!("📂 config loaded from {} (store={:?})", path.display(), cfg.store);
    Ok(cfg)
}

/// `$JUDOFED_CONFIG`, else `judofed.json` in the working directory.
pub fn load_config_from_env() -> anyhow::Result<PortalConfig> {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    load_config(&path)
}

pub fn open_store(cfg: &PortalConfig, session: &Session) -> Box<dyn ResultStore> {
    match &cfg.store {
        StoreConfig::Memory => Box::new(MemoryStore::new()),
        StoreConfig::File { dir } => Box::new(FileStore::new(dir.clone())),
        StoreConfig::Http { base_url, timeout_secs } => Box::new(HttpStore::with_timeout(
            base_url,
            session,
            Duration::from_secs(*timeout_secs),
        )),
    }
}
