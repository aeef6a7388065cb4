use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::Reason;

/// Per-directory override file, looked up in the working directory
pub const LOCAL_CONFIG: &str = ".rq-config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RqConfig {
    #[serde(default)]
    pub modes: ModeFlags,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Reject reasons; empty means the built-in catalog
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<Reason>,
}

/// [modes] section: the queue options toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeFlags {
    #[serde(default = "default_true")]
    pub shortcuts: bool,
    #[serde(default = "default_true")]
    pub auto_advance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// Rows kept above a card when scrolling to it
    #[serde(default = "default_margin_top")]
    pub margin_top: u64,
    /// Pause before auto-advancing, so the status label stays visible
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
    /// Minimum spacing between current-item scans while scrolling
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_max_materialized")]
    pub max_materialized: usize,
    /// Items per page when serving from a local pool file
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_duration_ms() -> u64 {
    250
}

fn default_margin_top() -> u64 {
    1
}

fn default_advance_delay_ms() -> u64 {
    500
}

fn default_throttle_ms() -> u64 {
    100
}

fn default_max_materialized() -> usize {
    50
}

fn default_batch_size() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self {
            shortcuts: true,
            auto_advance: true,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            margin_top: default_margin_top(),
            advance_delay_ms: default_advance_delay_ms(),
            throttle_ms: default_throttle_ms(),
        }
    }
}

impl ScrollConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_materialized: default_max_materialized(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            more_url: None,
            commit_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `~/.config/rq/config.toml` (platform equivalent)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rq").join("config.toml"))
}

/// The `--config` path, or `./.rq-config.toml`
pub fn local_config_path(local: Option<&Path>) -> PathBuf {
    local
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
}

/// Load config by merging global defaults with the local override.
/// Priority: `local` (or `./.rq-config.toml`) > global > built-in defaults.
pub fn load_config(local: Option<&Path>) -> RqConfig {
    load_config_from(global_config_path().as_deref(), &local_config_path(local))
}

/// Merge two config files. Merging is deep: individual fields within a
/// section (e.g. `[modes]`) override independently.
pub fn load_config_from(global: Option<&Path>, local: &Path) -> RqConfig {
    let global_table = global.and_then(read_table);
    let local_table = read_table(local);

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            global
        }
        (Some(global), None) => global,
        (None, Some(local)) => local,
        (None, None) => return RqConfig::default(),
    };

    toml::Value::Table(merged).try_into().unwrap_or_else(|e| {
        tracing::warn!("invalid config, using defaults: {e}");
        RqConfig::default()
    })
}

fn read_table(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<toml::Table>(&content) {
        Ok(table) => Some(table),
        Err(e) => {
            tracing::warn!(path = %path.display(), "skipping unparsable config: {e}");
            None
        }
    }
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables are merged recursively.
fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Write the sections the options overlay edits (`[modes]` and `[scroll]`)
/// into the file at `path`. Every other key already in the file is kept, and
/// nothing else from `config` (CLI overrides, local-only values) is written.
pub fn save_settings_to(config: &RqConfig, path: &Path) -> Result<()> {
    let mut table = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str::<toml::Table>(&content)
            .with_context(|| format!("Refusing to overwrite unparsable {}", path.display()))?
    } else {
        toml::Table::new()
    };
    table.insert("modes".into(), toml::Value::try_from(&config.modes)?);
    table.insert("scroll".into(), toml::Value::try_from(&config.scroll)?);

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(&table)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Settings item types for the options overlay UI.
#[derive(Debug, Clone)]
pub enum SettingsItem {
    SectionHeader(String),
    BoolToggle {
        label: String,
        get: fn(&RqConfig) -> bool,
        set: fn(&mut RqConfig, bool),
    },
    NumberEdit {
        label: String,
        get: fn(&RqConfig) -> u64,
        set: fn(&mut RqConfig, u64),
        step: u64,
    },
    StringDisplay {
        label: String,
        get: fn(&RqConfig) -> String,
    },
}

/// Build the list of settings items for the options overlay.
pub fn settings_items() -> Vec<SettingsItem> {
    vec![
        SettingsItem::SectionHeader("Queue options".into()),
        SettingsItem::BoolToggle {
            label: "Keyboard shortcuts".into(),
            get: |c| c.modes.shortcuts,
            set: |c, v| c.modes.shortcuts = v,
        },
        SettingsItem::BoolToggle {
            label: "Auto-advance after review".into(),
            get: |c| c.modes.auto_advance,
            set: |c, v| c.modes.auto_advance = v,
        },
        SettingsItem::SectionHeader("Scrolling".into()),
        SettingsItem::NumberEdit {
            label: "Scroll duration (ms)".into(),
            get: |c| c.scroll.duration_ms,
            set: |c, v| c.scroll.duration_ms = v,
            step: 50,
        },
        SettingsItem::NumberEdit {
            label: "Advance delay (ms)".into(),
            get: |c| c.scroll.advance_delay_ms,
            set: |c, v| c.scroll.advance_delay_ms = v,
            step: 100,
        },
        SettingsItem::NumberEdit {
            label: "Top margin (rows)".into(),
            get: |c| c.scroll.margin_top,
            set: |c, v| c.scroll.margin_top = v,
            step: 1,
        },
        SettingsItem::SectionHeader("Endpoint".into()),
        SettingsItem::StringDisplay {
            label: "More".into(),
            get: |c| c.endpoint.more_url.clone().unwrap_or_else(|| "-".into()),
        },
        SettingsItem::StringDisplay {
            label: "Commit".into(),
            get: |c| c.endpoint.commit_url.clone().unwrap_or_else(|| "-".into()),
        },
        SettingsItem::StringDisplay {
            label: "Max items".into(),
            get: |c| c.queue.max_materialized.to_string(),
        },
    ]
}
