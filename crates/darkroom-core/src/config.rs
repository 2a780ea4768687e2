use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    #[serde(default)]
    pub overdue: OverdueConfig,
    #[serde(default)]
    pub targets: TargetConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub self_orders: SelfOrderConfig,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            overdue: OverdueConfig::default(),
            targets: TargetConfig::default(),
            notifications: NotificationConfig::default(),
            self_orders: SelfOrderConfig::default(),
        }
    }
}

/// Age thresholds for flagging stale non-completed orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueConfig {
    /// Orders at least this many days old count as overdue.
    #[serde(default = "default_short_after_days")]
    pub short_after_days: u32,
    /// Orders at least this many days old count as long-overdue.
    #[serde(default = "default_long_after_days")]
    pub long_after_days: u32,
}

impl Default for OverdueConfig {
    fn default() -> Self {
        Self {
            short_after_days: default_short_after_days(),
            long_after_days: default_long_after_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Upper bound a team leader may set as a monthly completion target.
    #[serde(default = "default_monthly_cap")]
    pub monthly_cap: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            monthly_cap: default_monthly_cap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Notifications older than this many hours are swept.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfOrderConfig {
    /// Skip the waiting-approval stage for every self-created order.
    #[serde(default)]
    pub auto_approve: bool,
}

#[allow(clippy::derivable_impls)]
impl Default for SelfOrderConfig {
    fn default() -> Self {
        Self {
            auto_approve: false,
        }
    }
}

/// User-level configuration from the platform config directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Team root used when the caller does not name one explicitly.
    #[serde(default)]
    pub team_root: Option<PathBuf>,
}

pub fn load_team_config(team_root: &Path) -> Result<TeamConfig> {
    let path = team_root.join(".darkroom/config.toml");
    if !path.exists() {
        return Ok(TeamConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TeamConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("darkroom/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the team root: explicit caller choice, then the user config,
/// then the current directory.
pub fn resolve_team_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root);
    }
    if let Some(root) = load_user_config()?.team_root {
        return Ok(root);
    }
    std::env::current_dir().context("Failed to resolve current directory")
}

const fn default_short_after_days() -> u32 {
    3
}

const fn default_long_after_days() -> u32 {
    30
}

const fn default_monthly_cap() -> u32 {
    200
}

const fn default_ttl_hours() -> u32 {
    12
}
