use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use toml::Value;

use crate::banner::{BannerSelector, DEFAULT_REDIRECT_BASE};
use crate::plan::{PLAN_JETPACK_FREE, SitePlan};

pub const DEFAULT_CONFIG_PATH: &str = ".plancard/config.toml";
pub const ENV_CONFIG: &str = "PLANCARD_CONFIG";
pub const ENV_SITE_URL: &str = "PLANCARD_SITE_URL";
pub const ENV_PLAN: &str = "PLANCARD_PLAN";
pub const ENV_REDIRECT_BASE: &str = "PLANCARD_REDIRECT_BASE";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct PlancardConfig {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub banner: BannerSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct SiteSection {
    pub url: Option<String>,
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct BannerSection {
    pub redirect_base: Option<String>,
}

/// Settings after applying env > config file > default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSettings {
    pub site_url: Option<String>,
    pub plan_slug: String,
    pub redirect_base: String,
}

impl ResolvedSettings {
    pub fn site_plan(&self) -> SitePlan {
        SitePlan::new(self.plan_slug.clone())
    }

    pub fn selector(&self) -> BannerSelector {
        BannerSelector::new(self.redirect_base.clone())
    }
}

impl PlancardConfig {
    pub fn resolve(&self) -> ResolvedSettings {
        self.resolve_with_lookup(|key| env::var(key).ok())
    }

    pub fn resolve_with_lookup<F>(&self, lookup_env: F) -> ResolvedSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |key: &str| {
            lookup_env(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        ResolvedSettings {
            site_url: from_env(ENV_SITE_URL).or_else(|| self.site.url.clone()),
            plan_slug: from_env(ENV_PLAN)
                .or_else(|| self.site.plan.clone())
                .unwrap_or_else(|| PLAN_JETPACK_FREE.to_string()),
            redirect_base: from_env(ENV_REDIRECT_BASE)
                .or_else(|| self.banner.redirect_base.clone())
                .unwrap_or_else(|| DEFAULT_REDIRECT_BASE.to_string()),
        }
    }
}

/// Pick the config file: explicit flag > PLANCARD_CONFIG > default under `cwd`.
pub fn resolve_config_path(cwd: &Path, flag: Option<&Path>) -> PathBuf {
    resolve_config_path_with_lookup(cwd, flag, |key| env::var(key).ok())
}

fn resolve_config_path_with_lookup<F>(cwd: &Path, flag: Option<&Path>, lookup_env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let chosen = match flag {
        Some(path) => path.to_path_buf(),
        None => lookup_env(ENV_CONFIG)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
    };
    if chosen.is_absolute() {
        chosen
    } else {
        cwd.join(chosen)
    }
}

/// Load and parse the config file. Returns default if the file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<PlancardConfig> {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "config file missing, using defaults");
        return Ok(PlancardConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: PlancardConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub set_site_url: Option<String>,
    pub set_plan: Option<String>,
    pub set_redirect_base: Option<String>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.set_site_url.is_none() && self.set_plan.is_none() && self.set_redirect_base.is_none()
    }
}

/// Update selected keys while preserving all other config sections.
/// Returns `true` when a write occurred.
pub fn patch_config(config_path: &Path, patch: &ConfigPatch) -> Result<bool> {
    if patch.is_empty() {
        return Ok(false);
    }

    let mut root = if config_path.exists() {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        toml::from_str::<Value>(&content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?
    } else {
        Value::Table(Default::default())
    };
    let original = root.clone();

    let root_table = root.as_table_mut().ok_or_else(|| {
        anyhow::anyhow!(
            "top-level TOML must be a table in {}",
            config_path.display()
        )
    })?;

    if let Some(url) = &patch.set_site_url {
        set_string(root_table, "site", "url", url, config_path)?;
    }
    if let Some(plan) = &patch.set_plan {
        set_string(root_table, "site", "plan", plan, config_path)?;
    }
    if let Some(base) = &patch.set_redirect_base {
        set_string(root_table, "banner", "redirect_base", base, config_path)?;
    }

    if root == original {
        return Ok(false);
    }

    let parent = config_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("config path has no parent: {}", config_path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config TOML")?;
    fs::write(config_path, rendered)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "updated config");
    Ok(true)
}

fn set_string(
    root: &mut toml::map::Map<String, Value>,
    section: &str,
    key: &str,
    value: &str,
    config_path: &Path,
) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("[{section}] {key} cannot be empty");
    }
    let entry = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Table(Default::default()));
    let table = entry.as_table_mut().ok_or_else(|| {
        anyhow::anyhow!("[{section}] must be a table in {}", config_path.display())
    })?;
    table.insert(key.to_string(), Value::String(trimmed.to_string()));
    Ok(())
}
