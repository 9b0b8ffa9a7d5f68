//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `--config FILE`
//! 2. `$VLB_CONFIG` environment variable
//! 3. `<vault>/.vlb.toml`
//! 4. Built-in defaults (everything is optional)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use vlb_core::{Confidence, LinkFormat, StrategyName, StrategyProfile};
use vlb_vault::RELATED_NOTES_HEADING;

/// File name looked up at the vault root.
pub const VAULT_CONFIG_FILE: &str = ".vlb.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub analyze: AnalyzeConfig,
    pub suggest: SuggestConfig,
    pub apply: ApplyConfig,
}

/// Vault scanning settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeConfig {
    /// Directory names skipped during the scan.
    pub exclude_dirs: Vec<String>,
}

/// Suggestion settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub strategy: Option<String>,
    /// Per-profile threshold overrides, keyed by profile name.
    pub profiles: BTreeMap<String, ProfileOverride>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ProfileOverride {
    pub min_score: Option<f64>,
    pub max_links: Option<usize>,
}

/// Link application settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    pub format: Option<String>,
    pub min_confidence: Option<String>,
    pub backup: bool,
    pub related_heading: String,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            format: None,
            min_confidence: None,
            backup: false,
            related_heading: RELATED_NOTES_HEADING.into(),
        }
    }
}

impl Config {
    /// Strategy from `flag`, else the config file, else `balanced`.
    pub fn strategy(&self, flag: Option<StrategyName>) -> Result<StrategyName> {
        if let Some(name) = flag {
            return Ok(name);
        }
        match &self.suggest.strategy {
            Some(name) => Ok(name.parse()?),
            None => Ok(StrategyName::default()),
        }
    }

    /// Thresholds for `name`, with any configured overrides applied.
    pub fn profile(&self, name: StrategyName) -> Result<StrategyProfile> {
        for key in self.suggest.profiles.keys() {
            key.parse::<StrategyName>()
                .with_context(|| format!("unknown profile [suggest.profiles.{key}]"))?;
        }

        let mut profile = name.profile();
        if let Some(over) = self.suggest.profiles.get(&name.to_string()) {
            if let Some(min_score) = over.min_score {
                if !(0.0..=1.0).contains(&min_score) {
                    bail!("min_score for profile '{name}' must be within 0.0..=1.0, got {min_score}");
                }
                profile.min_score = min_score;
            }
            if let Some(max_links) = over.max_links {
                profile.max_links = max_links;
            }
        }
        Ok(profile)
    }

    pub fn link_format(&self, flag: Option<LinkFormat>) -> Result<LinkFormat> {
        if let Some(format) = flag {
            return Ok(format);
        }
        match &self.apply.format {
            Some(format) => Ok(format.parse()?),
            None => Ok(LinkFormat::default()),
        }
    }

    pub fn min_confidence(&self, flag: Option<Confidence>) -> Result<Confidence> {
        if let Some(confidence) = flag {
            return Ok(confidence);
        }
        match &self.apply.min_confidence {
            Some(confidence) => Ok(confidence.parse()?),
            None => Ok(Confidence::Medium),
        }
    }
}

/// Load config for `vault`. Returns defaults if no config file exists.
///
/// An explicitly requested file (flag or environment) must exist.
pub fn load_config(flag: Option<&Path>, vault: Option<&Path>) -> Result<Config> {
    let env = std::env::var_os("VLB_CONFIG").map(PathBuf::from);
    let Some((path, explicit)) = config_path(flag, env, vault) else {
        return Ok(Config::default());
    };

    if !path.exists() {
        if explicit {
            bail!("config file not found: {}", path.display());
        }
        return Ok(Config::default());
    }

    let content =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Resolve the config file path, and whether it was asked for explicitly.
fn config_path(
    flag: Option<&Path>,
    env: Option<PathBuf>,
    vault: Option<&Path>,
) -> Option<(PathBuf, bool)> {
    if let Some(p) = flag {
        return Some((p.to_path_buf(), true));
    }
    if let Some(p) = env.filter(|p| !p.as_os_str().is_empty()) {
        return Some((p, true));
    }
    vault.map(|v| (v.join(VAULT_CONFIG_FILE), false))
}
