use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "glossa";
const CONFIG_FILE: &str = "config.json";

/// Overrides the application data directory (config and indexes)
pub const HOME_ENV: &str = "GLOSSA_HOME";

/// User configuration stored in the app data directory.
///
/// Every field is optional in the file; command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Glossary repository root (the directory holding `projects/`)
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Default source language filter for lookups
    #[serde(default)]
    pub source_language: Option<String>,

    /// Default target language filter for lookups
    #[serde(default)]
    pub target_language: Option<String>,

    /// Glossary whose hits are listed first
    #[serde(default)]
    pub preferred_glossary: Option<String>,

    /// Colorize lookup output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Maximum number of hits to print (0 = unlimited)
    #[serde(default)]
    pub limit: usize,
}

fn default_color() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: None,
            source_language: None,
            target_language: None,
            preferred_glossary: None,
            color: default_color(),
            limit: 0,
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).context("Failed to read config file")?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Glossary root: explicit flag, then config, then the current directory
    pub fn resolve_root(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.root.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Limit as an option (0 means unlimited)
    pub fn effective_limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit)
    }

    pub const KEYS: [&'static str; 6] = [
        "root",
        "source_language",
        "target_language",
        "preferred_glossary",
        "color",
        "limit",
    ];

    /// Current value of a setting, empty when unset
    pub fn get(&self, key: &str) -> Result<String> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        Ok(match key {
            "root" => self
                .root
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "source_language" => opt(&self.source_language),
            "target_language" => opt(&self.target_language),
            "preferred_glossary" => opt(&self.preferred_glossary),
            "color" => self.color.to_string(),
            "limit" => self.limit.to_string(),
            _ => bail!("unknown config key '{key}' (expected one of: {})", Self::KEYS.join(", ")),
        })
    }

    /// Set a setting from its text form; an empty value clears optional settings
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let opt = |v: &str| (!v.is_empty()).then(|| v.to_string());
        match key {
            "root" => self.root = opt(value).map(PathBuf::from),
            "source_language" => self.source_language = opt(value),
            "target_language" => self.target_language = opt(value),
            "preferred_glossary" => self.preferred_glossary = opt(value),
            "color" => {
                self.color = value
                    .parse()
                    .with_context(|| format!("color must be true or false, got '{value}'"))?
            }
            "limit" => {
                self.limit = value
                    .parse()
                    .with_context(|| format!("limit must be a number, got '{value}'"))?
            }
            _ => bail!("unknown config key '{key}' (expected one of: {})", Self::KEYS.join(", ")),
        }
        Ok(())
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join(CONFIG_FILE))
}

/// Get the application data directory for config and indexes
pub fn get_app_data_dir() -> Result<PathBuf> {
    let app_dir = match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base = if cfg!(target_os = "macos") {
                dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
            } else if cfg!(target_os = "windows") {
                dirs::data_local_dir()
            } else {
                // Linux/Unix: XDG_DATA_HOME or ~/.local/share
                dirs::data_dir()
            };
            base.context("Could not determine app data directory")?
                .join(APP_NAME)
        }
    };

    fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create {}", app_dir.display()))?;
    Ok(app_dir)
}

/// Get the index directory for a glossary repository root
pub fn get_index_dir(root_path: &Path) -> Result<PathBuf> {
    let indexes_dir = get_app_data_dir()?.join("indexes");
    fs::create_dir_all(&indexes_dir)?;
    Ok(indexes_dir.join(hash_path(root_path)))
}

/// Hash a path to create a unique folder name
/// Format: first 16 chars of dir name + hash
fn hash_path(path: &Path) -> String {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    let dir_name = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("root");

    let sanitized: String = dir_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(16)
        .collect();

    let mut hasher = DefaultHasher::new();
    canonical.to_string_lossy().hash(&mut hasher);

    format!("{}-{:016x}", sanitized, hasher.finish())
}

/// Remove the index for a glossary repository
pub fn remove_index(root_path: &Path) -> Result<bool> {
    let index_dir = get_index_dir(root_path)?;
    if index_dir.exists() {
        fs::remove_dir_all(&index_dir)?;
        return Ok(true);
    }
    Ok(false)
}
