use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TT_CONFIG_PATH";

/// Escape sequences used to highlight the active task and dim finished ones.
#[derive(Debug, Clone)]
pub struct Palette {
    pub active: &'static str,
    pub finished: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn paint_active(&self, text: &str) -> String {
        paint(self.active, self.reset, text)
    }

    pub fn paint_finished(&self, text: &str) -> String {
        paint(self.finished, self.reset, text)
    }
}

fn paint(color: &str, reset: &str, text: &str) -> String {
    if color.is_empty() {
        text.to_string()
    } else {
        format!("{color}{text}{reset}")
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            active: "\x1b[38;5;208m",
            finished: "\x1b[38;5;244m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            active: "\x1b[38;5;108m",
            finished: "\x1b[38;5;246m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            active: "",
            finished: "",
            reset: "",
        },
    }
}

/// Known themes are `default`, `noir` and `solarized`; anything else paints
/// nothing. A blank name means no theme.
pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonical_key(raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

pub(crate) fn canonical_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    #[serde(default)]
    pub store_path: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub aliases: HashMap<String, String>,
    pub store_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideTarget {
    Theme,
    Alias(String),
    StorePath,
}

impl ConfigOverrides {
    /// Applies one `KEY=VALUE` argument, e.g. `theme=noir`,
    /// `aliases.ls=list` or `store_path=/tmp/tasks.txt`.
    pub fn apply(&mut self, raw: &str) -> Result<OverrideTarget, AppError> {
        let (key_raw, value_raw) = raw
            .trim()
            .split_once('=')
            .ok_or_else(|| AppError::invalid_input("override must be in KEY=VALUE format"))?;
        let value = value_raw.trim().to_string();
        let (field, remainder) = match key_raw.split_once('.') {
            Some((field, rest)) => (field, Some(rest.trim())),
            None => (key_raw, None),
        };

        let field = canonical_key(field);
        match (field.as_str(), remainder) {
            ("", _) => Err(AppError::invalid_input("override key cannot be empty")),
            ("theme", None) => {
                self.theme = Some(value);
                Ok(OverrideTarget::Theme)
            }
            ("store_path" | "store", None) => {
                self.store_path = Some(value);
                Ok(OverrideTarget::StorePath)
            }
            ("theme" | "store_path" | "store", Some(_)) => Err(AppError::invalid_input(format!(
                "{field} override cannot have subfields"
            ))),
            ("aliases" | "alias", Some(name)) if !name.is_empty() => {
                self.aliases.insert(name.to_string(), value);
                Ok(OverrideTarget::Alias(name.to_string()))
            }
            ("aliases" | "alias", _) => Err(AppError::invalid_input(
                "aliases override requires an alias name",
            )),
            (other, _) => Err(AppError::invalid_input(format!(
                "unknown config field '{other}'"
            ))),
        }
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("tt").join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("tt")
            .join(CONFIG_FILE_NAME))
    }
}

/// Loads the user configuration. A missing file gives defaults; an unreadable
/// or invalid one also gives defaults, with a warning.
pub fn load_config_or_default() -> Config {
    match config_path() {
        Ok(path) => load_config_or_default_from_path(&path),
        Err(err) => {
            warn!(error = %err, "cannot locate config, using defaults");
            Config::default()
        }
    }
}

fn load_config_or_default_from_path(path: &Path) -> Config {
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Config::default();
    }

    match load_config_from_path(path) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "ignoring config file");
            Config::default()
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref() {
        merged.theme = canonical_theme_name(theme);
    }

    if let Some(store_path) = overrides.store_path.as_ref() {
        merged.store_path = Some(store_path.clone());
    }

    for (alias, value) in overrides.aliases.iter() {
        merged.aliases.insert(alias.clone(), value.clone());
    }

    merged
}
