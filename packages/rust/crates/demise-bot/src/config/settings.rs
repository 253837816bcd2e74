//! Runtime settings loader for demise.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/demise/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "demise/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DemiseSettings {
    #[serde(default)]
    pub discord: DiscordSettings,
    #[serde(default)]
    pub selectors: SelectorSettings,
}

/// List-valued fields are comma separated, e.g. `allowed_guilds: "1,2"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscordSettings {
    pub allowed_guilds: Option<String>,
    pub admin_users: Option<String>,
    pub ingress_bind: Option<String>,
    pub ingress_path: Option<String>,
    /// Hex Ed25519 application public key used to verify interactions.
    pub public_key: Option<String>,
    pub ingress_secret_token: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SelectorSettings {
    pub history_limit: Option<usize>,
}

impl DemiseSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            discord: self.discord.merge(overlay.discord),
            selectors: self.selectors.merge(overlay.selectors),
        }
    }
}

impl DiscordSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            allowed_guilds: overlay.allowed_guilds.or(self.allowed_guilds),
            admin_users: overlay.admin_users.or(self.admin_users),
            ingress_bind: overlay.ingress_bind.or(self.ingress_bind),
            ingress_path: overlay.ingress_path.or(self.ingress_path),
            public_key: overlay.public_key.or(self.public_key),
            ingress_secret_token: overlay.ingress_secret_token.or(self.ingress_secret_token),
            api_base_url: overlay.api_base_url.or(self.api_base_url),
        }
    }
}

impl SelectorSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            history_limit: overlay.history_limit.or(self.history_limit),
        }
    }
}

/// Load merged settings (user overrides system).
pub fn load_runtime_settings() -> DemiseSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> DemiseSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> DemiseSettings {
    if !path.exists() {
        return DemiseSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                event = "config.settings.read_failed",
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return DemiseSettings::default();
        }
    };
    // An empty file parses as YAML null.
    if raw.trim().is_empty() {
        return DemiseSettings::default();
    }
    match serde_yaml::from_str::<DemiseSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                event = "config.settings.parse_failed",
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            DemiseSettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Set config-home override (used by CLI `--conf`).
///
/// Relative paths resolve against `PRJ_ROOT`, or the working directory.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }
    let configured = std::env::var("PRJ_CONFIG_HOME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}
