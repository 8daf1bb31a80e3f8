//! Runtime settings loader.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/conf/settings.yaml`
//! - User overrides:  `<config home>/crowdsim/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "crowdsim/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// Inference endpoint settings; env vars win over these.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmSettings {
    pub inference_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// Document store settings; `VALKEY_URL` env wins over `valkey_url`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    pub valkey_url: Option<String>,
    pub key_prefix: Option<String>,
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationSettings {
    pub turn_delay_ms: Option<u64>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            llm: self.llm.merge(overlay.llm),
            store: self.store.merge(overlay.store),
            simulation: self.simulation.merge(overlay.simulation),
        }
    }
}

impl LlmSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            inference_url: overlay.inference_url.or(self.inference_url),
            model: overlay.model.or(self.model),
            api_key: overlay.api_key.or(self.api_key),
        }
    }
}

impl StoreSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            valkey_url: overlay.valkey_url.or(self.valkey_url),
            key_prefix: overlay.key_prefix.or(self.key_prefix),
            ttl_secs: overlay.ttl_secs.or(self.ttl_secs),
        }
    }
}

impl SimulationSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            turn_delay_ms: overlay.turn_delay_ms.or(self.turn_delay_ms),
        }
    }
}

/// Override the user config home (CLI `--conf`). First caller wins; later
/// calls are ignored.
pub fn set_config_home_override(path: PathBuf) {
    let _ = CONFIG_HOME_OVERRIDE.set(path);
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn config_home() -> PathBuf {
    if let Some(overridden) = CONFIG_HOME_OVERRIDE.get() {
        return overridden.clone();
    }
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = std::env::var("HOME")
                .ok()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            home.join(DEFAULT_CONFIG_HOME_RELATIVE_PATH)
        })
}

fn load_settings_file(path: &Path) -> Option<RuntimeSettings> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_yaml::from_str(&raw) {
        Ok(settings) => Some(settings),
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                %error,
                "failed to parse settings file; ignoring it"
            );
            None
        }
    }
}

/// Load and merge system and user settings from their default locations.
pub fn load_runtime_settings() -> RuntimeSettings {
    let system = project_root().join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user = config_home().join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    load_runtime_settings_from_paths(&system, &user)
}

/// Load and merge settings from explicit paths (user over system). Missing
/// or unparseable files fall back to defaults.
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    let system_settings = load_settings_file(system).unwrap_or_default();
    let user_settings = load_settings_file(user).unwrap_or_default();
    system_settings.merge(user_settings)
}
