//! Configuration: YAML runtime settings plus the resolved simulation config.

mod settings;
mod simulation;

pub use settings::{
    LlmSettings, RuntimeSettings, SimulationSettings, StoreSettings, load_runtime_settings,
    load_runtime_settings_from_paths, set_config_home_override,
};
pub use simulation::{DEFAULT_INFERENCE_URL, SimulationConfig};
