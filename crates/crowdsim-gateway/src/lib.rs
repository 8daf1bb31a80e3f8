//! crowdsim-gateway: synthetic focus-group simulation over an LLM provider.
//!
//! One HTTP endpoint (`POST /simulation`) expands demographic buckets into
//! named personas, round-robins them through a fixed number of turns against
//! a chat-completions model, extracts a purchase-likelihood percentage from
//! each completion, and persists every turn to a document store. Turns are
//! strictly sequential with a fixed inter-turn delay; the first model failure
//! aborts the whole run.

#![allow(missing_docs)]

mod config;
mod gateway;
mod llm;
mod observability;
mod persona;
mod prompt;
mod simulation;
mod store;
#[doc(hidden)]
pub mod test_support;

pub use config::{
    DEFAULT_INFERENCE_URL, LlmSettings, RuntimeSettings, SimulationConfig, SimulationSettings,
    StoreSettings, load_runtime_settings, load_runtime_settings_from_paths,
    set_config_home_override,
};
pub use gateway::{
    FALLBACK_ERROR_MESSAGE, GatewayState, HealthResponse, MODEL_ERROR_MESSAGE, SimulationResponse,
    router, run_http,
};
pub use llm::{CompletionModel, LlmClient};
pub use persona::{DemographicBucket, Persona, PersonaTraits, TraitValue, generate_personas};
pub use prompt::{EMPTY_TRANSCRIPT_PLACEHOLDER, build_turn_prompt};
pub use simulation::{
    ConversationEntry, DEFAULT_TURN_DELAY_MS, MessageRecord, ProductCost, RunError,
    SimulationOutcome, SimulationRecord, SimulationRequest, SimulationRunner,
    extract_purchase_likelihood,
};
pub use store::SimulationStore;
