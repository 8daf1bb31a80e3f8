//! Simulation domain types and the sequential turn runner.

mod likelihood;
mod runner;

pub use likelihood::extract_purchase_likelihood;
pub use runner::{DEFAULT_TURN_DELAY_MS, RunError, SimulationRunner};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persona::{DemographicBucket, PersonaTraits};

/// Product cost as supplied by the caller: number or free-form string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductCost {
    Integer(i64),
    Amount(f64),
    Text(String),
}

impl fmt::Display for ProductCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Amount(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Inbound simulation request. Wire field names are camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    /// Buckets expanded into personas, in order.
    pub demographics: Vec<DemographicBucket>,
    /// Round-robin passes over the persona list.
    pub number_of_turns: u32,
    pub product_name: String,
    pub product_description: String,
    pub product_cost: ProductCost,
    /// The announcement every persona reacts to.
    pub exposure_message: String,
}

/// Persisted simulation metadata: the request parameters plus a generated id
/// correlating all messages of the run. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub request: SimulationRequest,
}

impl SimulationRecord {
    pub fn new(request: SimulationRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            request,
        }
    }
}

/// One persisted turn. Append-only; `purchase_likelihood` stays null when the
/// completion carries no asterisk-wrapped percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub simulation_id: String,
    /// 1-based, strictly increasing within a run.
    pub turn: u32,
    pub sender: String,
    /// Copy of the speaking persona's trait mapping.
    pub sender_details: PersonaTraits,
    /// Raw completion text, unmodified (the asterisk block stays in).
    pub content: String,
    pub purchase_likelihood: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// One transcript entry. Lives in memory for the duration of a run and is
/// returned in the response; reconstructable from messages, never persisted
/// as its own entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub sender: String,
    pub content: String,
}

/// Full-run result returned to the caller on success.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub simulation: SimulationRecord,
    pub conversation: Vec<ConversationEntry>,
}
