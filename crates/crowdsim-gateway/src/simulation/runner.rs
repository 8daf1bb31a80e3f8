//! Sequential turn loop: round-robin personas, one awaited model call per turn.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::llm::CompletionModel;
use crate::observability::SimulationEvent;
use crate::persona::generate_personas;
use crate::prompt::build_turn_prompt;
use crate::store::SimulationStore;

use super::likelihood::extract_purchase_likelihood;
use super::{ConversationEntry, MessageRecord, SimulationOutcome, SimulationRecord, SimulationRequest};

/// Default pause between turns, throttling calls to the provider.
pub const DEFAULT_TURN_DELAY_MS: u64 = 500;

/// Why a run failed. Model failures map to the gateway's fixed error payload;
/// store failures surface their own message.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("model completion failed at turn {turn}")]
    Model {
        turn: u32,
        #[source]
        source: anyhow::Error,
    },
    #[error("store write failed")]
    Store(#[source] anyhow::Error),
}

/// Runs one simulation to completion or to the first model error.
///
/// Turns are strictly sequential: each model call and store write is awaited
/// before the next turn starts, and the inter-turn delay is unconditional on
/// the success path. There is no retry and no caller-triggered cancellation.
pub struct SimulationRunner {
    model: Arc<dyn CompletionModel>,
    store: SimulationStore,
    turn_delay: Duration,
}

impl SimulationRunner {
    pub fn new(model: Arc<dyn CompletionModel>, store: SimulationStore, turn_delay: Duration) -> Self {
        Self {
            model,
            store,
            turn_delay,
        }
    }

    pub fn store(&self) -> &SimulationStore {
        &self.store
    }

    pub fn turn_delay(&self) -> Duration {
        self.turn_delay
    }

    /// Execute every turn of the request. The simulation record is persisted
    /// before the first turn; messages persisted before a mid-loop model
    /// failure remain in the store (no compensating rollback).
    pub async fn run(&self, request: SimulationRequest) -> Result<SimulationOutcome, RunError> {
        let simulation = SimulationRecord::new(request);
        self.store
            .save_simulation(&simulation)
            .await
            .map_err(RunError::Store)?;

        let personas = generate_personas(&simulation.request.demographics);
        let persona_count = u32::try_from(personas.len()).unwrap_or(u32::MAX);
        let total_turns = persona_count.saturating_mul(simulation.request.number_of_turns);
        tracing::info!(
            event = SimulationEvent::SimulationStarted.as_str(),
            simulation_id = %simulation.id,
            personas = personas.len(),
            total_turns,
            "simulation started"
        );

        let mut conversation: Vec<ConversationEntry> = Vec::new();
        for turn in 1..=total_turns {
            // Deterministic round-robin, independent of model output.
            let speaker = &personas[(turn as usize - 1) % personas.len()];
            let prompt = build_turn_prompt(&simulation.request, &conversation, speaker);

            let text = match self.model.complete(&prompt).await {
                Ok(text) => text,
                Err(source) => {
                    tracing::error!(
                        event = SimulationEvent::ModelCallFailed.as_str(),
                        simulation_id = %simulation.id,
                        turn,
                        error = %source,
                        "model call failed; aborting run"
                    );
                    return Err(RunError::Model { turn, source });
                }
            };

            let purchase_likelihood = extract_purchase_likelihood(&text);
            if let Some(value) = purchase_likelihood.filter(|v| *v > 100) {
                tracing::warn!(
                    event = SimulationEvent::LikelihoodOutOfRange.as_str(),
                    simulation_id = %simulation.id,
                    turn,
                    value,
                    "purchase likelihood above 100; stored as returned"
                );
            }

            conversation.push(ConversationEntry {
                sender: speaker.name.clone(),
                content: text.clone(),
            });
            let message = MessageRecord {
                simulation_id: simulation.id.clone(),
                turn,
                sender: speaker.name.clone(),
                sender_details: speaker.traits.clone(),
                content: text,
                purchase_likelihood,
                created_at: Utc::now(),
            };
            self.store
                .save_message(&message)
                .await
                .map_err(RunError::Store)?;
            tracing::debug!(
                event = SimulationEvent::TurnCompleted.as_str(),
                simulation_id = %simulation.id,
                turn,
                sender = %message.sender,
                likelihood = ?purchase_likelihood,
                "turn completed"
            );

            // Rate throttling toward the provider, not backpressure.
            tokio::time::sleep(self.turn_delay).await;
        }

        tracing::info!(
            event = SimulationEvent::SimulationCompleted.as_str(),
            simulation_id = %simulation.id,
            turns = conversation.len(),
            "simulation completed"
        );
        Ok(SimulationOutcome {
            simulation,
            conversation,
        })
    }
}
