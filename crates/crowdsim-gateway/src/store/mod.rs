//! Insert-only document store for simulation and message records.
//!
//! Two write operations (`save_simulation`, `save_message`), no update or
//! delete path. Backend is Valkey/Redis when configured, otherwise in-memory;
//! runs are single-request scoped, so there are no concurrent-writer
//! conflicts on one simulation by construction.

mod redis_backend;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use crate::observability::SimulationEvent;
use crate::simulation::{MessageRecord, SimulationRecord};

use redis_backend::RedisDocumentBackend;

/// Document store: simulation metadata plus per-turn messages keyed by
/// simulation id. Cloning shares the underlying backend.
#[derive(Clone)]
pub struct SimulationStore {
    simulations: Arc<RwLock<HashMap<String, SimulationRecord>>>,
    messages: Arc<RwLock<HashMap<String, Vec<MessageRecord>>>>,
    redis: Option<Arc<RedisDocumentBackend>>,
}

impl SimulationStore {
    fn from_redis_backend(redis: Option<Arc<RedisDocumentBackend>>) -> Self {
        Self {
            simulations: Arc::new(RwLock::new(HashMap::new())),
            messages: Arc::new(RwLock::new(HashMap::new())),
            redis,
        }
    }

    /// Backend from env/settings: Valkey when `VALKEY_URL` (or the store
    /// settings section) is configured, in-memory otherwise.
    pub fn new() -> Result<Self> {
        let redis = match RedisDocumentBackend::from_env() {
            Some(Ok(backend)) => {
                tracing::info!(
                    event = SimulationEvent::StoreBackendEnabled.as_str(),
                    key_prefix = %backend.key_prefix(),
                    ttl_secs = ?backend.ttl_secs(),
                    "document store backend enabled: valkey"
                );
                Some(Arc::new(backend))
            }
            Some(Err(error)) => {
                return Err(error).context("failed to initialize valkey document store");
            }
            None => None,
        };
        Ok(Self::from_redis_backend(redis))
    }

    /// Purely in-memory store (also the test backend).
    pub fn in_memory() -> Self {
        Self::from_redis_backend(None)
    }

    /// Store with explicit Valkey backend parameters.
    pub fn new_with_redis(
        redis_url: impl Into<String>,
        key_prefix: Option<String>,
        ttl_secs: Option<u64>,
    ) -> Result<Self> {
        let backend = RedisDocumentBackend::new_from_parts(redis_url.into(), key_prefix, ttl_secs)?;
        Ok(Self::from_redis_backend(Some(Arc::new(backend))))
    }

    pub fn backend_name(&self) -> &'static str {
        if self.redis.is_some() { "valkey" } else { "memory" }
    }

    /// Persist simulation metadata. Single insert, never updated.
    pub async fn save_simulation(&self, record: &SimulationRecord) -> Result<()> {
        if let Some(ref redis) = self.redis {
            redis.save_simulation(record).await.with_context(|| {
                format!("valkey simulation save failed for simulation_id={}", record.id)
            })?;
            tracing::debug!(
                event = SimulationEvent::DocumentSaved.as_str(),
                kind = "simulation",
                simulation_id = %record.id,
                backend = "valkey",
                "simulation record saved"
            );
            return Ok(());
        }
        let mut g = self.simulations.write().await;
        g.insert(record.id.clone(), record.clone());
        tracing::debug!(
            event = SimulationEvent::DocumentSaved.as_str(),
            kind = "simulation",
            simulation_id = %record.id,
            backend = "memory",
            "simulation record saved"
        );
        Ok(())
    }

    /// Append one turn's message record.
    pub async fn save_message(&self, record: &MessageRecord) -> Result<()> {
        if let Some(ref redis) = self.redis {
            redis.save_message(record).await.with_context(|| {
                format!(
                    "valkey message save failed for simulation_id={} turn={}",
                    record.simulation_id, record.turn
                )
            })?;
            tracing::debug!(
                event = SimulationEvent::DocumentSaved.as_str(),
                kind = "message",
                simulation_id = %record.simulation_id,
                turn = record.turn,
                backend = "valkey",
                "message record saved"
            );
            return Ok(());
        }
        let mut g = self.messages.write().await;
        let entry = g.entry(record.simulation_id.clone()).or_default();
        entry.push(record.clone());
        tracing::debug!(
            event = SimulationEvent::DocumentSaved.as_str(),
            kind = "message",
            simulation_id = %record.simulation_id,
            turn = record.turn,
            total_messages = entry.len(),
            backend = "memory",
            "message record saved"
        );
        Ok(())
    }

    /// All stored simulation records. Diagnostics and tests only; the run
    /// path never reads.
    pub async fn simulations(&self) -> Result<Vec<SimulationRecord>> {
        if let Some(ref redis) = self.redis {
            return redis
                .simulations()
                .await
                .context("valkey simulation listing failed");
        }
        let g = self.simulations.read().await;
        let mut records: Vec<SimulationRecord> = g.values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    /// Message history for one simulation, in insertion order. Diagnostics
    /// and tests only; the run path never reads.
    pub async fn messages_for(&self, simulation_id: &str) -> Result<Vec<MessageRecord>> {
        if let Some(ref redis) = self.redis {
            return redis.messages_for(simulation_id).await.with_context(|| {
                format!("valkey message read failed for simulation_id={simulation_id}")
            });
        }
        let g = self.messages.read().await;
        Ok(g.get(simulation_id).cloned().unwrap_or_default())
    }
}
