//! Valkey/Redis-backed document persistence for simulations and messages.
//!
//! Simulation records are JSON string keys; messages are JSON entries in a
//! per-simulation list (append-only, insertion order preserved). An optional
//! TTL expires both.

use std::sync::Arc;

use anyhow::{Context, Result};
use redis::FromRedisValue;
use tokio::sync::Mutex;

use crate::config::load_runtime_settings;
use crate::observability::SimulationEvent;
use crate::simulation::{MessageRecord, SimulationRecord};

const DEFAULT_STORE_KEY_PREFIX: &str = "crowdsim:store";

#[derive(Debug, Clone)]
pub(crate) struct RedisDocumentConfig {
    pub(crate) url: String,
    pub(crate) key_prefix: String,
    pub(crate) ttl_secs: Option<u64>,
}

impl RedisDocumentConfig {
    pub(crate) fn from_env() -> Option<Self> {
        let settings = load_runtime_settings();
        let url = std::env::var("VALKEY_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                settings
                    .store
                    .valkey_url
                    .as_deref()
                    .map(str::trim)
                    .map(str::to_string)
                    .filter(|v| !v.is_empty())
            })?;
        let key_prefix = std::env::var("CROWDSIM_STORE_KEY_PREFIX")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                settings
                    .store
                    .key_prefix
                    .as_deref()
                    .map(str::trim)
                    .map(str::to_string)
                    .filter(|v| !v.is_empty())
            })
            .unwrap_or_else(|| DEFAULT_STORE_KEY_PREFIX.to_string());
        let ttl_secs = match std::env::var("CROWDSIM_STORE_TTL_SECS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(v) if v > 0 => Some(v),
                _ => {
                    tracing::warn!(
                        env_var = "CROWDSIM_STORE_TTL_SECS",
                        value = %raw,
                        "invalid store ttl env value; using settings/default"
                    );
                    settings.store.ttl_secs.filter(|v| *v > 0)
                }
            },
            Err(_) => settings.store.ttl_secs.filter(|v| *v > 0),
        };
        Some(Self {
            url,
            key_prefix,
            ttl_secs,
        })
    }
}

#[derive(Debug)]
pub(crate) struct RedisDocumentBackend {
    client: redis::Client,
    key_prefix: String,
    ttl_secs: Option<u64>,
    connection: Arc<Mutex<Option<redis::aio::MultiplexedConnection>>>,
}

impl RedisDocumentBackend {
    pub(crate) fn from_env() -> Option<Result<Self>> {
        let cfg = RedisDocumentConfig::from_env()?;
        Some(Self::new(cfg))
    }

    pub(crate) fn new(cfg: RedisDocumentConfig) -> Result<Self> {
        let client = redis::Client::open(cfg.url.as_str())
            .with_context(|| format!("invalid redis url for document store: {}", cfg.url))?;
        Ok(Self {
            client,
            key_prefix: cfg.key_prefix,
            ttl_secs: cfg.ttl_secs,
            connection: Arc::new(Mutex::new(None)),
        })
    }

    pub(crate) fn new_from_parts(
        url: String,
        key_prefix: Option<String>,
        ttl_secs: Option<u64>,
    ) -> Result<Self> {
        let prefix = key_prefix
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_KEY_PREFIX.to_string());
        Self::new(RedisDocumentConfig {
            url,
            key_prefix: prefix,
            ttl_secs: ttl_secs.filter(|value| *value > 0),
        })
    }

    pub(crate) fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub(crate) fn ttl_secs(&self) -> Option<u64> {
        self.ttl_secs
    }

    fn simulation_key(&self, simulation_id: &str) -> String {
        format!("{}:simulation:{}", self.key_prefix, simulation_id)
    }

    fn messages_key(&self, simulation_id: &str) -> String {
        format!("{}:messages:{}", self.key_prefix, simulation_id)
    }

    async fn ensure_connection(
        &self,
        connection: &mut Option<redis::aio::MultiplexedConnection>,
    ) -> Result<()> {
        if connection.is_some() {
            return Ok(());
        }
        *connection = Some(
            self.client
                .get_multiplexed_async_connection()
                .await
                .context("failed to open redis connection for document store")?,
        );
        tracing::debug!(
            event = SimulationEvent::StoreValkeyConnected.as_str(),
            key_prefix = %self.key_prefix,
            "valkey document store connected"
        );
        Ok(())
    }

    /// Run one command with a single reconnect retry on failure.
    async fn run_command<T, F>(&self, operation: &'static str, build: F) -> Result<T>
    where
        T: FromRedisValue + Send,
        F: Fn() -> redis::Cmd,
    {
        let mut last_err: Option<anyhow::Error> = None;
        for attempt in 0..2 {
            let mut conn_guard = self.connection.lock().await;
            self.ensure_connection(&mut conn_guard).await?;
            let conn = conn_guard
                .as_mut()
                .ok_or_else(|| anyhow::anyhow!("redis document store connection unavailable"))?;
            let cmd = build();
            let result: redis::RedisResult<T> = cmd.query_async(conn).await;
            match result {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!(
                            event = SimulationEvent::StoreCommandRetrySucceeded.as_str(),
                            operation,
                            "store command succeeded after reconnect"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    // Drop the connection so the retry reconnects.
                    *conn_guard = None;
                    last_err = Some(
                        anyhow::Error::new(error)
                            .context(format!("redis command failed: {operation}")),
                    );
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            anyhow::anyhow!("redis command failed without error detail: {operation}")
        }))
    }

    pub(crate) async fn save_simulation(&self, record: &SimulationRecord) -> Result<()> {
        let payload =
            serde_json::to_string(record).context("failed to serialize simulation record")?;
        let key = self.simulation_key(&record.id);
        let ttl_secs = self.ttl_secs;
        self.run_command::<(), _>("set_simulation", || {
            let mut cmd = redis::cmd("SET");
            cmd.arg(&key).arg(&payload);
            if let Some(ttl) = ttl_secs {
                cmd.arg("EX").arg(ttl);
            }
            cmd
        })
        .await
    }

    pub(crate) async fn save_message(&self, record: &MessageRecord) -> Result<()> {
        let payload =
            serde_json::to_string(record).context("failed to serialize message record")?;
        let key = self.messages_key(&record.simulation_id);
        let _len: i64 = self
            .run_command("rpush_message", || {
                let mut cmd = redis::cmd("RPUSH");
                cmd.arg(&key).arg(&payload);
                cmd
            })
            .await?;
        if let Some(ttl) = self.ttl_secs {
            let _set: i64 = self
                .run_command("expire_messages", || {
                    let mut cmd = redis::cmd("EXPIRE");
                    cmd.arg(&key).arg(ttl);
                    cmd
                })
                .await?;
        }
        Ok(())
    }

    pub(crate) async fn simulations(&self) -> Result<Vec<SimulationRecord>> {
        let pattern = format!("{}:simulation:*", self.key_prefix);
        let keys: Vec<String> = self
            .run_command("keys_simulations", || {
                let mut cmd = redis::cmd("KEYS");
                cmd.arg(&pattern);
                cmd
            })
            .await?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: Option<String> = self
                .run_command("get_simulation", || {
                    let mut cmd = redis::cmd("GET");
                    cmd.arg(&key);
                    cmd
                })
                .await?;
            if let Some(raw) = raw {
                records.push(
                    serde_json::from_str(&raw)
                        .context("failed to deserialize simulation record")?,
                );
            }
        }
        records.sort_by(|a: &SimulationRecord, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    pub(crate) async fn messages_for(&self, simulation_id: &str) -> Result<Vec<MessageRecord>> {
        let key = self.messages_key(simulation_id);
        let raw: Vec<String> = self
            .run_command("lrange_messages", || {
                let mut cmd = redis::cmd("LRANGE");
                cmd.arg(&key).arg(0).arg(-1);
                cmd
            })
            .await?;
        raw.iter()
            .map(|entry| {
                serde_json::from_str(entry).context("failed to deserialize message record")
            })
            .collect()
    }
}
