//! Acknowledgement store — the set of appointment ids whose rebooking
//! reminder a user has already dismissed.
//!
//! `AppState` holds an `Arc<dyn AcknowledgementStore>`. Production uses Redis;
//! tests use the in-memory store.

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;

#[async_trait]
pub trait AcknowledgementStore: Send + Sync {
    async fn acknowledged_ids(&self, user_id: Uuid) -> Result<HashSet<String>>;

    /// Idempotent: acknowledging an id twice is a no-op.
    async fn mark_acknowledged(&self, user_id: Uuid, appointment_ids: &[String]) -> Result<()>;
}

pub struct RedisAcknowledgementStore {
    client: redis::Client,
}

impl RedisAcknowledgementStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to connect to Redis")
    }
}

fn ack_key(user_id: Uuid) -> String {
    format!("familycare:reminders:ack:{user_id}")
}

#[async_trait]
impl AcknowledgementStore for RedisAcknowledgementStore {
    async fn acknowledged_ids(&self, user_id: Uuid) -> Result<HashSet<String>> {
        let mut conn = self.connection().await?;
        let ids: HashSet<String> = conn
            .smembers(ack_key(user_id))
            .await
            .context("Failed to read acknowledged reminders")?;
        Ok(ids)
    }

    async fn mark_acknowledged(&self, user_id: Uuid, appointment_ids: &[String]) -> Result<()> {
        if appointment_ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let _: () = conn
            .sadd(ack_key(user_id), appointment_ids.to_vec())
            .await
            .context("Failed to record acknowledged reminders")?;
        debug!(
            "Acknowledged {} reminder(s) for user {user_id}",
            appointment_ids.len()
        );
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct InMemoryAcknowledgementStore {
    inner: tokio::sync::RwLock<std::collections::HashMap<Uuid, HashSet<String>>>,
}

#[cfg(test)]
#[async_trait]
impl AcknowledgementStore for InMemoryAcknowledgementStore {
    async fn acknowledged_ids(&self, user_id: Uuid) -> Result<HashSet<String>> {
        Ok(self
            .inner
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn mark_acknowledged(&self, user_id: Uuid, appointment_ids: &[String]) -> Result<()> {
        self.inner
            .write()
            .await
            .entry(user_id)
            .or_default()
            .extend(appointment_ids.iter().cloned());
        Ok(())
    }
}
