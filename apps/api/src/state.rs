use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::appointments::acknowledgements::AcknowledgementStore;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::models::queue::QueueEntryRow;
use crate::queue::snapshot::LastGoodSnapshot;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Reminder acknowledgements. Redis-backed in production.
    pub acknowledgements: Arc<dyn AcknowledgementStore>,
    /// Active queue entries as last read successfully.
    pub queue_snapshot: LastGoodSnapshot<QueueEntryRow>,
}
