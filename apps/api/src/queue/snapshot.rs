//! Last-good snapshot of a source that is re-read on every request.
//! A failed read serves the previous successful result instead of nothing.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

#[derive(Clone)]
pub struct LastGoodSnapshot<T> {
    source: &'static str,
    inner: Arc<RwLock<Option<Vec<T>>>>,
}

impl<T: Clone> LastGoodSnapshot<T> {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Stores `fetched` on success. On failure returns the previous snapshot,
    /// or an empty list if the source has never been read successfully.
    pub async fn resolve(&self, fetched: anyhow::Result<Vec<T>>) -> Vec<T> {
        match fetched {
            Ok(items) => {
                *self.inner.write().await = Some(items.clone());
                items
            }
            Err(e) => {
                let previous = self.inner.read().await.clone();
                warn!(
                    "Refreshing {} failed, serving {} cached item(s): {e:#}",
                    self.source,
                    previous.as_ref().map_or(0, Vec::len)
                );
                previous.unwrap_or_default()
            }
        }
    }
}
