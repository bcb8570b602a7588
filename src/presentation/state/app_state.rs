use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::services::{BatchCoordinator, BatchRunHandle, MergeEngine};
use crate::domain::BatchId;

pub const DEFAULT_BATCH_RETENTION: Duration = Duration::from_secs(3600);

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<BatchCoordinator>,
    pub merge_engine: Arc<MergeEngine>,
    pub batches: Arc<RwLock<HashMap<BatchId, BatchRunHandle>>>,
    pub default_batch_size: usize,
    pub batch_retention: Duration,
}

impl AppState {
    pub fn new(
        coordinator: Arc<BatchCoordinator>,
        merge_engine: Arc<MergeEngine>,
        default_batch_size: usize,
    ) -> Self {
        Self {
            coordinator,
            merge_engine,
            batches: Arc::new(RwLock::new(HashMap::new())),
            default_batch_size,
            batch_retention: DEFAULT_BATCH_RETENTION,
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.batch_retention = retention;
        self
    }

    pub async fn batch(&self, id: BatchId) -> Option<BatchRunHandle> {
        self.batches.read().await.get(&id).cloned()
    }

    /// Tracks a new batch and drops batches finished longer than the
    /// retention window ago. Dropping the last handle lets its driver exit.
    pub async fn register(&self, handle: BatchRunHandle) {
        let mut batches = self.batches.write().await;
        let evicted = self.evict_expired(&mut batches);
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted finished batches");
        }
        batches.insert(handle.id(), handle);
    }

    fn evict_expired(&self, batches: &mut HashMap<BatchId, BatchRunHandle>) -> usize {
        let Ok(retention) = chrono::Duration::from_std(self.batch_retention) else {
            return 0;
        };
        let cutoff = Utc::now() - retention;
        let before = batches.len();
        batches.retain(|_, handle| match handle.progress().finished_at {
            Some(finished_at) => finished_at > cutoff,
            None => true,
        });
        before - batches.len()
    }
}
