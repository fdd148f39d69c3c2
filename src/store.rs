use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::model::*;

/// Read side of whatever owns the scheduling data.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Active workers in roster order.
    async fn active_workers(&self) -> Result<Vec<Worker>, StoreError>;

    async fn blocks_for(&self, worker_ids: &[Ulid]) -> Result<Vec<AvailabilityBlock>, StoreError>;

    /// Jobs on `date` assigned to one of `worker_ids`.
    async fn jobs_on(
        &self,
        date: NaiveDate,
        worker_ids: &[Ulid],
    ) -> Result<Vec<ScheduledJob>, StoreError>;

    async fn duration_config(&self) -> Result<DurationConfig, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnknownWorker(Ulid),
    NotFound(Ulid),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "io error: {e}"),
            StoreError::Json(e) => write!(f, "invalid snapshot: {e}"),
            StoreError::UnknownWorker(id) => write!(f, "unknown worker: {id}"),
            StoreError::NotFound(id) => write!(f, "not found: {id}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// Serialized form of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub blocks: Vec<AvailabilityBlock>,
    #[serde(default)]
    pub jobs: Vec<ScheduledJob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DurationConfig>,
}

/// In-memory store. Roster order is display name, then id.
pub struct MemoryStore {
    workers: DashMap<Ulid, Worker>,
    blocks: DashMap<Ulid, AvailabilityBlock>,
    jobs: DashMap<Ulid, ScheduledJob>,
    settings: RwLock<Option<DurationConfig>>,
    /// Used when no settings have been stored.
    default_config: DurationConfig,
}

impl MemoryStore {
    pub fn new(default_config: DurationConfig) -> Self {
        Self {
            workers: DashMap::new(),
            blocks: DashMap::new(),
            jobs: DashMap::new(),
            settings: RwLock::new(None),
            default_config,
        }
    }

    /// Blocks referencing a worker missing from the snapshot are rejected.
    pub fn from_snapshot(snapshot: Snapshot, default_config: DurationConfig) -> Result<Self, StoreError> {
        let store = Self {
            settings: RwLock::new(snapshot.settings),
            ..Self::new(default_config)
        };
        for worker in snapshot.workers {
            store.upsert_worker(worker);
        }
        for block in snapshot.blocks {
            store.add_block(block)?;
        }
        for job in snapshot.jobs {
            store.upsert_job(job);
        }
        Ok(store)
    }

    pub async fn load_json(path: impl AsRef<Path>, default_config: DurationConfig) -> Result<Self, StoreError> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            workers = snapshot.workers.len(),
            blocks = snapshot.blocks.len(),
            jobs = snapshot.jobs.len(),
            "loaded snapshot"
        );
        Self::from_snapshot(snapshot, default_config)
    }

    pub async fn snapshot(&self) -> Snapshot {
        let mut workers: Vec<Worker> = self.workers.iter().map(|e| e.value().clone()).collect();
        sort_roster(&mut workers);
        let mut blocks: Vec<AvailabilityBlock> = self.blocks.iter().map(|e| e.value().clone()).collect();
        blocks.sort_by_key(|b| b.id);
        let mut jobs: Vec<ScheduledJob> = self.jobs.iter().map(|e| e.value().clone()).collect();
        jobs.sort_by_key(|j| j.id);
        Snapshot {
            workers,
            blocks,
            jobs,
            settings: *self.settings.read().await,
        }
    }

    pub fn upsert_worker(&self, worker: Worker) {
        self.workers.insert(worker.id, worker);
    }

    pub fn add_block(&self, block: AvailabilityBlock) -> Result<(), StoreError> {
        if !self.workers.contains_key(&block.worker_id) {
            return Err(StoreError::UnknownWorker(block.worker_id));
        }
        self.blocks.insert(block.id, block);
        Ok(())
    }

    pub fn remove_block(&self, id: Ulid) -> Result<AvailabilityBlock, StoreError> {
        self.blocks
            .remove(&id)
            .map(|(_, block)| block)
            .ok_or(StoreError::NotFound(id))
    }

    pub fn upsert_job(&self, job: ScheduledJob) {
        self.jobs.insert(job.id, job);
    }

    pub fn remove_job(&self, id: Ulid) -> Result<ScheduledJob, StoreError> {
        self.jobs
            .remove(&id)
            .map(|(_, job)| job)
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn set_duration_config(&self, config: DurationConfig) {
        *self.settings.write().await = Some(config);
    }
}

fn sort_roster(workers: &mut [Worker]) {
    workers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn active_workers(&self) -> Result<Vec<Worker>, StoreError> {
        let mut workers: Vec<Worker> = self
            .workers
            .iter()
            .filter(|e| e.value().active)
            .map(|e| e.value().clone())
            .collect();
        sort_roster(&mut workers);
        Ok(workers)
    }

    async fn blocks_for(&self, worker_ids: &[Ulid]) -> Result<Vec<AvailabilityBlock>, StoreError> {
        let wanted: HashSet<&Ulid> = worker_ids.iter().collect();
        Ok(self
            .blocks
            .iter()
            .filter(|e| wanted.contains(&e.value().worker_id))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn jobs_on(
        &self,
        date: NaiveDate,
        worker_ids: &[Ulid],
    ) -> Result<Vec<ScheduledJob>, StoreError> {
        let wanted: HashSet<&Ulid> = worker_ids.iter().collect();
        let mut jobs: Vec<ScheduledJob> = self
            .jobs
            .iter()
            .filter(|e| {
                let job = e.value();
                job.date == date && job.worker_id.is_some_and(|w| wanted.contains(&w))
            })
            .map(|e| e.value().clone())
            .collect();
        jobs.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(jobs)
    }

    async fn duration_config(&self) -> Result<DurationConfig, StoreError> {
        Ok(self.settings.read().await.unwrap_or(self.default_config))
    }
}
