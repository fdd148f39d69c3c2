mod availability;
mod conflict;
mod duration;
mod error;

pub use availability::resolve_availability;
pub use duration::{FALLBACK_MINUTES, estimate_duration, estimate_end_time};
pub use error::EngineError;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};
use ulid::Ulid;

use crate::clock::{Clock, business_tomorrow};
use crate::model::*;
use crate::observability::*;
use crate::store::ScheduleStore;

/// A job being booked or edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub date: NaiveDate,
    pub start: Option<TimeOfDay>,
    /// When absent, estimated from `scope` if there is a start time.
    pub end: Option<TimeOfDay>,
    pub scope: Option<JobScope>,
    pub exclude_job: Option<Ulid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobAvailability {
    /// The window that was checked, if any.
    pub window: Option<Window>,
    pub end_estimated: bool,
    #[serde(flatten)]
    pub availability: Availability,
}

/// One worker's jobs for a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySheet {
    pub worker: Worker,
    pub jobs: Vec<ScheduledJob>,
}

/// Runs the scheduling core over data fetched from a [`ScheduleStore`].
/// Reads are fresh on every call; nothing is cached.
pub struct Engine<S> {
    store: Arc<S>,
}

impl<S: ScheduleStore> Engine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fetch the roster, then its blocks and that day's jobs concurrently,
    /// then resolve.
    pub async fn availability(&self, query: &AvailabilityQuery) -> Result<Availability, EngineError> {
        let started = Instant::now();
        metrics::counter!(RESOLVE_TOTAL).increment(1);

        let workers = self.store.active_workers().await?;
        if workers.is_empty() {
            debug!(date = %query.date, "empty roster");
            return Ok(Availability::default());
        }
        let ids: Vec<Ulid> = workers.iter().map(|w| w.id).collect();
        let (blocks, jobs) = tokio::try_join!(
            self.store.blocks_for(&ids),
            self.store.jobs_on(query.date, &ids),
        )?;

        let result = resolve_availability(query, &workers, &blocks, &jobs);

        for u in &result.unavailable {
            metrics::counter!(WORKERS_UNAVAILABLE_TOTAL, "reason" => reason_label(&u.reason))
                .increment(1);
        }
        metrics::histogram!(RESOLVE_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        debug!(
            date = %query.date,
            window = ?query.window(),
            roster = workers.len(),
            available = result.available.len(),
            unavailable = result.unavailable.len(),
            "resolved availability"
        );
        Ok(result)
    }

    /// Estimate with the duration settings currently in the store.
    pub async fn estimate_end_time(&self, start: TimeOfDay, scope: &JobScope) -> Result<TimeOfDay, EngineError> {
        let config = self.store.duration_config().await?;
        metrics::counter!(ESTIMATES_TOTAL).increment(1);
        if duration::contributed_minutes(scope, &config) == 0 {
            metrics::counter!(ESTIMATE_FALLBACK_TOTAL).increment(1);
            info!(?scope, "no service duration, assuming {FALLBACK_MINUTES} minutes");
        }
        Ok(estimate_end_time(start, scope, &config))
    }

    /// Estimate the end time when only a start is known, then resolve.
    pub async fn availability_for_job(&self, request: &JobRequest) -> Result<JobAvailability, EngineError> {
        let (end, end_estimated) = match (request.start, request.end, request.scope) {
            (Some(start), None, Some(scope)) => (Some(self.estimate_end_time(start, &scope).await?), true),
            (_, end, _) => (end, false),
        };
        let query = AvailabilityQuery {
            date: request.date,
            start: request.start,
            end,
            exclude_job: request.exclude_job,
        };
        let availability = self.availability(&query).await?;
        Ok(JobAvailability {
            window: query.window(),
            end_estimated,
            availability,
        })
    }

    /// Active workers with jobs on `date`, in roster order. Timed jobs come
    /// first by start time, untimed ones last.
    pub async fn day_sheet(&self, date: NaiveDate) -> Result<Vec<DaySheet>, EngineError> {
        let workers = self.store.active_workers().await?;
        let ids: Vec<Ulid> = workers.iter().map(|w| w.id).collect();
        let jobs = self.store.jobs_on(date, &ids).await?;

        let mut by_worker: HashMap<Ulid, Vec<ScheduledJob>> = HashMap::new();
        for job in jobs {
            if let Some(worker_id) = job.worker_id {
                by_worker.entry(worker_id).or_default().push(job);
            }
        }

        Ok(workers
            .into_iter()
            .filter_map(|worker| {
                let mut jobs = by_worker.remove(&worker.id)?;
                jobs.sort_by(|a, b| {
                    (a.start_time.is_none(), a.start_time, &a.job_number)
                        .cmp(&(b.start_time.is_none(), b.start_time, &b.job_number))
                });
                Some(DaySheet { worker, jobs })
            })
            .collect())
    }

    /// Day sheets for the business's next calendar day.
    pub async fn reminders(&self, clock: &dyn Clock, tz: Tz) -> Result<(NaiveDate, Vec<DaySheet>), EngineError> {
        let date = business_tomorrow(clock, tz);
        let sheets = self.day_sheet(date).await?;
        info!(%date, %tz, workers = sheets.len(), "collected reminders");
        Ok((date, sheets))
    }
}
