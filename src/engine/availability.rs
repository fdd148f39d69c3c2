use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use ulid::Ulid;

use crate::model::*;

use super::conflict::find_conflict;

// ── Availability Algorithm ────────────────────────────────────────

/// Partition the active roster into available and unavailable workers.
///
/// Checks run per worker, first match wins:
/// 1. recurring weekly day off on the query date's weekday,
/// 2. one-off block on exactly the query date,
/// 3. overlap with another of the worker's timed jobs that day, only when
///    the query has both a start and an end time.
///
/// Inactive workers appear in neither list. Both lists keep roster order.
pub fn resolve_availability(
    query: &AvailabilityQuery,
    workers: &[Worker],
    blocks: &[AvailabilityBlock],
    jobs: &[ScheduledJob],
) -> Availability {
    let mut blocks_by_worker: HashMap<Ulid, Vec<&AvailabilityBlock>> = HashMap::new();
    for block in blocks {
        blocks_by_worker.entry(block.worker_id).or_default().push(block);
    }
    let mut jobs_by_worker: HashMap<Ulid, Vec<&ScheduledJob>> = HashMap::new();
    for job in jobs {
        // Unassigned jobs conflict with nobody.
        if let Some(worker_id) = job.worker_id {
            jobs_by_worker.entry(worker_id).or_default().push(job);
        }
    }

    let window = query.window();
    let mut result = Availability::default();

    for worker in workers.iter().filter(|w| w.active) {
        let own_blocks = blocks_by_worker.get(&worker.id).map_or(&[][..], Vec::as_slice);
        let own_jobs = jobs_by_worker.get(&worker.id).map_or(&[][..], Vec::as_slice);

        let reason = day_block(own_blocks, query.date).or_else(|| {
            let window = window.as_ref()?;
            let (job, busy) =
                find_conflict(own_jobs.iter().copied(), query.date, window, query.exclude_job)?;
            Some(Unavailability::Busy {
                job_id: job.id,
                job_number: job.job_number.clone(),
                window: busy,
            })
        });

        match reason {
            Some(reason) => result.unavailable.push(UnavailableWorker {
                worker: worker.clone(),
                reason,
            }),
            None => result.available.push(worker.clone()),
        }
    }

    result
}

/// Recurring blocks are checked before one-off blocks.
fn day_block(blocks: &[&AvailabilityBlock], date: NaiveDate) -> Option<Unavailability> {
    let weekday = date.weekday();
    let recurring = blocks.iter().find_map(|b| match &b.kind {
        BlockKind::Recurring { weekday: w } if *w == weekday => {
            Some(Unavailability::DayOff { weekday })
        }
        _ => None,
    });
    recurring.or_else(|| {
        blocks.iter().find_map(|b| match &b.kind {
            BlockKind::OneOff { date: d, reason } if *d == date => {
                Some(Unavailability::DateBlocked {
                    date,
                    note: reason.clone(),
                })
            }
            _ => None,
        })
    })
}
