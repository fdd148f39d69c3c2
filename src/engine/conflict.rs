use chrono::NaiveDate;
use ulid::Ulid;

use crate::model::*;

/// First of `jobs` (by start time) that would double-book the window.
///
/// Skips the excluded job, jobs on other dates, and jobs missing a start or
/// end time. A job with only a start time therefore never conflicts.
pub(crate) fn find_conflict<'a, I>(
    jobs: I,
    date: NaiveDate,
    window: &Window,
    exclude_job: Option<Ulid>,
) -> Option<(&'a ScheduledJob, Window)>
where
    I: IntoIterator<Item = &'a ScheduledJob>,
{
    jobs.into_iter()
        .filter(|job| job.date == date && Some(job.id) != exclude_job)
        .filter_map(|job| job.window().map(|w| (job, w)))
        .filter(|(_, w)| w.overlaps(window))
        .min_by_key(|(job, w)| (w.start, job.job_number.clone()))
}
