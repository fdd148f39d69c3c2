use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Minutes since midnight. The only time-of-day unit.
pub type Minutes = u32;

pub const MINUTES_PER_DAY: Minutes = 24 * 60;

// ── Time of day ──────────────────────────────────────────────────

/// Naive wall-clock time with minute precision. Never time-zone aware.
/// Textual form is zero-padded 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(Minutes);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    /// Wraps modulo one day.
    pub fn from_minutes(minutes: u64) -> Self {
        Self((minutes % MINUTES_PER_DAY as u64) as Minutes)
    }

    pub fn minutes(self) -> Minutes {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }

    /// Adds minutes, wrapping past midnight. There is no date component, so
    /// `23:30 + 90` is `01:00` and indistinguishable from a same-day `01:00`.
    pub fn wrapping_add(self, minutes: Minutes) -> Self {
        Self::from_minutes(self.0 as u64 + minutes as u64)
    }

    /// 12-hour rendering, e.g. `9:00 AM`, `12:30 PM`.
    pub fn to_12h(self) -> String {
        let (hour, minute) = (self.hour(), self.minute());
        let suffix = if hour < 12 { "AM" } else { "PM" };
        let display_hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{display_hour}:{minute:02} {suffix}")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    /// Accepts `HH:MM` and `HH:MM:SS`; seconds are dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut parts = trimmed.split(':');
        let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
            return Err(ParseTimeError::Malformed(s.to_string()));
        };
        let digits = |field: &str| !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit());
        if let Some(sec) = parts.next()
            && (sec.len() != 2 || !digits(sec) || sec > "59")
        {
            return Err(ParseTimeError::Malformed(s.to_string()));
        }
        if parts.next().is_some() || !digits(h) || h.len() > 2 || !digits(m) || m.len() != 2 {
            return Err(ParseTimeError::Malformed(s.to_string()));
        }
        let hour: u32 = h.parse().map_err(|_| ParseTimeError::Malformed(s.to_string()))?;
        let minute: u32 = m.parse().map_err(|_| ParseTimeError::Malformed(s.to_string()))?;
        TimeOfDay::new(hour, minute).ok_or(ParseTimeError::OutOfRange(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTimeError {
    Malformed(String),
    OutOfRange(String),
}

impl fmt::Display for ParseTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTimeError::Malformed(s) => write!(f, "expected HH:MM, got {s:?}"),
            ParseTimeError::OutOfRange(s) => write!(f, "time of day out of range: {s:?}"),
        }
    }
}

impl std::error::Error for ParseTimeError {}

// ── Window ───────────────────────────────────────────────────────

/// Half-open interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Window {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Both ends or nothing.
    pub fn from_parts(start: Option<TimeOfDay>, end: Option<TimeOfDay>) -> Option<Self> {
        Some(Self::new(start?, end?))
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}

// ── Roster ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: Ulid,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// What a block takes away from a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// Never available on this weekday. On the wire: 0 = Sunday .. 6 = Saturday.
    Recurring {
        #[serde(rename = "day_of_week", with = "sunday_index")]
        weekday: Weekday,
    },
    /// Unavailable on this single date.
    OneOff {
        date: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub id: Ulid,
    pub worker_id: Ulid,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl AvailabilityBlock {
    pub fn recurring(worker_id: Ulid, weekday: Weekday) -> Self {
        Self {
            id: Ulid::new(),
            worker_id,
            kind: BlockKind::Recurring { weekday },
        }
    }

    pub fn one_off(worker_id: Ulid, date: NaiveDate, reason: Option<String>) -> Self {
        Self {
            id: Ulid::new(),
            worker_id,
            kind: BlockKind::OneOff { date, reason },
        }
    }
}

/// `Weekday` as a Sunday-based index (0 = Sunday .. 6 = Saturday).
pub mod sunday_index {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn to_weekday(index: u8) -> Option<Weekday> {
        match index {
            0 => Some(Weekday::Sun),
            1..=6 => Weekday::try_from(index - 1).ok(),
            _ => None,
        }
    }

    pub fn serialize<S: Serializer>(weekday: &Weekday, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(weekday.num_days_from_sunday() as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Weekday, D::Error> {
        let index = u8::deserialize(d)?;
        to_weekday(index).ok_or_else(|| {
            de::Error::invalid_value(de::Unexpected::Unsigned(index as u64), &"a day of week 0..=6")
        })
    }
}

/// A job as far as conflict checking is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: Ulid,
    pub job_number: String,
    #[serde(default)]
    pub worker_id: Option<Ulid>,
    pub date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<TimeOfDay>,
    #[serde(default)]
    pub end_time: Option<TimeOfDay>,
}

impl ScheduledJob {
    /// `None` unless both times are set; such jobs never conflict.
    pub fn window(&self) -> Option<Window> {
        Window::from_parts(self.start_time, self.end_time)
    }
}

// ── Duration inputs ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFlags {
    /// XRF scan, priced per unit and per common space.
    #[serde(default)]
    pub scan: bool,
    #[serde(default)]
    pub swab: bool,
    #[serde(default)]
    pub asbestos: bool,
}

/// Services ordered for a job plus the counts the scan service is priced on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobScope {
    #[serde(default)]
    pub services: ServiceFlags,
    #[serde(default)]
    pub unit_count: u32,
    #[serde(default)]
    pub common_space_count: u32,
}

/// Business-configurable durations, normally read from settings storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConfig {
    pub minutes_per_unit: Minutes,
    pub minutes_per_common_space: Minutes,
    pub swab_minutes: Minutes,
    pub asbestos_minutes: Minutes,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            minutes_per_unit: 45,
            minutes_per_common_space: 30,
            swab_minutes: 90,
            asbestos_minutes: 60,
        }
    }
}

// ── Query & result types ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
    /// The job being edited; its own slot never conflicts.
    pub exclude_job: Option<Ulid>,
}

impl AvailabilityQuery {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            start: None,
            end: None,
            exclude_job: None,
        }
    }

    pub fn between(mut self, start: TimeOfDay, end: TimeOfDay) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn excluding(mut self, job_id: Ulid) -> Self {
        self.exclude_job = Some(job_id);
        self
    }

    pub fn window(&self) -> Option<Window> {
        Window::from_parts(self.start, self.end)
    }
}

/// Why a worker cannot take the job. `Display` is the text staff see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unavailability {
    DayOff {
        #[serde(with = "sunday_index")]
        weekday: Weekday,
    },
    DateBlocked {
        date: NaiveDate,
        note: Option<String>,
    },
    Busy {
        job_id: Ulid,
        job_number: String,
        window: Window,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnavailableWorker {
    pub worker: Worker,
    pub reason: Unavailability,
}

/// Partition of the active roster. Both lists keep roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: Vec<Worker>,
    pub unavailable: Vec<UnavailableWorker>,
}

impl Availability {
    pub fn is_available(&self, worker_id: Ulid) -> bool {
        self.available.iter().any(|w| w.id == worker_id)
    }

    pub fn reason_for(&self, worker_id: Ulid) -> Option<&Unavailability> {
        self.unavailable
            .iter()
            .find(|u| u.worker.id == worker_id)
            .map(|u| &u.reason)
    }
}
