use std::fmt;

use chrono::{NaiveDate, Weekday};

use crate::model::Unavailability;

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// `Jun 10`
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

impl fmt::Display for Unavailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailability::DayOff { weekday } => {
                write!(f, "Off (every {})", weekday_name(*weekday))
            }
            Unavailability::DateBlocked { date, note } => {
                write!(f, "Off ({})", short_date(*date))?;
                match note.as_deref().map(str::trim) {
                    Some(note) if !note.is_empty() => write!(f, " ({note})"),
                    _ => Ok(()),
                }
            }
            Unavailability::Busy {
                job_number, window, ..
            } => write!(
                f,
                "Busy — Job #{job_number}, {}–{}",
                window.start.to_12h(),
                window.end.to_12h()
            ),
        }
    }
}
