use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of "now". Injected so business-date logic is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The calendar date in the business's time zone.
pub fn business_today(clock: &dyn Clock, tz: Tz) -> NaiveDate {
    clock.now().with_timezone(&tz).date_naive()
}

pub fn business_tomorrow(clock: &dyn Clock, tz: Tz) -> NaiveDate {
    let today = business_today(clock, tz);
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
    }

    #[test]
    fn late_evening_eastern_is_still_today() {
        // 02:30 UTC on Jun 11 is 22:30 EDT on Jun 10.
        let clock = at(2024, 6, 11, 2, 30);
        assert_eq!(business_today(&clock, New_York), NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(business_tomorrow(&clock, New_York), NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
    }

    #[test]
    fn offset_follows_dst() {
        // 04:30 UTC: EST (-5) gives 23:30 the previous day, EDT (-4) gives 00:30.
        let winter = at(2024, 1, 15, 4, 30);
        let summer = at(2024, 7, 15, 4, 30);
        assert_eq!(business_today(&winter, New_York), NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(business_today(&summer, New_York), NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
    }

    #[test]
    fn utc_zone_matches_utc_date() {
        let clock = at(2024, 12, 31, 23, 59);
        assert_eq!(business_today(&clock, Tz::UTC), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(business_tomorrow(&clock, Tz::UTC), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
