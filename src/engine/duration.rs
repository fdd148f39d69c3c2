use crate::model::*;

/// Used when the services contribute nothing, so a window is never empty.
pub const FALLBACK_MINUTES: Minutes = 60;

/// Estimated job length in minutes. Unit and common-space counts only count
/// toward the scan service.
pub fn estimate_duration(scope: &JobScope, config: &DurationConfig) -> Minutes {
    match contributed_minutes(scope, config) {
        0 => FALLBACK_MINUTES,
        total => total,
    }
}

/// Sum of the ordered services before the fallback applies.
pub(crate) fn contributed_minutes(scope: &JobScope, config: &DurationConfig) -> Minutes {
    let mut total: Minutes = 0;
    if scope.services.scan {
        total = total
            .saturating_add(scope.unit_count.saturating_mul(config.minutes_per_unit))
            .saturating_add(
                scope
                    .common_space_count
                    .saturating_mul(config.minutes_per_common_space),
            );
    }
    if scope.services.swab {
        total = total.saturating_add(config.swab_minutes);
    }
    if scope.services.asbestos {
        total = total.saturating_add(config.asbestos_minutes);
    }
    total
}

/// `start + estimate_duration`, wrapping past midnight.
pub fn estimate_end_time(start: TimeOfDay, scope: &JobScope, config: &DurationConfig) -> TimeOfDay {
    start.wrapping_add(estimate_duration(scope, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn scope(scan: bool, swab: bool, asbestos: bool, units: u32, common: u32) -> JobScope {
        JobScope {
            services: ServiceFlags { scan, swab, asbestos },
            unit_count: units,
            common_space_count: common,
        }
    }

    #[test]
    fn scan_counts_units_and_common_spaces() {
        let cfg = DurationConfig::default();
        let end = estimate_end_time(t("09:00"), &scope(true, false, false, 4, 2), &cfg);
        assert_eq!(end.to_string(), "13:00");
    }

    #[test]
    fn services_add_up() {
        let cfg = DurationConfig::default();
        // 1×45 + 0×30 + 90 + 60
        assert_eq!(estimate_duration(&scope(true, true, true, 1, 0), &cfg), 195);
        assert_eq!(estimate_duration(&scope(false, true, false, 0, 0), &cfg), 90);
    }

    #[test]
    fn counts_ignored_without_scan() {
        let cfg = DurationConfig::default();
        assert_eq!(estimate_duration(&scope(false, false, true, 10, 10), &cfg), 60);
    }

    #[test]
    fn nothing_ordered_falls_back_to_an_hour() {
        let cfg = DurationConfig::default();
        let end = estimate_end_time(t("09:00"), &scope(false, false, false, 0, 0), &cfg);
        assert_eq!(end.to_string(), "10:00");
        // Scan with no units is also a zero total.
        assert_eq!(estimate_duration(&scope(true, false, false, 0, 0), &cfg), FALLBACK_MINUTES);
    }

    #[test]
    fn zero_config_still_falls_back() {
        let cfg = DurationConfig {
            minutes_per_unit: 0,
            minutes_per_common_space: 0,
            swab_minutes: 0,
            asbestos_minutes: 0,
        };
        assert_eq!(estimate_duration(&scope(true, true, true, 5, 5), &cfg), FALLBACK_MINUTES);
    }

    #[test]
    fn wraps_past_midnight() {
        let cfg = DurationConfig {
            swab_minutes: 90,
            ..DurationConfig::default()
        };
        let end = estimate_end_time(t("23:30"), &scope(false, true, false, 0, 0), &cfg);
        assert_eq!(end.to_string(), "01:00");
    }

    #[test]
    fn huge_counts_saturate() {
        let cfg = DurationConfig::default();
        let total = estimate_duration(&scope(true, false, false, u32::MAX, u32::MAX), &cfg);
        assert_eq!(total, u32::MAX);
        // Still renders a valid time.
        let end = estimate_end_time(t("00:00"), &scope(true, false, false, u32::MAX, 0), &cfg);
        assert!(end.minutes() < MINUTES_PER_DAY);
    }

    #[test]
    fn deterministic() {
        let cfg = DurationConfig::default();
        let s = scope(true, true, false, 3, 1);
        assert_eq!(
            estimate_end_time(t("08:15"), &s, &cfg),
            estimate_end_time(t("08:15"), &s, &cfg)
        );
    }
}
