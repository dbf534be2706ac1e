use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

// Waktu Indonesia Barat, fixed UTC+7, no DST
const WIB_OFFSET_SECS: i32 = 7 * 3600;

pub fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECS).unwrap()
}

/// "HH:MM:SS" in WIB, for the confirmation messages
pub fn format_clock(t: DateTime<Utc>) -> String {
    t.with_timezone(&wib()).format("%H:%M:%S").to_string()
}

/// "YYYY-MM-DD HH:MM:SS+07:00" in WIB, for record summaries and reports
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.with_timezone(&wib())
        .format("%Y-%m-%d %H:%M:%S%:z")
        .to_string()
}

/// UTC instants covering [start 00:00:00, end 23:59:59] of the given WIB
/// calendar dates
pub fn day_bounds_utc(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_naive = start.and_hms_opt(0, 0, 0).unwrap();
    let end_naive = end.and_hms_opt(23, 59, 59).unwrap();

    // WIB wall-clock minus 7 hours is the UTC instant
    let offset = Duration::seconds(WIB_OFFSET_SECS as i64);
    (
        Utc.from_utc_datetime(&(start_naive - offset)),
        Utc.from_utc_datetime(&(end_naive - offset)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn clock_is_shifted_seven_hours_east() {
        let t = Utc.with_ymd_and_hms(2026, 1, 5, 1, 30, 0).unwrap();
        assert_eq!(format_clock(t), "08:30:00");
    }

    #[test]
    fn timestamp_carries_wib_offset() {
        let t = Utc.with_ymd_and_hms(2026, 1, 4, 23, 15, 9).unwrap();
        assert_eq!(format_timestamp(t), "2026-01-05 06:15:09+07:00");
    }

    #[test]
    fn day_bounds_cover_the_wib_calendar_day() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let (start, end) = day_bounds_utc(d, d);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 4, 17, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 5, 16, 59, 59).unwrap());
    }
}
