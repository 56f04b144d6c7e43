//! Wall-clock calendar arithmetic in a fixed time zone.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::period::MINUTES_PER_DAY;
use crate::error::{PlannerError, Result};

/// Time zone context used to anchor wall-clock periods onto instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    tz: Tz,
}

impl Calendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Gregorian calendar in UTC.
    pub fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    /// Looks up an IANA time zone name such as `"Europe/Paris"`.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::UnknownTimeZone` if the name is not in the
    /// time zone database.
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| PlannerError::UnknownTimeZone(name.to_string()))
    }

    pub fn time_zone(&self) -> Tz {
        self.tz
    }

    /// Local calendar day containing `instant`.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Instant at `minute` minutes after local midnight of `date`.
    ///
    /// Minutes outside a single day roll into the neighbouring days, so a
    /// negative value lands `MINUTES_PER_DAY + minute` into the previous day.
    /// Returns `None` when the local time does not exist (DST gap) or the
    /// date is out of range.
    pub fn instant_at(&self, date: NaiveDate, minute: i32) -> Option<DateTime<Utc>> {
        let day_offset = minute.div_euclid(MINUTES_PER_DAY);
        let minute_of_day = minute.rem_euclid(MINUTES_PER_DAY);
        let day = date.checked_add_signed(Duration::days(i64::from(day_offset)))?;
        let hour = u32::try_from(minute_of_day / 60).ok()?;
        let minute = u32::try_from(minute_of_day % 60).ok()?;
        let naive = day.and_hms_opt(hour, minute, 0)?;
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn negative_minutes_roll_into_previous_day() {
        let cal = Calendar::utc();
        let at = cal.instant_at(date(2024, 3, 10), -60).unwrap();
        assert_eq!(at.to_rfc3339(), "2024-03-09T23:00:00+00:00");
    }

    #[test]
    fn minutes_past_midnight_roll_into_next_day() {
        let cal = Calendar::utc();
        let at = cal.instant_at(date(2024, 12, 31), MINUTES_PER_DAY + 90).unwrap();
        assert_eq!(at.to_rfc3339(), "2025-01-01T01:30:00+00:00");
    }

    #[test]
    fn local_time_is_converted_to_utc() {
        let cal = Calendar::from_name("Europe/Paris").unwrap();
        // CEST is UTC+2.
        let at = cal.instant_at(date(2023, 7, 14), 15 * 60 + 2).unwrap();
        assert_eq!(at.to_rfc3339(), "2023-07-14T13:02:00+00:00");
    }

    #[test]
    fn dst_gap_yields_none() {
        let cal = Calendar::from_name("Europe/Paris").unwrap();
        // 02:30 does not exist on the spring-forward day.
        assert!(cal.instant_at(date(2024, 3, 31), 2 * 60 + 30).is_none());
    }

    #[test]
    fn local_date_follows_time_zone() {
        let cal = Calendar::from_name("Europe/Paris").unwrap();
        let instant = DateTime::parse_from_rfc3339("2023-07-14T23:30:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(cal.local_date(instant), date(2023, 7, 15));
        assert_eq!(Calendar::utc().local_date(instant), date(2023, 7, 14));
    }

    #[test]
    fn unknown_zone_is_an_error() {
        let err = Calendar::from_name("Mars/Olympus").unwrap_err();
        assert!(matches!(err, PlannerError::UnknownTimeZone(_)));
    }
}
