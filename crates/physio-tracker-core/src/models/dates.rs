//! Timestamp helpers shared by the record types.

use chrono::{DateTime, SubsecRound, TimeZone, Utc};

/// Current instant at the precision the store keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Medium date without time of day, e.g. `Oct 19, 2026`.
pub fn medium_date<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%b %-d, %Y").to_string()
}

/// Medium date with short time of day, e.g. `Oct 19, 2026 at 3:04 PM`.
pub fn medium_date_time<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz)
        .format("%b %-d, %Y at %-I:%M %p")
        .to_string()
}

/// Short numeric date, e.g. `10/19/26`.
pub fn short_date<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%-m/%-d/%y").to_string()
}
