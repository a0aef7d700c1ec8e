use chrono::{DateTime, NaiveDate, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn today_utc() -> NaiveDate {
    now().date_naive()
}

/// Calendar day (UTC) an instant falls on.
pub fn utc_day(dt: DateTime<Utc>) -> NaiveDate {
    dt.date_naive()
}
