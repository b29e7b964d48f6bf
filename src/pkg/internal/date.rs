use std::fmt::Display;

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

const INPUT_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%m-%d-%Y";
// %I is the 12-hour clock (01-12), so midnight renders as 12 AM
const DISPLAY_DATETIME_FORMAT: &str = "%m-%d-%Y %I:%M:%S %p";

// noon is never inside a DST transition
const ANCHOR_HOUR: u32 = 12;

// %Y grows a sign and a fifth digit outside these, which date inputs reject
const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

// 0 is "no timestamp" on the wire, never the epoch
fn localize<Tz: TimeZone>(ts: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    if ts == 0 {
        return None;
    }
    tz.timestamp_opt(ts, 0)
        .single()
        .filter(|dt| (MIN_YEAR..=MAX_YEAR).contains(&dt.year()))
}

fn format_in<Tz>(ts: i64, tz: &Tz, fmt: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    localize(ts, tz)
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_default()
}

pub fn to_input_date_in<Tz>(ts: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format_in(ts, tz, INPUT_FORMAT)
}

/// Value for an `<input type="date">`.
pub fn to_input_date(ts: i64) -> String {
    to_input_date_in(ts, &Local)
}

pub fn to_display_date_in<Tz>(ts: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format_in(ts, tz, DISPLAY_FORMAT)
}

pub fn to_display_date(ts: i64) -> String {
    to_display_date_in(ts, &Local)
}

pub fn to_display_datetime_in<Tz>(ts: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format_in(ts, tz, DISPLAY_DATETIME_FORMAT)
}

pub fn to_display_datetime(ts: i64) -> String {
    to_display_datetime_in(ts, &Local)
}

// Some(0) is a real answer: 1970-01-01 at UTC+12 noon is the epoch
pub fn parse_calendar_date_in<Tz: TimeZone>(date: &str, tz: &Tz) -> Option<i64> {
    NaiveDate::parse_from_str(date.trim(), INPUT_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(ANCHOR_HOUR, 0, 0))
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.timestamp())
}

pub fn parse_calendar_date(date: &str) -> Option<i64> {
    parse_calendar_date_in(date, &Local)
}

pub fn from_calendar_date_in<Tz: TimeZone>(date: &str, tz: &Tz) -> i64 {
    parse_calendar_date_in(date, tz).unwrap_or(0)
}

pub fn from_calendar_date(date: &str) -> i64 {
    from_calendar_date_in(date, &Local)
}

pub fn offset_for_timezone_in<Tz: TimeZone>(ts: i64, tz: &Tz) -> i64 {
    if ts == 0 {
        return 0;
    }
    DateTime::from_timestamp(ts, 0)
        .and_then(|utc| tz.from_local_datetime(&utc.naive_utc()).earliest())
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

pub fn offset_for_timezone(ts: i64) -> i64 {
    offset_for_timezone_in(ts, &Local)
}

pub fn today() -> String {
    Local::now().format(INPUT_FORMAT).to_string()
}

pub fn seconds_to_millis(secs: i64) -> i64 {
    secs.saturating_mul(1000)
}

pub fn millis_to_seconds(ms: i64) -> i64 {
    ms.div_euclid(1000)
}
