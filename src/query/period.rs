use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use strum::{AsRefStr, EnumString};

/// Named reporting window selected by the `filter` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Period {
    #[default]
    All,
    Week,
    Month,
    Year,
    Custom,
}

impl Period {
    /// Unknown or missing values mean `All`.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// Inclusive time window, expressed in the reporting offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeRange {
    /// Full days from `first` 00:00:00 to `last` 23:59:59 local time.
    ///
    /// `None` when either boundary falls outside the representable calendar
    /// once shifted to UTC.
    pub fn days(first: NaiveDate, last: NaiveDate, offset: FixedOffset) -> Option<Self> {
        Some(Self {
            start: local(first.and_time(NaiveTime::MIN), offset)?,
            end: local(first_second_before_midnight(last), offset)?,
        })
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }
}

fn first_second_before_midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
}

fn local(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let utc = naive.checked_sub_signed(Duration::seconds(offset.local_minus_utc() as i64))?;
    Some(DateTime::from_naive_utc_and_offset(utc, offset))
}

/// Why a custom range could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RangeProblem {
    #[display(fmt = "startDate '{}' is not a YYYY-MM-DD date", _0)]
    BadStart(String),
    #[display(fmt = "endDate '{}' is not a YYYY-MM-DD date", _0)]
    BadEnd(String),
    #[display(fmt = "startDate {} is after endDate {}", _0, _1)]
    Reversed(NaiveDate, NaiveDate),
    #[display(fmt = "date range {} to {} is outside the supported calendar", _0, _1)]
    OutOfRange(NaiveDate, NaiveDate),
}

pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Range for an explicit `startDate`/`endDate` pair.
///
/// `Ok(None)` when either bound is missing; `Err` when a bound is present but
/// unusable.
pub fn custom_range(
    start: Option<&str>,
    end: Option<&str>,
    offset: FixedOffset,
) -> Result<Option<TimeRange>, RangeProblem> {
    let (Some(raw_start), Some(raw_end)) = (non_blank(start), non_blank(end)) else {
        return Ok(None);
    };

    let first = parse_day(raw_start).ok_or_else(|| RangeProblem::BadStart(raw_start.to_string()))?;
    let last = parse_day(raw_end).ok_or_else(|| RangeProblem::BadEnd(raw_end.to_string()))?;

    if first > last {
        return Err(RangeProblem::Reversed(first, last));
    }

    TimeRange::days(first, last, offset)
        .map(Some)
        .ok_or(RangeProblem::OutOfRange(first, last))
}

/// Monday 00:00:00 through Sunday 23:59:59 of the week containing `now`.
pub fn current_week(now: DateTime<FixedOffset>) -> Option<TimeRange> {
    let today = now.date_naive();
    let monday =
        today.checked_sub_signed(Duration::days(today.weekday().num_days_from_monday() as i64))?;
    let sunday = monday.checked_add_signed(Duration::days(6))?;
    TimeRange::days(monday, sunday, *now.offset())
}

/// First through last calendar day of the month containing `now`.
pub fn current_month(now: DateTime<FixedOffset>) -> Option<TimeRange> {
    let today = now.date_naive();
    let first = today.with_day(1)?;
    let next_first = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
    };
    let last = next_first.pred_opt()?;
    TimeRange::days(first, last, *now.offset())
}

/// January 1 through December 31 of the year containing `now`.
pub fn current_year(now: DateTime<FixedOffset>) -> Option<TimeRange> {
    let year = now.year();
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)?;
    TimeRange::days(first, last, *now.offset())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
