//! Extracted date/time fields and incremental segment matching.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::Error;
use crate::directive::Field;
use crate::segment::CompiledSegment;

/// Date/time fields extracted from a path.
///
/// Fields are only ever set by [`match_segment`], which checks their ranges
/// through the segment regex. A `Match` is a plain value: merging produces a
/// new one and leaves the input untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Match {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    microsecond: Option<u32>,
}

impl Match {
    /// A match with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn hour(&self) -> Option<u32> {
        self.hour
    }

    pub fn minute(&self) -> Option<u32> {
        self.minute
    }

    pub fn second(&self) -> Option<u32> {
        self.second
    }

    pub fn microsecond(&self) -> Option<u32> {
        self.microsecond
    }

    /// The value of `field`, if it has been matched.
    pub fn get(&self, field: Field) -> Option<i64> {
        match field {
            Field::Year => self.year.map(i64::from),
            Field::Month => self.month.map(i64::from),
            Field::Day => self.day.map(i64::from),
            Field::Hour => self.hour.map(i64::from),
            Field::Minute => self.minute.map(i64::from),
            Field::Second => self.second.map(i64::from),
            Field::Microsecond => self.microsecond.map(i64::from),
        }
    }

    /// True if no field has been matched.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The match as a date and time; unmatched time fields count as zero.
    ///
    /// Fails if year, month or day is missing.
    pub fn as_datetime(&self) -> Result<NaiveDateTime, Error> {
        Ok(self.as_date()?.and_time(self.as_time()))
    }

    /// Like [`Match::as_datetime`], but `None` when it would fail, whether
    /// from a missing field or from fields that are not a calendar date.
    pub fn as_maybe_datetime(&self) -> Option<NaiveDateTime> {
        self.as_datetime().ok()
    }

    /// The match as a calendar date; time fields are ignored.
    pub fn as_date(&self) -> Result<NaiveDate, Error> {
        let year = self.year.ok_or(Error::MissingField(Field::Year))?;
        let month = self.month.ok_or(Error::MissingField(Field::Month))?;
        let day = self.day.ok_or(Error::MissingField(Field::Day))?;

        NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::InvalidDate { year, month, day })
    }

    /// Like [`Match::as_date`], but `None` when it would fail. An invalid
    /// date such as February 31 is `None` too, not an error.
    pub fn as_maybe_date(&self) -> Option<NaiveDate> {
        self.as_date().ok()
    }

    /// The time of day; date fields are ignored and unmatched fields count as zero.
    pub fn as_time(&self) -> NaiveTime {
        NaiveTime::from_hms_micro_opt(
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.microsecond.unwrap_or(0),
        )
        // ranges are enforced by the segment regexes
        .unwrap_or(NaiveTime::MIN)
    }

    /// A copy with `field` set to `value`.
    ///
    /// `None` if the field already holds a different value.
    fn merged(mut self, field: Field, value: i32) -> Option<Self> {
        fn merge<T: PartialEq>(slot: &mut Option<T>, value: T) -> Option<()> {
            match slot {
                Some(existing) if *existing != value => None,
                Some(_) => Some(()),
                None => {
                    *slot = Some(value);
                    Some(())
                }
            }
        }

        match field {
            Field::Year => merge(&mut self.year, value)?,
            Field::Month => merge(&mut self.month, u32::try_from(value).ok()?)?,
            Field::Day => merge(&mut self.day, u32::try_from(value).ok()?)?,
            Field::Hour => merge(&mut self.hour, u32::try_from(value).ok()?)?,
            Field::Minute => merge(&mut self.minute, u32::try_from(value).ok()?)?,
            Field::Second => merge(&mut self.second, u32::try_from(value).ok()?)?,
            Field::Microsecond => merge(&mut self.microsecond, u32::try_from(value).ok()?)?,
        }
        Some(self)
    }
}

/// Number of days in `month` of `year`, leap years included.
///
/// `None` for a month outside `1..=12` or a year chrono can not represent.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some(last.day())
}

/// Match one path segment against one compiled segment, merging the
/// extracted fields into `accumulated`.
///
/// Returns `None` when the segment does not match, when a field disagrees
/// with a value matched earlier, or when the day does not exist in a month
/// first learned by this call.
///
/// # Examples
/// ```
/// use datetime_glob::{match_segment, CompiledSegment, Match};
///
/// let compiled = CompiledSegment::compile("%Y-%m-%d").unwrap();
/// let matched = match_segment("2016-12-02", &compiled, Match::new()).unwrap();
/// assert_eq!(matched.year(), Some(2016));
/// assert_eq!(matched.day(), Some(2));
///
/// assert!(match_segment("2018-02-31", &compiled, Match::new()).is_none());
/// ```
pub fn match_segment(segment: &str, compiled: &CompiledSegment, accumulated: Match) -> Option<Match> {
    let (regex, groups) = match compiled {
        CompiledSegment::FixedText(text) => return (segment == text.as_str()).then_some(accumulated),
        CompiledSegment::Regex { regex, groups } => (regex, groups),
    };

    let captures = regex.captures(segment)?;

    let mut merged = accumulated;
    for (i, directive) in groups.iter().enumerate() {
        let digits = captures.get(i + 1)?.as_str();
        let value = directive.parse(digits)?;
        merged = merged.merged(directive.field(), value)?;
    }

    // Only re-checked when this call is what learned both year and month;
    // a day arriving in a later segment is not validated.
    let learned_year_month = accumulated.year.is_none()
        && accumulated.month.is_none()
        && merged.year.is_some()
        && merged.month.is_some();

    if learned_year_month
        && let (Some(year), Some(month), Some(day)) = (merged.year, merged.month, merged.day)
        && day > days_in_month(year, month)?
    {
        return None;
    }

    Some(merged)
}
