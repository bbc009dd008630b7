//! The supported strftime directives and the date/time fields they fill.

use std::fmt;

use serde::Serialize;

/// A date/time field of a [`Match`](crate::Match).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Microsecond,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Year => "year",
            Field::Month => "month",
            Field::Day => "day",
            Field::Hour => "hour",
            Field::Minute => "minute",
            Field::Second => "second",
            Field::Microsecond => "microsecond",
        };
        f.write_str(name)
    }
}

/// A strftime directive that captures one date/time field.
///
/// The `Unpadded` variants are the `%-x` forms, which accept values
/// without a leading zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `%d`
    Day,
    /// `%-d`
    DayUnpadded,
    /// `%m`
    Month,
    /// `%-m`
    MonthUnpadded,
    /// `%y`, a year in the 2000s.
    ShortYear,
    /// `%Y`
    Year,
    /// `%H`
    Hour,
    /// `%-H`
    HourUnpadded,
    /// `%M`
    Minute,
    /// `%-M`
    MinuteUnpadded,
    /// `%S`
    Second,
    /// `%-S`
    SecondUnpadded,
    /// `%f`
    Microsecond,
}

impl Directive {
    /// Every directive, in the order the tokenizer tries them.
    pub const ALL: [Directive; 13] = [
        Directive::Day,
        Directive::DayUnpadded,
        Directive::Month,
        Directive::MonthUnpadded,
        Directive::ShortYear,
        Directive::Year,
        Directive::Hour,
        Directive::HourUnpadded,
        Directive::Minute,
        Directive::MinuteUnpadded,
        Directive::Second,
        Directive::SecondUnpadded,
        Directive::Microsecond,
    ];

    /// The directive as written in a pattern.
    pub fn token(self) -> &'static str {
        match self {
            Directive::Day => "%d",
            Directive::DayUnpadded => "%-d",
            Directive::Month => "%m",
            Directive::MonthUnpadded => "%-m",
            Directive::ShortYear => "%y",
            Directive::Year => "%Y",
            Directive::Hour => "%H",
            Directive::HourUnpadded => "%-H",
            Directive::Minute => "%M",
            Directive::MinuteUnpadded => "%-M",
            Directive::Second => "%S",
            Directive::SecondUnpadded => "%-S",
            Directive::Microsecond => "%f",
        }
    }

    /// Regex alternatives for the accepted values, without the enclosing group.
    ///
    /// Longer alternatives come first so that leftmost-first alternation
    /// prefers two digits over one.
    pub fn regex_fragment(self) -> &'static str {
        match self {
            Directive::Day => "0[1-9]|1[0-9]|2[0-9]|3[0-1]",
            Directive::DayUnpadded => "1[0-9]|2[0-9]|3[0-1]|[1-9]",
            Directive::Month => "0[1-9]|1[0-2]",
            Directive::MonthUnpadded => "1[0-2]|[1-9]",
            Directive::ShortYear => "[0-9]{2}",
            Directive::Year => "[0-9]{4}",
            Directive::Hour => "0[0-9]|1[0-9]|2[0-3]",
            Directive::HourUnpadded => "1[0-9]|2[0-3]|[0-9]",
            Directive::Minute | Directive::Second => "[0-5][0-9]",
            Directive::MinuteUnpadded | Directive::SecondUnpadded => "[1-5][0-9]|[0-9]",
            Directive::Microsecond => "[0-9]{6}",
        }
    }

    /// The field this directive fills.
    pub fn field(self) -> Field {
        match self {
            Directive::Day | Directive::DayUnpadded => Field::Day,
            Directive::Month | Directive::MonthUnpadded => Field::Month,
            Directive::ShortYear | Directive::Year => Field::Year,
            Directive::Hour | Directive::HourUnpadded => Field::Hour,
            Directive::Minute | Directive::MinuteUnpadded => Field::Minute,
            Directive::Second | Directive::SecondUnpadded => Field::Second,
            Directive::Microsecond => Field::Microsecond,
        }
    }

    /// Interpret the digits captured for this directive.
    ///
    /// `%y` maps `18` to 2018.
    pub fn parse(self, digits: &str) -> Option<i32> {
        let value: i32 = digits.parse().ok()?;
        match self {
            Directive::ShortYear => Some(2000 + value),
            _ => Some(value),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
