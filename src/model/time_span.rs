//! Durations stored in payloads as `[-][d.]hh:mm:ss[.fffffff]`.

use std::fmt;
use std::str::FromStr;

use super::errors::ConversionError;

const TICKS_PER_SECOND: i64 = 10_000_000;
const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;
const TICKS_PER_HOUR: i64 = 60 * TICKS_PER_MINUTE;
const TICKS_PER_DAY: i64 = 24 * TICKS_PER_HOUR;

/// A signed duration with 100-nanosecond resolution.
///
/// Formats in the constant form `[-][d.]hh:mm:ss[.fffffff]`. Parsing accepts
/// that form and ISO 8601 durations such as `P1DT2H30M` or `PT0.5S`.
///
/// # Example
///
/// ```rust
/// use domain_api::model::TimeSpan;
///
/// let span: TimeSpan = "1.02:03:04.5".parse().unwrap();
/// assert_eq!(span.to_string(), "1.02:03:04.5000000");
/// assert_eq!("PT90M".parse::<TimeSpan>().unwrap().to_string(), "01:30:00");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpan {
    ticks: i64,
}

impl TimeSpan {
    /// The zero duration.
    pub const ZERO: Self = Self { ticks: 0 };

    /// Creates a span from 100-nanosecond ticks.
    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self { ticks }
    }

    /// Creates a span from whole seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self::from_ticks(seconds * TICKS_PER_SECOND)
    }

    /// Creates a span from days, hours, minutes and seconds.
    #[must_use]
    pub const fn new(days: i64, hours: i64, minutes: i64, seconds: i64) -> Self {
        Self::from_ticks(
            days * TICKS_PER_DAY
                + hours * TICKS_PER_HOUR
                + minutes * TICKS_PER_MINUTE
                + seconds * TICKS_PER_SECOND,
        )
    }

    /// The span in 100-nanosecond ticks.
    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.ticks
    }

    /// Parses the constant or ISO 8601 form.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::InvalidValue`] when neither form matches.
    pub fn parse(value: &str) -> Result<Self, ConversionError> {
        let text = value.trim();
        let (negative, body) = text
            .strip_prefix('-')
            .map_or((false, text), |rest| (true, rest));

        let ticks = if let Some(iso) = body.strip_prefix('P') {
            parse_iso(iso)
        } else {
            parse_constant(body)
        }
        .ok_or_else(|| ConversionError::invalid("TimeSpan", value, "expected [-][d.]hh:mm:ss[.fffffff] or an ISO 8601 duration"))?;

        Ok(Self::from_ticks(if negative { -ticks } else { ticks }))
    }
}

fn parse_fraction(digits: &str) -> Option<i64> {
    if digits.is_empty() || digits.len() > 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{digits:0<7}");
    padded.parse().ok()
}

fn parse_constant(body: &str) -> Option<i64> {
    let (days, clock) = match body.split_once('.') {
        Some((d, rest)) if rest.contains(':') && !d.contains(':') => (d.parse::<i64>().ok()?, rest),
        _ => (0, body),
    };

    let (clock, fraction) = match clock.split_once('.') {
        Some((c, f)) => (c, parse_fraction(f)?),
        None => (clock, 0),
    };

    let mut parts = clock.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next().map_or(Some(0), |s| s.parse().ok())?;
    if parts.next().is_some() || hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    Some(days * TICKS_PER_DAY + hours * TICKS_PER_HOUR + minutes * TICKS_PER_MINUTE + seconds * TICKS_PER_SECOND + fraction)
}

fn parse_iso(body: &str) -> Option<i64> {
    let (date, time) = body.split_once('T').unwrap_or((body, ""));
    let mut ticks = 0_i64;

    if !date.is_empty() {
        let days = date.strip_suffix('D')?;
        ticks += days.parse::<i64>().ok()? * TICKS_PER_DAY;
    }

    let mut number = String::new();
    for c in time.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' => ticks += std::mem::take(&mut number).parse::<i64>().ok()? * TICKS_PER_HOUR,
            'M' => ticks += std::mem::take(&mut number).parse::<i64>().ok()? * TICKS_PER_MINUTE,
            'S' => {
                let seconds = std::mem::take(&mut number);
                let (whole, fraction) = seconds.split_once('.').unwrap_or((&seconds, ""));
                ticks += whole.parse::<i64>().ok()? * TICKS_PER_SECOND;
                if !fraction.is_empty() {
                    ticks += parse_fraction(fraction)?;
                }
            }
            _ => return None,
        }
    }

    if !number.is_empty() || (date.is_empty() && time.is_empty()) {
        return None;
    }
    Some(ticks)
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ticks < 0 {
            f.write_str("-")?;
        }
        let ticks = self.ticks.unsigned_abs();
        let per_day = TICKS_PER_DAY.unsigned_abs();
        let days = ticks / per_day;
        let rest = ticks % per_day;
        let hours = rest / TICKS_PER_HOUR.unsigned_abs();
        let minutes = rest % TICKS_PER_HOUR.unsigned_abs() / TICKS_PER_MINUTE.unsigned_abs();
        let seconds = rest % TICKS_PER_MINUTE.unsigned_abs() / TICKS_PER_SECOND.unsigned_abs();
        let fraction = rest % TICKS_PER_SECOND.unsigned_abs();

        if days > 0 {
            write!(f, "{days}.")?;
        }
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")?;
        if fraction > 0 {
            write!(f, ".{fraction:07}")?;
        }
        Ok(())
    }
}

impl FromStr for TimeSpan {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
