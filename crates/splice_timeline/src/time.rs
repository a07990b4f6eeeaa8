// SPDX-License-Identifier: MIT OR Apache-2.0
//! Exact, frame-indexed time values and ranges.
//!
//! A [`RationalTime`] is an integer frame count at a frame rate. All edit
//! arithmetic happens on frame counts so hundreds of edits never accumulate
//! floating-point drift; seconds only appear at the display and interchange
//! boundaries.

use crate::error::TimeError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Frame rate used when nothing better is known
pub const DEFAULT_RATE: f64 = 30.0;

/// A point in time (or a duration) expressed as frames at a rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RationalTime {
    /// Frame count
    pub value: i64,
    /// Frames per second
    pub rate: f64,
}

impl RationalTime {
    /// Create a time from a frame count and rate
    pub const fn new(value: i64, rate: f64) -> Self {
        Self { value, rate }
    }

    /// Create a time from a frame count
    pub const fn from_frames(frames: i64, rate: f64) -> Self {
        Self::new(frames, rate)
    }

    /// Create a time from seconds, rounding to the nearest frame
    pub fn from_seconds(seconds: f64, rate: f64) -> Self {
        Self::new((seconds * rate).round() as i64, rate)
    }

    /// Zero at the given rate
    pub const fn zero(rate: f64) -> Self {
        Self::new(0, rate)
    }

    /// Seconds represented by this time
    pub fn to_seconds(&self) -> f64 {
        if self.rate <= 0.0 {
            0.0
        } else {
            self.value as f64 / self.rate
        }
    }

    /// Frame count at this time's own rate
    pub fn to_frames(&self) -> i64 {
        self.value
    }

    /// Convert to another rate, rounding to the nearest frame
    pub fn rescale(&self, new_rate: f64) -> Self {
        if self.rate == new_rate {
            return *self;
        }
        Self::from_seconds(self.to_seconds(), new_rate)
    }

    /// Sum, expressed at `self`'s rate
    pub fn add(&self, other: &Self) -> Self {
        Self::new(self.value + other.rescale(self.rate).value, self.rate)
    }

    /// Difference, expressed at `self`'s rate
    pub fn subtract(&self, other: &Self) -> Self {
        Self::new(self.value - other.rescale(self.rate).value, self.rate)
    }

    /// Scale by a factor, rounding to the nearest frame
    pub fn multiply(&self, factor: f64) -> Self {
        Self::new((self.value as f64 * factor).round() as i64, self.rate)
    }

    /// Negated time
    pub fn negate(&self) -> Self {
        Self::new(-self.value, self.rate)
    }

    /// Absolute time
    pub fn abs(&self) -> Self {
        Self::new(self.value.abs(), self.rate)
    }

    /// Compare two times regardless of their rates
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.rate == other.rate {
            return self.value.cmp(&other.value);
        }
        self.to_seconds()
            .partial_cmp(&other.to_seconds())
            .unwrap_or(Ordering::Equal)
    }

    /// Same instant, possibly at a different rate
    pub fn is_equal_to(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// Strictly earlier than `other`
    pub fn is_less_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Earlier than or equal to `other`
    pub fn is_less_than_or_equal(&self, other: &Self) -> bool {
        self.compare(other) != Ordering::Greater
    }

    /// Strictly later than `other`
    pub fn is_greater_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Later than or equal to `other`
    pub fn is_greater_than_or_equal(&self, other: &Self) -> bool {
        self.compare(other) != Ordering::Less
    }

    /// Earlier of two times
    pub fn min(self, other: Self) -> Self {
        if other.is_less_than(&self) {
            other
        } else {
            self
        }
    }

    /// Later of two times
    pub fn max(self, other: Self) -> Self {
        if other.is_greater_than(&self) {
            other
        } else {
            self
        }
    }

    /// Clamp into `[low, high]`
    pub fn clamp(self, low: Self, high: Self) -> Self {
        self.max(low).min(high)
    }

    /// True for a zero frame count
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// True when strictly below zero
    pub fn is_negative(&self) -> bool {
        self.value < 0
    }

    /// True when strictly above zero
    pub fn is_positive(&self) -> bool {
        self.value > 0
    }

    /// Format as a timecode string
    pub fn to_timecode(&self, format: TimecodeFormat) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        match format {
            TimecodeFormat::Frames => {
                let fps = (self.rate.round() as i64).max(1);
                let total = self.value.abs();
                let frames = total % fps;
                let secs = total / fps;
                format!(
                    "{sign}{:02}:{:02}:{:02}:{:02}",
                    secs / 3600,
                    (secs / 60) % 60,
                    secs % 60,
                    frames
                )
            }
            TimecodeFormat::Milliseconds => {
                let total_ms = (self.to_seconds().abs() * 1000.0).round() as i64;
                let secs = total_ms / 1000;
                format!(
                    "{sign}{:02}:{:02}:{:02}.{:03}",
                    secs / 3600,
                    (secs / 60) % 60,
                    secs % 60,
                    total_ms % 1000
                )
            }
        }
    }

    /// Parse `HH:MM:SS:FF`, `HH:MM:SS.mmm`, `MM:SS`, or bare seconds
    pub fn from_timecode(timecode: &str, rate: f64) -> Result<Self, TimeError> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(TimeError::InvalidRate(rate));
        }

        let trimmed = timecode.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let invalid = || TimeError::InvalidTimecode(timecode.to_string());

        let parts: Vec<&str> = body.split(':').collect();
        let time = match parts.as_slice() {
            [seconds] => {
                let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
                if seconds < 0.0 {
                    return Err(invalid());
                }
                checked_from_seconds(seconds, rate).ok_or_else(invalid)?
            }
            [hh, mm, ss, ff] => {
                let fps = (rate.round() as i64).max(1);
                let hh = parse_field(hh).ok_or_else(invalid)?;
                let mm = parse_field(mm).ok_or_else(invalid)?;
                let ss = parse_field(ss).ok_or_else(invalid)?;
                let ff = parse_field(ff).ok_or_else(invalid)?;
                if mm >= 60 || ss >= 60 || ff >= fps {
                    return Err(invalid());
                }
                let frames = hh
                    .checked_mul(3600)
                    .and_then(|total| total.checked_add(mm * 60 + ss))
                    .and_then(|total| total.checked_mul(fps))
                    .and_then(|total| total.checked_add(ff))
                    .ok_or_else(invalid)?;
                Self::from_frames(frames, rate)
            }
            [mm, ss] => {
                let mm = parse_field(mm).ok_or_else(invalid)?;
                let ss = parse_seconds_field(ss).ok_or_else(invalid)?;
                checked_from_seconds(mm as f64 * 60.0 + ss, rate).ok_or_else(invalid)?
            }
            [hh, mm, ss] => {
                let hh = parse_field(hh).ok_or_else(invalid)?;
                let mm = parse_field(mm).ok_or_else(invalid)?;
                let ss = parse_seconds_field(ss).ok_or_else(invalid)?;
                if mm >= 60 {
                    return Err(invalid());
                }
                let seconds = hh as f64 * 3600.0 + mm as f64 * 60.0 + ss;
                checked_from_seconds(seconds, rate).ok_or_else(invalid)?
            }
            _ => return Err(invalid()),
        };

        Ok(if negative { time.negate() } else { time })
    }

    /// Coarse human-readable duration such as `"1m 30s"`
    pub fn to_human_duration(&self) -> String {
        let total = self.to_seconds().abs().floor() as i64;
        let sign = if self.is_negative() && total > 0 {
            "-"
        } else {
            ""
        };
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        let body = match (hours, minutes, seconds) {
            (0, 0, s) => format!("{s}s"),
            (0, m, 0) => format!("{m}m"),
            (0, m, s) => format!("{m}m {s}s"),
            (h, 0, _) => format!("{h}h"),
            (h, m, _) => format!("{h}h {m}m"),
        };
        format!("{sign}{body}")
    }
}

fn parse_field(field: &str) -> Option<i64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// `from_seconds`, or `None` when the frame count does not fit in an `i64`
fn checked_from_seconds(seconds: f64, rate: f64) -> Option<RationalTime> {
    let frames = (seconds * rate).round();
    (frames.is_finite() && frames.abs() < i64::MAX as f64)
        .then(|| RationalTime::from_frames(frames as i64, rate))
}

fn parse_seconds_field(field: &str) -> Option<f64> {
    let seconds: f64 = field.parse().ok()?;
    (seconds.is_finite() && (0.0..60.0).contains(&seconds)).then_some(seconds)
}

impl Add for RationalTime {
    type Output = RationalTime;

    fn add(self, rhs: Self) -> Self::Output {
        RationalTime::add(&self, &rhs)
    }
}

impl Sub for RationalTime {
    type Output = RationalTime;

    fn sub(self, rhs: Self) -> Self::Output {
        self.subtract(&rhs)
    }
}

impl Neg for RationalTime {
    type Output = RationalTime;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value, self.rate)
    }
}

/// Timecode rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimecodeFormat {
    /// `HH:MM:SS:FF`
    #[default]
    Frames,
    /// `HH:MM:SS.mmm`
    Milliseconds,
}

/// A span of time: start plus duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    /// Start of the range
    pub start_time: RationalTime,
    /// Length of the range
    pub duration: RationalTime,
}

impl TimeRange {
    /// Create a range from start and duration
    pub const fn new(start_time: RationalTime, duration: RationalTime) -> Self {
        Self { start_time, duration }
    }

    /// Create a range spanning `[start, end)`
    pub fn from_start_end(start: RationalTime, end: RationalTime) -> Self {
        Self::new(start, end - start)
    }

    /// Duration at the range's own rate
    fn scaled_duration(&self) -> RationalTime {
        self.duration.rescale(self.start_time.rate)
    }

    /// Exclusive end: `start + duration`
    pub fn end_time(&self) -> RationalTime {
        self.start_time + self.scaled_duration()
    }

    /// Start in seconds
    pub fn start_seconds(&self) -> f64 {
        self.start_time.to_seconds()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.duration.to_seconds()
    }

    /// Inclusive start, exclusive end
    pub fn contains_time(&self, time: &RationalTime) -> bool {
        time.is_greater_than_or_equal(&self.start_time) && time.is_less_than(&self.end_time())
    }

    /// True if the two ranges share any time
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start_time.is_less_than(&other.end_time())
            && other.start_time.is_less_than(&self.end_time())
    }

    /// True if `other` lies entirely inside this range
    pub fn contains(&self, other: &TimeRange) -> bool {
        other.start_time.is_greater_than_or_equal(&self.start_time)
            && other.end_time().is_less_than_or_equal(&self.end_time())
    }

    /// Shared portion of two ranges, `None` if disjoint
    pub fn intersection(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start_time.max(other.start_time);
        let end = self.end_time().min(other.end_time());
        if start.is_less_than(&end) {
            Some(Self::from_start_end(start, end))
        } else {
            None
        }
    }

    /// Grow the range so it covers `time`
    pub fn extended_by(&self, time: &RationalTime) -> TimeRange {
        let start = self.start_time.min(*time);
        let end = self.end_time().max(*time);
        Self::from_start_end(start, end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_time, self.end_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(frames: i64) -> RationalTime {
        RationalTime::from_frames(frames, 30.0)
    }

    #[test]
    fn test_from_seconds_rounds_to_nearest_frame() {
        assert_eq!(RationalTime::from_seconds(1.0, 24.0).value, 24);
        assert_eq!(RationalTime::from_seconds(0.02, 30.0).value, 1);
        assert_eq!(RationalTime::from_seconds(0.01, 30.0).value, 0);
    }

    #[test]
    fn test_rescale_roundtrip() {
        for rate in [24.0, 25.0, 30.0] {
            for target in [48.0, 60.0, 120.0] {
                for value in [-500, -1, 0, 1, 7, 23, 1001, 86_400] {
                    let original = RationalTime::from_frames(value, rate);
                    let back = original.rescale(target).rescale(rate);
                    assert_eq!(back, original, "{value}@{rate} via {target}");
                }
            }
        }
    }

    #[test]
    fn test_add_keeps_left_rate() {
        let a = RationalTime::from_frames(30, 30.0);
        let b = RationalTime::from_frames(24, 24.0);
        let sum = a + b;
        assert_eq!(sum, RationalTime::from_frames(60, 30.0));
        let diff = b - a;
        assert_eq!(diff, RationalTime::from_frames(0, 24.0));
    }

    #[test]
    fn test_no_drift_over_many_additions() {
        let frame = t(1);
        let mut total = RationalTime::zero(30.0);
        for _ in 0..10_000 {
            total = total + frame;
        }
        assert_eq!(total.value, 10_000);
        assert_eq!(total.to_seconds(), 10_000.0 / 30.0);
    }

    #[test]
    fn test_compare_is_rate_agnostic() {
        let a = RationalTime::from_frames(30, 30.0);
        let b = RationalTime::from_frames(24, 24.0);
        assert!(a.is_equal_to(&b));
        assert!(t(29).is_less_than(&b));
        assert!(t(31).is_greater_than(&b));
        assert_eq!(t(5).min(t(3)), t(3));
        assert_eq!(t(5).max(t(3)), t(5));
        assert_eq!(t(50).clamp(t(0), t(10)), t(10));
        assert_eq!(t(-5).clamp(t(0), t(10)), t(0));
    }

    #[test]
    fn test_multiply_negate_abs() {
        assert_eq!(t(10).multiply(1.5), t(15));
        assert_eq!(-t(10), t(-10));
        assert_eq!(t(-10).abs(), t(10));
    }

    #[test]
    fn test_range_helpers() {
        let range = TimeRange::new(t(10), t(20));
        assert_eq!(range.end_time(), t(30));
        assert!(range.contains_time(&t(10)));
        assert!(range.contains_time(&t(29)));
        assert!(!range.contains_time(&t(30)));

        let other = TimeRange::new(t(25), t(10));
        assert!(range.overlaps(&other));
        assert!(!range.overlaps(&TimeRange::new(t(30), t(5))));
        assert_eq!(range.intersection(&other), Some(TimeRange::new(t(25), t(5))));
        assert_eq!(range.intersection(&TimeRange::new(t(40), t(5))), None);

        assert!(range.contains(&TimeRange::new(t(12), t(5))));
        assert!(!range.contains(&other));

        assert_eq!(range.extended_by(&t(40)), TimeRange::new(t(10), t(30)));
        assert_eq!(range.extended_by(&t(0)), TimeRange::new(t(0), t(30)));
        assert_eq!(range.extended_by(&t(15)), range);
    }

    #[test]
    fn test_range_duration_rescaled_to_start_rate() {
        let range = TimeRange::new(t(30), RationalTime::from_frames(48, 24.0));
        assert_eq!(range.end_time(), t(90));
        assert_eq!(range.duration_seconds(), 2.0);
    }

    #[test]
    fn test_timecode_formatting() {
        let time = t(90 * 30 + 15);
        assert_eq!(time.to_timecode(TimecodeFormat::Frames), "00:01:30:15");
        let time = RationalTime::from_seconds(3723.5, 30.0);
        assert_eq!(time.to_timecode(TimecodeFormat::Milliseconds), "01:02:03.500");
        assert_eq!(t(-45).to_timecode(TimecodeFormat::Frames), "-00:00:01:15");
    }

    #[test]
    fn test_timecode_parsing() {
        assert_eq!(RationalTime::from_timecode("00:01:30:15", 30.0).unwrap(), t(2715));
        assert_eq!(RationalTime::from_timecode("00:01:30.500", 30.0).unwrap(), t(2715));
        assert_eq!(RationalTime::from_timecode("90.5", 30.0).unwrap(), t(2715));
        assert_eq!(RationalTime::from_timecode("1:30", 30.0).unwrap(), t(2700));
        assert_eq!(RationalTime::from_timecode("-00:00:01:00", 30.0).unwrap(), t(-30));
    }

    #[test]
    fn test_timecode_parse_errors() {
        assert!(RationalTime::from_timecode("abc", 30.0).is_err());
        assert!(RationalTime::from_timecode("00:00:00:30", 30.0).is_err());
        assert!(RationalTime::from_timecode("00:61:00", 30.0).is_err());
        assert!(RationalTime::from_timecode("1:2:3:4:5", 30.0).is_err());
        for overflowing in [
            "9999999999999999:00:00:00",
            "9999999999999999:00:00.0",
            "99999999999999999999:00",
            "1e300",
            "inf",
        ] {
            assert!(matches!(
                RationalTime::from_timecode(overflowing, 30.0),
                Err(TimeError::InvalidTimecode(_))
            ));
        }
        assert_eq!(
            RationalTime::from_timecode("10", 0.0),
            Err(TimeError::InvalidRate(0.0))
        );
    }

    #[test]
    fn test_timecode_roundtrip() {
        let time = t(123_456);
        let tc = time.to_timecode(TimecodeFormat::Frames);
        assert_eq!(RationalTime::from_timecode(&tc, 30.0).unwrap(), time);
    }

    #[test]
    fn test_human_duration() {
        assert_eq!(RationalTime::from_seconds(90.0, 30.0).to_human_duration(), "1m 30s");
        assert_eq!(RationalTime::from_seconds(45.4, 30.0).to_human_duration(), "45s");
        assert_eq!(RationalTime::from_seconds(120.0, 30.0).to_human_duration(), "2m");
        assert_eq!(RationalTime::from_seconds(3900.0, 30.0).to_human_duration(), "1h 5m");
        assert_eq!(RationalTime::from_seconds(0.4, 30.0).to_human_duration(), "0s");
        assert_eq!(RationalTime::from_seconds(-90.0, 30.0).to_human_duration(), "-1m 30s");
    }
}
