//! Time-series utilities shared by the detectors
//!
//! All helpers take ordered sample slices and never mutate them.

use crate::types::{Sample, SleepSegment};
use chrono::NaiveDateTime;
use std::borrow::Cow;

/// Fraction of a series treated as the baseline period
pub const BASELINE_FRACTION: f64 = 0.7;

/// Fraction of the lowest values used for the resting-like estimate
pub const RESTING_FRACTION: f64 = 0.3;

/// Signed seconds from `from` to `to`, at microsecond resolution
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

/// Median of a set of values (mean of the two middle values for even counts)
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted_median(&sorted))
}

/// Median of the sample values
pub fn median_value(points: &[Sample]) -> Option<f64> {
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    median(&values)
}

fn sorted_median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Value of the sample closest in time to `target`, within `max_seconds`
///
/// Ties keep the first sample encountered.
pub fn nearest_value(points: &[Sample], target: NaiveDateTime, max_seconds: f64) -> Option<f64> {
    let mut nearest: Option<(f64, f64)> = None;

    for point in points {
        let delta = seconds_between(target, point.timestamp).abs();
        if delta > max_seconds {
            continue;
        }
        match nearest {
            Some((best, _)) if delta >= best => {}
            _ => nearest = Some((delta, point.value)),
        }
    }

    nearest.map(|(_, value)| value)
}

/// Split a series into `(baseline, recent)` at 70% of its length
///
/// Both halves are non-empty whenever there are at least two samples.
pub fn split_baseline_recent(points: &[Sample]) -> (&[Sample], &[Sample]) {
    let n = points.len();
    if n < 2 {
        return (points, &[]);
    }
    let split_idx = ((n as f64 * BASELINE_FRACTION) as usize).clamp(1, n - 1);
    points.split_at(split_idx)
}

/// Resting heart rate estimate: median of the lowest 30% of values
pub fn resting_like_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let low_count = ((sorted.len() as f64 * RESTING_FRACTION) as usize).max(1);
    Some(sorted_median(&sorted[..low_count]))
}

/// Restrict samples to those inside at least one sleep segment
///
/// With no segments the input is returned unchanged.
pub fn filter_to_segments<'a>(points: &'a [Sample], segments: &[SleepSegment]) -> Cow<'a, [Sample]> {
    if segments.is_empty() {
        return Cow::Borrowed(points);
    }
    Cow::Owned(
        points
            .iter()
            .filter(|p| segments.iter().any(|s| s.contains(p.timestamp)))
            .copied()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 26)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap()
    }

    fn at(secs: i64, value: f64) -> Sample {
        Sample::new(base() + Duration::seconds(secs), value)
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_nearest_value_within_tolerance() {
        let points = vec![at(0, 60.0), at(100, 70.0), at(300, 80.0)];

        assert_eq!(nearest_value(&points, base() + Duration::seconds(90), 120.0), Some(70.0));
        assert_eq!(nearest_value(&points, base() + Duration::seconds(200), 50.0), None);
        assert_eq!(nearest_value(&[], base(), 120.0), None);
    }

    #[test]
    fn test_nearest_value_tie_keeps_first() {
        let points = vec![at(-10, 1.0), at(10, 2.0)];
        assert_eq!(nearest_value(&points, base(), 120.0), Some(1.0));

        let reversed = vec![at(10, 2.0), at(-10, 1.0)];
        assert_eq!(nearest_value(&reversed, base(), 120.0), Some(2.0));
    }

    #[test]
    fn test_nearest_value_boundary_is_inclusive() {
        let points = vec![at(120, 5.0)];
        assert_eq!(nearest_value(&points, base(), 120.0), Some(5.0));
    }

    #[test]
    fn test_nearest_value_sub_millisecond_outside_tolerance() {
        let points = vec![Sample::new(base() + Duration::microseconds(120_000_400), 90.0)];
        assert_eq!(nearest_value(&points, base(), 120.0), None);

        let inside = vec![Sample::new(base() + Duration::microseconds(119_999_600), 91.0)];
        assert_eq!(nearest_value(&inside, base(), 120.0), Some(91.0));
    }

    #[test]
    fn test_seconds_between_resolution() {
        let later = base() + Duration::microseconds(1_500_250);
        assert_eq!(seconds_between(base(), later), 1.50025);
        assert_eq!(seconds_between(later, base()), -1.50025);
    }

    #[test]
    fn test_split_baseline_recent() {
        let points: Vec<Sample> = (0..10).map(|i| at(i, i as f64)).collect();
        let (baseline, recent) = split_baseline_recent(&points);
        assert_eq!(baseline.len(), 7);
        assert_eq!(recent.len(), 3);

        let (baseline, recent) = split_baseline_recent(&points[..2]);
        assert_eq!((baseline.len(), recent.len()), (1, 1));

        let (baseline, recent) = split_baseline_recent(&points[..1]);
        assert_eq!((baseline.len(), recent.len()), (1, 0));

        let (baseline, recent) = split_baseline_recent(&[]);
        assert!(baseline.is_empty() && recent.is_empty());
    }

    #[test]
    fn test_split_120_samples() {
        let points: Vec<Sample> = (0..120).map(|i| at(i, 0.0)).collect();
        let (baseline, recent) = split_baseline_recent(&points);
        assert_eq!((baseline.len(), recent.len()), (84, 36));
    }

    #[test]
    fn test_resting_like_median() {
        assert_eq!(resting_like_median(&[]), None);
        assert_eq!(resting_like_median(&[90.0]), Some(90.0));

        // lowest 3 of 10: 50, 52, 54
        let values = [80.0, 54.0, 120.0, 50.0, 95.0, 52.0, 70.0, 60.0, 110.0, 100.0];
        assert_eq!(resting_like_median(&values), Some(52.0));
    }

    #[test]
    fn test_filter_to_segments() {
        let points = vec![at(0, 1.0), at(60, 2.0), at(120, 3.0)];

        let unfiltered = filter_to_segments(&points, &[]);
        assert!(matches!(unfiltered, Cow::Borrowed(_)));
        assert_eq!(unfiltered.len(), 3);

        let segments = [SleepSegment::new(
            base() + Duration::seconds(60),
            base() + Duration::seconds(120),
        )];
        let filtered = filter_to_segments(&points, &segments);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].value, 2.0);
    }
}
