//! Metric Deriver
//!
//! Population-normalized rates and trailing rolling averages, per county
//! and for the synthetic statewide series.

use crate::data::{CaseRecord, TimeSeriesPoint};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Default rolling window, in records
pub const DEFAULT_ROLLING_WINDOW: usize = 7;

/// Cases per 10,000 residents.
///
/// `None` when the population is missing, zero, negative or not finite.
pub fn case_per_10k(cases: u64, population: Option<f64>) -> Option<f64> {
    let population = population.filter(|p| p.is_finite() && *p > 0.0)?;
    Some(cases as f64 / population * 10_000.0)
}

/// Trailing mean over `window` values.
///
/// The first `window - 1` entries have no value. A window of zero yields
/// no values at all.
pub fn rolling_mean(values: &[u64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum: u128 = 0;

    for (i, value) in values.iter().enumerate() {
        sum += u128::from(*value);
        if i >= window {
            sum -= u128::from(values[i - window]);
        }

        if i + 1 >= window {
            out.push(Some(sum as f64 / window as f64));
        } else {
            out.push(None);
        }
    }

    out
}

/// Build a series for one label from date-ordered `(date, cases)` pairs
fn series_from(label: &str, points: &[(NaiveDate, u64)], window: usize) -> Vec<TimeSeriesPoint> {
    let values: Vec<u64> = points.iter().map(|(_, cases)| *cases).collect();

    points
        .iter()
        .zip(rolling_mean(&values, window))
        .map(|((date, cases), rolling_average)| TimeSeriesPoint {
            date: *date,
            county: label.to_string(),
            cases: *cases,
            rolling_average,
        })
        .collect()
}

/// Per-county series keyed by feed county name.
///
/// Rows are ordered by date with a stable sort, so same-day duplicates keep
/// their feed order.
pub fn county_series(
    cases: &[CaseRecord],
    window: usize,
) -> BTreeMap<String, Vec<TimeSeriesPoint>> {
    let mut grouped: HashMap<&str, Vec<(NaiveDate, u64)>> = HashMap::new();
    for case in cases {
        grouped
            .entry(case.county.as_str())
            .or_default()
            .push((case.date, case.cases));
    }

    grouped
        .into_iter()
        .map(|(county, mut points)| {
            points.sort_by_key(|(date, _)| *date);
            (county.to_string(), series_from(county, &points, window))
        })
        .collect()
}

/// Statewide series: cases summed over all counties per date
pub fn statewide_series(cases: &[CaseRecord], label: &str, window: usize) -> Vec<TimeSeriesPoint> {
    let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for case in cases {
        *totals.entry(case.date).or_default() += case.cases;
    }

    let points: Vec<(NaiveDate, u64)> = totals.into_iter().collect();
    series_from(label, &points, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Fips;

    fn case(day: u32, county: &str, cases: u64) -> CaseRecord {
        CaseRecord {
            date: NaiveDate::from_ymd_opt(2020, 5, day).unwrap(),
            county: county.to_string(),
            fips: Some(Fips::new(48001)),
            cases,
            deaths: None,
        }
    }

    #[test]
    fn test_case_per_10k() {
        assert_eq!(case_per_10k(100, Some(50_000.0)), Some(20.0));
        assert_eq!(case_per_10k(0, Some(50_000.0)), Some(0.0));
    }

    #[test]
    fn test_case_per_10k_without_population() {
        assert_eq!(case_per_10k(100, None), None);
        assert_eq!(case_per_10k(100, Some(0.0)), None);
        assert_eq!(case_per_10k(100, Some(f64::NAN)), None);
    }

    #[test]
    fn test_rolling_mean_fixture() {
        let avg = rolling_mean(&[1, 2, 3, 4, 5, 6, 7, 8], 7);

        assert_eq!(avg.len(), 8);
        assert!(avg[..6].iter().all(Option::is_none));
        assert_eq!(avg[6], Some(4.0));
        assert_eq!(avg[7], Some(5.0));
    }

    #[test]
    fn test_rolling_mean_short_series() {
        let avg = rolling_mean(&[5, 5, 5], 7);
        assert_eq!(avg, vec![None, None, None]);
    }

    #[test]
    fn test_rolling_mean_window_one() {
        assert_eq!(rolling_mean(&[3, 4], 1), vec![Some(3.0), Some(4.0)]);
        assert_eq!(rolling_mean(&[3, 4], 0), vec![None, None]);
    }

    #[test]
    fn test_county_series_sorted_by_date() {
        let cases = vec![case(3, "Harris", 30), case(1, "Harris", 10), case(2, "Harris", 20)];
        let series = county_series(&cases, 2);
        let harris = &series["Harris"];

        let values: Vec<u64> = harris.iter().map(|p| p.cases).collect();
        assert_eq!(values, vec![10, 20, 30]);
        assert_eq!(harris[0].rolling_average, None);
        assert_eq!(harris[1].rolling_average, Some(15.0));
        assert_eq!(harris[2].rolling_average, Some(25.0));
    }

    #[test]
    fn test_county_series_per_county_windows() {
        let cases: Vec<CaseRecord> = (1..=8)
            .flat_map(|d| vec![case(d, "Harris", d as u64), case(d, "Dallas", 100)])
            .collect();
        let series = county_series(&cases, 7);

        assert_eq!(series["Harris"][6].rolling_average, Some(4.0));
        assert_eq!(series["Harris"][7].rolling_average, Some(5.0));
        assert_eq!(series["Dallas"][7].rolling_average, Some(100.0));
        assert_eq!(series["Dallas"][5].rolling_average, None);
    }

    #[test]
    fn test_statewide_sums_counties() {
        let cases = vec![case(1, "Harris", 10), case(1, "Dallas", 15), case(2, "Harris", 12)];
        let series = statewide_series(&cases, "Texas", 7);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].cases, 25);
        assert_eq!(series[0].county, "Texas");
        assert_eq!(series[1].cases, 12);
    }
}
