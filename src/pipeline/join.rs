//! Joiner
//!
//! Inner join of the case rows with the reference tables. Centroids are
//! matched on fips; population is matched on the "<Name> County" form of
//! the county name. Left (case) order is preserved.

use crate::data::{
    normalize_county_name, CaseRecord, CountyReference, DataError, DataResult, ReferenceData,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What to do with case rows that have no reference row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Drop them from the enriched output (counted and logged)
    #[default]
    Drop,
    /// Abort with `DataError::JoinMismatch`
    Fail,
}

/// A case row with its resolved reference data
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    /// Normalized county name
    pub county: String,
    pub case: CaseRecord,
    pub reference: CountyReference,
}

/// Outcome of the join
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinReport {
    pub matched: usize,
    pub dropped: usize,
    /// Distinct feed county names of dropped rows, sorted
    pub dropped_counties: Vec<String>,
    /// Matched counties without a population row, sorted
    pub missing_population: Vec<String>,
}

/// Join case rows with reference data
pub fn join(
    cases: &[CaseRecord],
    reference: &ReferenceData,
    policy: UnmatchedPolicy,
) -> DataResult<(Vec<JoinedRow>, JoinReport)> {
    let mut rows = Vec::with_capacity(cases.len());
    let mut dropped = 0usize;
    let mut dropped_counties = BTreeSet::new();
    let mut missing_population = BTreeSet::new();

    for case in cases {
        let point = case.fips.and_then(|fips| reference.points.get(&fips));

        let Some(point) = point else {
            dropped += 1;
            dropped_counties.insert(case.county.clone());
            continue;
        };

        let county = normalize_county_name(&case.county);
        if !reference.population.contains(&county) {
            missing_population.insert(county.clone());
        }

        rows.push(JoinedRow {
            reference: CountyReference {
                fips: point.fips,
                latitude: point.latitude,
                longitude: point.longitude,
                population: reference.population.get(&county),
            },
            county,
            case: case.clone(),
        });
    }

    let report = JoinReport {
        matched: rows.len(),
        dropped,
        dropped_counties: dropped_counties.into_iter().collect(),
        missing_population: missing_population.into_iter().collect(),
    };

    if report.dropped > 0 {
        if policy == UnmatchedPolicy::Fail {
            return Err(DataError::JoinMismatch {
                dropped: report.dropped,
                counties: report.dropped_counties,
            });
        }

        tracing::warn!(
            dropped = report.dropped,
            counties = ?report.dropped_counties,
            "Dropped case rows without reference data"
        );
    }

    if !report.missing_population.is_empty() {
        tracing::warn!(
            counties = ?report.missing_population,
            "Counties without population; rate will be empty"
        );
    }

    Ok((rows, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference::{read_points, read_population, CountyBoundaries};
    use crate::data::Fips;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashMap;

    fn reference() -> ReferenceData {
        let points = read_points(
            "GEOID,lat,lon\n48201,29.8,-95.4\n48001,31.8,-95.6\n48301,31.8,-103.5\n".as_bytes(),
            "points",
        )
        .unwrap();
        let population = read_population(
            "CTYNAME,2019\nHarris County,4713325\nAnderson County,57735\n".as_bytes(),
            "pop",
            "CTYNAME",
            "2019",
        )
        .unwrap();
        let boundaries = CountyBoundaries::from_value(
            json!({"type": "FeatureCollection", "features": []}),
            "GEOID",
            "geo",
        )
        .unwrap();

        ReferenceData {
            population,
            points,
            boundaries,
        }
    }

    fn case(day: u32, county: &str, fips: Option<u32>, cases: u64) -> CaseRecord {
        CaseRecord {
            date: NaiveDate::from_ymd_opt(2020, 4, day).unwrap(),
            county: county.to_string(),
            fips: fips.map(Fips::new),
            cases,
            deaths: Some(0),
        }
    }

    fn fixture() -> Vec<CaseRecord> {
        vec![
            case(1, "Harris", Some(48201), 10),
            case(1, "Unknown", None, 3),
            case(1, "Anderson", Some(48001), 1),
            case(2, "Harris", Some(48201), 12),
            case(2, "Nowhere", Some(48999), 4),
            case(2, "Loving", Some(48301), 1),
            case(3, "Harris", Some(48201), 15),
        ]
    }

    #[test]
    fn test_join_completeness_per_county() {
        let cases = fixture();
        let (rows, report) = join(&cases, &reference(), UnmatchedPolicy::Drop).unwrap();

        let mut expected: HashMap<&str, usize> = HashMap::new();
        let reference = reference();
        for c in &cases {
            if c.fips.map_or(false, |f| reference.points.contains_key(&f)) {
                *expected.entry(c.county.as_str()).or_default() += 1;
            }
        }

        let mut actual: HashMap<&str, usize> = HashMap::new();
        for row in &rows {
            *actual.entry(row.case.county.as_str()).or_default() += 1;
        }

        assert_eq!(actual, expected);
        assert_eq!(report.matched, 5);
        assert_eq!(report.dropped, 2);
        assert_eq!(report.dropped_counties, vec!["Nowhere", "Unknown"]);
    }

    #[test]
    fn test_join_preserves_case_order() {
        let (rows, _) = join(&fixture(), &reference(), UnmatchedPolicy::Drop).unwrap();
        let order: Vec<(&str, u64)> = rows
            .iter()
            .map(|r| (r.case.county.as_str(), r.case.cases))
            .collect();

        assert_eq!(
            order,
            vec![
                ("Harris", 10),
                ("Anderson", 1),
                ("Harris", 12),
                ("Loving", 1),
                ("Harris", 15)
            ]
        );
    }

    #[test]
    fn test_join_attaches_reference() {
        let (rows, report) = join(&fixture(), &reference(), UnmatchedPolicy::Drop).unwrap();

        let harris = &rows[0];
        assert_eq!(harris.county, "Harris County");
        assert_eq!(harris.reference.population, Some(4_713_325.0));
        assert_eq!(harris.reference.latitude, 29.8);

        let loving = rows.iter().find(|r| r.case.county == "Loving").unwrap();
        assert_eq!(loving.reference.population, None);
        assert_eq!(report.missing_population, vec!["Loving County"]);
    }

    #[test]
    fn test_fail_policy_reports_mismatch() {
        let err = join(&fixture(), &reference(), UnmatchedPolicy::Fail).unwrap_err();
        match err {
            DataError::JoinMismatch { dropped, counties } => {
                assert_eq!(dropped, 2);
                assert_eq!(counties, vec!["Nowhere", "Unknown"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fail_policy_passes_clean_input() {
        let cases = vec![case(1, "Harris", Some(48201), 10)];
        let (rows, report) = join(&cases, &reference(), UnmatchedPolicy::Fail).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(report.dropped, 0);
    }
}
