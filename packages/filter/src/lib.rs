#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Festival filter engine.
//!
//! [`apply`] narrows a festival collection by user criteria. It is pure
//! and order-preserving, and every criterion is ANDed with the others.
//! [`filter_options`] derives the values that populate the filter
//! controls.

use std::collections::BTreeSet;

use festival_map_festival_models::{FestivalRecord, FilterCriteria, Period};
use serde::Serialize;

/// Returns the records matching every criterion, in input order.
///
/// Criteria are normalized first, so empty strings match everything.
/// Text matches case-insensitively against name or commune; region,
/// department, and period must be equal; genre must be contained in the
/// record's genre string.
#[must_use]
pub fn apply<'a>(records: &'a [FestivalRecord], criteria: &FilterCriteria) -> Vec<&'a FestivalRecord> {
    let criteria = criteria.clone().normalized();
    let text = criteria.text.as_deref().map(str::to_lowercase);

    records
        .iter()
        .filter(|record| {
            text.as_deref().is_none_or(|t| matches_text(record, t))
                && equals(criteria.region.as_deref(), record.region.as_deref())
                && equals(criteria.department.as_deref(), record.department.as_deref())
                && criteria.period.is_none_or(|p| record.period == Some(p))
                && criteria.genre.as_deref().is_none_or(|g| {
                    record.genre.as_deref().is_some_and(|genre| genre.contains(g))
                })
        })
        .collect()
}

/// Indices of the matching records, in input order.
#[must_use]
pub fn apply_indices(records: &[FestivalRecord], criteria: &FilterCriteria) -> Vec<usize> {
    let matching = apply(records, criteria);
    let mut matching = matching.into_iter().peekable();

    records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            matching
                .next_if(|m| std::ptr::eq(*m, record))
                .map(|_| i)
        })
        .collect()
}

fn matches_text(record: &FestivalRecord, lowered: &str) -> bool {
    [record.name.as_deref(), record.commune.as_deref()]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(lowered))
}

fn equals(wanted: Option<&str>, actual: Option<&str>) -> bool {
    wanted.is_none_or(|w| actual == Some(w))
}

/// Values available in each filter control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct regions, sorted.
    pub regions: Vec<String>,
    /// Distinct departments, sorted.
    pub departments: Vec<String>,
    /// Distinct genres, sorted.
    pub genres: Vec<String>,
    /// Every period, in calendar order.
    pub periods: Vec<Period>,
}

/// Collects the distinct non-empty regions, departments, and genres.
#[must_use]
pub fn filter_options(records: &[FestivalRecord]) -> FilterOptions {
    FilterOptions {
        regions: unique_values(records, |r| r.region.as_deref()),
        departments: unique_values(records, |r| r.department.as_deref()),
        genres: unique_values(records, |r| r.genre.as_deref()),
        periods: Period::ALL.to_vec(),
    }
}

fn unique_values<F>(records: &[FestivalRecord], field: F) -> Vec<String>
where
    F: Fn(&FestivalRecord) -> Option<&str>,
{
    records
        .iter()
        .filter_map(field)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn festival(id: &str, name: &str, commune: &str, region: &str) -> FestivalRecord {
        FestivalRecord {
            name: Some(name.to_string()),
            commune: Some(commune.to_string()),
            region: Some(region.to_string()),
            ..FestivalRecord::new(id)
        }
    }

    fn ids(records: &[&FestivalRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn text_matches_name_or_commune_case_insensitively() {
        let records = vec![
            festival("a", "Rock en Seine", "Saint-Cloud", "Île-de-France"),
            festival("b", "Jazz à Vienne", "Rockville", "Auvergne-Rhône-Alpes"),
            festival("c", "Les Suds", "Arles", "PACA"),
        ];

        let criteria = FilterCriteria::default().with_text("rock");
        assert_eq!(ids(&apply(&records, &criteria)), ["a", "b"]);
    }

    #[test]
    fn region_is_exact_and_case_sensitive() {
        let records = vec![
            festival("a", "A", "Paris", "Île-de-France"),
            festival("b", "B", "Marseille", "PACA"),
            FestivalRecord::new("c"),
        ];

        assert_eq!(
            ids(&apply(&records, &FilterCriteria::default().with_region("PACA"))),
            ["b"]
        );
        assert!(apply(&records, &FilterCriteria::default().with_region("paca")).is_empty());
    }

    #[test]
    fn genre_is_a_substring_match() {
        let mut a = FestivalRecord::new("a");
        a.genre = Some("Jazz, Blues".to_string());
        let mut b = FestivalRecord::new("b");
        b.genre = Some("Musiques actuelles".to_string());
        let records = vec![a, b];

        assert_eq!(
            ids(&apply(&records, &FilterCriteria::default().with_genre("Blues"))),
            ["a"]
        );
    }

    #[test]
    fn period_must_match_exactly() {
        let mut a = FestivalRecord::new("a");
        a.period = Some(Period::Season);
        let records = vec![a, FestivalRecord::new("b")];

        let criteria = FilterCriteria::default().with_period(Period::Season);
        assert_eq!(ids(&apply(&records, &criteria)), ["a"]);
    }

    #[test]
    fn empty_strings_match_everything() {
        let records = vec![FestivalRecord::new("a"), FestivalRecord::new("b")];
        let criteria = FilterCriteria::default()
            .with_text("  ")
            .with_region("")
            .with_genre("");
        assert_eq!(apply(&records, &criteria).len(), 2);
    }

    #[test]
    fn indices_follow_matches() {
        let records = vec![
            festival("a", "A", "x", "PACA"),
            festival("b", "B", "x", "Bretagne"),
            festival("c", "C", "x", "PACA"),
        ];
        let criteria = FilterCriteria::default().with_region("PACA");
        assert_eq!(apply_indices(&records, &criteria), [0, 2]);
    }

    #[test]
    fn options_are_sorted_unique_and_non_empty() {
        let records = vec![
            festival("a", "A", "x", "PACA"),
            festival("b", "B", "x", "Bretagne"),
            festival("c", "C", "x", "PACA"),
            festival("d", "D", "x", ""),
            FestivalRecord::new("e"),
        ];

        let options = filter_options(&records);
        assert_eq!(options.regions, ["Bretagne", "PACA"]);
        assert!(options.departments.is_empty());
        assert_eq!(options.periods, Period::ALL);
    }

    const WORDS: &[&str] = &["", "Rock", "rock", "Jazz", "PACA", "Bretagne", "Arles"];

    fn word() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(proptest::sample::select(WORDS).prop_map(String::from))
    }

    fn period() -> impl Strategy<Value = Option<Period>> {
        proptest::option::of(proptest::sample::select(Period::ALL))
    }

    fn record() -> impl Strategy<Value = FestivalRecord> {
        (
            any::<u16>(),
            word(),
            word(),
            word(),
            word(),
            word(),
            period(),
        )
            .prop_map(|(id, name, commune, department, region, genre, period)| {
                FestivalRecord {
                    name,
                    commune,
                    department,
                    region,
                    genre,
                    period,
                    ..FestivalRecord::new(i64::from(id))
                }
            })
    }

    fn criteria() -> impl Strategy<Value = FilterCriteria> {
        (word(), word(), word(), word(), period()).prop_map(
            |(text, region, department, genre, period)| FilterCriteria {
                text,
                region,
                department,
                genre,
                period,
            },
        )
    }

    proptest! {
        #[test]
        fn empty_criteria_is_identity(records in proptest::collection::vec(record(), 0..32)) {
            let filtered = apply(&records, &FilterCriteria::default());
            prop_assert_eq!(filtered.len(), records.len());
            for (kept, original) in filtered.iter().zip(&records) {
                prop_assert!(std::ptr::eq(*kept, original));
            }
        }

        #[test]
        fn criteria_decompose_into_and(
            records in proptest::collection::vec(record(), 0..32),
            criteria in criteria(),
        ) {
            let single = [
                FilterCriteria { text: criteria.text.clone(), ..FilterCriteria::default() },
                FilterCriteria { region: criteria.region.clone(), ..FilterCriteria::default() },
                FilterCriteria { department: criteria.department.clone(), ..FilterCriteria::default() },
                FilterCriteria { genre: criteria.genre.clone(), ..FilterCriteria::default() },
                FilterCriteria { period: criteria.period, ..FilterCriteria::default() },
            ];

            let combined = apply(&records, &criteria);
            let intersected: Vec<&FestivalRecord> = records
                .iter()
                .filter(|r| {
                    single.iter().all(|c| {
                        apply(std::slice::from_ref(*r), c).len() == 1
                    })
                })
                .collect();

            prop_assert_eq!(combined.len(), intersected.len());
            for (a, b) in combined.iter().zip(&intersected) {
                prop_assert!(std::ptr::eq(*a, *b));
            }
        }

        #[test]
        fn result_is_an_ordered_subsequence(
            records in proptest::collection::vec(record(), 0..32),
            criteria in criteria(),
        ) {
            let indices = apply_indices(&records, &criteria);
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(indices.len(), apply(&records, &criteria).len());
        }
    }
}
