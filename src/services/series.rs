// src/services/series.rs
use chrono::NaiveDate;
use log::warn;
use serde_json::{Map, Value};

use crate::models::{HistoryTimeline, SeriesPoint, SeriesSummary};
use crate::services::provider::ProviderError;

/// Provider date keys look like `1/22/20`.
const DATE_KEY_FORMAT: &str = "%m/%d/%y";

/// Every 5th point (and always the final one) carries a weekday-qualified
/// label so a consumer can thin its axis without recomputing dates.
const LABEL_STRIDE: usize = 5;

/// Converts a sparse historical timeline into an ordered, gap-free series
/// with derived per-day actives, plus a summary of what was produced.
///
/// The `cases` map's key order is the provider's chronological order and is
/// taken as canonical; no re-sorting happens here. `deaths`/`recovered`
/// entries absent for a date default to 0. An empty `cases` map is a valid
/// outcome and yields an empty series, not an error; only an unparseable
/// date key is treated as a malformed payload.
pub fn normalize(timeline: &HistoryTimeline) -> Result<(Vec<SeriesPoint>, SeriesSummary), ProviderError> {
    if timeline.cases.is_empty() {
        warn!("historical payload has no case data, producing empty series");
        return Ok((Vec::new(), SeriesSummary::default()));
    }

    let total = timeline.cases.len();
    let mut points = Vec::with_capacity(total);

    for (index, (key, cases_value)) in timeline.cases.iter().enumerate() {
        let date = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).map_err(|e| {
            ProviderError::malformed(format!("bad date key {:?} in historical payload: {}", key, e))
        })?;

        let cases = count_value(cases_value);
        let deaths = count_at(&timeline.deaths, key);
        let recovered = count_at(&timeline.recovered, key);

        let marker = index % LABEL_STRIDE == 0 || index == total - 1;
        let label = if marker {
            date.format("%a %b %-d").to_string()
        } else {
            date.format("%b %-d").to_string()
        };

        points.push(SeriesPoint {
            date,
            label,
            cases,
            deaths,
            recovered,
            active: cases - recovered - deaths,
        });
    }

    let summary = SeriesSummary {
        last_date: points.last().map(|p| p.date),
        point_count: points.len(),
    };
    Ok((points, summary))
}

fn count_at(map: &Map<String, Value>, key: &str) -> i64 {
    map.get(key).map(count_value).unwrap_or(0)
}

fn count_value(value: &Value) -> i64 {
    value.as_i64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(json: &str) -> HistoryTimeline {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn fills_sparse_companion_maps_with_zero() {
        let input = timeline(
            r#"{"cases":{"1/1/24":10,"1/2/24":15},"deaths":{"1/1/24":1},"recovered":{}}"#,
        );
        let (points, summary) = normalize(&input).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(points[0].cases, 10);
        assert_eq!(points[0].deaths, 1);
        assert_eq!(points[0].recovered, 0);
        assert_eq!(points[0].active, 9);
        assert_eq!(points[1].cases, 15);
        assert_eq!(points[1].deaths, 0);
        assert_eq!(points[1].active, 15);
        assert_eq!(summary.last_date, Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
        assert_eq!(summary.point_count, 2);
    }

    #[test]
    fn empty_cases_map_yields_empty_series() {
        let input = timeline(r#"{"cases":{},"deaths":{"1/1/24":1},"recovered":{}}"#);
        let (points, summary) = normalize(&input).unwrap();
        assert!(points.is_empty());
        assert_eq!(summary.last_date, None);
        assert_eq!(summary.point_count, 0);
    }

    #[test]
    fn normalization_is_idempotent() {
        let input = timeline(
            r#"{"cases":{"1/1/24":10,"1/2/24":15,"1/3/24":21},"deaths":{"1/2/24":2},"recovered":{"1/3/24":4}}"#,
        );
        let first = normalize(&input).unwrap();
        let second = normalize(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dates_are_strictly_increasing_in_provider_order() {
        let input = timeline(
            r#"{"cases":{"12/30/23":1,"12/31/23":2,"1/1/24":3,"1/2/24":4,"1/10/24":5},"deaths":{},"recovered":{}}"#,
        );
        let (points, _) = normalize(&input).unwrap();
        for pair in points.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn labels_mark_every_fifth_point_and_the_last() {
        let entries: Vec<String> = (1..=8).map(|d| format!("\"1/{}/24\":{}", d, d)).collect();
        let input = timeline(&format!(
            r#"{{"cases":{{{}}},"deaths":{{}},"recovered":{{}}}}"#,
            entries.join(",")
        ));
        let (points, _) = normalize(&input).unwrap();

        // Weekday-qualified labels have three space-separated parts.
        let marked: Vec<bool> = points
            .iter()
            .map(|p| p.label.split(' ').count() == 3)
            .collect();
        assert_eq!(marked, vec![true, false, false, false, false, true, false, true]);
    }

    #[test]
    fn unparseable_date_key_is_malformed() {
        let input = timeline(r#"{"cases":{"not-a-date":10},"deaths":{},"recovered":{}}"#);
        let err = normalize(&input).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { .. }));
    }

    #[test]
    fn non_integer_counters_default_to_zero() {
        let input = timeline(r#"{"cases":{"1/1/24":"ten"},"deaths":{},"recovered":{}}"#);
        let (points, _) = normalize(&input).unwrap();
        assert_eq!(points[0].cases, 0);
    }
}
