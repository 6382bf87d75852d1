// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Point-in-time cumulative counters for one scope (global or one country),
/// as produced by the provider parse step. `recovered` defaults to 0 when
/// the provider omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub scope: String,
    pub cases: u64,
    pub deaths: u64,
    #[serde(default)]
    pub recovered: u64,
    #[serde(default)]
    pub today_cases: i64,
    #[serde(default)]
    pub today_deaths: i64,
    #[serde(default)]
    pub flag: Option<String>,
}

/// One calendar day inside a normalized historical series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub label: String,
    pub cases: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub active: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub last_date: Option<NaiveDate>,
    pub point_count: usize,
}

/// Raw historical payload from the provider: three parallel sparse maps
/// keyed by `M/D/YY` date strings. Key order is the provider's chronological
/// order and is preserved through deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HistoryTimeline {
    #[serde(default)]
    pub cases: Map<String, Value>,
    #[serde(default)]
    pub deaths: Map<String, Value>,
    #[serde(default)]
    pub recovered: Map<String, Value>,
}

/// The currently focused scope. Replaced wholesale on every selection event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Global,
    Entity(String),
}

impl Selection {
    pub fn from_scope(scope: &str) -> Self {
        if scope.eq_ignore_ascii_case("global") {
            Selection::Global
        } else {
            Selection::Entity(scope.to_string())
        }
    }

    pub fn scope_name(&self) -> &str {
        match self {
            Selection::Global => "Global",
            Selection::Entity(name) => name,
        }
    }
}

impl Serialize for Selection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.scope_name())
    }
}

/// Requested historical window: a fixed day count or all time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    Days(u32),
    All,
}

pub const HISTORY_WINDOWS: [u32; 5] = [7, 30, 90, 180, 365];

impl HistoryRange {
    /// Parses the wire form (`"7"`..`"365"` or `"all"`). Day counts outside
    /// the fixed window set are rejected.
    pub fn from_param(param: &str) -> Option<Self> {
        if param.eq_ignore_ascii_case("all") {
            return Some(HistoryRange::All);
        }
        let days: u32 = param.parse().ok()?;
        HISTORY_WINDOWS
            .contains(&days)
            .then_some(HistoryRange::Days(days))
    }

    /// Value for the provider's `lastdays` query parameter.
    pub fn lastdays(&self) -> String {
        match self {
            HistoryRange::Days(days) => days.to_string(),
            HistoryRange::All => "all".to_string(),
        }
    }
}

impl Default for HistoryRange {
    fn default() -> Self {
        HistoryRange::Days(30)
    }
}

impl Serialize for HistoryRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.lastdays())
    }
}

/// Lifecycle of a logical fetch: Idle -> Loading -> Success | Failed,
/// back to Loading on the next trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    Idle,
    Loading,
    Success,
    Failed,
}

/// A dismissible user-visible error notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_scope_parsing_is_case_insensitive_for_global() {
        assert_eq!(Selection::from_scope("global"), Selection::Global);
        assert_eq!(Selection::from_scope("Global"), Selection::Global);
        assert_eq!(
            Selection::from_scope("Italy"),
            Selection::Entity("Italy".to_string())
        );
    }

    #[test]
    fn history_range_accepts_only_fixed_windows() {
        assert_eq!(HistoryRange::from_param("30"), Some(HistoryRange::Days(30)));
        assert_eq!(HistoryRange::from_param("all"), Some(HistoryRange::All));
        assert_eq!(HistoryRange::from_param("ALL"), Some(HistoryRange::All));
        assert_eq!(HistoryRange::from_param("31"), None);
        assert_eq!(HistoryRange::from_param("-7"), None);
        assert_eq!(HistoryRange::from_param("ninety"), None);
    }

    #[test]
    fn snapshot_defaults_optional_counters() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"scope":"Global","cases":100,"deaths":5}"#).unwrap();
        assert_eq!(snapshot.recovered, 0);
        assert_eq!(snapshot.today_cases, 0);
        assert!(snapshot.flag.is_none());
    }

    #[test]
    fn timeline_key_order_survives_deserialization() {
        let timeline: HistoryTimeline = serde_json::from_str(
            r#"{"cases":{"12/30/23":1,"1/2/24":3,"1/10/24":5},"deaths":{},"recovered":{}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = timeline.cases.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["12/30/23", "1/2/24", "1/10/24"]);
    }
}
