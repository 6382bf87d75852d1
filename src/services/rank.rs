// src/services/rank.rs
use crate::models::Snapshot;
use crate::services::stats::active_cases;

/// How many entities a ranked view exposes.
pub const TOP_LIMIT: usize = 10;

/// Metric a ranked entity view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    Cases,
    Deaths,
    Recovered,
    ActiveCases,
}

impl RankKey {
    pub fn from_param(param: &str) -> Option<Self> {
        match param.to_ascii_lowercase().as_str() {
            "cases" => Some(RankKey::Cases),
            "deaths" => Some(RankKey::Deaths),
            "recovered" => Some(RankKey::Recovered),
            "active" | "activecases" => Some(RankKey::ActiveCases),
            _ => None,
        }
    }

    fn value(&self, snapshot: &Snapshot) -> i64 {
        match self {
            RankKey::Cases => snapshot.cases as i64,
            RankKey::Deaths => snapshot.deaths as i64,
            RankKey::Recovered => snapshot.recovered as i64,
            RankKey::ActiveCases => active_cases(snapshot),
        }
    }
}

/// Filters the collection by a case-insensitive substring of the entity
/// name, sorts descending by `key` (ties keep their filtered order), and
/// truncates to the top 10.
pub fn rank(entities: &[Snapshot], search: &str, key: RankKey) -> Vec<Snapshot> {
    let needle = search.to_lowercase();
    let mut matches: Vec<Snapshot> = entities
        .iter()
        .filter(|e| e.scope.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    // Vec::sort_by is stable, so equal keys retain filter order.
    matches.sort_by(|a, b| key.value(b).cmp(&key.value(a)));
    matches.truncate(TOP_LIMIT);
    matches
}
