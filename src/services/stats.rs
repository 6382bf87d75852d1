// src/services/stats.rs
use serde::Serialize;

use crate::models::Snapshot;
use crate::services::format::percentage;

/// Metrics derived from a single snapshot on read. Nothing here is stored
/// back on the snapshot, so repeated derivation is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetrics {
    pub active_cases: i64,
    pub recovery_rate: String,
    pub fatality_rate: String,
    pub active_ratio: String,
}

/// `cases - recovered - deaths`, in signed arithmetic. The provider can
/// lag on `recovered`/`deaths` updates, so the result may be negative;
/// that is passed through unclamped.
pub fn active_cases(snapshot: &Snapshot) -> i64 {
    snapshot.cases as i64 - snapshot.recovered as i64 - snapshot.deaths as i64
}

pub fn derive(snapshot: &Snapshot) -> SnapshotMetrics {
    let active = active_cases(snapshot);
    let cases = snapshot.cases as f64;
    SnapshotMetrics {
        active_cases: active,
        recovery_rate: percentage(snapshot.recovered as f64, cases),
        fatality_rate: percentage(snapshot.deaths as f64, cases),
        active_ratio: percentage(active as f64, cases),
    }
}
