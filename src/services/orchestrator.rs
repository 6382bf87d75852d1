// src/services/orchestrator.rs
use std::sync::atomic::{AtomicU64, Ordering};

use log::{error, info, warn};
use tokio::sync::RwLock;

use crate::models::{
    HistoryRange, LoadPhase, Notice, Selection, SeriesPoint, SeriesSummary, Snapshot,
};
use crate::services::provider::ProviderClient;
use crate::services::series;

/// Everything the presentation boundary can observe. Owned exclusively by
/// the orchestrator; readers get cloned views and never mutate in place.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub selection: Selection,
    pub range: HistoryRange,
    pub phase: LoadPhase,
    pub snapshot: Option<Snapshot>,
    pub entities: Vec<Snapshot>,
    pub series: Vec<SeriesPoint>,
    pub series_summary: SeriesSummary,
    pub notice: Option<Notice>,
}

impl Default for DashboardState {
    fn default() -> Self {
        DashboardState {
            selection: Selection::Global,
            range: HistoryRange::default(),
            phase: LoadPhase::Idle,
            snapshot: None,
            entities: Vec::new(),
            series: Vec::new(),
            series_summary: SeriesSummary::default(),
            notice: None,
        }
    }
}

/// Coordinates provider fetches and owns the lifecycle of every snapshot,
/// entity collection, and series the rest of the system sees.
///
/// Every triggering event (initial load, selection change, range change)
/// bumps the request generation; a fetch carries the generation it was
/// dispatched under and its completion is discarded if another event has
/// since superseded it. In-flight calls are never cancelled, stale
/// responses simply die on arrival.
pub struct Orchestrator {
    provider: ProviderClient,
    state: RwLock<DashboardState>,
    generation: AtomicU64,
}

impl Orchestrator {
    pub fn new(provider: ProviderClient) -> Self {
        Orchestrator {
            provider,
            state: RwLock::new(DashboardState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Cloned view of the current state.
    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Initial mount: snapshot and entity collection are fetched together
    /// and joined with both-or-neither semantics, while the historical
    /// series for the starting selection loads independently alongside.
    pub async fn initial_load(&self) {
        info!("Running initial load");
        let generation = self.begin(None, None).await;
        let combined = async {
            tokio::try_join!(self.provider.global_snapshot(), self.provider.entities())
        };
        let (combined, _) = tokio::join!(combined, self.refresh_history(generation, false));

        match combined {
            Ok((snapshot, entities)) => {
                info!("Initial load complete ({} entities)", entities.len());
                self.publish(generation, |state| {
                    state.snapshot = Some(snapshot);
                    state.entities = entities;
                    state.phase = LoadPhase::Success;
                })
                .await;
            }
            Err(e) => {
                error!("Initial load failed: {}", e);
                self.publish(generation, |state| {
                    state.phase = LoadPhase::Failed;
                    state.notice =
                        Some(Notice::new("Failed to fetch data. Please try again later."));
                })
                .await;
            }
        }
    }

    /// Selection-change event: refetches the snapshot and the historical
    /// series for the new scope. The two fetches are independent and run
    /// concurrently.
    pub async fn select(&self, selection: Selection) {
        info!("Selection changed to {}", selection.scope_name());
        let generation = self.begin(Some(selection.clone()), None).await;
        tokio::join!(
            self.refresh_snapshot(generation, &selection),
            self.refresh_history(generation, false),
        );
    }

    /// Range-change event: only the historical series is refetched.
    pub async fn set_range(&self, range: HistoryRange) {
        info!("History range changed to {}", range.lastdays());
        let generation = self.begin(None, Some(range)).await;
        self.refresh_history(generation, true).await;
    }

    pub async fn dismiss_notice(&self) {
        self.state.write().await.notice = None;
    }

    /// Starts a logical request: bumps the generation, applies the trigger's
    /// selection/range, and enters Loading.
    async fn begin(&self, selection: Option<Selection>, range: Option<HistoryRange>) -> u64 {
        // Bumped under the write lock so the event that owns the newest
        // generation is also the one whose selection/range lands last.
        let mut state = self.state.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(selection) = selection {
            state.selection = selection;
        }
        if let Some(range) = range {
            state.range = range;
        }
        state.phase = LoadPhase::Loading;
        generation
    }

    /// Applies a completion unless its request generation has been
    /// superseded. Returns whether the completion was published.
    async fn publish(&self, generation: u64, apply: impl FnOnce(&mut DashboardState)) -> bool {
        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(
                "Discarding completion for superseded request generation {}",
                generation
            );
            return false;
        }
        apply(&mut state);
        true
    }

    async fn refresh_snapshot(&self, generation: u64, selection: &Selection) {
        match self.provider.snapshot(selection).await {
            Ok(snapshot) => {
                self.publish(generation, |state| {
                    state.snapshot = Some(snapshot);
                    state.phase = LoadPhase::Success;
                })
                .await;
            }
            Err(e) => {
                error!(
                    "Failed to fetch snapshot for {}: {}",
                    selection.scope_name(),
                    e
                );
                let message = match selection {
                    Selection::Global => "Failed to fetch global data.".to_string(),
                    Selection::Entity(name) => format!("Failed to fetch data for {}.", name),
                };
                // The previous snapshot and series stay visible; only the
                // phase and notice record the failure.
                self.publish(generation, |state| {
                    state.phase = LoadPhase::Failed;
                    state.notice = Some(Notice::new(message));
                })
                .await;
            }
        }
    }

    /// Fetches and normalizes the historical series for the current
    /// selection and range. A provider failure clears the series, which
    /// renders identically to a genuinely empty history; the distinction
    /// lives in the log. When `conclude` is set (range-only triggers) the
    /// completion also ends the Loading phase.
    async fn refresh_history(&self, generation: u64, conclude: bool) {
        let (selection, range) = {
            let state = self.state.read().await;
            (state.selection.clone(), state.range)
        };

        let normalized = match self.provider.history(&selection, range).await {
            Ok(timeline) => series::normalize(&timeline),
            Err(e) => Err(e),
        };

        let (points, summary) = match normalized {
            Ok(result) => result,
            Err(e) => {
                error!(
                    "Historical fetch for {} failed, clearing series: {}",
                    selection.scope_name(),
                    e
                );
                (Vec::new(), SeriesSummary::default())
            }
        };

        self.publish(generation, |state| {
            state.series = points;
            state.series_summary = summary;
            if conclude {
                state.phase = LoadPhase::Success;
            }
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(scope: &str, cases: u64) -> Snapshot {
        Snapshot {
            scope: scope.to_string(),
            cases,
            deaths: 0,
            recovered: 0,
            today_cases: 0,
            today_deaths: 0,
            flag: None,
        }
    }

    fn orchestrator() -> Orchestrator {
        // Nothing listens on port 9; every fetch fails fast.
        Orchestrator::new(ProviderClient::with_base_url("http://127.0.0.1:9").unwrap())
    }

    async fn seed_success(orch: &Orchestrator) {
        let generation = orch.begin(None, None).await;
        orch.publish(generation, |state| {
            state.snapshot = Some(snapshot("Global", 1000));
            state.entities = vec![snapshot("Italy", 100)];
            state.phase = LoadPhase::Success;
        })
        .await;
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let orch = orchestrator();
        let gen_a = orch.begin(Some(Selection::Entity("Italy".to_string())), None).await;
        let gen_b = orch.begin(Some(Selection::Entity("France".to_string())), None).await;

        // B's response arrives first and is published.
        assert!(
            orch.publish(gen_b, |state| {
                state.snapshot = Some(snapshot("France", 20));
                state.phase = LoadPhase::Success;
            })
            .await
        );
        // A's response arrives after B superseded it and must be dropped.
        assert!(
            !orch
                .publish(gen_a, |state| {
                    state.snapshot = Some(snapshot("Italy", 10));
                })
                .await
        );

        let state = orch.state().await;
        assert_eq!(state.snapshot.unwrap().scope, "France");
        assert_eq!(state.phase, LoadPhase::Success);
    }

    #[tokio::test]
    async fn failed_initial_load_populates_nothing() {
        let orch = orchestrator();
        orch.initial_load().await;

        let state = orch.state().await;
        assert_eq!(state.phase, LoadPhase::Failed);
        assert!(state.snapshot.is_none());
        assert!(state.entities.is_empty());
        assert!(state.series.is_empty());
        let notice = state.notice.unwrap();
        assert_eq!(notice.message, "Failed to fetch data. Please try again later.");
    }

    #[tokio::test]
    async fn failed_selection_refetch_keeps_previous_snapshot() {
        let orch = orchestrator();
        seed_success(&orch).await;

        orch.select(Selection::Entity("Italy".to_string())).await;

        let state = orch.state().await;
        assert_eq!(state.phase, LoadPhase::Failed);
        // Stale-but-available: the old snapshot is still there.
        assert_eq!(state.snapshot.unwrap().scope, "Global");
        assert_eq!(state.selection, Selection::Entity("Italy".to_string()));
        assert!(state.notice.unwrap().message.contains("Italy"));
    }

    #[tokio::test]
    async fn failed_history_fetch_clears_series_and_concludes() {
        let orch = orchestrator();
        seed_success(&orch).await;
        {
            let mut state = orch.state.write().await;
            state.series = vec![SeriesPoint {
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                label: "Mon Jan 1".to_string(),
                cases: 10,
                deaths: 1,
                recovered: 0,
                active: 9,
            }];
            state.series_summary = SeriesSummary {
                last_date: Some(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                point_count: 1,
            };
        }

        orch.set_range(HistoryRange::Days(7)).await;

        let state = orch.state().await;
        assert!(state.series.is_empty());
        assert_eq!(state.series_summary, SeriesSummary::default());
        assert_eq!(state.range, HistoryRange::Days(7));
        assert_eq!(state.phase, LoadPhase::Success);
    }

    #[tokio::test]
    async fn dismissing_notice_clears_it() {
        let orch = orchestrator();
        orch.initial_load().await;
        assert!(orch.state().await.notice.is_some());

        orch.dismiss_notice().await;
        assert!(orch.state().await.notice.is_none());
    }
}
