use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::classify::Classifier;
use crate::error::SyncError;
use crate::merge::merge;
use crate::model::Company;
use crate::scraper::RecordSource;
use crate::view::ViewMode;

/// Banner text shown for any failed sync. The cause goes to the log.
pub const SYNC_FAILED_MESSAGE: &str = "Failed to analyze companies. Check your API key.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Syncing,
    Success,
    Failed,
}

/// Read-only view of the dashboard at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub phase: SyncPhase,
    pub companies: Arc<Vec<Company>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub view: ViewMode,
}

impl Snapshot {
    pub fn status_line(&self) -> String {
        match (self.phase, self.last_updated) {
            (SyncPhase::Syncing, _) => "Analyzing...".to_string(),
            (_, Some(ts)) => format!("Updated {}", ts.format("%H:%M:%S")),
            (_, None) => "Ready to sync".to_string(),
        }
    }
}

struct State {
    phase: SyncPhase,
    companies: Arc<Vec<Company>>,
    last_updated: Option<DateTime<Utc>>,
    error: Option<String>,
    view: ViewMode,
}

/// Owns the company set and drives syncs through
/// `idle|success|failed -> syncing -> success|failed`.
///
/// At most one sync runs at a time; an overlapping call is rejected with
/// [`SyncError::AlreadySyncing`]. The company set is replaced whole, so
/// readers holding an earlier snapshot never see a partial update.
pub struct Dashboard {
    source: Box<dyn RecordSource>,
    classifier: Box<dyn Classifier>,
    state: Mutex<State>,
}

impl Dashboard {
    pub fn new(source: Box<dyn RecordSource>, classifier: Box<dyn Classifier>) -> Self {
        Dashboard {
            source,
            classifier,
            state: Mutex::new(State {
                phase: SyncPhase::Idle,
                companies: Arc::new(Vec::new()),
                last_updated: None,
                error: None,
                view: ViewMode::Landscape,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            phase: state.phase,
            companies: Arc::clone(&state.companies),
            last_updated: state.last_updated,
            error: state.error.clone(),
            view: state.view,
        }
    }

    pub fn set_view(&self, view: ViewMode) {
        self.lock().view = view;
    }

    /// Run one full sync: fetch, classify, merge, publish.
    pub async fn sync(&self) -> Result<Arc<Vec<Company>>, SyncError> {
        let mut in_flight = self.begin()?;
        let t0 = Instant::now();
        let result = self.run().await;
        in_flight.finished = true;

        let mut state = self.lock();
        match result {
            Ok(companies) => {
                let analyzed = companies.iter().filter(|c| c.analysis().is_some()).count();
                info!(
                    "Sync complete: {} companies ({} analyzed) in {:.1}s",
                    companies.len(),
                    analyzed,
                    t0.elapsed().as_secs_f64()
                );
                let companies = Arc::new(companies);
                state.companies = Arc::clone(&companies);
                state.last_updated = Some(Utc::now());
                state.phase = SyncPhase::Success;
                Ok(companies)
            }
            Err(e) => {
                error!("Sync failed: {}", e);
                state.error = Some(SYNC_FAILED_MESSAGE.to_string());
                state.phase = SyncPhase::Failed;
                Err(e)
            }
        }
    }

    fn begin(&self) -> Result<InFlight<'_>, SyncError> {
        let mut state = self.lock();
        if state.phase == SyncPhase::Syncing {
            warn!("Sync requested while another is in flight, rejecting");
            return Err(SyncError::AlreadySyncing);
        }
        state.phase = SyncPhase::Syncing;
        state.error = None;
        Ok(InFlight {
            dashboard: self,
            finished: false,
        })
    }

    async fn run(&self) -> Result<Vec<Company>, SyncError> {
        let records = self.source.fetch().await.map_err(SyncError::Source)?;
        let analyses = self.classifier.classify(&records).await?;
        let merged = merge(&records, &analyses);
        if !merged.rejected.is_empty() {
            warn!("Dropped {} duplicate records", merged.rejected.len());
        }
        Ok(merged.companies)
    }
}

/// Marks a sync as failed if its future is dropped before completion.
struct InFlight<'a> {
    dashboard: &'a Dashboard,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("Sync dropped before completion");
        let mut state = self.dashboard.lock();
        state.error = Some(SYNC_FAILED_MESSAGE.to_string());
        state.phase = SyncPhase::Failed;
    }
}
