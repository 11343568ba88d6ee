//! In-flight scan coalescing
//!
//! Maps each location to the single scan currently running for it. Callers
//! that arrive while a scan is running share its outcome instead of starting
//! another one. The scan itself runs on a spawned task that owns an
//! [`InFlightGuard`]; dropping the guard removes the map entry, so cleanup
//! happens on every exit path including a panic inside the scan.

use crate::core::sync::handle_mutex_poison;
use crate::scanner::error::{ScanError, ScanOutcome};
use crate::scanner::types::ScanResult;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Shared handle on a running scan
pub type SharedScan = Shared<BoxFuture<'static, ScanOutcome<Arc<ScanResult>>>>;

type ScanMap = Arc<Mutex<HashMap<String, SharedScan>>>;

/// Whether a caller started a scan or joined one already running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Started,
    Joined,
}

/// Request-coalescing map of running scans
#[derive(Clone, Default)]
pub struct InFlightScans {
    scans: ScanMap,
}

impl InFlightScans {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the running scan for `location`, or spawn `start()` as the new one.
    ///
    /// The lookup and the insert happen under one lock with no await point in
    /// between, so at most one scan per location is ever running.
    pub fn join_or_start<F, Fut>(
        &self,
        location: &str,
        start: F,
    ) -> ScanOutcome<(SharedScan, JoinKind)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ScanOutcome<Arc<ScanResult>>> + Send + 'static,
    {
        let mut scans = handle_mutex_poison(self.scans.lock(), |message| ScanError::Internal {
            message,
        })?;

        if let Some(running) = scans.get(location) {
            return Ok((running.clone(), JoinKind::Joined));
        }

        let guard = InFlightGuard {
            location: location.to_string(),
            scans: Arc::clone(&self.scans),
        };
        let scan = start();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            scan.await
        });

        let task_location = location.to_string();
        let shared = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(ScanError::Internal {
                    message: format!("Scan task for '{}' failed: {}", task_location, e),
                }),
            }
        }
        .boxed()
        .shared();

        scans.insert(location.to_string(), shared.clone());
        Ok((shared, JoinKind::Started))
    }

    /// Number of scans currently running
    pub fn len(&self) -> usize {
        self.scans.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, location: &str) -> bool {
        self.scans
            .lock()
            .map(|s| s.contains_key(location))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for InFlightScans {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlightScans")
            .field("running", &self.len())
            .finish()
    }
}

/// Removes a location's in-flight entry when the scan task finishes
struct InFlightGuard {
    location: String,
    scans: ScanMap,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut scans = self
            .scans
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        scans.remove(&self.location);
    }
}
