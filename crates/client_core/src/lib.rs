use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{AdmissionOutcome, Callsign, Section},
    protocol::{morse_href, CALLSIGN_INPUT_ID, STORE_KEY_NAME},
};
use tokio::{
    sync::Mutex,
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, info, warn};

mod local_store;
pub mod page;
pub mod transport;

pub use local_store::{DurableLocalStore, MemoryStore};
pub use page::{PageState, SharedPage};
pub use transport::HttpAvailabilityChecker;

/// Page surface the controller writes to.
pub trait UiPort: Send + Sync {
    /// Removes the `hidden` class from `section` when `visible`, adds it otherwise.
    fn show(&self, section: Section, visible: bool);
    fn set_link_href(&self, href: &str);
    fn input_value(&self, id: &str) -> Option<String>;
}

#[async_trait]
pub trait PersistencePort: Send + Sync {
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait AvailabilityChecker: Send + Sync {
    /// Returns the status code the server answered the check with.
    async fn check(&self, callsign: &Callsign) -> Result<u16>;
}

/// How overlapping admissions interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Every admission completes on its own; the last response to land wins.
    #[default]
    Concurrent,
    /// A new admission aborts the one still waiting for its response.
    ReplacePending,
}

/// An admission whose availability check is still running.
#[derive(Debug)]
pub struct PendingAdmission {
    callsign: Callsign,
    handle: JoinHandle<AdmissionOutcome>,
}

impl PendingAdmission {
    pub fn callsign(&self) -> &Callsign {
        &self.callsign
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the outcome to be applied to the page.
    ///
    /// Returns `None` when the admission was replaced before its response
    /// arrived.
    pub async fn outcome(self) -> Option<AdmissionOutcome> {
        match self.handle.await {
            Ok(outcome) => Some(outcome),
            Err(err) if err.is_cancelled() => None,
            Err(err) => {
                warn!(callsign = %self.callsign, "admission: continuation failed: {err}");
                None
            }
        }
    }
}

pub struct AdmissionController {
    ui: Arc<dyn UiPort>,
    store: Arc<dyn PersistencePort>,
    checker: Arc<dyn AvailabilityChecker>,
    mode: ConcurrencyMode,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl AdmissionController {
    pub fn new(
        ui: Arc<dyn UiPort>,
        store: Arc<dyn PersistencePort>,
        checker: Arc<dyn AvailabilityChecker>,
    ) -> Self {
        Self {
            ui,
            store,
            checker,
            mode: ConcurrencyMode::default(),
            in_flight: Mutex::new(None),
        }
    }

    pub fn with_concurrency_mode(mut self, mode: ConcurrencyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn concurrency_mode(&self) -> ConcurrencyMode {
        self.mode
    }

    /// Page-load entry point: admits whatever the callsign input holds.
    pub async fn on_load(&self) -> Option<PendingAdmission> {
        let value = self.ui.input_value(CALLSIGN_INPUT_ID).unwrap_or_default();
        self.admit(&value).await
    }

    /// Validates, stores and links `raw_value`, then starts the availability
    /// check in the background.
    ///
    /// Input without a run of three letters is ignored and yields `None`.
    pub async fn admit(&self, raw_value: &str) -> Option<PendingAdmission> {
        let callsign = match Callsign::parse(raw_value) {
            Ok(callsign) => callsign,
            Err(err) => {
                debug!("admission: ignoring input: {err}");
                return None;
            }
        };

        // Store, link and the registered check come from one admission.
        let mut in_flight = self.in_flight.lock().await;
        if self.mode == ConcurrencyMode::ReplacePending {
            if let Some(previous) = in_flight.take() {
                previous.abort();
            }
        }

        if let Err(err) = self.store.set_item(STORE_KEY_NAME, callsign.as_str()).await {
            warn!(callsign = %callsign, "admission: failed to persist callsign: {err:#}");
        }
        self.ui.set_link_href(&morse_href(&callsign));

        let ui = Arc::clone(&self.ui);
        let checker = Arc::clone(&self.checker);
        let task_callsign = callsign.clone();
        let handle = tokio::spawn(async move {
            let outcome = check_availability(checker.as_ref(), &task_callsign).await;
            apply_outcome(ui.as_ref(), outcome);
            outcome
        });

        if self.mode == ConcurrencyMode::ReplacePending {
            *in_flight = Some(handle.abort_handle());
        }
        info!(callsign = %callsign, "admission: availability check started");

        Some(PendingAdmission { callsign, handle })
    }

    /// Reflects `outcome` into section visibility.
    pub fn apply(&self, outcome: AdmissionOutcome) {
        apply_outcome(self.ui.as_ref(), outcome);
    }

    /// Last callsign that passed admission, if the store still has it.
    pub async fn remembered_callsign(&self) -> Result<Option<String>> {
        self.store.get_item(STORE_KEY_NAME).await
    }
}

async fn check_availability(
    checker: &dyn AvailabilityChecker,
    callsign: &Callsign,
) -> AdmissionOutcome {
    match checker.check(callsign).await {
        Ok(status) => {
            let outcome = AdmissionOutcome::from_status(status);
            info!(callsign = %callsign, status, %outcome, "admission: availability checked");
            outcome
        }
        Err(err) => {
            warn!(callsign = %callsign, "admission: availability check failed: {err:#}");
            AdmissionOutcome::Error
        }
    }
}

fn apply_outcome(ui: &dyn UiPort, outcome: AdmissionOutcome) {
    if outcome.reveals_join() {
        ui.show(Section::Ready, outcome == AdmissionOutcome::Ready);
        ui.show(Section::Taken, outcome == AdmissionOutcome::Taken);
        ui.show(Section::Join, true);
        ui.show(Section::Error, false);
    } else {
        ui.show(Section::Error, true);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
