//! Location → connectivity → fetch, once per trigger.
//!
//! A [`WeatherWorkflow`] runs at most one sequence at a time. Each accepted
//! trigger produces exactly one [`TriggerResult`]; a trigger that arrives
//! while a run is in flight is ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    connectivity::ConnectivityChecker,
    error::WeatherError,
    location::LocationProvider,
    model::{UnitSystem, WeatherQuery, WeatherReport},
    provider::WeatherClient,
};

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Refresh,
}

/// Where the workflow is between trigger and outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingLocation,
    CheckingConnectivity,
    Fetching,
}

/// Terminal state of one run, handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done(WeatherReport),
    Failed(WeatherError),
}

impl Outcome {
    pub fn into_result(self) -> Result<WeatherReport, WeatherError> {
        match self {
            Outcome::Done(report) => Ok(report),
            Outcome::Failed(err) => Err(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerResult {
    Completed(Outcome),
    /// Another run was in flight; nothing was done.
    Ignored,
    /// The run was cancelled before it finished; its result was dropped.
    Superseded,
}

impl TriggerResult {
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            TriggerResult::Completed(outcome) => Some(outcome),
            TriggerResult::Ignored | TriggerResult::Superseded => None,
        }
    }
}

/// Per-request values that don't come from the location provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    pub api_key: String,
    pub unit_system: UnitSystem,
}

#[derive(Debug)]
pub struct WeatherWorkflow {
    location: Box<dyn LocationProvider>,
    connectivity: Box<dyn ConnectivityChecker>,
    client: Box<dyn WeatherClient>,
    settings: WorkflowSettings,
    phase: watch::Sender<Phase>,
    sequence: AtomicU64,
}

impl WeatherWorkflow {
    pub fn new(
        location: Box<dyn LocationProvider>,
        connectivity: Box<dyn ConnectivityChecker>,
        client: Box<dyn WeatherClient>,
        settings: WorkflowSettings,
    ) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self { location, connectivity, client, settings, phase, sequence: AtomicU64::new(0) }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Observe phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Run one location → connectivity → fetch sequence.
    pub async fn trigger(&self, trigger: Trigger) -> TriggerResult {
        let Some(seq) = self.start() else {
            debug!(?trigger, phase = ?self.phase(), "run in flight, ignoring trigger");
            return TriggerResult::Ignored;
        };
        debug!(?trigger, seq, "workflow started");
        let mut run = RunGuard { workflow: self, seq, armed: true };

        let coordinate = match self.location.request_once().await {
            Ok(coordinate) => coordinate,
            Err(err) => return self.finish(&mut run, Outcome::Failed(err)),
        };
        debug!(seq, lat = coordinate.latitude, lon = coordinate.longitude, "location received");

        if !self.advance(seq, Phase::CheckingConnectivity) {
            return TriggerResult::Superseded;
        }
        if !self.connectivity.is_online().await {
            return self.finish(&mut run, Outcome::Failed(WeatherError::NoConnectivity));
        }

        if !self.advance(seq, Phase::Fetching) {
            return TriggerResult::Superseded;
        }
        let query = WeatherQuery::new(
            coordinate,
            self.settings.unit_system,
            self.settings.api_key.clone(),
        );
        let outcome = match self.client.fetch(&query).await {
            Ok(report) => Outcome::Done(report),
            Err(err) => Outcome::Failed(err),
        };

        self.finish(&mut run, outcome)
    }

    /// Abandon the in-flight run, if any. Its result will be discarded.
    pub fn cancel(&self) -> bool {
        let cancelled = self.phase.send_if_modified(|phase| {
            if *phase == Phase::Idle {
                return false;
            }
            self.sequence.fetch_add(1, Ordering::SeqCst);
            *phase = Phase::Idle;
            true
        });
        if cancelled {
            debug!("workflow cancelled");
        }
        cancelled
    }

    /// Claim the workflow if idle, returning the run's sequence number.
    fn start(&self) -> Option<u64> {
        let mut seq = None;
        self.phase.send_if_modified(|phase| {
            if *phase != Phase::Idle {
                return false;
            }
            seq = Some(self.sequence.fetch_add(1, Ordering::SeqCst) + 1);
            *phase = Phase::AwaitingLocation;
            true
        });
        seq
    }

    fn is_current(&self, seq: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == seq
    }

    /// Move to `next` unless the run was cancelled in the meantime.
    fn advance(&self, seq: u64, next: Phase) -> bool {
        self.phase.send_if_modified(|phase| {
            if !self.is_current(seq) {
                return false;
            }
            debug!(seq, from = ?*phase, to = ?next, "phase transition");
            *phase = next;
            true
        })
    }

    /// Return to `Idle` if run `seq` still owns the workflow.
    fn release(&self, seq: u64) -> bool {
        self.phase.send_if_modified(|phase| {
            if !self.is_current(seq) {
                return false;
            }
            *phase = Phase::Idle;
            true
        })
    }

    fn finish(&self, run: &mut RunGuard<'_>, outcome: Outcome) -> TriggerResult {
        run.armed = false;
        let seq = run.seq;

        if !self.release(seq) {
            debug!(seq, "dropping result of cancelled run");
            return TriggerResult::Superseded;
        }

        match &outcome {
            Outcome::Done(report) => info!(seq, location = %report.location_name, "workflow done"),
            Outcome::Failed(err) => warn!(seq, "workflow failed: {err}"),
        }
        TriggerResult::Completed(outcome)
    }
}

/// Releases the workflow when a run's future is dropped before it finishes.
struct RunGuard<'a> {
    workflow: &'a WeatherWorkflow,
    seq: u64,
    armed: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.workflow.release(self.seq) {
            debug!(seq = self.seq, "run abandoned mid-flight, back to idle");
        }
    }
}
