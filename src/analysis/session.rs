//! The analysis session state machine.
//!
//! `Idle` -> `Staged` -> `Analyzing` -> `Resulted`. The image, the in-flight
//! run and the result are facets of a single [`SessionState`] value, so the
//! session can never be analyzing and resulted at once, nor hold a result
//! without an image.
//!
//! Simulator events arrive over a channel owned by the session. Each
//! `start_analysis` mints a fresh run id and events carrying any other id are
//! dropped, which covers events queued before a cancellation.

use crate::analysis::classifier;
use crate::analysis::simulator::{
    AnalysisSimulator, CancelHandle, RunId, SimulatorEvent, PROGRESS_COMPLETE,
};
use crate::error::{AppError, AppResult};
use crate::models::{AnalysisResult, ImageRef, RawAnalysisOutput, RiskTier};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Coarse view of the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Staged,
    Analyzing,
    Resulted,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Staged => "staged",
            SessionPhase::Analyzing => "analyzing",
            SessionPhase::Resulted => "resulted",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full session state.
#[derive(Debug)]
pub enum SessionState {
    Idle,
    Staged {
        image: ImageRef,
    },
    Analyzing {
        image: ImageRef,
        run: RunId,
        progress: u8,
        cancel: CancelHandle,
    },
    Resulted {
        image: ImageRef,
        result: AnalysisResult,
    },
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Staged { .. } => SessionPhase::Staged,
            SessionState::Analyzing { .. } => SessionPhase::Analyzing,
            SessionState::Resulted { .. } => SessionPhase::Resulted,
        }
    }
}

/// A change applied to the session by a simulator event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    Progress { run: RunId, value: u8 },
    Completed { run: RunId, tier: RiskTier },
}

/// Owns the staged image, the current run and its result.
pub struct AnalysisSession {
    state: SessionState,
    simulator: AnalysisSimulator,
    last_run: RunId,
    events_tx: mpsc::UnboundedSender<SimulatorEvent>,
    events_rx: mpsc::UnboundedReceiver<SimulatorEvent>,
}

impl AnalysisSession {
    /// Create an idle session.
    pub fn new(simulator: AnalysisSimulator) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::Idle,
            simulator,
            last_run: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// The staged or analyzed image, if any.
    pub fn image(&self) -> Option<&ImageRef> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Staged { image }
            | SessionState::Analyzing { image, .. }
            | SessionState::Resulted { image, .. } => Some(image),
        }
    }

    /// Progress of the current run; 100 once resulted, 0 otherwise.
    pub fn progress(&self) -> u8 {
        match &self.state {
            SessionState::Analyzing { progress, .. } => *progress,
            SessionState::Resulted { .. } => PROGRESS_COMPLETE,
            SessionState::Idle | SessionState::Staged { .. } => 0,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SessionState::Resulted { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Id of the in-flight run.
    pub fn current_run(&self) -> Option<RunId> {
        match &self.state {
            SessionState::Analyzing { run, .. } => Some(*run),
            _ => None,
        }
    }

    /// Stage an image, replacing any previous image and discarding any
    /// result. An in-flight run is cancelled.
    pub fn stage_image(&mut self, image: ImageRef) {
        self.cancel_in_flight();
        debug!("Staged image {} (was {})", image.name(), self.phase());
        self.state = SessionState::Staged { image };
    }

    /// Start a run for the staged image.
    ///
    /// Only valid while staged. Must be called from within a tokio runtime.
    pub fn start_analysis(&mut self) -> AppResult<RunId> {
        let image = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Staged { image } => image,
            other => {
                let phase = other.phase();
                self.state = other;
                warn!("Rejected start_analysis while {}", phase);
                return Err(AppError::InvalidState {
                    operation: "start analysis",
                    state: phase.as_str(),
                });
            }
        };

        self.last_run += 1;
        let run = self.last_run;
        let cancel = self.simulator.run(run, self.events_tx.clone());

        info!("Analyzing {} (run {})", image.name(), run);
        self.state = SessionState::Analyzing {
            image,
            run,
            progress: 0,
            cancel,
        };

        Ok(run)
    }

    /// Apply a progress tick. Returns whether the tick was accepted.
    ///
    /// Ticks from other runs, or not above the current value, are ignored.
    pub fn on_progress(&mut self, run: RunId, value: u8) -> bool {
        match &mut self.state {
            SessionState::Analyzing {
                run: current,
                progress,
                ..
            } if *current == run && value > *progress && value <= PROGRESS_COMPLETE => {
                *progress = value;
                true
            }
            _ => {
                debug!("Discarded progress {} for run {}", value, run);
                false
            }
        }
    }

    /// Apply a completed run. Returns whether the result was accepted.
    pub fn on_complete(&mut self, run: RunId, output: RawAnalysisOutput) -> bool {
        let image = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Analyzing {
                image,
                run: current,
                cancel,
                ..
            } if current == run => {
                cancel.cancel();
                image
            }
            other => {
                self.state = other;
                debug!("Discarded result for stale run {}", run);
                return false;
            }
        };

        let result = classifier::build_result(&output);
        info!(
            "Run {} finished: {} risk ({})",
            run, result.risk_tier, result.prediction_text
        );
        self.state = SessionState::Resulted { image, result };
        true
    }

    /// Clear image, progress and result, cancelling any in-flight run.
    pub fn reset(&mut self) {
        self.cancel_in_flight();
        debug!("Reset session (was {})", self.phase());
        self.state = SessionState::Idle;
    }

    /// Route a simulator event to the matching handler.
    pub fn apply(&mut self, event: SimulatorEvent) -> Option<SessionUpdate> {
        match event {
            SimulatorEvent::Progress { run, value } => self
                .on_progress(run, value)
                .then_some(SessionUpdate::Progress { run, value }),
            SimulatorEvent::Complete { run, output } => {
                if self.on_complete(run, output) {
                    self.result().map(|r| SessionUpdate::Completed {
                        run,
                        tier: r.risk_tier,
                    })
                } else {
                    None
                }
            }
        }
    }

    /// Apply every event already queued without waiting. Returns how many
    /// were accepted.
    pub fn drain_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.apply(event).is_some() {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next accepted event of the in-flight run.
    pub async fn next_update(&mut self) -> AppResult<SessionUpdate> {
        loop {
            if self.phase() != SessionPhase::Analyzing {
                return Err(AppError::InvalidState {
                    operation: "await analysis",
                    state: self.phase().as_str(),
                });
            }

            let event = self.events_rx.recv().await.ok_or(AppError::SessionClosed)?;
            if let Some(update) = self.apply(event) {
                return Ok(update);
            }
        }
    }

    /// Drive the in-flight run to its result, reporting each progress value.
    pub async fn run_to_completion<F>(&mut self, mut on_progress: F) -> AppResult<&AnalysisResult>
    where
        F: FnMut(u8),
    {
        let mut last = 0;
        loop {
            match self.next_update().await? {
                SessionUpdate::Progress { value, .. } => {
                    last = value;
                    on_progress(value);
                }
                SessionUpdate::Completed { .. } => break,
            }
        }

        // The result may land before the final tick.
        if last < PROGRESS_COMPLETE {
            on_progress(PROGRESS_COMPLETE);
        }
        self.result().ok_or(AppError::SessionClosed)
    }

    fn cancel_in_flight(&mut self) {
        if let SessionState::Analyzing { cancel, .. } = &self.state {
            cancel.cancel();
        }
    }
}

impl fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("state", &self.state)
            .field("last_run", &self.last_run)
            .finish()
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
