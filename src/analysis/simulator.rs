//! Simulated analysis runs.
//!
//! A run emits progress ticks on a fixed interval and, independently, one
//! randomized result after a fixed delay. Nothing looks at the image: the
//! only coupling to it is that a run is started after one has been staged.
//!
//! Events are sent over an mpsc channel tagged with the run id. Sends go
//! through a shared gate that [`CancelHandle::cancel`] closes, so once
//! `cancel()` returns no further event from that run can reach the channel.

use crate::models::RawAnalysisOutput;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Identifies one run; minted by the session for every `start_analysis`.
pub type RunId = u64;

/// Terminal progress value.
pub const PROGRESS_COMPLETE: u8 = 100;

/// Event emitted by a running simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulatorEvent {
    Progress { run: RunId, value: u8 },
    Complete { run: RunId, output: RawAnalysisOutput },
}

impl SimulatorEvent {
    /// The run this event belongs to.
    pub fn run(&self) -> RunId {
        match self {
            SimulatorEvent::Progress { run, .. } | SimulatorEvent::Complete { run, .. } => *run,
        }
    }
}

/// Timing and sampling settings for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Time between progress ticks.
    pub tick_interval: Duration,
    /// Progress added per tick.
    pub progress_step: u8,
    /// Time from run start until the result is produced.
    pub result_delay: Duration,
    /// Base seed for reproducible runs; each run mixes in its id.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            progress_step: 10,
            result_delay: Duration::from_millis(2000),
            seed: None,
        }
    }
}

impl From<&crate::config::SimulatorSection> for SimulatorConfig {
    fn from(section: &crate::config::SimulatorSection) -> Self {
        Self {
            tick_interval: Duration::from_millis(section.tick_interval_ms),
            progress_step: section.progress_step,
            result_delay: Duration::from_millis(section.result_delay_ms),
            seed: section.seed,
        }
    }
}

/// Draw one raw output.
///
/// accuracy = u * 15 + 85, confidence = u * 20 + 75, positive when u > 0.6,
/// with an independent uniform `u` in `[0, 1)` for each field.
pub fn sample_output<R: Rng + ?Sized>(rng: &mut R) -> RawAnalysisOutput {
    let accuracy_pct = rng.gen::<f64>() * 15.0 + 85.0;
    let confidence_pct = rng.gen::<f64>() * 20.0 + 75.0;
    let is_positive = rng.gen::<f64>() > 0.6;

    RawAnalysisOutput {
        accuracy_pct,
        confidence_pct,
        is_positive,
    }
}

/// Send side of a run, closed by cancellation or when the run ends.
struct EventGate {
    sender: Mutex<Option<mpsc::UnboundedSender<SimulatorEvent>>>,
}

impl EventGate {
    fn new(sender: mpsc::UnboundedSender<SimulatorEvent>) -> Self {
        Self {
            sender: Mutex::new(Some(sender)),
        }
    }

    /// Returns false once the gate is closed or the receiver is gone.
    fn send(&self, event: SimulatorEvent) -> bool {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    fn close(&self) {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

/// Stops a run. Dropping the handle does not cancel.
pub struct CancelHandle {
    run: RunId,
    gate: Arc<EventGate>,
    task: JoinHandle<()>,
}

impl CancelHandle {
    /// Stop both timers. No event from this run is sent after this returns.
    pub fn cancel(&self) {
        if !self.is_finished() {
            debug!("Cancelled analysis run {}", self.run);
        }
        self.gate.close();
        self.task.abort();
    }

    /// The run this handle controls.
    pub fn run(&self) -> RunId {
        self.run
    }

    /// True once the run can no longer emit events.
    pub fn is_finished(&self) -> bool {
        self.gate.is_closed() || self.task.is_finished()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("run", &self.run)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Produces simulated analysis runs.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSimulator {
    config: SimulatorConfig,
}

impl AnalysisSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Start a run on the current tokio runtime.
    ///
    /// Progress values are sent in strictly increasing order, ending at
    /// exactly 100. One `Complete` event follows the result delay. The
    /// relative order of the final tick and the result is not guaranteed.
    pub fn run(&self, run: RunId, events: mpsc::UnboundedSender<SimulatorEvent>) -> CancelHandle {
        let gate = Arc::new(EventGate::new(events));
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run)),
            None => StdRng::from_entropy(),
        };

        debug!(
            "Starting analysis run {} ({}ms ticks, result after {}ms)",
            run,
            self.config.tick_interval.as_millis(),
            self.config.result_delay.as_millis()
        );

        let task = tokio::spawn(drive(self.config.clone(), run, gate.clone(), rng));

        CancelHandle { run, gate, task }
    }
}

async fn drive(config: SimulatorConfig, run: RunId, gate: Arc<EventGate>, mut rng: StdRng) {
    let start = Instant::now();
    let step = config.progress_step.clamp(1, PROGRESS_COMPLETE);

    let mut ticker = time::interval_at(start + config.tick_interval, config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
    let result_timer = time::sleep_until(start + config.result_delay);
    tokio::pin!(result_timer);

    let mut progress: u8 = 0;
    let mut result_sent = false;

    while progress < PROGRESS_COMPLETE || !result_sent {
        tokio::select! {
            biased;

            _ = ticker.tick(), if progress < PROGRESS_COMPLETE => {
                progress = progress.saturating_add(step).min(PROGRESS_COMPLETE);
                trace!("Run {} progress {}", run, progress);
                if !gate.send(SimulatorEvent::Progress { run, value: progress }) {
                    return;
                }
            }

            _ = &mut result_timer, if !result_sent => {
                result_sent = true;
                let output = sample_output(&mut rng);
                debug!(
                    "Run {} produced result (positive: {}, confidence: {:.2})",
                    run, output.is_positive, output.confidence_pct
                );
                if !gate.send(SimulatorEvent::Complete { run, output }) {
                    return;
                }
            }
        }
    }

    gate.close();
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(
        rx: &mut mpsc::UnboundedReceiver<SimulatorEvent>,
    ) -> Vec<(Duration, SimulatorEvent)> {
        let start = Instant::now();
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push((start.elapsed(), event));
        }
        events
    }

    #[test]
    fn test_sample_output_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut positives = 0;
        let runs = 10_000;

        for _ in 0..runs {
            let output = sample_output(&mut rng);
            assert!((85.0..100.0).contains(&output.accuracy_pct));
            assert!((75.0..95.0).contains(&output.confidence_pct));
            if output.is_positive {
                positives += 1;
            }
        }

        // P(positive) = 0.4
        let ratio = positives as f64 / runs as f64;
        assert!((0.35..0.45).contains(&ratio), "positive ratio {}", ratio);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = sample_output(&mut StdRng::seed_from_u64(42));
        let b = sample_output(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_schedule() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = AnalysisSimulator::default().run(1, tx);

        let events = collect(&mut rx).await;
        let progress: Vec<u8> = events
            .iter()
            .filter_map(|(_, e)| match e {
                SimulatorEvent::Progress { value, .. } => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);

        for (i, (at, event)) in events
            .iter()
            .filter(|(_, e)| matches!(e, SimulatorEvent::Progress { .. }))
            .enumerate()
        {
            assert_eq!(*at, Duration::from_millis(200 * (i as u64 + 1)));
            assert_eq!(event.run(), 1);
        }

        let completions: Vec<_> = events
            .iter()
            .filter(|(_, e)| matches!(e, SimulatorEvent::Complete { .. }))
            .collect();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].0, Duration::from_millis(2000));
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_clamps_at_complete() {
        let config = SimulatorConfig {
            progress_step: 30,
            ..SimulatorConfig::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = AnalysisSimulator::new(config).run(3, tx);

        let progress: Vec<u8> = collect(&mut rx)
            .await
            .into_iter()
            .filter_map(|(_, e)| match e {
                SimulatorEvent::Progress { value, .. } => Some(value),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![30, 60, 90, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_both_timers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = AnalysisSimulator::default().run(2, tx);

        time::sleep(Duration::from_millis(500)).await;
        handle.cancel();
        assert!(handle.is_finished());

        time::sleep(Duration::from_millis(5000)).await;
        let events = collect(&mut rx).await;
        let values: Vec<_> = events.iter().map(|(_, e)| *e).collect();
        assert_eq!(
            values,
            vec![
                SimulatorEvent::Progress { run: 2, value: 10 },
                SimulatorEvent::Progress { run: 2, value: 20 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = AnalysisSimulator::default().run(9, tx);
        handle.cancel();

        time::sleep(Duration::from_millis(3000)).await;
        assert!(rx.recv().await.is_none());
    }
}
