//! Analysis workflow.
//!
//! The session state machine drives a simulated run and classifies its
//! output into a risk tier with recommendations.

pub mod classifier;
pub mod session;
pub mod simulator;

pub use classifier::{build_result, classify, recommendations_for, Classification};
pub use session::{AnalysisSession, SessionPhase, SessionState, SessionUpdate};
pub use simulator::{AnalysisSimulator, CancelHandle, RunId, SimulatorConfig, SimulatorEvent};
