//! LungScan - simulated chest X-ray screening workflow.
//!
//! An authenticated session stages an image, runs a simulated analysis that
//! reports progress on a timer, and classifies the randomized output into a
//! risk tier with a fixed list of recommended precautions.

pub mod analysis;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod upload;

pub use error::{AppError, AppResult};
