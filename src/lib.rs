//! # Run Recorder
//!
//! Telemetry for reinforcement learning runs. Agents push actions, rewards,
//! losses and model parameters into a recorder during training; at episode
//! boundaries rewards fold into a per-episode series, and at epoch boundaries
//! everything is written to a per-run directory alongside smoothed SVG plots.
//!
//! ## Modules
//!
//! - [`recorder`] — `RunRecorder`, `NeuralRunRecorder`, run state, smoothing, plots, artifacts
//! - [`snapshot`] — Model capture from weight maps and burn networks, divergence guard
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod config;
pub mod error;
pub mod recorder;
pub mod snapshot;

pub use config::RecorderConfig;
pub use error::{ConfigError, TelemetryError};
pub use recorder::{moving_average, NeuralRunRecorder, RunRecorder};
pub use snapshot::{BurnNetwork, MagnitudeGuard, ModelSnapshot, SnapshotSource, WeightMap};
