use std::path::{Path, PathBuf};

use crate::config::RecorderConfig;
use crate::error::TelemetryError;
use crate::recorder::plot::{self, PlotSettings};
use crate::recorder::smoothing::moving_average;
use crate::recorder::state::{RunState, SeriesValue, ValueTrace};
use crate::recorder::storage::{Artifact, RunStorage};
use crate::snapshot::{MagnitudeGuard, ModelSnapshot, SnapshotSource, WeightMap};

pub const ACTIONS: &str = "actions";
pub const EPISODE_REWARDS: &str = "episode_reward_series";
pub const LOSSES: &str = "loss_series";

/// Telemetry recorder for one run of an agent.
///
/// Recording (`record_*`, `end_episode`) always updates memory. Epoch
/// checkpoints reach storage only when telemetry is enabled; value strings and
/// value summaries are written regardless.
#[derive(Debug)]
pub struct RunRecorder {
    state: RunState,
    storage: RunStorage,
    telemetry_enabled: bool,
    guard: MagnitudeGuard,
    plot: PlotSettings,
}

impl RunRecorder {
    pub fn new(identity: impl Into<String>, config: &RecorderConfig) -> Self {
        RunRecorder {
            storage: RunStorage::new(config.log_root.clone(), identity),
            state: RunState::new(),
            telemetry_enabled: config.telemetry_enabled,
            guard: MagnitudeGuard::with_magnitude_guard(config.max_weight_magnitude),
            plot: PlotSettings {
                smoothing_window: config.smoothing_window,
                width: config.plot_width,
                height: config.plot_height,
            },
        }
    }

    /// Replace the divergence check applied on model capture.
    pub fn with_guard(mut self, guard: MagnitudeGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn identity(&self) -> &str {
        self.storage.identity()
    }

    pub fn telemetry_enabled(&self) -> bool {
        self.telemetry_enabled
    }

    pub fn guard(&self) -> MagnitudeGuard {
        self.guard
    }

    pub fn record_action(&mut self, action: usize) {
        self.state.record_action(action);
    }

    pub fn record_reward(&mut self, reward: f64) {
        self.state.record_reward(reward);
    }

    pub fn record_loss(&mut self, loss: f64) {
        self.state.record_loss(loss);
    }

    /// Close the current episode. Returns the episode's reward total.
    pub fn end_episode(&mut self) -> f64 {
        self.state.end_episode()
    }

    /// Capture a raw weight mapping as the current model.
    pub fn record_weights(&mut self, weights: &WeightMap) -> Result<(), TelemetryError> {
        self.capture_model(weights)
    }

    /// Extract a snapshot from `source` and make it the current model.
    ///
    /// On a divergence error the previous snapshot is kept.
    pub fn capture_model<S: SnapshotSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<(), TelemetryError> {
        let snapshot = source.extract_snapshot()?;
        self.guard.check(&snapshot)?;
        self.state.replace_snapshot(snapshot);
        Ok(())
    }

    /// Persist all series and the current model for `epoch`. No-op when
    /// telemetry is disabled.
    pub fn checkpoint(&mut self, epoch: u64) -> Result<(), TelemetryError> {
        if !self.telemetry_enabled {
            log::debug!("telemetry disabled, skipping checkpoint for epoch {epoch}");
            return Ok(());
        }
        self.persist_epoch(epoch)
    }

    pub(crate) fn persist_epoch(&mut self, epoch: u64) -> Result<(), TelemetryError> {
        let RunRecorder {
            state,
            storage,
            plot,
            ..
        } = self;
        write_stat(storage, *plot, ACTIONS, state.actions(), epoch)?;
        write_stat(storage, *plot, EPISODE_REWARDS, state.episode_rewards(), epoch)?;
        write_stat(storage, *plot, LOSSES, state.losses(), epoch)?;

        let (artifact, contents) = match state.snapshot() {
            Some(snapshot @ ModelSnapshot::Parameters(_)) => {
                (Artifact::NetworkSnapshot { epoch }, snapshot.to_bytes()?)
            }
            Some(snapshot @ ModelSnapshot::Weights(_)) => {
                (Artifact::WeightsSnapshot { epoch }, snapshot.to_bytes()?)
            }
            None => (
                Artifact::WeightsSnapshot { epoch },
                serde_json::to_vec(&Option::<WeightMap>::None)?,
            ),
        };
        storage.write(artifact, &contents)?;
        log::debug!("checkpoint for epoch {epoch} written");
        Ok(())
    }

    /// Dump `values` under `name` and render its graph. Both files are
    /// replaced on every call; `epoch` does not affect the file names.
    pub fn record_stat<T: SeriesValue>(
        &mut self,
        name: &str,
        values: &[T],
        epoch: u64,
    ) -> Result<(), TelemetryError> {
        write_stat(&mut self.storage, self.plot, name, values, epoch)
    }

    /// Write a formatted description of state values to `value_image.txt`.
    pub fn record_value_string(&mut self, text: &str) -> Result<PathBuf, TelemetryError> {
        self.storage.write(Artifact::ValueImage, text.as_bytes())
    }

    /// Append mean/max/min of the state values to the value trace and
    /// re-render the full trace plot.
    pub fn record_value_summary<'a, K: 'a>(
        &mut self,
        value_by_state: impl IntoIterator<Item = (&'a K, &'a f64)>,
    ) -> Result<(), TelemetryError> {
        let summary = self
            .state
            .push_value_summary(value_by_state.into_iter().map(|(_, v)| *v));
        if summary.is_none() {
            log::warn!("value summary received no states, trace unchanged");
            return Ok(());
        }
        let path = self.storage.artifact_path(Artifact::StateValuesGraph)?;
        plot::render_value_trace(&path, self.state.value_trace(), self.plot)
    }

    pub fn actions(&self) -> &[usize] {
        self.state.actions()
    }

    pub fn pending_episode_rewards(&self) -> &[f64] {
        self.state.pending_rewards()
    }

    pub fn episode_rewards(&self) -> &[f64] {
        self.state.episode_rewards()
    }

    pub fn losses(&self) -> &[f64] {
        self.state.losses()
    }

    pub fn snapshot(&self) -> Option<&ModelSnapshot> {
        self.state.snapshot()
    }

    pub fn value_trace(&self) -> &ValueTrace {
        self.state.value_trace()
    }

    /// Run directory, once something has been written.
    pub fn storage_location(&self) -> Option<&Path> {
        self.storage.location()
    }

    pub(crate) fn storage_mut(&mut self) -> &mut RunStorage {
        &mut self.storage
    }
}

fn write_stat<T: SeriesValue>(
    storage: &mut RunStorage,
    settings: PlotSettings,
    name: &str,
    values: &[T],
    epoch: u64,
) -> Result<(), TelemetryError> {
    storage.write_series(name, values)?;

    let plotted: Vec<f64> = values.iter().map(|v| v.to_f64()).collect();
    let smoothed = moving_average(&plotted, settings.smoothing_window);
    let path = storage.artifact_path(Artifact::SeriesGraph(name))?;
    plot::render_series(&path, name, &plotted, &smoothed, settings)?;
    log::debug!("recorded {name} ({} values) at epoch {epoch}", values.len());
    Ok(())
}
