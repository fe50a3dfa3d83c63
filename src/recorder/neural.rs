use std::path::{Path, PathBuf};

use crate::config::RecorderConfig;
use crate::error::TelemetryError;
use crate::recorder::run::RunRecorder;
use crate::recorder::state::{SeriesValue, ValueTrace};
use crate::recorder::storage::Artifact;
use crate::snapshot::{MagnitudeGuard, SnapshotSource};

/// Hyperparameters a network-based agent was trained with.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NetworkHyperparameters {
    pub batch_size: usize,
    pub num_hidden: usize,
    pub discount: f64,
    pub learning_rate: f64,
    pub update_rule: String,
    /// Updates between target-network refreshes.
    pub freeze_interval: usize,
}

impl Default for NetworkHyperparameters {
    fn default() -> Self {
        NetworkHyperparameters {
            batch_size: 32,
            num_hidden: 64,
            discount: 0.99,
            learning_rate: 1e-3,
            update_rule: "adam".to_string(),
            freeze_interval: 1000,
        }
    }
}

/// A network that can report its hyperparameters.
pub trait HyperparameterSource {
    fn hyperparameters(&self) -> NetworkHyperparameters;
}

/// A replay buffer that can report its capacity.
pub trait ReplayCapacity {
    fn capacity(&self) -> usize;
}

/// Recorder for network-based agents.
///
/// Shares the run state and checkpoint protocol of [`RunRecorder`], but the
/// current model is captured from the network at each checkpoint and is not
/// subject to the magnitude guard.
#[derive(Debug)]
pub struct NeuralRunRecorder {
    base: RunRecorder,
}

impl NeuralRunRecorder {
    pub fn new(identity: impl Into<String>, config: &RecorderConfig) -> Self {
        NeuralRunRecorder {
            base: RunRecorder::new(identity, config)
                .with_guard(MagnitudeGuard::without_magnitude_guard()),
        }
    }

    pub fn base(&self) -> &RunRecorder {
        &self.base
    }

    pub fn record_action(&mut self, action: usize) {
        self.base.record_action(action);
    }

    pub fn record_reward(&mut self, reward: f64) {
        self.base.record_reward(reward);
    }

    pub fn record_loss(&mut self, loss: f64) {
        self.base.record_loss(loss);
    }

    pub fn end_episode(&mut self) -> f64 {
        self.base.end_episode()
    }

    /// Capture `source` as the current model outside a checkpoint.
    pub fn capture_model<S: SnapshotSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<(), TelemetryError> {
        self.base.capture_model(source)
    }

    /// Capture `network` and persist all series plus
    /// `network_file_epoch_{epoch}`. No-op when telemetry is disabled.
    pub fn checkpoint<N: SnapshotSource + ?Sized>(
        &mut self,
        epoch: u64,
        network: &N,
    ) -> Result<(), TelemetryError> {
        if !self.base.telemetry_enabled() {
            log::debug!("telemetry disabled, skipping checkpoint for epoch {epoch}");
            return Ok(());
        }
        self.base.capture_model(network)?;
        self.base.persist_epoch(epoch)
    }

    /// Write the network and replay-buffer hyperparameters to
    /// `hyperparameters.txt`. The policy is accepted but not inspected.
    pub fn record_hyperparameters<N, P, R>(
        &mut self,
        network: &N,
        _policy: &P,
        replay_buffer: &R,
    ) -> Result<PathBuf, TelemetryError>
    where
        N: HyperparameterSource + ?Sized,
        P: ?Sized,
        R: ReplayCapacity + ?Sized,
    {
        let text = format_hyperparameters(&network.hyperparameters(), replay_buffer.capacity());
        self.base
            .storage_mut()
            .write(Artifact::Hyperparameters, text.as_bytes())
    }

    /// See [`RunRecorder::record_stat`].
    pub fn record_stat<T: SeriesValue>(
        &mut self,
        name: &str,
        values: &[T],
        epoch: u64,
    ) -> Result<(), TelemetryError> {
        self.base.record_stat(name, values, epoch)
    }

    pub fn record_value_string(&mut self, text: &str) -> Result<PathBuf, TelemetryError> {
        self.base.record_value_string(text)
    }

    pub fn record_value_summary<'a, K: 'a>(
        &mut self,
        value_by_state: impl IntoIterator<Item = (&'a K, &'a f64)>,
    ) -> Result<(), TelemetryError> {
        self.base.record_value_summary(value_by_state)
    }

    pub fn value_trace(&self) -> &ValueTrace {
        self.base.value_trace()
    }

    pub fn storage_location(&self) -> Option<&Path> {
        self.base.storage_location()
    }
}

fn format_hyperparameters(hp: &NetworkHyperparameters, replay_capacity: usize) -> String {
    [
        ("batch_size", hp.batch_size.to_string()),
        ("num_hidden", hp.num_hidden.to_string()),
        ("discount", hp.discount.to_string()),
        ("learning_rate", hp.learning_rate.to_string()),
        ("update_rule", hp.update_rule.clone()),
        ("freeze_interval", hp.freeze_interval.to_string()),
        ("replay_memory_capacity", replay_capacity.to_string()),
    ]
    .iter()
    .map(|(key, value)| format!("{key}: {value}\n"))
    .collect()
}
