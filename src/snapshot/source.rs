use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use burn::module::Module;
use burn::record::{BinBytesRecorder, FullPrecisionSettings, Recorder};
use burn::tensor::backend::Backend;

use crate::error::TelemetryError;
use crate::recorder::{HyperparameterSource, NetworkHyperparameters};

/// Raw parameter mapping: parameter identifier to value. Ordered so that
/// persisted snapshots are stable across runs.
pub type WeightMap = BTreeMap<String, f64>;

/// The most recently captured parameter state of the model being trained.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSnapshot {
    /// Named scalar weights, e.g. a linear function approximator.
    Weights(WeightMap),
    /// Opaque parameter blob extracted from a network.
    Parameters(Vec<u8>),
}

impl ModelSnapshot {
    /// Largest absolute weight value, or `None` for opaque parameter blobs.
    ///
    /// An empty weight map has magnitude 0. A NaN weight makes the result NaN.
    pub fn max_magnitude(&self) -> Option<f64> {
        match self {
            ModelSnapshot::Weights(weights) => Some(
                weights
                    .values()
                    .map(|v| v.abs())
                    .fold(0.0_f64, |acc, m| if m.is_nan() || m > acc { m } else { acc }),
            ),
            ModelSnapshot::Parameters(_) => None,
        }
    }

    /// Serialized form written to the epoch snapshot file.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TelemetryError> {
        match self {
            ModelSnapshot::Weights(weights) => Ok(serde_json::to_vec_pretty(weights)?),
            ModelSnapshot::Parameters(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Anything the recorder can capture as the "current model".
pub trait SnapshotSource {
    fn extract_snapshot(&self) -> Result<ModelSnapshot, TelemetryError>;
}

impl SnapshotSource for WeightMap {
    fn extract_snapshot(&self) -> Result<ModelSnapshot, TelemetryError> {
        Ok(ModelSnapshot::Weights(self.clone()))
    }
}

impl SnapshotSource for HashMap<String, f64> {
    fn extract_snapshot(&self) -> Result<ModelSnapshot, TelemetryError> {
        Ok(ModelSnapshot::Weights(
            self.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        ))
    }
}

/// A burn module paired with the hyperparameters it was built and trained with.
#[derive(Debug, Clone)]
pub struct BurnNetwork<B: Backend, M: Module<B>> {
    module: M,
    hyperparameters: NetworkHyperparameters,
    _backend: PhantomData<B>,
}

impl<B: Backend, M: Module<B>> BurnNetwork<B, M> {
    pub fn new(module: M, hyperparameters: NetworkHyperparameters) -> Self {
        BurnNetwork {
            module,
            hyperparameters,
            _backend: PhantomData,
        }
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    /// Swap in the module produced by the latest optimizer step.
    pub fn set_module(&mut self, module: M) {
        self.module = module;
    }
}

impl<B: Backend, M: Module<B>> SnapshotSource for BurnNetwork<B, M> {
    fn extract_snapshot(&self) -> Result<ModelSnapshot, TelemetryError> {
        let recorder: BinBytesRecorder<FullPrecisionSettings> = BinBytesRecorder::default();
        let bytes = Recorder::<B>::record(&recorder, self.module.clone().into_record(), ())
            .map_err(|e| TelemetryError::Snapshot(format!("{e:?}")))?;
        Ok(ModelSnapshot::Parameters(bytes))
    }
}

impl<B: Backend, M: Module<B>> HyperparameterSource for BurnNetwork<B, M> {
    fn hyperparameters(&self) -> NetworkHyperparameters {
        self.hyperparameters.clone()
    }
}
