//! Run telemetry: in-memory series, the epoch checkpoint protocol, smoothing,
//! plot rendering, and the neural-network variant of the recorder.

mod neural;
mod plot;
mod run;
mod smoothing;
mod state;
mod storage;

pub use neural::{HyperparameterSource, NetworkHyperparameters, NeuralRunRecorder, ReplayCapacity};
pub use plot::{render_series, render_value_trace, PlotSettings};
pub use run::{RunRecorder, ACTIONS, EPISODE_REWARDS, LOSSES};
pub use smoothing::moving_average;
pub use state::{RunState, SeriesValue, ValueTrace};
pub use storage::{read_series, Artifact, PersistencePolicy, RunStorage};
