//! Model snapshot capture: a single extraction capability shared by raw
//! weight maps and burn networks, plus the divergence guard.

mod guard;
mod source;

pub use guard::MagnitudeGuard;
pub use source::{BurnNetwork, ModelSnapshot, SnapshotSource, WeightMap};
