use crate::config::MAXIMUM_WEIGHT_MAGNITUDE;
use crate::error::TelemetryError;
use crate::snapshot::ModelSnapshot;

/// Divergence check applied before a captured snapshot replaces the current one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MagnitudeGuard {
    Enforced { limit: f64 },
    Disabled,
}

impl MagnitudeGuard {
    pub fn with_magnitude_guard(limit: f64) -> Self {
        MagnitudeGuard::Enforced { limit }
    }

    pub fn without_magnitude_guard() -> Self {
        MagnitudeGuard::Disabled
    }

    pub fn is_enforced(&self) -> bool {
        matches!(self, MagnitudeGuard::Enforced { .. })
    }

    /// Reject snapshots whose largest absolute weight exceeds the limit.
    /// Opaque parameter blobs carry no magnitude and always pass.
    pub fn check(&self, snapshot: &ModelSnapshot) -> Result<(), TelemetryError> {
        let MagnitudeGuard::Enforced { limit } = *self else {
            return Ok(());
        };
        match snapshot.max_magnitude() {
            Some(max_magnitude) if max_magnitude.is_nan() || max_magnitude > limit => {
                log::warn!("weights diverged: max magnitude {max_magnitude} > {limit}");
                Err(TelemetryError::Divergence {
                    max_magnitude,
                    limit,
                })
            }
            _ => Ok(()),
        }
    }
}

impl Default for MagnitudeGuard {
    fn default() -> Self {
        MagnitudeGuard::with_magnitude_guard(MAXIMUM_WEIGHT_MAGNITUDE)
    }
}
