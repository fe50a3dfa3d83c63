use serde::Serialize;

use crate::snapshot::ModelSnapshot;

/// A scalar that can be persisted verbatim and plotted.
pub trait SeriesValue: Serialize + Copy {
    fn to_f64(self) -> f64;
}

impl SeriesValue for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

impl SeriesValue for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl SeriesValue for usize {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl SeriesValue for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Mean, max and min of the value function, one entry per summary call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTrace {
    pub mean: Vec<f64>,
    pub max: Vec<f64>,
    pub min: Vec<f64>,
}

impl ValueTrace {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    fn push(&mut self, mean: f64, max: f64, min: f64) {
        self.mean.push(mean);
        self.max.push(max);
        self.min.push(min);
    }
}

/// In-memory state of one run. Accumulation never touches storage and is
/// never gated.
#[derive(Debug, Default)]
pub struct RunState {
    actions: Vec<usize>,
    pending_rewards: Vec<f64>,
    episode_rewards: Vec<f64>,
    losses: Vec<f64>,
    snapshot: Option<ModelSnapshot>,
    value_trace: ValueTrace,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_action(&mut self, action: usize) {
        self.actions.push(action);
    }

    pub fn record_reward(&mut self, reward: f64) {
        self.pending_rewards.push(reward);
    }

    pub fn record_loss(&mut self, loss: f64) {
        self.losses.push(loss);
    }

    /// Fold the pending rewards into one episode total. An empty episode
    /// contributes 0. Returns the total.
    pub fn end_episode(&mut self) -> f64 {
        let total: f64 = self.pending_rewards.drain(..).sum();
        self.episode_rewards.push(total);
        total
    }

    pub fn replace_snapshot(&mut self, snapshot: ModelSnapshot) {
        self.snapshot = Some(snapshot);
    }

    /// Append mean/max/min of `values` to the value trace. Returns `None`
    /// (and appends nothing) when `values` is empty. A NaN value makes all
    /// three entries NaN.
    pub fn push_value_summary<I>(&mut self, values: I) -> Option<(f64, f64, f64)>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        for v in values {
            count += 1;
            sum += v;
            if v.is_nan() || v > max {
                max = v;
            }
            if v.is_nan() || v < min {
                min = v;
            }
        }
        if count == 0 {
            return None;
        }
        let mean = sum / count as f64;
        self.value_trace.push(mean, max, min);
        Some((mean, max, min))
    }

    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    pub fn pending_rewards(&self) -> &[f64] {
        &self.pending_rewards
    }

    pub fn episode_rewards(&self) -> &[f64] {
        &self.episode_rewards
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    pub fn snapshot(&self) -> Option<&ModelSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn value_trace(&self) -> &ValueTrace {
        &self.value_trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_episode_sums_and_clears() {
        let mut state = RunState::new();
        state.record_reward(1.5);
        state.record_reward(-0.5);
        let total = state.end_episode();

        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(state.episode_rewards(), &[1.0]);
        assert!(state.pending_rewards().is_empty());
    }

    #[test]
    fn test_empty_episode_contributes_zero() {
        let mut state = RunState::new();
        state.end_episode();
        state.end_episode();
        assert_eq!(state.episode_rewards(), &[0.0, 0.0]);
    }

    #[test]
    fn test_actions_and_losses_append() {
        let mut state = RunState::new();
        state.record_action(3);
        state.record_action(0);
        state.record_loss(0.25);
        assert_eq!(state.actions(), &[3, 0]);
        assert_eq!(state.losses(), &[0.25]);
    }

    #[test]
    fn test_value_summary_mean_max_min() {
        let mut state = RunState::new();
        let summary = state.push_value_summary([1.0, 3.0, 5.0]);
        assert_eq!(summary, Some((3.0, 5.0, 1.0)));
        assert_eq!(state.value_trace().mean, vec![3.0]);
        assert_eq!(state.value_trace().max, vec![5.0]);
        assert_eq!(state.value_trace().min, vec![1.0]);
    }

    #[test]
    fn test_value_summary_propagates_nan() {
        let mut state = RunState::new();
        state.push_value_summary([f64::NAN, 2.0]).unwrap();
        state.push_value_summary([2.0, f64::NAN, -1.0]).unwrap();

        let trace = state.value_trace();
        assert!(trace.mean.iter().all(|v| v.is_nan()));
        assert!(trace.max.iter().all(|v| v.is_nan()));
        assert!(trace.min.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_value_summary_empty_appends_nothing() {
        let mut state = RunState::new();
        assert_eq!(state.push_value_summary(std::iter::empty()), None);
        assert!(state.value_trace().is_empty());
    }

    #[test]
    fn test_snapshot_slot_is_overwritten() {
        let mut state = RunState::new();
        state.replace_snapshot(ModelSnapshot::Parameters(vec![1]));
        state.replace_snapshot(ModelSnapshot::Parameters(vec![2]));
        assert_eq!(state.snapshot(), Some(&ModelSnapshot::Parameters(vec![2])));
    }
}
