use std::collections::HashMap;
use std::path::Path;

use burn::backend::NdArray;
use burn::nn::{Linear, LinearConfig};

use run_recorder::recorder::{
    read_series, NetworkHyperparameters, ReplayCapacity, ACTIONS, EPISODE_REWARDS, LOSSES,
};
use run_recorder::{
    BurnNetwork, NeuralRunRecorder, RecorderConfig, RunRecorder, TelemetryError, WeightMap,
};

type TestBackend = NdArray;

struct ReplayMemory {
    capacity: usize,
}

impl ReplayCapacity for ReplayMemory {
    fn capacity(&self) -> usize {
        self.capacity
    }
}

fn config(root: &Path) -> RecorderConfig {
    RecorderConfig {
        log_root: root.to_path_buf(),
        plot_width: 400,
        plot_height: 300,
        ..Default::default()
    }
}

/// Drives a tabular agent through two epochs of a small line world.
#[test]
fn test_tabular_run_two_epochs() {
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = RunRecorder::new("QLearningAgent", &config(dir.path()));

    let mut q: WeightMap = WeightMap::new();
    for epoch in 1..=2u64 {
        for episode in 0..10 {
            for step in 0..5usize {
                recorder.record_action(step % 2);
                recorder.record_reward(if step == 4 { 1.0 } else { -0.1 });
                recorder.record_loss(1.0 / (1 + episode + step) as f64);
                *q.entry(format!("s{step}")).or_insert(0.0) += 0.05;
            }
            recorder.end_episode();
            recorder.record_weights(&q).unwrap();
        }
        let values: HashMap<String, f64> = q.iter().map(|(k, v)| (k.clone(), *v)).collect();
        recorder.record_value_summary(&values).unwrap();
        recorder.checkpoint(epoch).unwrap();
    }

    assert_eq!(recorder.episode_rewards().len(), 20);
    for total in recorder.episode_rewards() {
        assert!((total - 0.6).abs() < 1e-9);
    }
    assert_eq!(recorder.value_trace().len(), 2);

    let run_dir = recorder.storage_location().unwrap();
    let name = run_dir.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("QLearningAgent_"));

    let actions: Vec<usize> = read_series(run_dir, ACTIONS).unwrap();
    assert_eq!(actions.len(), 100);
    let rewards: Vec<f64> = read_series(run_dir, EPISODE_REWARDS).unwrap();
    assert_eq!(rewards.len(), 20);
    let losses: Vec<f64> = read_series(run_dir, LOSSES).unwrap();
    assert_eq!(losses.len(), 100);

    assert!(run_dir.join("weights_epoch_1.json").exists());
    assert!(run_dir.join("weights_epoch_2.json").exists());
    assert!(run_dir.join("state_values_graph.svg").exists());
    assert!(run_dir.join("episode_reward_series_graph.svg").exists());
}

#[test]
fn test_divergence_is_reported_to_the_training_loop() {
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = RunRecorder::new("agent", &config(dir.path()));
    let mut q: WeightMap = [("s0".to_string(), 999.0)].into();
    recorder.record_weights(&q).unwrap();

    q.insert("s0".to_string(), -1000.5);
    match recorder.record_weights(&q) {
        Err(TelemetryError::Divergence { max_magnitude, limit }) => {
            assert_eq!(max_magnitude, 1000.5);
            assert_eq!(limit, 1000.0);
        }
        other => panic!("expected divergence, got {other:?}"),
    }

    // Telemetry can still be flushed after the training loop gives up.
    recorder.checkpoint(1).unwrap();
    let run_dir = recorder.storage_location().unwrap();
    let saved: WeightMap =
        serde_json::from_slice(&std::fs::read(run_dir.join("weights_epoch_1.json")).unwrap())
            .unwrap();
    assert_eq!(saved.get("s0"), Some(&999.0));
}

#[test]
fn test_neural_run_with_burn_network() {
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = NeuralRunRecorder::new("RecurrentQNetwork", &config(dir.path()));

    let device = Default::default();
    let linear: Linear<TestBackend> = LinearConfig::new(6, 4).init(&device);
    let hyperparameters = NetworkHyperparameters {
        batch_size: 100,
        num_hidden: 4,
        discount: 1.0,
        learning_rate: 1e-3,
        update_rule: "adam".to_string(),
        freeze_interval: 10000,
    };
    let network: BurnNetwork<TestBackend, _> = BurnNetwork::new(linear, hyperparameters);

    recorder
        .record_hyperparameters(&network, &"epsilon-greedy", &ReplayMemory { capacity: 50000 })
        .unwrap();

    for epoch in 1..=3u64 {
        for step in 0..4usize {
            recorder.record_action(step);
            recorder.record_reward(-0.1);
            recorder.record_loss(0.5 / epoch as f64);
        }
        recorder.end_episode();
        recorder.checkpoint(epoch, &network).unwrap();
    }
    recorder.record_value_string("0.3 0.4 0.5").unwrap();

    let run_dir = recorder.storage_location().unwrap();
    for epoch in 1..=3 {
        let blob = std::fs::read(run_dir.join(format!("network_file_epoch_{epoch}.bin"))).unwrap();
        assert!(!blob.is_empty());
    }
    let hp = std::fs::read_to_string(run_dir.join("hyperparameters.txt")).unwrap();
    assert!(hp.starts_with("batch_size: 100\n"));
    assert!(hp.contains("replay_memory_capacity: 50000\n"));
    assert_eq!(
        std::fs::read_to_string(run_dir.join("value_image.txt")).unwrap(),
        "0.3 0.4 0.5"
    );
    let rewards: Vec<f64> = read_series(run_dir, EPISODE_REWARDS).unwrap();
    assert_eq!(rewards.len(), 3);
}
