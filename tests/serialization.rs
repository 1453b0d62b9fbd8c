use fnn::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fnn-{}-{}", std::process::id(), name))
}

fn trained_network() -> Network {
    let mut rng = StdRng::seed_from_u64(99);
    let mut network = Network::builder(4)
        .add_dense(6, Activation::Tanh)
        .add_dense(3, Activation::Relu)
        .add_dense(2, Activation::Sigmoid)
        .build_randomized(&mut rng)
        .unwrap();
    let data: Vec<Datapoint> = (0..16)
        .map(|i| {
            let x = i as f64 / 16.0;
            Datapoint::new(vec![x, 1.0 - x, x * x, 0.5], vec![x, 1.0 - x])
        })
        .collect();
    let config = LearningConfiguration::default()
        .with_epochs(20)
        .with_rate(0.1)
        .with_decay(1e-4)
        .with_batch_size(4);
    train(&mut network, &data, &config, &mut rng).unwrap();
    network
}

#[test]
fn test_save_and_load_both_formats() {
    let network = trained_network();
    for (name, format) in [("model.bin", Format::Binary), ("model.json", Format::Json)] {
        let path = scratch_path(name);
        network.save(&path, format).unwrap();
        let restored = Network::load(&path, Format::from_path(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(restored.input_width(), network.input_width());
        assert_eq!(restored.layers().len(), network.layers().len());
        for (a, b) in restored.layers().iter().zip(network.layers()) {
            assert_eq!(a.weights().dim(), b.weights().dim());
            assert_eq!(a.activation(), b.activation());
            assert_eq!(a.weights(), b.weights());
        }
    }
}

#[test]
fn test_restored_network_predicts_identically() {
    let network = trained_network();
    let restored = Network::deserialize(&network.serialize().unwrap()).unwrap();
    let x = array![[0.1, 0.2, 0.3, 0.4], [1.0, -1.0, 0.0, 2.0]];
    assert_eq!(network.predict(&x).unwrap(), restored.predict(&x).unwrap());
}

#[test]
fn test_loading_missing_file_fails() {
    let path = scratch_path("does-not-exist.json");
    assert!(matches!(
        Network::load(&path, Format::Json),
        Err(NNError::IoError(_))
    ));
}

#[test]
fn test_garbage_bytes_are_rejected() {
    assert!(matches!(
        Network::deserialize(b"definitely not a network"),
        Err(NNError::ModelLoadError(_))
    ));
}
