pub use serde::{Deserialize, Serialize};

pub use ndarray::*;
pub use ndarray_rand::rand_distr::Uniform;
pub use ndarray_rand::RandomExt;
pub use rand::Rng;

pub use crate::error::*;
pub use crate::config::LearningConfiguration;
pub use crate::data::Datapoint;
pub use crate::models::{ForwardPass, Gradients, Network, NetworkBuilder};
pub use crate::serialization::Format;
pub use crate::trainer::{evaluate, train, train_with, BatchReport, TrainingSummary};

// Internal re-exports
pub use crate::core::{apply_optimization, Activation, Dense, ErrorFunction, Optimization};
