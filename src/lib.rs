//! A small feedforward neural-network engine: dense layers, forward
//! propagation, backpropagation against a chosen error function, and
//! mini-batch gradient descent with weight decay.

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod prelude;
pub mod serialization;
pub mod trainer;
pub mod utils;

// Re-export types
pub use crate::config::LearningConfiguration;
pub use crate::core::{Activation, Dense, ErrorFunction};
pub use crate::data::Datapoint;
pub use crate::error::{NNError, Result};
pub use crate::models::Network;
pub use crate::trainer::{evaluate, train, train_with};
