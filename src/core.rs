// src/core.rs
pub mod activations;
pub mod layers;
pub mod losses;
pub mod optimizers;

// Re-export commonly used items
pub use activations::Activation;
pub use layers::Dense;
pub use losses::ErrorFunction;
pub use optimizers::{apply_optimization, Optimization};
