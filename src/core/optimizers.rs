use crate::prelude::*;

pub trait Optimization {
    fn optimize(&mut self, dw: &Array2<f64>, batch_size: usize, config: &LearningConfiguration);
}

/// Plain gradient descent with weight decay:
/// `w <- w - rate * dw / batch_size - rate * decay * w`.
///
/// Decay is applied on every call, independent of the epoch.
pub fn apply_optimization(
    weights: &mut Array2<f64>,
    dw: &Array2<f64>,
    batch_size: usize,
    config: &LearningConfiguration,
) {
    let rate = config.rate;
    let decay = config.decay;
    let n = batch_size.max(1) as f64;
    weights.zip_mut_with(dw, |w, &g| {
        *w = *w - rate * (g / n) - rate * decay * *w;
    });
}
