use crate::core::activations::Activation;
use crate::core::optimizers::{apply_optimization, Optimization};
use crate::prelude::*;
use crate::rand_array;

/// Upper bound on the weights of a single layer (2 GiB of `f64`).
pub const MAX_WEIGHTS: usize = 1 << 28;

/// `prev * next` if it fits within [`MAX_WEIGHTS`].
pub fn weight_count(prev: usize, next: usize) -> Option<usize> {
    prev.checked_mul(next).filter(|&n| n <= MAX_WEIGHTS)
}

/// A fully connected layer. Weights are stored as an `(input, output)`
/// matrix so a batch with one example per row is transformed by `a.dot(&w)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    pub(crate) w: Array2<f64>,
    pub(crate) activation: Activation,
    /// False until the weights were either supplied or randomized.
    pub(crate) initialized: bool,
}

impl Dense {
    /// Creates a layer whose weights are still unset (all zero).
    pub fn new(prev: usize, perceptron: usize, activation: Activation) -> Result<Self> {
        if perceptron == 0 || prev == 0 {
            return Err(NNError::InvalidLayerConfiguration(
                "Layer dimensions must be greater than 0".to_string(),
            ));
        }
        if weight_count(prev, perceptron).is_none() {
            return Err(NNError::InvalidLayerConfiguration(format!(
                "{} x {} weights exceed the limit of {}",
                prev, perceptron, MAX_WEIGHTS
            )));
        }
        Ok(Self {
            w: Array2::zeros((prev, perceptron)),
            activation,
            initialized: false,
        })
    }

    /// Wraps already trained weights. An all-zero matrix is kept as is.
    pub fn from_weights(w: Array2<f64>, activation: Activation) -> Result<Self> {
        if w.is_empty() {
            return Err(NNError::InvalidLayerConfiguration(
                "Layer dimensions must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            w,
            activation,
            initialized: true,
        })
    }

    pub fn input_width(&self) -> usize {
        self.w.nrows()
    }

    pub fn output_width(&self) -> usize {
        self.w.ncols()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.w
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Fills every weight from `Uniform(-1/sqrt(in), 1/sqrt(in))`. Exact zeros
    /// are redrawn.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let scale = 1.0 / (self.input_width() as f64).sqrt();
        let dist = Uniform::new(-scale, scale);
        let mut w = rand_array!(rng, &dist, self.input_width(), self.output_width());
        for x in w.iter_mut() {
            while *x == 0.0 {
                *x = rng.sample(&dist);
            }
        }
        self.w = w;
        self.initialized = true;
    }

    /// Returns the linear output `z` and the activated output `a`.
    pub fn forward(&self, a: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let z = a.dot(&self.w);
        let a = self.activation.forward(&z);
        (z, a)
    }

    /// Given the layer's input `a_prev`, its linear output `z`, and the loss
    /// gradient `da` with respect to its activated output, returns the weight
    /// gradient and the gradient to hand to the preceding layer.
    pub fn backward(
        &self,
        z: &Array2<f64>,
        a_prev: &Array2<f64>,
        da: &Array2<f64>,
    ) -> (Array2<f64>, Array2<f64>) {
        let dz = self.activation.backward(z, da);
        let dw = a_prev.t().dot(&dz);
        let da_prev = dz.dot(&self.w.t());
        (dw, da_prev)
    }

    pub fn typ(&self) -> String {
        "Dense".into()
    }
}

impl Optimization for Dense {
    fn optimize(&mut self, dw: &Array2<f64>, batch_size: usize, config: &LearningConfiguration) {
        apply_optimization(&mut self.w, dw, batch_size, config);
    }
}
