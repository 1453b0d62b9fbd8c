use crate::prelude::*;

/// Elementwise nonlinearity applied to a layer's linear output.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    pub fn forward(&self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Self::Linear => z.clone(),
            Self::Relu => relu_forward(z),
            Self::Sigmoid => sigmoid_forward(z),
            Self::Tanh => tanh_forward(z),
        }
    }

    /// Multiplies the incoming gradient `da` by the derivative evaluated at
    /// the linear output `z`.
    pub fn backward(&self, z: &Array2<f64>, da: &Array2<f64>) -> Array2<f64> {
        match self {
            Self::Linear => da.clone(),
            Self::Relu => da * &relu_backward(z),
            Self::Sigmoid => da * &sigmoid_backward(z),
            Self::Tanh => da * &tanh_backward(z),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Relu => "Relu",
            Self::Sigmoid => "Sigmoid",
            Self::Tanh => "Tanh",
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn sigmoid_forward(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(sigmoid)
}

fn sigmoid_backward(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|z| {
        let s = sigmoid(z);
        s * (1.0 - s)
    })
}

fn relu_forward(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|z| if z >= 0.0 { z } else { 0.0 })
}

fn relu_backward(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|z| if z >= 0.0 { 1.0 } else { 0.0 })
}

fn tanh_forward(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(f64::tanh)
}

fn tanh_backward(z: &Array2<f64>) -> Array2<f64> {
    z.mapv(|z| {
        let t = z.tanh();
        1.0 - t * t
    })
}
