use crate::core::losses::criteria;
use crate::prelude::*;

/// A multilayer perceptron: an input width followed by dense layers, where
/// each layer's input width equals the previous layer's output width.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    input_width: usize,
    layers: Vec<Dense>,
}

/// Activation cache produced by [`Network::forward`] and consumed by
/// [`Network::backward`].
#[derive(Debug, Clone)]
pub struct ForwardPass {
    // a_cache[i] is the input to layer i; the final entry is the prediction.
    a_cache: Vec<Array2<f64>>,
    z_cache: Vec<Array2<f64>>,
}

impl ForwardPass {
    pub fn predictions(&self) -> &Array2<f64> {
        // forward always pushes the input plus one entry per layer
        &self.a_cache[self.a_cache.len() - 1]
    }

    pub fn into_predictions(mut self) -> Array2<f64> {
        self.a_cache.swap_remove(self.a_cache.len() - 1)
    }
}

/// Per-layer weight gradients produced by [`Network::backward`] and consumed
/// by [`Network::update`].
#[derive(Debug, Clone)]
pub struct Gradients {
    dw: Vec<Array2<f64>>,
    batch_size: usize,
    loss: f64,
}

impl Gradients {
    /// Loss of the batch the gradients were computed on.
    pub fn loss(&self) -> f64 {
        self.loss
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn weight_gradients(&self) -> &[Array2<f64>] {
        &self.dw
    }
}

impl Network {
    pub fn new(input_width: usize, layers: Vec<Dense>) -> Result<Self> {
        if layers.is_empty() {
            return Err(NNError::EmptyModel);
        }
        let mut width = input_width;
        for (i, layer) in layers.iter().enumerate() {
            if layer.input_width() != width {
                return Err(NNError::LayerShapeMismatch(format!(
                    "layer {} expects {} inputs, previous width is {}",
                    i,
                    layer.input_width(),
                    width
                )));
            }
            width = layer.output_width();
        }
        Ok(Self { input_width, layers })
    }

    pub fn builder(input_width: usize) -> NetworkBuilder {
        NetworkBuilder {
            input_width,
            widths: Vec::new(),
        }
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn output_width(&self) -> usize {
        self.layers
            .last()
            .map(Dense::output_width)
            .unwrap_or(self.input_width)
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// True when some layer has never received weights, either from a
    /// serialized model or from [`Network::randomize_synapses`].
    pub fn needs_randomization(&self) -> bool {
        self.layers.iter().any(|layer| !layer.is_initialized())
    }

    pub fn randomize_synapses<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for layer in self.layers.iter_mut() {
            layer.randomize(rng);
        }
    }

    /// Feeds a batch with one example per row through every layer, keeping
    /// what backpropagation needs.
    pub fn forward(&self, x: &Array2<f64>) -> Result<ForwardPass> {
        self.check_input(x)?;
        let mut a_cache = Vec::with_capacity(self.layers.len() + 1);
        let mut z_cache = Vec::with_capacity(self.layers.len());
        a_cache.push(x.to_owned());
        for layer in self.layers.iter() {
            let (z, a) = layer.forward(&a_cache[a_cache.len() - 1]);
            z_cache.push(z);
            a_cache.push(a);
        }
        Ok(ForwardPass { a_cache, z_cache })
    }

    /// Propagates the gradient of `error` at the output back through every
    /// layer.
    pub fn backward(
        &self,
        pass: ForwardPass,
        y: &Array2<f64>,
        error: ErrorFunction,
    ) -> Result<Gradients> {
        let ForwardPass {
            mut a_cache,
            z_cache,
        } = pass;
        if z_cache.len() != self.layers.len() {
            return Err(NNError::LayerShapeMismatch(format!(
                "forward pass has {} layers, network has {}",
                z_cache.len(),
                self.layers.len()
            )));
        }
        for (i, (layer, z)) in self.layers.iter().zip(z_cache.iter()).enumerate() {
            if a_cache[i].ncols() != layer.input_width() || z.ncols() != layer.output_width() {
                return Err(NNError::LayerShapeMismatch(format!(
                    "forward pass does not match layer {}",
                    i
                )));
            }
        }
        let y_hat = a_cache.pop().ok_or(NNError::EmptyModel)?;
        let batch_size = y_hat.nrows();
        let (loss, mut da) = criteria(&y_hat, y, error)?;

        let mut dw_cache = Vec::with_capacity(self.layers.len());
        for ((layer, z), a) in self
            .layers
            .iter()
            .rev()
            .zip(z_cache.iter().rev())
            .zip(a_cache.iter().rev())
        {
            let (dw, da_prev) = layer.backward(z, a, &da);
            dw_cache.push(dw);
            da = da_prev;
        }
        dw_cache.reverse();

        Ok(Gradients {
            dw: dw_cache,
            batch_size,
            loss,
        })
    }

    /// Applies one gradient descent step with weight decay. Shapes are checked
    /// before any weight changes.
    pub fn update(&mut self, gradients: Gradients, config: &LearningConfiguration) -> Result<()> {
        if gradients.dw.len() != self.layers.len() {
            return Err(NNError::LayerShapeMismatch(format!(
                "{} weight gradients for {} layers",
                gradients.dw.len(),
                self.layers.len()
            )));
        }
        for (i, (layer, dw)) in self.layers.iter().zip(gradients.dw.iter()).enumerate() {
            if layer.weights().dim() != dw.dim() {
                return Err(NNError::LayerShapeMismatch(format!(
                    "layer {} has weights {:?}, gradient is {:?}",
                    i,
                    layer.weights().dim(),
                    dw.dim()
                )));
            }
        }
        for (layer, dw) in self.layers.iter_mut().zip(gradients.dw.iter()) {
            layer.optimize(dw, gradients.batch_size, config);
        }
        Ok(())
    }

    /// Forward propagation without keeping the activation cache.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;
        let mut a = x.to_owned();
        for layer in self.layers.iter() {
            (_, a) = layer.forward(&a);
        }
        Ok(a)
    }

    /// Predicts the output vector for a single feature vector.
    pub fn evaluate(&self, features: &[f64]) -> Result<Vec<f64>> {
        let x = Array2::from_shape_vec((1, features.len()), features.to_vec())?;
        Ok(self.predict(&x)?.row(0).to_vec())
    }

    pub fn summary(&self) -> String {
        let mut total_param = 0;
        let mut res = "\nModel Network\n".to_string();
        res.push_str("-------------------------------------------------------------\n");
        res.push_str("Layer (Type)\t Activation\t Output shape\t No.of params\n");
        res.push_str(&format!("Input\t\t -\t\t (None, {})\t 0\n", self.input_width));
        for layer in self.layers.iter() {
            let params = layer.weights().len();
            total_param += params;
            res.push_str(&format!(
                "{}\t\t {}\t\t (None, {})\t {}\n",
                layer.typ(),
                layer.activation().name(),
                layer.output_width(),
                params
            ));
        }
        res.push_str("-------------------------------------------------------------\n");
        res.push_str(&format!("Total params: {}\n", total_param));
        res
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.input_width {
            return Err(NNError::InvalidInputShape(format!(
                "expected {} features per example, got {}",
                self.input_width,
                x.ncols()
            )));
        }
        Ok(())
    }
}

/// Declares a network's topology layer by layer. The built network has unset
/// weights until [`Network::randomize_synapses`] is called.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    input_width: usize,
    widths: Vec<(usize, Activation)>,
}

impl NetworkBuilder {
    pub fn add_dense(mut self, output_width: usize, activation: Activation) -> Self {
        self.widths.push((output_width, activation));
        self
    }

    pub fn build(self) -> Result<Network> {
        if self.input_width == 0 {
            return Err(NNError::InvalidLayerConfiguration(
                "Network input width must be greater than 0".to_string(),
            ));
        }
        let mut layers = Vec::with_capacity(self.widths.len());
        let mut prev = self.input_width;
        for (width, activation) in self.widths {
            layers.push(Dense::new(prev, width, activation)?);
            prev = width;
        }
        Network::new(self.input_width, layers)
    }

    pub fn build_randomized<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        let mut network = self.build()?;
        network.randomize_synapses(rng);
        Ok(network)
    }
}
