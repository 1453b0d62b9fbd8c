//! Mini-batch gradient descent over a set of datapoints.

use crate::data::fill_batch;
use crate::prelude::*;
use rand::seq::SliceRandom;
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

/// Passed to the `train_with` hook after every completed batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchReport {
    pub epoch: usize,
    pub batch: usize,
    pub loss: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrainingSummary {
    pub epochs: usize,
    pub batches: usize,
    /// Loss of the last batch trained on, if any.
    pub last_loss: Option<f64>,
    pub stopped_early: bool,
}

/// Returns a fresh uniformly random permutation of `0..len`.
pub fn epoch_permutation<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..len).collect();
    perm.shuffle(rng);
    perm
}

/// Trains `network` for every configured epoch.
///
/// Each epoch draws a new permutation of the datapoints and runs
/// forward/backward/update on each consecutive full batch. The trailing
/// `len % batch_size` datapoints of the permutation are skipped for that epoch.
pub fn train<R: Rng + ?Sized>(
    network: &mut Network,
    datapoints: &[Datapoint],
    config: &LearningConfiguration,
    rng: &mut R,
) -> Result<TrainingSummary> {
    train_with(network, datapoints, config, rng, |_| ControlFlow::Continue(()))
}

/// Like [`train`], but calls `on_batch` after every update; returning
/// `ControlFlow::Break` stops training before the next batch.
///
/// A shape error aborts the offending batch before the network is touched;
/// updates from earlier batches are kept.
pub fn train_with<R, F>(
    network: &mut Network,
    datapoints: &[Datapoint],
    config: &LearningConfiguration,
    rng: &mut R,
    mut on_batch: F,
) -> Result<TrainingSummary>
where
    R: Rng + ?Sized,
    F: FnMut(&BatchReport) -> ControlFlow<()>,
{
    config.validate()?;
    let mut summary = TrainingSummary::default();
    if datapoints.is_empty() {
        warn!("no datapoints to train on");
        return Ok(summary);
    }

    let batch_size = config.effective_batch_size(datapoints.len());
    if batch_size > datapoints.len() {
        warn!(
            batch_size,
            datapoints = datapoints.len(),
            "batch size exceeds dataset, no batch will be trained"
        );
    }

    let rows = batch_size.min(datapoints.len());
    let mut features = Array2::zeros((rows, network.input_width()));
    let mut values = Array2::zeros((rows, network.output_width()));
    for epoch in 0..config.epochs as usize {
        let perm = epoch_permutation(datapoints.len(), rng);
        for (batch, indices) in perm.chunks_exact(batch_size).enumerate() {
            fill_batch(datapoints, indices, &mut features, &mut values)?;
            let pass = network.forward(&features)?;
            let gradients = network.backward(pass, &values, config.error_name)?;
            let loss = gradients.loss();
            network.update(gradients, config)?;

            summary.batches += 1;
            summary.last_loss = Some(loss);
            let report = BatchReport { epoch, batch, loss };
            if on_batch(&report).is_break() {
                summary.stopped_early = true;
                info!(epoch, batches = summary.batches, loss, "training stopped by caller");
                return Ok(summary);
            }
        }
        summary.epochs += 1;
        debug!(epoch, loss = ?summary.last_loss, "epoch complete");
    }

    info!(
        epochs = summary.epochs,
        batches = summary.batches,
        loss = ?summary.last_loss,
        "training complete"
    );
    Ok(summary)
}

/// Rows per forward pass in [`evaluate`].
const EVALUATION_CHUNK: usize = 256;

/// Mean over datapoints of the summed squared error across output dimensions.
/// Does not modify the network. Runs in fixed-size chunks so memory stays
/// bounded for large datasets.
pub fn evaluate(network: &Network, datapoints: &[Datapoint]) -> Result<f64> {
    if datapoints.is_empty() {
        return Err(NNError::EmptyDataset);
    }
    let rows = EVALUATION_CHUNK.min(datapoints.len());
    let mut features = Array2::zeros((rows, network.input_width()));
    let mut values = Array2::zeros((rows, network.output_width()));
    let indices: Vec<usize> = (0..datapoints.len()).collect();
    let mut square_error = 0.0;
    for chunk in indices.chunks(EVALUATION_CHUNK) {
        let n = chunk.len();
        if n < rows {
            features = Array2::zeros((n, network.input_width()));
            values = Array2::zeros((n, network.output_width()));
        }
        fill_batch(datapoints, chunk, &mut features, &mut values)?;
        let y_hat = network.predict(&features)?;
        square_error += (&values - &y_hat).mapv(|d| d * d).sum();
    }
    Ok(square_error / datapoints.len() as f64)
}
