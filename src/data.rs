//! Labeled examples and the readers that produce them.

use crate::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One labeled example: a feature vector and the expected output vector.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Datapoint {
    #[serde(rename = "Features", alias = "features")]
    pub features: Vec<f64>,
    #[serde(rename = "Values", alias = "values")]
    pub values: Vec<f64>,
}

impl Datapoint {
    pub fn new(features: Vec<f64>, values: Vec<f64>) -> Self {
        Self { features, values }
    }
}

/// Reads a JSON array of datapoints.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<Datapoint>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Reads header-less CSV rows where the trailing `target_width` columns of
/// each row are the expected values.
pub fn read_csv<R: Read>(reader: R, target_width: usize) -> Result<Vec<Datapoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut datapoints = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|e| {
                    NNError::InvalidInputShape(format!(
                        "row {}: cannot parse {:?} as a number: {}",
                        line + 1,
                        field,
                        e
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        if row.len() <= target_width {
            return Err(NNError::InvalidInputShape(format!(
                "row {} has {} columns, need more than {} target columns",
                line + 1,
                row.len(),
                target_width
            )));
        }
        let split = row.len() - target_width;
        datapoints.push(Datapoint::new(row[..split].to_vec(), row[split..].to_vec()));
    }
    Ok(datapoints)
}

/// Loads a dataset file, reading `.csv` files as CSV and anything else as JSON.
pub fn load<P: AsRef<Path>>(path: P, target_width: usize) -> Result<Vec<Datapoint>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        read_csv(file, target_width)
    } else {
        read_json(file)
    }
}

/// Copies the rows of `datapoints` selected by `indices`, in that order, into
/// `features` and `values`. Both matrices must have one row per index.
pub fn fill_batch(
    datapoints: &[Datapoint],
    indices: &[usize],
    features: &mut Array2<f64>,
    values: &mut Array2<f64>,
) -> Result<()> {
    for (k, &i) in indices.iter().enumerate() {
        let datapoint = &datapoints[i];
        if datapoint.features.len() != features.ncols() {
            return Err(NNError::InvalidInputShape(format!(
                "datapoint {} has {} features, network expects {}",
                i,
                datapoint.features.len(),
                features.ncols()
            )));
        }
        if datapoint.values.len() != values.ncols() {
            return Err(NNError::InvalidOutputShape(format!(
                "datapoint {} has {} values, network produces {}",
                i,
                datapoint.values.len(),
                values.ncols()
            )));
        }
        features
            .row_mut(k)
            .assign(&ArrayView1::from(datapoint.features.as_slice()));
        values
            .row_mut(k)
            .assign(&ArrayView1::from(datapoint.values.as_slice()));
    }
    Ok(())
}

/// Builds fresh feature and target matrices for the selected datapoints.
pub fn assemble_batch(
    datapoints: &[Datapoint],
    indices: &[usize],
    input_width: usize,
    output_width: usize,
) -> Result<(Array2<f64>, Array2<f64>)> {
    let mut features = Array2::zeros((indices.len(), input_width));
    let mut values = Array2::zeros((indices.len(), output_width));
    fill_batch(datapoints, indices, &mut features, &mut values)?;
    Ok((features, values))
}
