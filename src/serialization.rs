//! Persisted form of a [`Network`].
//!
//! Both the binary (bincode) and the textual (JSON) forms encode the same
//! record: the input width and, per layer, its output width, activation and
//! row-major `(input, output)` weights. Weights may be absent, which marks the
//! layer as not yet trained.

use crate::core::layers::weight_count;
use crate::prelude::*;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct NetworkRecord {
    input_width: usize,
    layers: Vec<LayerRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct LayerRecord {
    output_width: usize,
    activation: Activation,
    #[serde(default)]
    weights: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Binary,
    Json,
}

impl Format {
    /// `.json` files are textual, everything else binary.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Binary,
        }
    }
}

impl Network {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.to_record())?)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Network> {
        let record: NetworkRecord =
            bincode::deserialize(bytes).map_err(|e| NNError::ModelLoadError(e.to_string()))?;
        Network::from_record(record)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    pub fn from_json(json: &str) -> Result<Network> {
        let record: NetworkRecord =
            serde_json::from_str(json).map_err(|e| NNError::ModelLoadError(e.to_string()))?;
        Network::from_record(record)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, format: Format) -> Result<()> {
        let encoded = match format {
            Format::Binary => self.serialize()?,
            Format::Json => self.to_json()?.into_bytes(),
        };
        File::create(path)?.write_all(&encoded)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P, format: Format) -> Result<Network> {
        let mut buffer = Vec::new();
        File::open(path)?.read_to_end(&mut buffer)?;
        match format {
            Format::Binary => Network::deserialize(&buffer),
            Format::Json => {
                let text = String::from_utf8(buffer)
                    .map_err(|e| NNError::ModelLoadError(e.to_string()))?;
                Network::from_json(&text)
            }
        }
    }

    fn to_record(&self) -> NetworkRecord {
        NetworkRecord {
            input_width: self.input_width(),
            layers: self
                .layers()
                .iter()
                .map(|layer| LayerRecord {
                    output_width: layer.output_width(),
                    activation: layer.activation(),
                    weights: layer
                        .is_initialized()
                        .then(|| layer.weights().iter().copied().collect()),
                })
                .collect(),
        }
    }

    fn from_record(record: NetworkRecord) -> Result<Network> {
        if record.input_width == 0 {
            return Err(NNError::ModelLoadError("input width is 0".to_string()));
        }
        if record.layers.is_empty() {
            return Err(NNError::ModelLoadError("network has no layers".to_string()));
        }
        let mut layers = Vec::with_capacity(record.layers.len());
        let mut prev = record.input_width;
        for (i, layer) in record.layers.into_iter().enumerate() {
            if layer.output_width == 0 {
                return Err(NNError::ModelLoadError(format!("layer {} has output width 0", i)));
            }
            let expected = weight_count(prev, layer.output_width).ok_or_else(|| {
                NNError::ModelLoadError(format!(
                    "layer {} has too many weights ({} x {})",
                    i, prev, layer.output_width
                ))
            })?;
            let dense = match layer.weights {
                None => Dense::new(prev, layer.output_width, layer.activation)?,
                Some(weights) => {
                    if weights.len() != expected {
                        return Err(NNError::ModelLoadError(format!(
                            "layer {} has {} weights, expected {} x {}",
                            i,
                            weights.len(),
                            prev,
                            layer.output_width
                        )));
                    }
                    let w = Array2::from_shape_vec((prev, layer.output_width), weights)?;
                    Dense::from_weights(w, layer.activation)?
                }
            };
            prev = layer.output_width;
            layers.push(dense);
        }
        Network::new(record.input_width, layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn trained_network() -> Network {
        Network::builder(3)
            .add_dense(5, Activation::Relu)
            .add_dense(2, Activation::Sigmoid)
            .build_randomized(&mut StdRng::seed_from_u64(42))
            .unwrap()
    }

    #[test]
    fn test_binary_round_trip() {
        let network = trained_network();
        let restored = Network::deserialize(&network.serialize().unwrap()).unwrap();
        assert_eq!(restored, network);
    }

    #[test]
    fn test_json_round_trip_is_exact() {
        let network = trained_network();
        let restored = Network::from_json(&network.to_json().unwrap()).unwrap();
        assert_eq!(restored, network);
        for (a, b) in restored.layers().iter().zip(network.layers()) {
            for (x, y) in a.weights().iter().zip(b.weights().iter()) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }

    #[test]
    fn test_truncated_bytes_are_rejected() {
        let bytes = trained_network().serialize().unwrap();
        for len in [0, 4, bytes.len() / 2, bytes.len() - 1] {
            assert!(matches!(
                Network::deserialize(&bytes[..len]),
                Err(NNError::ModelLoadError(_))
            ));
        }
    }

    #[test]
    fn test_topology_without_weights_needs_randomization() {
        let json = r#"{
            "inputWidth": 2,
            "layers": [
                {"outputWidth": 3, "activation": "Sigmoid"},
                {"outputWidth": 1, "activation": "Linear", "weights": null}
            ]
        }"#;
        let network = Network::from_json(json).unwrap();
        assert!(network.needs_randomization());
        assert_eq!(network.output_width(), 1);
        let restored = Network::deserialize(&network.serialize().unwrap()).unwrap();
        assert!(restored.needs_randomization());
    }

    #[test]
    fn test_explicit_zero_weights_are_trained_weights() {
        let json = r#"{
            "inputWidth": 2,
            "layers": [{"outputWidth": 1, "activation": "Linear", "weights": [0.0, 0.0]}]
        }"#;
        let network = Network::from_json(json).unwrap();
        assert!(!network.needs_randomization());
    }

    #[test]
    fn test_inconsistent_record_is_rejected() {
        for json in [
            r#"{"inputWidth": 0, "layers": [{"outputWidth": 1, "activation": "Linear"}]}"#,
            r#"{"inputWidth": 2, "layers": []}"#,
            r#"{"inputWidth": 2, "layers": [{"outputWidth": 0, "activation": "Linear"}]}"#,
            r#"{"inputWidth": 2, "layers": [{"outputWidth": 1, "activation": "Linear", "weights": [1.0]}]}"#,
            r#"{"inputWidth": 2, "layers": [{"outputWidth": 1, "activation": "Softplus"}]}"#,
            r#"{"inputWidth": 2"#,
            r#"{"inputWidth": 4294967296, "layers": [{"outputWidth": 4294967296, "activation": "Linear"}]}"#,
            r#"{"inputWidth": 18446744073709551615, "layers": [{"outputWidth": 2, "activation": "Linear", "weights": [1.0]}]}"#,
            r#"{"inputWidth": 65536, "layers": [{"outputWidth": 65536, "activation": "Linear"}]}"#,
        ] {
            assert!(
                matches!(Network::from_json(json), Err(NNError::ModelLoadError(_))),
                "{}",
                json
            );
        }
    }

    #[test]
    fn test_oversized_binary_record_is_rejected() {
        let record = NetworkRecord {
            input_width: usize::MAX,
            layers: vec![LayerRecord {
                output_width: 3,
                activation: Activation::Linear,
                weights: None,
            }],
        };
        let bytes = bincode::serialize(&record).unwrap();
        assert!(matches!(
            Network::deserialize(&bytes),
            Err(NNError::ModelLoadError(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path("model.json"), Format::Json);
        assert_eq!(Format::from_path("model.JSON"), Format::Json);
        assert_eq!(Format::from_path("model.bin"), Format::Binary);
        assert_eq!(Format::from_path("model"), Format::Binary);
    }
}
