//! Learning configuration supplied by the caller before training starts.

use crate::prelude::*;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearningConfiguration {
    /// Number of full passes over the training set.
    pub epochs: i32,
    /// Gradient step size.
    pub rate: f64,
    /// Weight shrinkage applied on every update.
    pub decay: f64,
    /// Examples per batch; 0 uses the whole dataset as one batch.
    pub batch_size: i32,
    pub error_name: ErrorFunction,
}

impl Default for LearningConfiguration {
    fn default() -> Self {
        Self {
            epochs: 1000,
            rate: 0.001,
            decay: 0.0,
            batch_size: 1,
            error_name: ErrorFunction::QuadraticCost,
        }
    }
}

impl LearningConfiguration {
    pub fn with_epochs(mut self, epochs: i32) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_batch_size(mut self, batch_size: i32) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_error(mut self, error_name: ErrorFunction) -> Self {
        self.error_name = error_name;
        self
    }

    /// Parses a JSON object with `epochs`, `rate`, `decay`, `batchSize` and
    /// `errorName` keys. Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PartialConfiguration = serde_json::from_str(json)
            .map_err(|e| NNError::InvalidConfiguration(e.to_string()))?;
        let config = config.resolve()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs <= 0 {
            return Err(NNError::InvalidConfiguration(format!(
                "epochs must be positive, got {}",
                self.epochs
            )));
        }
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return Err(NNError::InvalidConfiguration(format!(
                "rate must be a positive number, got {}",
                self.rate
            )));
        }
        if !(self.decay.is_finite() && self.decay >= 0.0) {
            return Err(NNError::InvalidConfiguration(format!(
                "decay must be non-negative, got {}",
                self.decay
            )));
        }
        if self.batch_size < 0 {
            return Err(NNError::InvalidConfiguration(format!(
                "batchSize must be non-negative, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }

    /// Number of examples per batch for a dataset of `len` datapoints.
    pub fn effective_batch_size(&self, len: usize) -> usize {
        match self.batch_size {
            0 => len,
            n => n.max(0) as usize,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PartialConfiguration {
    epochs: Option<i32>,
    rate: Option<f64>,
    decay: Option<f64>,
    batch_size: Option<i32>,
    error_name: Option<String>,
}

impl PartialConfiguration {
    fn resolve(self) -> Result<LearningConfiguration> {
        let defaults = LearningConfiguration::default();
        Ok(LearningConfiguration {
            epochs: self.epochs.unwrap_or(defaults.epochs),
            rate: self.rate.unwrap_or(defaults.rate),
            decay: self.decay.unwrap_or(defaults.decay),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            error_name: match self.error_name {
                Some(name) => name.parse()?,
                None => defaults.error_name,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LearningConfiguration::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_fields() {
        let base = LearningConfiguration::default();
        for config in [
            base.with_epochs(0),
            base.with_epochs(-3),
            base.with_rate(0.0),
            base.with_rate(-0.1),
            base.with_rate(f64::NAN),
            base.with_decay(-1.0),
            base.with_batch_size(-1),
        ] {
            assert!(
                matches!(config.validate(), Err(NNError::InvalidConfiguration(_))),
                "{:?}",
                config
            );
        }
    }

    #[test]
    fn test_from_json() {
        let config = LearningConfiguration::from_json(
            r#"{"epochs": 20, "rate": 0.5, "batchSize": 0, "errorName": "CROSS_ENTROPY"}"#,
        )
        .unwrap();
        assert_eq!(config.epochs, 20);
        assert_eq!(config.rate, 0.5);
        assert_eq!(config.decay, 0.0);
        assert_eq!(config.batch_size, 0);
        assert_eq!(config.error_name, ErrorFunction::CrossEntropy);
    }

    #[test]
    fn test_from_json_rejects_unknown_error_name() {
        let result = LearningConfiguration::from_json(r#"{"errorName": "ABSOLUTE"}"#);
        assert!(matches!(result, Err(NNError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_from_json_rejects_negative_batch_size() {
        let result = LearningConfiguration::from_json(r#"{"batchSize": -2}"#);
        assert!(matches!(result, Err(NNError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_effective_batch_size() {
        let config = LearningConfiguration::default();
        assert_eq!(config.with_batch_size(0).effective_batch_size(10), 10);
        assert_eq!(config.with_batch_size(3).effective_batch_size(10), 3);
    }
}
