use crate::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Clamp applied to predictions before taking logarithms.
const EPSILON: f64 = 1e-15;

/// Loss used to drive backpropagation. The set is closed; each variant is a
/// pair of pure functions over a predicted batch and a target batch.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorFunction {
    /// `0.5 * sum((p - t)^2)`
    #[default]
    QuadraticCost,
    /// `-sum(t ln p + (1 - t) ln(1 - p))`, for outputs in (0, 1).
    CrossEntropy,
}

impl ErrorFunction {
    pub fn loss(&self, y_hat: &Array2<f64>, y: &Array2<f64>) -> f64 {
        match self {
            Self::QuadraticCost => 0.5 * (y_hat - y).mapv(|d| d * d).sum(),
            Self::CrossEntropy => {
                let y_hat_safe = y_hat.mapv(clamp_probability);
                -(y * &y_hat_safe.mapv(f64::ln)
                    + (1.0 - y) * &y_hat_safe.mapv(|p| (1.0 - p).ln()))
                .sum()
            }
        }
    }

    /// Gradient of `loss` with respect to `y_hat`, same shape as `y_hat`.
    pub fn gradient(&self, y_hat: &Array2<f64>, y: &Array2<f64>) -> Array2<f64> {
        match self {
            Self::QuadraticCost => y_hat - y,
            Self::CrossEntropy => {
                let y_hat_safe = y_hat.mapv(clamp_probability);
                -((y / &y_hat_safe) - ((1.0 - y) / (1.0 - &y_hat_safe)))
            }
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            Self::QuadraticCost => "QUADRATIC_COST",
            Self::CrossEntropy => "CROSS_ENTROPY",
        }
    }
}

fn clamp_probability(p: f64) -> f64 {
    p.max(EPSILON).min(1.0 - EPSILON)
}

impl fmt::Display for ErrorFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for ErrorFunction {
    type Err = NNError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QUADRATIC_COST" => Ok(Self::QuadraticCost),
            "CROSS_ENTROPY" => Ok(Self::CrossEntropy),
            other => Err(NNError::InvalidConfiguration(format!(
                "unknown error function {:?}",
                other
            ))),
        }
    }
}

/// Computes the loss and its gradient, rejecting mismatched batches.
pub fn criteria(
    y_hat: &Array2<f64>,
    y: &Array2<f64>,
    error: ErrorFunction,
) -> Result<(f64, Array2<f64>)> {
    if y_hat.shape() != y.shape() {
        return Err(NNError::InvalidOutputShape(format!(
            "Prediction shape {:?} doesn't match target shape {:?}",
            y_hat.shape(),
            y.shape()
        )));
    }
    Ok((error.loss(y_hat, y), error.gradient(y_hat, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_gradient_matches_finite_difference(error: ErrorFunction, p: &Array2<f64>, t: &Array2<f64>) {
        let h = 1e-6;
        let analytic = error.gradient(p, t);
        for ((i, j), a) in analytic.indexed_iter() {
            let mut plus = p.clone();
            plus[[i, j]] += h;
            let mut minus = p.clone();
            minus[[i, j]] -= h;
            let numeric = (error.loss(&plus, t) - error.loss(&minus, t)) / (2.0 * h);
            assert!((a - numeric).abs() < 1e-5, "{}: {} vs {}", error, a, numeric);
        }
    }

    #[test]
    fn test_quadratic_cost_closed_form() {
        let p = array![[0.5, 2.0], [-1.0, 0.0]];
        let t = array![[1.0, 1.0], [1.0, 0.0]];
        let loss = ErrorFunction::QuadraticCost.loss(&p, &t);
        assert!((loss - 0.5 * (0.25 + 1.0 + 4.0)).abs() < 1e-12);
        assert_eq!(ErrorFunction::QuadraticCost.gradient(&p, &t), &p - &t);
    }

    #[test]
    fn test_quadratic_cost_gradient_finite_difference() {
        let p = array![[0.3, -1.2, 2.5], [0.0, 0.7, -0.4]];
        let t = array![[1.0, 0.0, 2.0], [0.5, 0.5, 0.5]];
        assert_gradient_matches_finite_difference(ErrorFunction::QuadraticCost, &p, &t);
    }

    #[test]
    fn test_cross_entropy_gradient_finite_difference() {
        let p = array![[0.2, 0.7], [0.9, 0.4]];
        let t = array![[0.0, 1.0], [1.0, 0.0]];
        assert_gradient_matches_finite_difference(ErrorFunction::CrossEntropy, &p, &t);
    }

    #[test]
    fn test_parse_identifiers() {
        assert_eq!("QUADRATIC_COST".parse::<ErrorFunction>().unwrap(), ErrorFunction::QuadraticCost);
        assert_eq!("cross_entropy".parse::<ErrorFunction>().unwrap(), ErrorFunction::CrossEntropy);
        assert!(matches!(
            "HINGE".parse::<ErrorFunction>(),
            Err(NNError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_criteria_rejects_shape_mismatch() {
        let p = array![[0.0, 1.0]];
        let t = array![[0.0]];
        assert!(matches!(
            criteria(&p, &t, ErrorFunction::QuadraticCost),
            Err(NNError::InvalidOutputShape(_))
        ));
    }
}
