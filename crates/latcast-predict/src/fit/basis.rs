//! Feature-vector construction for the normal-equation fits

use serde::{Deserialize, Serialize};

/// How a raw `[input, output, traffic]` point expands into regression features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureBasis {
    /// `[1, x1, x2, x3]`
    Linear3,
    /// `[1, x1, x2, x1², x2², x1·x2]`
    Quadratic2,
    /// `[1, x1, x2, x3, x1², x2², x3², x1·x2, x1·x3, x2·x3]`
    Quadratic3,
}

impl FeatureBasis {
    /// Number of coefficients the basis produces
    pub fn width(&self) -> usize {
        match self {
            FeatureBasis::Linear3 => 4,
            FeatureBasis::Quadratic2 => 6,
            FeatureBasis::Quadratic3 => 10,
        }
    }

    /// Expand a point into its design-matrix row
    pub fn expand(&self, point: &[f64; 3]) -> Vec<f64> {
        let [x1, x2, x3] = *point;
        match self {
            FeatureBasis::Linear3 => vec![1.0, x1, x2, x3],
            FeatureBasis::Quadratic2 => vec![1.0, x1, x2, x1 * x1, x2 * x2, x1 * x2],
            FeatureBasis::Quadratic3 => vec![
                1.0,
                x1,
                x2,
                x3,
                x1 * x1,
                x2 * x2,
                x3 * x3,
                x1 * x2,
                x1 * x3,
                x2 * x3,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_match_expansion() {
        for basis in [
            FeatureBasis::Linear3,
            FeatureBasis::Quadratic2,
            FeatureBasis::Quadratic3,
        ] {
            assert_eq!(basis.expand(&[2.0, 3.0, 5.0]).len(), basis.width());
        }
    }

    #[test]
    fn test_quadratic2_ignores_traffic() {
        assert_eq!(
            FeatureBasis::Quadratic2.expand(&[2.0, 3.0, 5.0]),
            vec![1.0, 2.0, 3.0, 4.0, 9.0, 6.0]
        );
    }

    #[test]
    fn test_quadratic3_terms() {
        assert_eq!(
            FeatureBasis::Quadratic3.expand(&[2.0, 3.0, 5.0]),
            vec![1.0, 2.0, 3.0, 5.0, 4.0, 9.0, 25.0, 6.0, 10.0, 15.0]
        );
    }
}
