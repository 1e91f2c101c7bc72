//! Standard scaling with training-time statistics

use serde::{Deserialize, Serialize};

/// Standard deviations at or below this are treated as 1.0
pub const STD_EPSILON: f64 = 1e-12;

/// Fitted z-score scaler for a single column: `(x - center) / scale`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    center: f64,
    scale: f64,
}

impl StandardScaler {
    /// Build from training mean and standard deviation.
    ///
    /// A degenerate (`<= STD_EPSILON`) or non-finite std falls back to 1.0 so
    /// scaling never produces `NaN`/`Inf`.
    pub fn new(mean: f64, std: f64) -> Self {
        let scale = if std.is_finite() && std > STD_EPSILON {
            std
        } else {
            1.0
        };
        Self {
            center: if mean.is_finite() { mean } else { 0.0 },
            scale,
        }
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.center) / self.scale
    }

    #[inline]
    pub fn inverse_transform(&self, value: f64) -> f64 {
        value * self.scale + self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaling() {
        let scaler = StandardScaler::new(10.0, 2.0);
        assert!((scaler.transform(14.0) - 2.0).abs() < 1e-12);
        assert!((scaler.transform(10.0)).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_std_is_finite() {
        for std in [0.0, 1e-15, -3.0, f64::NAN, f64::INFINITY] {
            let scaler = StandardScaler::new(5.0, std);
            let v = scaler.transform(7.0);
            assert!(v.is_finite(), "std={} produced {}", std, v);
            assert_eq!(scaler.scale(), 1.0);
        }
    }

    #[test]
    fn test_inverse_transform() {
        let scaler = StandardScaler::new(3271.0, 2822.7);
        let x = 5000.0;
        let restored = scaler.inverse_transform(scaler.transform(x));
        assert!((restored - x).abs() < 1e-9);
    }
}
