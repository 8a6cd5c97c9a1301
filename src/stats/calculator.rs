//! Statistics Calculator Module
//! Least-squares line fitting and Pearson correlation for trend overlays.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Keeps the t statistic finite when |r| == 1.
const TINY: f64 = 1.0e-20;

/// Result of an ordinary least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
    /// Two-sided p-value for a zero slope.
    pub p_value: f64,
    /// Standard error of the slope.
    pub std_err: f64,
    /// Number of (x, y) pairs used.
    pub count: usize,
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Sums of squares and cross products about the means: (ssxm, ssym, ssxym).
    fn sums_of_squares(xs: &[f64], ys: &[f64]) -> (f64, f64, f64) {
        let mean_x = Self::mean(xs);
        let mean_y = Self::mean(ys);

        xs.iter()
            .zip(ys.iter())
            .fold((0.0, 0.0, 0.0), |(sxx, syy, sxy), (&x, &y)| {
                let dx = x - mean_x;
                let dy = y - mean_y;
                (sxx + dx * dx, syy + dy * dy, sxy + dx * dy)
            })
    }

    /// Pearson correlation coefficient of paired samples.
    ///
    /// Returns `None` for fewer than two pairs or mismatched lengths. A
    /// constant sample has no defined correlation and yields `0.0`.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }

        let (ssxm, ssym, ssxym) = Self::sums_of_squares(xs, ys);
        if ssxm == 0.0 || ssym == 0.0 {
            return Some(0.0);
        }

        Some((ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0))
    }

    /// Fit a least-squares line through paired samples.
    ///
    /// Returns `None` when there are fewer than two pairs or every x is the
    /// same, since no line can be fitted.
    pub fn linear_regression(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }

        let n = xs.len();
        let (ssxm, ssym, ssxym) = Self::sums_of_squares(xs, ys);
        if ssxm == 0.0 {
            return None;
        }

        let slope = ssxym / ssxm;
        let intercept = Self::mean(ys) - slope * Self::mean(xs);
        let r_value = Self::pearson(xs, ys)?;

        let (p_value, std_err) = if n == 2 {
            // Two points always fit exactly.
            (0.0, 0.0)
        } else {
            let df = (n - 2) as f64;
            let t = r_value * (df / ((1.0 - r_value + TINY) * (1.0 + r_value + TINY))).sqrt();
            let p_value = match StudentsT::new(0.0, 1.0, df) {
                Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
                Err(_) => f64::NAN,
            };
            let std_err = ((1.0 - r_value * r_value).max(0.0) * ssym / ssxm / df).sqrt();
            (p_value, std_err)
        };

        Some(LinearFit {
            slope,
            intercept,
            r_value,
            p_value,
            std_err,
            count: n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn perfect_line_fits_exactly() {
        let fit =
            StatsCalculator::linear_regression(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0])
                .unwrap();

        assert!(approx(fit.slope, 2.0));
        assert!(approx(fit.intercept, 0.0));
        assert!(approx(fit.r_value, 1.0));
        assert!(fit.p_value < 1e-6);
        assert!(approx(fit.std_err, 0.0));
        assert_eq!(fit.count, 4);
    }

    #[test]
    fn negative_slope_has_negative_correlation() {
        let fit =
            StatsCalculator::linear_regression(&[0.0, 1.0, 2.0, 3.0], &[10.0, 7.0, 5.0, 1.0])
                .unwrap();

        assert!(fit.slope < 0.0);
        assert!(fit.r_value < -0.9 && fit.r_value >= -1.0);
        assert!(fit.p_value > 0.0 && fit.p_value < 0.05);
        assert!(fit.std_err > 0.0);
    }

    #[test]
    fn two_points_have_zero_error() {
        let fit = StatsCalculator::linear_regression(&[1.0, 3.0], &[5.0, 1.0]).unwrap();

        assert!(approx(fit.slope, -2.0));
        assert!(approx(fit.intercept, 7.0));
        assert!(approx(fit.r_value, -1.0));
        assert_eq!(fit.p_value, 0.0);
        assert_eq!(fit.std_err, 0.0);
    }

    #[test]
    fn too_few_or_degenerate_inputs_have_no_fit() {
        assert!(StatsCalculator::linear_regression(&[1.0], &[2.0]).is_none());
        assert!(StatsCalculator::linear_regression(&[], &[]).is_none());
        assert!(StatsCalculator::linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(StatsCalculator::linear_regression(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn flat_y_has_zero_correlation() {
        let fit =
            StatsCalculator::linear_regression(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();

        assert!(approx(fit.slope, 0.0));
        assert!(approx(fit.intercept, 4.0));
        assert_eq!(fit.r_value, 0.0);
    }

    #[test]
    fn pearson_matches_known_value() {
        // r for (1,1), (2,3), (3,2) is 0.5
        let r = StatsCalculator::pearson(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]).unwrap();
        assert!(approx(r, 0.5));
        assert!(StatsCalculator::pearson(&[1.0], &[1.0]).is_none());
    }
}
