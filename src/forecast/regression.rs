/// Ordinary least-squares fit of `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    /// Fits the pairs `(xs[i], ys[i])`. Returns `None` for empty or
    /// mismatched input. When every `x` is identical the slope is zero
    /// and the intercept is the mean of `y`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return None;
        }

        let x_mean = mean(xs);
        let y_mean = mean(ys);

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - x_mean;
            sxx += dx * dx;
            sxy += dx * (y - y_mean);
        }

        let slope = if sxx <= f64::EPSILON { 0.0 } else { sxy / sxx };
        Some(Self {
            intercept: y_mean - slope * x_mean,
            slope,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Coefficient of determination over the given data.
    ///
    /// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
    pub fn r_squared(&self, xs: &[f64], ys: &[f64]) -> f64 {
        if ys.is_empty() {
            return 0.0;
        }
        let y_mean = mean(ys);
        let ss_res: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (y - self.predict(*x)).powi(2))
            .sum();
        let ss_tot: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();

        if ss_tot <= f64::EPSILON {
            if ss_res <= f64::EPSILON {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        }
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn recovers_an_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert!(close(fit.slope, 2.0));
        assert!(close(fit.intercept, 1.0));
        assert!(close(fit.predict(10.0), 21.0));
        assert!(close(fit.r_squared(&xs, &ys), 1.0));
    }

    #[test]
    fn noisy_data_scores_below_one() {
        let xs = [0.0, 2.0, 5.0];
        let ys = [5.0, 3.0, 2.0];
        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert!(close(fit.slope, -11.0 / 19.0));
        let score = fit.r_squared(&xs, &ys);
        assert!(score > 0.8 && score < 1.0);
    }

    #[test]
    fn identical_x_falls_back_to_the_mean() {
        let xs = [4.0, 4.0];
        let ys = [2.0, 6.0];
        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert!(close(fit.intercept, 4.0));
        assert!(close(fit.predict(100.0), 4.0));
    }

    #[test]
    fn constant_target_scores() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [3.0, 3.0, 3.0];
        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert_eq!(fit.r_squared(&xs, &ys), 1.0);

        let off = LinearFit { intercept: 1.0, slope: 0.0 };
        assert_eq!(off.r_squared(&xs, &ys), 0.0);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(LinearFit::fit(&[], &[]).is_none());
        assert!(LinearFit::fit(&[1.0], &[1.0, 2.0]).is_none());
    }
}
