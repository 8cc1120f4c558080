/// Running mean and sample variance (Welford's algorithm).
///
/// Every statistic goes through this type, so missing values are handled
/// the same way everywhere.
///
/// Values are accumulated in the order they are added. Missing values are
/// skipped and never counted.
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    /// Sample standard deviation, `None` with fewer than 2 values.
    pub std_dev: Option<f64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn add_opt(&mut self, val: Option<f64>) {
        if let Some(val) = val {
            self.add(val);
        }
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: self.mean,
            std_dev: if self.n_vals > 1 {
                Some((self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt())
            } else {
                None
            },
        }
    }
}

impl FromIterator<Option<f64>> for Accumulator {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        let mut acc = Accumulator::new();
        for val in iter {
            acc.add_opt(val);
        }
        acc
    }
}

/// Round `val` to `decimals` decimal places, half away from zero.
pub fn round_to(val: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (val * scale).round() / scale
}
