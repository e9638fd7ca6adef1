//! Utilities for working with probabilities and numeric slices.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);
    fn softmax(&mut self);
    fn mean(&self) -> f64;
    fn stdev(&self) -> Option<f64>;
    fn quantile(&self, q: f64) -> Option<f64>;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        self.scale(target / sum);
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }

    /// Replaces each score with its softmax probability. The maximum is subtracted before
    /// exponentiating, so large scores do not overflow.
    fn softmax(&mut self) {
        if self.is_empty() {
            return;
        }
        let max = self.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for element in &mut *self {
            *element = (*element - max).exp();
        }
        self.normalise(1.0);
    }

    fn mean(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.sum() / self.len() as f64
        }
    }

    /// Sample standard deviation. Undefined for fewer than two values.
    fn stdev(&self) -> Option<f64> {
        if self.len() < 2 {
            return None;
        }
        let mean = self.mean();
        let sq_dev: f64 = self.iter().map(|value| (value - mean).powi(2)).sum();
        Some((sq_dev / (self.len() - 1) as f64).sqrt())
    }

    /// Linearly interpolated quantile, `q` in \[0, 1]. The slice need not be sorted.
    fn quantile(&self, q: f64) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let mut sorted = self.to_vec();
        sorted.sort_by(f64::total_cmp);
        let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
        let lower = pos.floor() as usize;
        let upper = pos.ceil() as usize;
        let frac = pos - lower as f64;
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
    }
}

/// Log-odds of a probability.
#[inline]
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}
