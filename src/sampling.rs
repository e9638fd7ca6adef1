//! Seeded sampling primitives. Every draw goes through a caller-owned [Rand], so a fixed seed
//! fixes the sequence of draws.

use tinyrand::{Rand, RandRange};

/// Draws indices in proportion to a fixed set of non-negative weights.
#[derive(Debug, Clone)]
pub struct CategoricalSampler {
    cumulative: Vec<f64>,
    last_positive: usize,
}
impl CategoricalSampler {
    /// Returns `None` if the weights do not carry any positive, finite mass.
    pub fn new(weights: &[f64]) -> Option<Self> {
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut sum = 0.0;
        let mut last_positive = None;
        for (index, &weight) in weights.iter().enumerate() {
            if weight > 0.0 {
                sum += weight;
                last_positive = Some(index);
            }
            cumulative.push(sum);
        }
        if !sum.is_finite() {
            return None;
        }
        last_positive.map(|last_positive| Self {
            cumulative,
            last_positive,
        })
    }

    pub fn total(&self) -> f64 {
        self.cumulative[self.last_positive]
    }

    #[inline]
    pub fn sample(&self, rand: &mut impl Rand) -> usize {
        let random = random_f64(rand) * self.total();
        let index = self.cumulative.partition_point(|&cumulative| cumulative <= random);
        usize::min(index, self.last_positive)
    }

    /// A multinomial draw of `count` independent samples, in draw order.
    pub fn sample_many(&self, count: usize, rand: &mut impl Rand) -> Vec<usize> {
        (0..count).map(|_| self.sample(rand)).collect()
    }
}

/// Uniform index in `0..len`. `len` must be positive.
#[inline]
pub fn choose_uniform(len: usize, rand: &mut impl Rand) -> usize {
    debug_assert!(len > 0);
    rand.next_range(0..len)
}

/// Uniform choice of `count` distinct indices from `0..len`, in draw order (partial
/// Fisher-Yates).
pub fn choose_without_replacement(len: usize, count: usize, rand: &mut impl Rand) -> Vec<usize> {
    assert!(count <= len, "cannot choose {count} of {len}");
    let mut indices: Vec<_> = (0..len).collect();
    for drawn in 0..count {
        let pick = drawn + choose_uniform(len - drawn, rand);
        indices.swap(drawn, pick);
    }
    indices.truncate(count);
    indices
}

/// Uniform in \[0, 1) with 53 bits of precision.
#[inline]
pub fn random_f64(rand: &mut impl Rand) -> f64 {
    (rand.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}
