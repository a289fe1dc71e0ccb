//! Temperature and nucleus (top-p) sampling over n-gram frequency tables.
//!
//! Sampling a next word takes four steps:
//!
//! 1. **Temperature**: raw counts become `count^(1/temperature)` and are
//!    normalized to probabilities. Temperature below 1 sharpens toward the
//!    mode, above 1 flattens, and exactly 1 keeps the count proportions.
//! 2. **Sort** candidates by probability, highest first.
//! 3. **Nucleus**: keep the shortest prefix whose cumulative probability
//!    reaches `top_p`. The top candidate is always kept.
//! 4. **Draw** one candidate from the renormalized nucleus with a uniform
//!    random number from the caller's RNG.
//!
//! The RNG is always supplied by the caller, so a seeded `SmallRng` gives fully
//! reproducible output.

use ngram_model::FrequencyTable;
use rand::Rng;

/// Temperatures are clamped to at least this value.
pub const MIN_TEMPERATURE: f64 = 0.01;

/// Sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampler {
    temperature: f64,
    top_p: f64,
}

impl Sampler {
    /// Create a sampler. Temperature is clamped to [`MIN_TEMPERATURE`] and
    /// `top_p` to `(0, 1]`; a non-finite or non-positive `top_p` means 1.
    pub fn new(temperature: f64, top_p: f64) -> Self {
        let temperature = if temperature.is_finite() {
            temperature.max(MIN_TEMPERATURE)
        } else {
            1.0
        };
        let top_p = if top_p.is_finite() && top_p > 0.0 {
            top_p.min(1.0)
        } else {
            1.0
        };
        Sampler { temperature, top_p }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn top_p(&self) -> f64 {
        self.top_p
    }

    /// Temperature-scaled probabilities in table order, summing to 1.
    pub fn distribution<'t>(&self, table: &'t FrequencyTable) -> Vec<(&'t str, f64)> {
        let max = table.iter().map(|(_, c)| c).max().unwrap_or(0);
        if max == 0 {
            return Vec::new();
        }

        // Dividing by the max count first keeps large counts from overflowing
        // when the exponent is big; it cancels out in the normalization.
        let exponent = 1.0 / self.temperature;
        let weights: Vec<(&str, f64)> = table
            .iter()
            .map(|(word, count)| (word, (count as f64 / max as f64).powf(exponent)))
            .collect();

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 || !total.is_finite() {
            return Vec::new();
        }
        weights.into_iter().map(|(w, p)| (w, p / total)).collect()
    }

    /// The nucleus: highest-probability candidates first, truncated at `top_p`
    /// cumulative mass and renormalized to sum to 1.
    pub fn nucleus<'t>(&self, table: &'t FrequencyTable) -> Vec<(&'t str, f64)> {
        let mut sorted = self.distribution(table);
        // Stable: equal probabilities keep table order.
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut cumulative = 0.0;
        let mut cut = sorted.len();
        for (i, (_, p)) in sorted.iter().enumerate() {
            cumulative += p;
            if cumulative >= self.top_p {
                cut = i + 1;
                break;
            }
        }
        sorted.truncate(cut);

        let mass: f64 = sorted.iter().map(|(_, p)| p).sum();
        if mass > 0.0 {
            for (_, p) in &mut sorted {
                *p /= mass;
            }
        }
        sorted
    }

    /// Draw the next word, or `None` for an empty table.
    pub fn sample<R: Rng>(&self, table: &FrequencyTable, rng: &mut R) -> Option<String> {
        if table.len() == 1 {
            return table.iter().next().map(|(w, _)| w.to_string());
        }

        let nucleus = self.nucleus(table);
        let (last, _) = *nucleus.last()?;

        let draw: f64 = rng.random::<f64>();
        let mut cumulative = 0.0;
        for &(word, p) in &nucleus {
            cumulative += p;
            if draw < cumulative {
                return Some(word.to_string());
            }
        }
        // Rounding can leave the cumulative sum a hair under 1.
        Some(last.to_string())
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Sampler::new(1.0, 1.0)
    }
}
