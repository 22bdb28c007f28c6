//! Weighted random selection

use crate::EngineError;
use rand::Rng;

/// Draws one candidate with probability proportional to its weight
///
/// The random source is injected so tests can replay a fixed sequence.
/// Production code uses [`rand::rngs::StdRng`] seeded from OS entropy.
///
/// # Selection rule
///
/// - Total weight `T > 0`: draw an integer `r` uniformly from `[0, T)` and return
///   the first candidate, in input order, whose cumulative weight is `> r`.
///   Candidate `i` is returned with probability exactly `w_i / T`, and a
///   zero-weight candidate can never be returned.
/// - Total weight `0`: every candidate is equally likely.
pub struct WeightedSelector<R> {
    rng: R,
}

impl<R: Rng> WeightedSelector<R> {
    /// Create a selector drawing from the given random source
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Pick one candidate
    ///
    /// `weight_of` returns the weight of a candidate; candidates without a
    /// configured weight should report 0.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PreconditionViolation` if `candidates` is empty.
    /// Callers must check for an empty set first.
    pub fn select<'a, T, F>(&mut self, candidates: &'a [T], weight_of: F) -> Result<&'a T, EngineError>
    where
        F: Fn(&T) -> u32,
    {
        if candidates.is_empty() {
            return Err(EngineError::PreconditionViolation(
                "weighted selection called with no candidates".to_string(),
            ));
        }

        let total: u64 = candidates.iter().map(|c| u64::from(weight_of(c))).sum();

        if total == 0 {
            let index = self.rng.gen_range(0..candidates.len());
            return Ok(&candidates[index]);
        }

        let draw = self.rng.gen_range(0..total);
        let index = candidates
            .iter()
            .scan(0u64, |cumulative, c| {
                *cumulative += u64::from(weight_of(c));
                Some(*cumulative)
            })
            .position(|cumulative| cumulative > draw)
            // draw < total, so some prefix always exceeds it
            .unwrap_or(candidates.len() - 1);

        Ok(&candidates[index])
    }
}
