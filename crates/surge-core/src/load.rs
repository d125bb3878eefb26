//! Synthetic CPU load.
//!
//! [`run_load`] burns a predictable amount of CPU on the calling thread so that
//! an external autoscaler has something to react to. It touches no shared
//! state and its result is a pure function of the iteration count.

use std::hint::black_box;

use serde::Serialize;

/// Result of one load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    /// Sum of `0..iterations`, wrapping on overflow.
    pub result: u64,
    pub iterations: u64,
}

/// Accumulates `0 + 1 + ... + (iterations - 1)` one step at a time.
///
/// `black_box` keeps the optimizer from folding the loop into the closed form,
/// which would defeat the point.
///
/// # Examples
///
/// ```
/// use surge_core::run_load;
///
/// let outcome = run_load(10);
/// assert_eq!(outcome.result, 45);
/// assert_eq!(outcome.iterations, 10);
/// ```
pub fn run_load(iterations: u64) -> LoadOutcome {
    let mut result: u64 = 0;
    for i in 0..iterations {
        result = result.wrapping_add(black_box(i));
    }

    LoadOutcome { result, iterations }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed form of the same sum, wrapped like the loop.
    fn expected_result(iterations: u64) -> u64 {
        if iterations == 0 {
            return 0;
        }
        let n = iterations as u128;
        ((n * (n - 1) / 2) % (u64::MAX as u128 + 1)) as u64
    }

    #[test]
    fn test_zero_iterations() {
        assert_eq!(
            run_load(0),
            LoadOutcome {
                result: 0,
                iterations: 0
            }
        );
    }

    #[test]
    fn test_small_counts_match_closed_form() {
        for n in [1, 2, 3, 10, 1_000, 65_537] {
            assert_eq!(run_load(n).result, expected_result(n), "n = {n}");
        }
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        assert_eq!(run_load(12_345), run_load(12_345));
    }
}
