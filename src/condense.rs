//! Condensation ratio search.
//!
//! Ratios live on a fixed-point scale where [`NATURAL_RATIO`] draws text
//! at its natural width and `0` is the most compressed value. The search
//! walks down in coarse steps of 100 until the text stops overflowing,
//! then backtracks and refines the step to 10 and finally 1. It is not a
//! binary search, but it always terminates and converges on the largest
//! ratio that still fits.

/// Ratio that renders text at its natural width.
pub const NATURAL_RATIO: i32 = 1000;
/// Most compressed ratio.
pub const MIN_RATIO: i32 = 0;

const INITIAL_MAGNITUDE: i32 = 100;
const MAX_ITERATIONS: i32 = 30;

/// Converts a fixed-point ratio to a horizontal scale factor.
pub fn scale_factor(ratio: i32) -> f32 {
    ratio as f32 / NATURAL_RATIO as f32
}

/// The width a line may occupy before the condensation `ratio` is applied.
///
/// Non-positive ratios give an infinite width.
pub fn hypothetical_width(width: f32, ratio: i32) -> f32 {
    if ratio <= 0 {
        f32::INFINITY
    } else {
        width / scale_factor(ratio)
    }
}

/// Where a [`CondenseSearch`] is in its coarse-to-fine progression.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    /// Stepping down by the initial magnitude.
    Coarse,
    /// Stepping by a refined magnitude (10, then 1).
    Refine { magnitude: i32 },
    /// The search has ended; `median` holds the result.
    Committed,
}

/// State of one condensation search.
///
/// A search is owned by a single tier attempt and is never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondenseSearch {
    min: i32,
    max: i32,
    median: i32,
    last_effective: i32,
    magnitude: i32,
    remaining: i32,
}

impl Default for CondenseSearch {
    fn default() -> Self {
        Self::new(MIN_RATIO, NATURAL_RATIO)
    }
}

impl CondenseSearch {
    pub fn new(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            median: max,
            last_effective: max,
            magnitude: INITIAL_MAGNITUDE,
            remaining: MAX_ITERATIONS,
        }
    }

    pub fn reset(&mut self, min: i32, max: i32) {
        *self = Self::new(min, max);
    }

    /// Moves toward a more compressed ratio by the current magnitude.
    ///
    /// Each call consumes one iteration.
    pub fn search_down(&mut self) -> i32 {
        self.median -= self.magnitude;
        self.remaining -= 1;
        self.median
    }

    /// Undoes the previous step and shrinks the step size by a decimal order.
    ///
    /// Once the step size is already 1, the search is finished instead and
    /// the median is returned unchanged.
    pub fn reverse_search(&mut self) -> i32 {
        if self.magnitude == 1 {
            self.finish();
            return self.median;
        }

        self.median += self.magnitude;
        self.magnitude /= 10;
        self.median -= self.magnitude;
        self.median.min(self.max)
    }

    pub fn finish(&mut self) {
        self.remaining = -1;
    }

    /// Records the current median as the best known fitting ratio.
    pub fn record_effective(&mut self) {
        self.last_effective = self.median;
    }

    pub fn set_last_effective(&mut self, value: i32) {
        self.last_effective = value;
    }

    pub fn last_effective(&self) -> i32 {
        self.last_effective
    }

    /// Commits the last known fitting ratio and ends the search.
    pub fn apply_last_effective(&mut self) {
        self.median = self.last_effective;
        self.finish();
    }

    /// Iterations left. `-1` once the search has ended.
    pub fn iterate_count(&self) -> i32 {
        self.remaining
    }

    pub fn median(&self) -> i32 {
        self.median
    }

    pub fn set_median(&mut self, value: i32) {
        self.median = value;
    }

    pub fn magnitude(&self) -> i32 {
        self.magnitude
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_finished(&self) -> bool {
        self.remaining < 0
    }

    pub fn phase(&self) -> SearchPhase {
        if self.is_finished() {
            SearchPhase::Committed
        } else if self.magnitude == INITIAL_MAGNITUDE {
            SearchPhase::Coarse
        } else {
            SearchPhase::Refine {
                magnitude: self.magnitude,
            }
        }
    }
}

/// Outcome of driving a [`CondenseSearch`] to completion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Convergence {
    /// The committed ratio, clamped to the search range.
    pub ratio: i32,
    /// Number of `search_down` calls.
    pub coarse_steps: u32,
    /// Number of `reverse_search` calls.
    pub refinements: u32,
}

/// Drives `search` until it commits a ratio.
///
/// `overflows` reports whether the text overflows its box at the given ratio.
/// If the text already fits at the maximum ratio the search ends without
/// stepping down at all.
pub fn converge(
    search: &mut CondenseSearch,
    mut overflows: impl FnMut(i32) -> bool,
) -> Convergence {
    let mut coarse_steps = 0;
    let mut refinements = 0;

    while search.iterate_count() >= 0 {
        if search.iterate_count() == 0 {
            log::trace!(
                "Iteration budget exhausted, committing ratio {}",
                search.last_effective()
            );
            search.apply_last_effective();
            break;
        }

        let median = search.median();
        if overflows(median) {
            search.search_down();
            coarse_steps += 1;
            log::trace!("Ratio {} overflows, stepping down to {}", median, search.median());
            continue;
        }

        if median >= search.max() {
            search.finish();
            break;
        }

        search.record_effective();
        search.reverse_search();
        refinements += 1;
        log::trace!("Ratio {} fits, refining from {}", median, search.median());
    }

    Convergence {
        ratio: search.last_effective().clamp(search.min(), search.max()),
        coarse_steps,
        refinements,
    }
}
