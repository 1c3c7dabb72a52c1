//! Choosing a font tier and its condensation ratio.

use serde::{Deserialize, Serialize};

use crate::{
    condense::{converge, hypothetical_width, CondenseSearch, MIN_RATIO},
    config::ToleranceTable,
    font::FontTier,
    oracle::MeasurementOracle,
    rect::Region,
    text::{
        lines::{break_lines, count_lines, measure_paragraphs, Line},
        Token,
    },
};

/// Record of one tier tried during selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAttempt {
    pub tier_index: usize,
    pub ratio: u16,
    /// Body lines at `ratio`, not counting header and footer.
    pub line_count: usize,
    pub coarse_steps: u32,
    pub refinements: u32,
    pub accepted: bool,
}

/// The accepted tier, its ratio and the lines broken at that ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub tier_index: usize,
    pub ratio: u16,
    pub lines: Vec<Line>,
    pub attempts: Vec<TierAttempt>,
}

/// Tries each tier from largest to smallest and accepts the first one
/// whose condensation ratio meets the tolerance for the paragraph count.
///
/// The last tier is always accepted. `additional_line_count` is added to
/// the body line count of every candidate (one per header or footer line).
///
/// Returns `None` only if `tiers` or `regions` is empty.
pub fn select_tier<O>(
    paragraphs: &[Vec<Token>],
    tiers: &[FontTier],
    regions: &[Region],
    tolerance: &ToleranceTable,
    additional_line_count: usize,
    oracle: &O,
) -> Option<Selection>
where
    O: MeasurementOracle + ?Sized,
{
    select_tier_with(
        paragraphs,
        tiers,
        regions,
        tolerance,
        additional_line_count,
        oracle,
        |_| {},
    )
}

/// Like [`select_tier`], calling `on_attempt` with the index of each tier
/// before it is tried.
pub fn select_tier_with<O>(
    paragraphs: &[Vec<Token>],
    tiers: &[FontTier],
    regions: &[Region],
    tolerance: &ToleranceTable,
    additional_line_count: usize,
    oracle: &O,
    mut on_attempt: impl FnMut(usize),
) -> Option<Selection>
where
    O: MeasurementOracle + ?Sized,
{
    let tier_count = tiers.len().min(regions.len());
    let minimum = tolerance.minimum_ratio(paragraphs.len());
    let mut attempts = Vec::with_capacity(tier_count);

    for (tier_index, (tier, region)) in tiers.iter().zip(regions).enumerate() {
        on_attempt(tier_index);
        let budget = paragraphs.len().max(tier.line_capacity);
        let measured = measure_paragraphs(paragraphs, tier, oracle);

        let mut search = CondenseSearch::default();
        let convergence = converge(&mut search, |ratio| {
            // Maximum compression always counts as fitting.
            ratio > MIN_RATIO
                && count_lines(&measured, hypothetical_width(region.width, ratio))
                    + additional_line_count
                    > budget
        });

        let ratio = convergence.ratio;
        let lines = break_lines(&measured, hypothetical_width(region.width, ratio));
        let is_last = tier_index + 1 == tier_count;
        let accepted = ratio >= minimum || is_last;

        log::debug!(
            "Tier {} ({}px): ratio {} over {} lines after {} steps, tolerance {}",
            tier_index,
            tier.font_size(),
            ratio,
            lines.len(),
            convergence.coarse_steps + convergence.refinements,
            minimum
        );

        attempts.push(TierAttempt {
            tier_index,
            ratio: ratio as u16,
            line_count: lines.len(),
            coarse_steps: convergence.coarse_steps,
            refinements: convergence.refinements,
            accepted,
        });

        if accepted {
            if ratio < minimum {
                log::warn!(
                    "No tier meets tolerance {}, using tier {} at ratio {}",
                    minimum,
                    tier_index,
                    ratio
                );
            }
            return Some(Selection {
                tier_index,
                ratio: ratio as u16,
                lines,
                attempts,
            });
        }
    }

    None
}
