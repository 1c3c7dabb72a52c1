//! The layout entry point.

use crate::{
    condense::NATURAL_RATIO,
    config::{ConfigError, LayoutConfig, SegmentStyle},
    justify::{justify_lines, justify_single, LineInstruction, SegmentInstruction},
    oracle::MeasurementOracle,
    text::{normalize, split_material, tokenize_paragraphs},
    tier::{select_tier_with, TierAttempt},
};

/// A block of text to lay out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutRequest {
    pub text: String,
    /// Material line drawn above the body.
    pub header: Option<String>,
    /// Flavor-condition line drawn below the body.
    pub footer: Option<String>,
}

impl LayoutRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            header: None,
            footer: None,
        }
    }

    /// Takes a leading `[material]` bracket, if any, as the header.
    pub fn with_material_bracket(text: &str) -> Self {
        let (material, body) = split_material(text);
        Self {
            text: body.to_owned(),
            header: material.map(str::to_owned),
            footer: None,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// Draw instructions for a laid out block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub tier_index: usize,
    pub condensation_ratio: u16,
    pub lines: Vec<LineInstruction>,
    pub header: Option<SegmentInstruction>,
    pub footer: Option<SegmentInstruction>,
    /// Every tier tried, in order. The last one was accepted.
    pub attempts: Vec<TierAttempt>,
}

impl LayoutResult {
    /// A result that draws nothing.
    pub fn empty() -> Self {
        Self {
            tier_index: 0,
            condensation_ratio: NATURAL_RATIO as u16,
            lines: Vec::new(),
            header: None,
            footer: None,
            attempts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.header.is_none() && self.footer.is_none()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LayoutState {
    Idle,
    SearchingTier(usize),
    LayingOut,
    Done,
}

impl LayoutState {
    fn enter(&mut self, next: LayoutState) {
        log::trace!("Layout {:?} -> {:?}", self, next);
        *self = next;
    }
}

/// Lays out text according to a validated [`LayoutConfig`].
///
/// A `Layouter` is immutable; one instance may serve any number of
/// requests, including from several threads at once.
#[derive(Debug, Clone)]
pub struct Layouter {
    config: LayoutConfig,
}

impl Layouter {
    pub fn new(config: LayoutConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn layout<O>(&self, request: &LayoutRequest, oracle: &O) -> LayoutResult
    where
        O: MeasurementOracle + ?Sized,
    {
        let mut state = LayoutState::Idle;

        let header = single_line(
            request.header.as_deref(),
            self.config.header.as_ref(),
            oracle,
        );
        let footer = single_line(
            request.footer.as_deref(),
            self.config.footer.as_ref(),
            oracle,
        );

        let text = normalize(&request.text);
        if text.trim().is_empty() {
            state.enter(LayoutState::Done);
            return LayoutResult {
                header,
                footer,
                ..LayoutResult::empty()
            };
        }

        let additional_line_count = header.iter().count() + footer.iter().count();
        let paragraphs = tokenize_paragraphs(&text, &self.config.specials);

        let selection = select_tier_with(
            &paragraphs,
            &self.config.tiers,
            &self.config.regions,
            &self.config.tolerance,
            additional_line_count,
            oracle,
            |index| state.enter(LayoutState::SearchingTier(index)),
        );
        let selection = match selection {
            Some(selection) => selection,
            None => {
                state.enter(LayoutState::Done);
                return LayoutResult::empty();
            }
        };

        state.enter(LayoutState::LayingOut);
        let tier = &self.config.tiers[selection.tier_index];
        let region = self.config.regions[selection.tier_index];
        let lines = justify_lines(&selection.lines, tier, region, selection.ratio);

        log::debug!(
            "Laid out {} lines with tier {} at ratio {}",
            lines.len(),
            selection.tier_index,
            selection.ratio
        );
        state.enter(LayoutState::Done);

        LayoutResult {
            tier_index: selection.tier_index,
            condensation_ratio: selection.ratio,
            lines,
            header,
            footer,
            attempts: selection.attempts,
        }
    }
}

/// Validates `config` and lays out `text` in one call.
///
/// Prefer a [`Layouter`] when the same configuration serves many requests.
pub fn layout<O>(
    text: &str,
    config: &LayoutConfig,
    oracle: &O,
) -> Result<LayoutResult, ConfigError>
where
    O: MeasurementOracle + ?Sized,
{
    config.validate()?;
    let layouter = Layouter {
        config: config.clone(),
    };
    Ok(layouter.layout(&LayoutRequest::new(text), oracle))
}

fn single_line<O>(
    text: Option<&str>,
    style: Option<&SegmentStyle>,
    oracle: &O,
) -> Option<SegmentInstruction>
where
    O: MeasurementOracle + ?Sized,
{
    let text = normalize(text?);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match style {
        Some(style) => Some(justify_single(text, style, oracle)),
        None => {
            log::warn!("Ignoring '{}': no style is configured for it", text);
            None
        }
    }
}
