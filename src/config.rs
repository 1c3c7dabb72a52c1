//! Layout configuration.
//!
//! Everything here is plain data supplied by the host. It derives
//! `serde` traits so hosts may keep tier tables in their own files, but
//! this crate never reads files itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    condense::NATURAL_RATIO,
    font::{FontConfig, FontTier},
    rect::Region,
    text::SpecialCharacters,
};

/// Minimum acceptable condensation ratio, keyed by paragraph count.
///
/// Paragraph counts above the largest key use the largest key's value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToleranceTable(BTreeMap<usize, u16>);

impl ToleranceTable {
    pub fn new(buckets: impl IntoIterator<Item = (usize, u16)>) -> Self {
        Self(buckets.into_iter().collect())
    }

    /// Accepts any ratio.
    pub fn permissive() -> Self {
        Self::new([(1, 0)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The minimum ratio for text with `paragraphs` paragraphs.
    pub fn minimum_ratio(&self, paragraphs: usize) -> i32 {
        self.0
            .get(&paragraphs)
            .or_else(|| self.0.values().next_back())
            .map_or(0, |&ratio| i32::from(ratio))
    }

    fn buckets(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }
}

/// Font and box of an optional single-line header or footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStyle {
    pub font: FontConfig,
    pub region: Region,
}

/// Everything a [`Layouter`](crate::Layouter) needs besides the text and
/// the measurement oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Font tiers, largest first.
    pub tiers: Vec<FontTier>,
    /// One region per tier.
    pub regions: Vec<Region>,
    pub tolerance: ToleranceTable,
    #[serde(default)]
    pub specials: SpecialCharacters,
    /// Style of the material line drawn above the body.
    #[serde(default)]
    pub header: Option<SegmentStyle>,
    /// Style of the flavor-condition line drawn below the body.
    #[serde(default)]
    pub footer: Option<SegmentStyle>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("the tier table is empty")]
    NoTiers,
    #[error("{tiers} tiers were configured but {regions} regions")]
    RegionCountMismatch { tiers: usize, regions: usize },
    #[error("the tolerance table is empty")]
    EmptyToleranceTable,
    #[error("tolerance {ratio} for {paragraphs} paragraphs is above {max}", max = NATURAL_RATIO)]
    ToleranceOutOfRange { paragraphs: usize, ratio: u16 },
    #[error("tier {index} has a non-positive {field}")]
    InvalidTier { index: usize, field: &'static str },
    #[error("{what} has a non-positive width")]
    InvalidRegion { what: String },
}

impl LayoutConfig {
    pub fn new(tiers: Vec<FontTier>, regions: Vec<Region>, tolerance: ToleranceTable) -> Self {
        Self {
            tiers,
            regions,
            tolerance,
            specials: SpecialCharacters::default(),
            header: None,
            footer: None,
        }
    }

    pub fn with_specials(mut self, specials: SpecialCharacters) -> Self {
        self.specials = specials;
        self
    }

    pub fn with_header(mut self, header: SegmentStyle) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: SegmentStyle) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Checks the configuration for programming errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        if self.tiers.len() != self.regions.len() {
            return Err(ConfigError::RegionCountMismatch {
                tiers: self.tiers.len(),
                regions: self.regions.len(),
            });
        }
        if self.tolerance.is_empty() {
            return Err(ConfigError::EmptyToleranceTable);
        }
        if let Some((paragraphs, ratio)) = self
            .tolerance
            .buckets()
            .find(|&(_, ratio)| i32::from(ratio) > NATURAL_RATIO)
        {
            return Err(ConfigError::ToleranceOutOfRange { paragraphs, ratio });
        }

        for (index, tier) in self.tiers.iter().enumerate() {
            let invalid = |field| ConfigError::InvalidTier { index, field };
            if !(tier.font.size > 0.) {
                return Err(invalid("font size"));
            }
            if !(tier.line_height > 0.) {
                return Err(invalid("line height"));
            }
            if tier.line_capacity == 0 {
                return Err(invalid("line capacity"));
            }
            if tier.overrides.values().any(|font| !(font.size > 0.)) {
                return Err(invalid("override font size"));
            }
        }

        for (index, region) in self.regions.iter().enumerate() {
            if !(region.width > 0.) {
                return Err(ConfigError::InvalidRegion {
                    what: format!("region {}", index),
                });
            }
        }
        for (what, segment) in [("header", &self.header), ("footer", &self.footer)] {
            if let Some(segment) = segment {
                if !(segment.region.width > 0.) {
                    return Err(ConfigError::InvalidRegion { what: what.into() });
                }
            }
        }

        Ok(())
    }
}

/// Tier tables for the standard card text boxes.
pub mod presets {
    use crate::{
        font::{FontConfig, FontTier, SymbolClass},
        rect::Region,
        text::SpecialCharacters,
    };

    use super::{LayoutConfig, SegmentStyle, ToleranceTable};

    pub const BODY_FAMILY: &str = "CardBody";
    pub const SYMBOL_FAMILY: &str = "CardSymbols";
    pub const TITLE_FAMILY: &str = "CardTitle";

    pub const EFFECT_BOX_WIDTH: f32 = 460.;

    fn effect_tier(size: f32, line_capacity: usize) -> FontTier {
        FontTier::new(FontConfig::new(BODY_FAMILY, size), size, line_capacity)
            .with_bullet_width(size * 0.8)
            .with_override(
                SymbolClass::Symbol,
                FontConfig::new(SYMBOL_FAMILY, size * 1.15),
            )
    }

    /// The card effect box. Two tiers with bullets, symbols, and an
    /// optional material header and flavor-condition footer.
    pub fn card_effect() -> LayoutConfig {
        LayoutConfig::new(
            vec![effect_tier(17., 6), effect_tier(14., 7)],
            vec![
                Region::new(33., 620., EFFECT_BOX_WIDTH),
                Region::new(33., 618., EFFECT_BOX_WIDTH),
            ],
            ToleranceTable::new([(1, 645), (2, 665), (3, 685)]),
        )
        .with_header(SegmentStyle {
            font: FontConfig::new(BODY_FAMILY, 15.),
            region: Region::new(33., 600., EFFECT_BOX_WIDTH),
        })
        .with_footer(SegmentStyle {
            font: FontConfig::new(BODY_FAMILY, 13.),
            region: Region::new(33., 742., EFFECT_BOX_WIDTH),
        })
    }

    /// The older effect box: the same tiers without bullet or symbol
    /// handling, and one tolerance for every paragraph count.
    pub fn legacy_card_effect() -> LayoutConfig {
        let tiers = [17., 14.]
            .iter()
            .zip([6, 7])
            .map(|(&size, capacity)| {
                FontTier::new(FontConfig::new(BODY_FAMILY, size), size, capacity)
            })
            .collect();
        LayoutConfig::new(
            tiers,
            vec![Region::new(33., 620., EFFECT_BOX_WIDTH); 2],
            ToleranceTable::new([(1, 650)]),
        )
        .with_specials(SpecialCharacters::none())
    }

    /// A single-line title. The title always condenses rather than wraps.
    pub fn card_title() -> LayoutConfig {
        LayoutConfig::new(
            vec![FontTier::new(FontConfig::new(TITLE_FAMILY, 32.), 32., 1)],
            vec![Region::new(32., 28., 420.)],
            ToleranceTable::permissive(),
        )
        .with_specials(SpecialCharacters::none())
    }
}
