//! Font configuration and the static text-metrics oracle.
//!
//! Glyph metrics come from the `fontdue` crate. Text is not shaped and
//! kerning is not applied.

use std::collections::HashMap;

use ahash::{AHashMap, AHashSet};
use fontdue::FontSettings;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use smartstring::{LazyCompact, SmartString};

use crate::{oracle::MeasurementOracle, text::TokenKind};

const WIDTH_CACHE_CAPACITY: usize = 4096;

/// A font face, identified by family name, at a pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    pub family: SmartString<LazyCompact>,
    /// Font size in pixels.
    pub size: f32,
}

impl FontConfig {
    pub fn new(family: &str, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

/// Classes of tokens that may be drawn with a font other than
/// the tier's base font.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolClass {
    /// Large symbol glyphs, usually from a distinct family.
    Symbol,
    /// The bullet glyph.
    Bullet,
}

pub type SymbolOverrides = HashMap<SymbolClass, FontConfig, ahash::RandomState>;

/// One entry of a tier table.
///
/// Tiers are tried from largest to smallest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontTier {
    /// The base font. Its size is the tier's font size.
    pub font: FontConfig,
    pub line_height: f32,
    /// Maximum number of lines at this tier.
    pub line_capacity: usize,
    /// Fixed width of a bullet glyph. Bullets are never condensed.
    pub bullet_width: f32,
    #[serde(default)]
    pub overrides: SymbolOverrides,
}

impl FontTier {
    pub fn new(font: FontConfig, line_height: f32, line_capacity: usize) -> Self {
        Self {
            bullet_width: font.size,
            font,
            line_height,
            line_capacity,
            overrides: SymbolOverrides::default(),
        }
    }

    pub fn with_bullet_width(mut self, bullet_width: f32) -> Self {
        self.bullet_width = bullet_width;
        self
    }

    pub fn with_override(mut self, class: SymbolClass, font: FontConfig) -> Self {
        self.overrides.insert(class, font);
        self
    }

    pub fn font_size(&self) -> f32 {
        self.font.size
    }

    /// The font used to measure and draw a token of the given kind.
    pub fn font_for(&self, kind: TokenKind) -> &FontConfig {
        kind.symbol_class()
            .and_then(|class| self.overrides.get(&class))
            .unwrap_or(&self.font)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to parse font as TTF/OTF font data")]
pub struct MalformedFont;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WidthKey {
    family: SmartString<LazyCompact>,
    size_bits: u32,
    text: SmartString<LazyCompact>,
}

/// Static text-metrics oracle backed by parsed font files.
///
/// Widths are the sum of glyph advances at the configured pixel size.
/// Measurements are memoized; the cache never changes the result of a
/// measurement.
pub struct FontBook {
    fonts: AHashMap<SmartString<LazyCompact>, fontdue::Font>,
    default_family: Option<SmartString<LazyCompact>>,

    widths: Mutex<LruCache<WidthKey, f32>>,
    warned: Mutex<AHashSet<SmartString<LazyCompact>>>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self {
            fonts: AHashMap::new(),
            default_family: None,
            widths: Mutex::new(LruCache::new(WIDTH_CACHE_CAPACITY)),
            warned: Mutex::new(AHashSet::new()),
        }
    }

    /// Parses a font and registers it under `family`.
    pub fn add_font(&mut self, family: &str, data: &[u8]) -> Result<(), MalformedFont> {
        let font = fontdue::Font::from_bytes(data, FontSettings::default())
            .map_err(|_| MalformedFont)?;
        self.fonts.insert(family.into(), font);
        self.widths.get_mut().clear();
        log::info!("Loaded font '{}'", family);
        Ok(())
    }

    /// Sets the family used when a configuration names a family
    /// that was never loaded.
    pub fn set_default_family(&mut self, family: &str) {
        self.default_family = Some(family.into());
        self.widths.get_mut().clear();
    }

    pub fn contains(&self, family: &str) -> bool {
        self.fonts.contains_key(family)
    }

    fn resolve(&self, family: &str) -> Option<&fontdue::Font> {
        self.fonts.get(family).or_else(|| {
            self.default_family
                .as_ref()
                .and_then(|default| self.fonts.get(default.as_str()))
        })
    }

    fn warn_missing(&self, family: &str) {
        if self.warned.lock().insert(family.into()) {
            log::warn!("No font loaded for family '{}', measuring as zero width", family);
        }
    }
}

fn measure_with(font: &fontdue::Font, text: &str, px: f32) -> f32 {
    text.chars().map(|c| font.metrics(c, px).advance_width).sum()
}

impl MeasurementOracle for FontBook {
    fn measure(&self, text: &str, font: &FontConfig) -> f32 {
        if text.is_empty() {
            return 0.;
        }

        let face = match self.resolve(&font.family) {
            Some(face) => face,
            None => {
                self.warn_missing(&font.family);
                return 0.;
            }
        };

        let key = WidthKey {
            family: font.family.clone(),
            size_bits: font.size.to_bits(),
            text: text.into(),
        };
        if let Some(width) = self.widths.lock().get(&key) {
            return *width;
        }

        let width = measure_with(face, text, font.size);
        self.widths.lock().put(key, width);
        width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONO: &[u8] = include_bytes!("../testdata/DejaVuSansMono.ttf");

    fn book() -> FontBook {
        let mut book = FontBook::new();
        book.add_font("Mono", MONO).unwrap();
        book
    }

    fn tier() -> FontTier {
        FontTier::new(FontConfig::new("Body", 17.), 17., 6)
            .with_bullet_width(12.)
            .with_override(SymbolClass::Symbol, FontConfig::new("Symbols", 19.))
    }

    #[test]
    fn overrides_apply_per_class() {
        let tier = tier();
        assert_eq!(tier.font_for(TokenKind::Normal).family.as_str(), "Body");
        assert_eq!(tier.font_for(TokenKind::Space).family.as_str(), "Body");
        assert_eq!(tier.font_for(TokenKind::SpecialSymbol).family.as_str(), "Symbols");
        assert_eq!(tier.font_for(TokenKind::Bullet).family.as_str(), "Body");
    }

    #[test]
    fn tier_from_json() {
        let json = r#"{
            "font": { "family": "Body", "size": 14.0 },
            "line_height": 14.0,
            "line_capacity": 7,
            "bullet_width": 10.0,
            "overrides": { "Symbol": { "family": "Symbols", "size": 16.0 } }
        }"#;
        let tier: FontTier = serde_json::from_str(json).unwrap();
        assert_eq!(tier.line_capacity, 7);
        assert_eq!(tier.font_for(TokenKind::SpecialSymbol).size, 16.);
    }

    #[test]
    fn malformed_font_is_rejected() {
        let mut book = FontBook::new();
        assert!(book.add_font("Broken", b"definitely not a font").is_err());
        assert!(!book.contains("Broken"));
    }

    #[test]
    fn missing_family_measures_zero() {
        let book = FontBook::new();
        assert_eq!(book.measure("text", &FontConfig::new("Nowhere", 12.)), 0.);
        assert_eq!(book.measure("", &FontConfig::new("Nowhere", 12.)), 0.);
    }

    #[test]
    fn width_is_sum_of_glyph_advances() {
        let face = fontdue::Font::from_bytes(MONO, FontSettings::default()).unwrap();
        let text = "Draw 1 card.";
        let expected: f32 = text.chars().map(|c| face.metrics(c, 16.).advance_width).sum();
        assert!(expected > 0.);

        let book = book();
        let font = FontConfig::new("Mono", 16.);
        let width = book.measure(text, &font);
        assert!((width - expected).abs() < 1e-3);
        // Served from the cache the second time.
        assert_eq!(book.measure(text, &font), width);

        let glyph = book.measure("W", &font);
        assert!((width - glyph * 12.).abs() < 1e-2);
    }

    #[test]
    fn unknown_family_uses_default() {
        let mut book = book();
        let missing = FontConfig::new("Nowhere", 16.);
        assert_eq!(book.measure("card", &missing), 0.);

        book.set_default_family("Mono");
        assert_eq!(
            book.measure("card", &missing),
            book.measure("card", &FontConfig::new("Mono", 16.))
        );
    }
}
