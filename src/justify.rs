//! Turning broken lines into positioned draw instructions.
//!
//! Every non-final line of a paragraph is stretched to the full width of
//! its region by widening the spaces between words. Glyphs of ordinary
//! text are condensed horizontally by the tier's ratio; bullets and large
//! symbols keep their natural proportions.

use glam::{vec2, Vec2};
use smartstring::{LazyCompact, SmartString};

use crate::{
    condense::scale_factor,
    config::SegmentStyle,
    font::{FontConfig, FontTier},
    oracle::MeasurementOracle,
    rect::Region,
    text::{
        lines::{Line, MeasuredToken},
        Token, TokenKind,
    },
};

/// A single token placed on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub token: Token,
    pub font: FontConfig,
    /// Offset from the line origin.
    pub x: f32,
    /// Horizontal space the segment occupies on the line.
    pub advance: f32,
    /// Width of the token at its natural scale.
    pub natural_width: f32,
    /// Horizontal glyph scale.
    pub scale_x: f32,
}

impl Segment {
    /// Offset from the line origin at which the glyphs start.
    ///
    /// Symbols are centered in their advance.
    pub fn glyph_x(&self) -> f32 {
        match self.token.kind {
            TokenKind::SpecialSymbol => {
                self.x + (self.advance - self.natural_width * self.scale_x) / 2.
            }
            _ => self.x,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineInstruction {
    pub origin: Vec2,
    /// Horizontal scale of condensed text on this line.
    pub scale: f32,
    /// Advance of each stretchable space.
    ///
    /// Final lines are not stretched; there it is the condensed natural
    /// width of the first stretchable space. Negative when fixed-width
    /// bullets leave less room than the rest of the line needs.
    pub space_width: f32,
    pub segments: Vec<Segment>,
    pub is_last_of_paragraph: bool,
}

impl LineInstruction {
    /// Sum of all segment advances.
    pub fn width(&self) -> f32 {
        self.segments.iter().map(|s| s.advance).sum()
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.token.text.as_str()).collect()
    }
}

/// A header or footer line, condensed independently of the body.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentInstruction {
    pub text: SmartString<LazyCompact>,
    pub font: FontConfig,
    pub origin: Vec2,
    pub natural_width: f32,
    /// `min(region width / natural width, 1)`.
    pub scale: f32,
}

fn follows_bullet(tokens: &[MeasuredToken], index: usize) -> bool {
    index > 0 && tokens[index - 1].kind() == TokenKind::Bullet
}

/// Fixed advance of a token, or `None` for a stretchable space.
fn fixed_advance(tokens: &[MeasuredToken], index: usize, scale: f32) -> Option<f32> {
    let token = &tokens[index];
    match token.kind() {
        TokenKind::Bullet => Some(token.width),
        TokenKind::Space if !follows_bullet(tokens, index) => None,
        _ => Some(token.width * scale),
    }
}

/// Lays out one line of body text at `ratio`.
///
/// `row` is the zero-based index of the line within the body.
pub fn justify_line(
    line: &Line,
    tier: &FontTier,
    region: Region,
    row: usize,
    ratio: u16,
) -> LineInstruction {
    let scale = scale_factor(i32::from(ratio)).min(1.);
    let tokens = &line.tokens;

    let (fixed_width, flexible) = (0..tokens.len()).fold((0., 0), |(width, count), i| {
        match fixed_advance(tokens, i, scale) {
            Some(advance) => (width + advance, count),
            None => (width, count + 1),
        }
    });

    let space_width = if line.is_last_of_paragraph {
        // Final lines keep their natural spacing.
        tokens
            .iter()
            .enumerate()
            .find(|&(i, t)| t.token.is_space() && !follows_bullet(tokens, i))
            .map_or(0., |(_, t)| t.width * scale)
    } else if flexible > 0 {
        (region.width - fixed_width) / flexible as f32
    } else {
        0.
    };

    let mut x = 0.;
    let segments = tokens
        .iter()
        .enumerate()
        .map(|(i, measured)| {
            let advance = match fixed_advance(tokens, i, scale) {
                Some(advance) => advance,
                None if line.is_last_of_paragraph => measured.width * scale,
                None => space_width,
            };
            let scale_x = if measured.kind().is_condensed() {
                scale
            } else {
                1.
            };
            let segment = Segment {
                token: measured.token.clone(),
                font: tier.font_for(measured.kind()).clone(),
                x,
                advance,
                natural_width: measured.width,
                scale_x,
            };
            x += advance;
            segment
        })
        .collect();

    LineInstruction {
        origin: vec2(region.left, region.top + row as f32 * tier.line_height),
        scale,
        space_width,
        segments,
        is_last_of_paragraph: line.is_last_of_paragraph,
    }
}

/// Lays out every line of the body.
pub fn justify_lines(
    lines: &[Line],
    tier: &FontTier,
    region: Region,
    ratio: u16,
) -> Vec<LineInstruction> {
    lines
        .iter()
        .enumerate()
        .map(|(row, line)| justify_line(line, tier, region, row, ratio))
        .collect()
}

/// Lays out a single header or footer line in its own box.
///
/// The line is condensed just enough to fit and never stretched.
pub fn justify_single<O>(text: &str, style: &SegmentStyle, oracle: &O) -> SegmentInstruction
where
    O: MeasurementOracle + ?Sized,
{
    let natural_width = oracle.measure(text, &style.font).max(0.);
    let scale = if natural_width > 0. {
        (style.region.width / natural_width).min(1.)
    } else {
        1.
    };

    SegmentInstruction {
        text: text.into(),
        font: style.font.clone(),
        origin: style.region.origin(),
        natural_width,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        condense::hypothetical_width,
        font::SymbolClass,
        oracle::tests::monospace,
        text::{
            lines::{break_lines, measure_paragraphs},
            tokenize_paragraphs, SpecialCharacters,
        },
    };

    use super::*;

    const EPSILON: f32 = 1e-3;

    // 10px characters, 15px bullets, 12px symbols.
    fn tier() -> FontTier {
        FontTier::new(FontConfig::new("Body", 20.), 20., 6)
            .with_bullet_width(15.)
            .with_override(SymbolClass::Symbol, FontConfig::new("Symbols", 24.))
    }

    fn region() -> Region {
        Region::new(30., 100., 200.)
    }

    fn layout(text: &str, ratio: u16) -> Vec<LineInstruction> {
        layout_with(text, ratio, &tier(), &monospace)
    }

    fn layout_with<O>(text: &str, ratio: u16, tier: &FontTier, oracle: &O) -> Vec<LineInstruction>
    where
        O: MeasurementOracle,
    {
        let paragraphs = tokenize_paragraphs(text, &SpecialCharacters::default());
        let measured = measure_paragraphs(&paragraphs, tier, oracle);
        let width = hypothetical_width(region().width, i32::from(ratio));
        let lines = break_lines(&measured, width);
        justify_lines(&lines, tier, region(), ratio)
    }

    #[test]
    fn non_final_lines_fill_the_region() {
        let lines = layout("aaa bb c dddd ee fff gg hhhh ii jjj", 800);
        assert!(lines.len() > 1);
        for line in &lines[..lines.len() - 1] {
            assert!((line.width() - 200.).abs() < EPSILON);
        }
    }

    #[test]
    fn final_line_keeps_natural_spacing() {
        let lines = layout("aa bb", 500);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.scale, 0.5);
        assert_eq!(line.space_width, 5.);
        assert!((line.width() - 25.).abs() < EPSILON);
    }

    #[test]
    fn ratio_above_natural_is_clamped() {
        let lines = justify_lines(
            &break_lines(
                &measure_paragraphs(
                    &tokenize_paragraphs("aa", &SpecialCharacters::default()),
                    &tier(),
                    &monospace,
                ),
                f32::INFINITY,
            ),
            &tier(),
            region(),
            1200,
        );
        assert_eq!(lines[0].scale, 1.);
    }

    #[test]
    fn lines_stack_by_line_height() {
        let lines = layout("aaaaaaaaaaaaaaa\nb\nc", 1000);
        let ys: Vec<f32> = lines.iter().map(|l| l.origin.y).collect();
        assert_eq!(ys, vec![100., 120., 140.]);
        assert!(lines.iter().all(|l| l.origin.x == 30.));
    }

    #[test]
    fn space_after_bullet_is_fixed() {
        let lines = layout("● aaaa bbbb cccc dddd eeee ffff", 1000);
        let first = &lines[0];
        assert!(!first.is_last_of_paragraph);
        assert_eq!(first.segments[0].advance, 15.);
        assert_eq!(first.segments[0].scale_x, 1.);
        assert_eq!(first.segments[1].advance, 10.);
        assert!(first.space_width > 10.);
        assert!((first.width() - 200.).abs() < EPSILON);
    }

    #[test]
    fn wide_bullet_on_tight_line_still_fills_the_region() {
        let tier = tier().with_bullet_width(40.);
        let text = format!("● {} {} c", "a".repeat(17), "b".repeat(17));
        let lines = layout_with(&text, 500, &tier, &monospace);

        let first = &lines[0];
        assert!(!first.is_last_of_paragraph);
        assert_eq!(first.segments[0].advance, 40.);
        assert!(first.space_width < 0.);
        assert!((first.width() - 200.).abs() < EPSILON);
    }

    #[test]
    fn final_line_keeps_each_space_width() {
        let ideographic = |text: &str, font: &FontConfig| {
            if text == "\u{3000}" {
                font.size
            } else {
                monospace(text, font)
            }
        };
        let lines = layout_with("a b\u{3000}c", 1000, &tier(), &ideographic);
        assert_eq!(lines.len(), 1);

        let advances: Vec<f32> = lines[0].segments.iter().map(|s| s.advance).collect();
        assert_eq!(advances, vec![10., 10., 10., 20., 10.]);
        assert_eq!(lines[0].width(), 60.);
    }

    #[test]
    fn symbols_keep_proportions_and_center() {
        let lines = layout("aaaa ① bbbb", 500);
        let symbol = &lines[0].segments[2];
        assert_eq!(symbol.token.kind, TokenKind::SpecialSymbol);
        assert_eq!(symbol.font.family.as_str(), "Symbols");
        assert_eq!(symbol.scale_x, 1.);
        assert_eq!(symbol.advance, 6.);
        assert_eq!(symbol.glyph_x(), symbol.x - 3.);
    }

    #[test]
    fn line_without_spaces_is_not_stretched() {
        let lines = layout("aaaaaaaaaaaaaaaaaaaaaaaaa b", 1000);
        assert_eq!(lines[0].text(), "aaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(lines[0].space_width, 0.);
        assert_eq!(lines[0].width(), 250.);
    }

    #[test]
    fn header_condenses_independently() {
        let style = SegmentStyle {
            font: FontConfig::new("Body", 20.),
            region: Region::new(30., 80., 100.),
        };
        let header = justify_single("Materials text", &style, &monospace);
        assert_eq!(header.natural_width, 140.);
        assert!((header.scale - 100. / 140.).abs() < EPSILON);
        assert_eq!(header.origin, vec2(30., 80.));

        let short = justify_single("Fits", &style, &monospace);
        assert_eq!(short.scale, 1.);
    }
}
