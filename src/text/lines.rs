//! Greedy line breaking under a hypothetical width.

use crate::{font::FontTier, oracle::MeasurementOracle};

use super::{Token, TokenKind};

/// A token together with its natural (uncondensed) width.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredToken {
    pub token: Token,
    pub width: f32,
}

impl MeasuredToken {
    pub fn kind(&self) -> TokenKind {
        self.token.kind
    }
}

/// A line of text produced by the line breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub tokens: Vec<MeasuredToken>,
    /// Sum of the natural widths of `tokens`.
    pub measured_width: f32,
    pub is_last_of_paragraph: bool,
}

impl Line {
    fn new(mut tokens: Vec<MeasuredToken>, is_last_of_paragraph: bool) -> Self {
        while tokens.last().map_or(false, |t| t.token.is_space()) {
            tokens.pop();
        }
        let measured_width = tokens.iter().map(|t| t.width).sum();
        Self {
            tokens,
            measured_width,
            is_last_of_paragraph,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.token.text.as_str()).collect()
    }
}

/// Measures every token of every paragraph with the fonts of `tier`.
///
/// Bullets take the tier's fixed bullet width. Non-positive widths
/// reported by the oracle are floored to zero.
pub fn measure_paragraphs<O>(
    paragraphs: &[Vec<Token>],
    tier: &FontTier,
    oracle: &O,
) -> Vec<Vec<MeasuredToken>>
where
    O: MeasurementOracle + ?Sized,
{
    paragraphs
        .iter()
        .map(|tokens| {
            tokens
                .iter()
                .map(|token| MeasuredToken {
                    width: token_width(token, tier, oracle),
                    token: token.clone(),
                })
                .collect()
        })
        .collect()
}

pub fn token_width<O>(token: &Token, tier: &FontTier, oracle: &O) -> f32
where
    O: MeasurementOracle + ?Sized,
{
    let width = match token.kind {
        TokenKind::Bullet => tier.bullet_width,
        kind => oracle.measure(&token.text, tier.font_for(kind)),
    };
    // NaN also ends up as zero here.
    width.max(0.)
}

/// Breaks paragraphs into lines no wider than `max_width`.
///
/// A token wider than `max_width` is placed alone on its own line; tokens
/// are never split. An empty paragraph gives one empty line.
pub fn break_lines(paragraphs: &[Vec<MeasuredToken>], max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    for paragraph in paragraphs {
        break_paragraph(paragraph, max_width, &mut lines);
    }
    lines
}

/// Number of lines [`break_lines`] would produce.
pub fn count_lines(paragraphs: &[Vec<MeasuredToken>], max_width: f32) -> usize {
    break_lines(paragraphs, max_width).len()
}

fn break_paragraph(tokens: &[MeasuredToken], max_width: f32, lines: &mut Vec<Line>) {
    let first_line = lines.len();
    let mut current = Vec::new();
    let mut width = 0.;

    for token in tokens {
        if current.is_empty() && token.token.is_space() {
            continue;
        }

        if !current.is_empty() && width + token.width > max_width {
            lines.push(Line::new(std::mem::take(&mut current), false));
            width = 0.;
            if token.token.is_space() {
                continue;
            }
        }

        width += token.width;
        current.push(token.clone());
    }

    // Trailing spaces can close a line and leave nothing behind.
    if current.is_empty() && lines.len() > first_line {
        if let Some(last) = lines.last_mut() {
            last.is_last_of_paragraph = true;
        }
    } else {
        lines.push(Line::new(current, true));
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        font::FontConfig,
        oracle::tests::monospace,
        text::{tokenize_paragraphs, SpecialCharacters},
    };

    use super::*;

    // 10px characters.
    fn tier() -> FontTier {
        FontTier::new(FontConfig::new("Body", 20.), 20., 3).with_bullet_width(15.)
    }

    fn lines(text: &str, max_width: f32) -> Vec<Line> {
        let paragraphs = tokenize_paragraphs(text, &SpecialCharacters::default());
        break_lines(&measure_paragraphs(&paragraphs, &tier(), &monospace), max_width)
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    #[test]
    fn greedy_wrapping() {
        let lines = lines("aaa bbb ccc ddd", 75.);
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc ddd"]);
        assert_eq!(lines[0].measured_width, 70.);
        assert!(!lines[0].is_last_of_paragraph);
        assert!(lines[1].is_last_of_paragraph);
    }

    #[test]
    fn fits_exactly() {
        let lines = lines("aaa bbb", 70.);
        assert_eq!(texts(&lines), vec!["aaa bbb"]);
    }

    #[test]
    fn overlong_token_sits_alone() {
        let lines = lines("a verylongword b", 50.);
        assert_eq!(texts(&lines), vec!["a", "verylongword", "b"]);
    }

    #[test]
    fn empty_paragraph_yields_empty_line() {
        let lines = lines("first\n\nthird", 500.);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
        assert!(lines.iter().all(|l| l.is_last_of_paragraph));
    }

    #[test]
    fn edge_spaces_are_trimmed() {
        let lines = lines("  aaa   bbb  ", 45.);
        assert_eq!(texts(&lines), vec!["aaa", "bbb"]);
    }

    #[test]
    fn bullet_width_is_fixed() {
        let paragraphs = tokenize_paragraphs("● a", &SpecialCharacters::default());
        let measured = measure_paragraphs(&paragraphs, &tier(), &monospace);
        assert_eq!(measured[0][0].width, 15.);
        assert_eq!(measured[0][2].width, 10.);
    }

    #[test]
    fn negative_widths_always_fit() {
        let oracle = |_: &str, _: &FontConfig| -5.0_f32;
        let paragraphs =
            tokenize_paragraphs("many words that would not fit", &SpecialCharacters::none());
        let measured = measure_paragraphs(&paragraphs, &tier(), &oracle);
        assert_eq!(count_lines(&measured, 1.), 1);
    }

    #[test]
    fn infinite_width_keeps_paragraphs_whole() {
        let lines = lines("one two three\nfour five", f32::INFINITY);
        assert_eq!(texts(&lines), vec!["one two three", "four five"]);
    }

    #[test]
    fn narrower_widths_never_need_fewer_lines() {
        let text = "Once per turn: You can target 1 face-up monster on the field; \
                    change it to face-down Defense Position.";
        let paragraphs = tokenize_paragraphs(text, &SpecialCharacters::default());
        let measured = measure_paragraphs(&paragraphs, &tier(), &monospace);
        let mut previous = 0;
        for width in (100..=1200).rev().step_by(25) {
            let count = count_lines(&measured, width as f32);
            assert!(count >= previous);
            previous = count;
        }
    }
}
