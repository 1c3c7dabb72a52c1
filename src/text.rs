//! Tokenizing card text.
//!
//! Text is split into paragraphs on `\n`. Each paragraph is lexed into
//! words, spaces and break characters (`-`, `/`), and words are then
//! split further so that every bullet glyph and large symbol stands
//! alone as its own token.

use std::collections::HashSet;

use logos::Logos;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use smartstring::{LazyCompact, SmartString};

use crate::font::SymbolClass;

pub mod lines;

pub const DEFAULT_BULLET: char = '●';

static DEFAULT_SPECIALS: Lazy<SpecialCharacters> = Lazy::new(|| {
    // Circled digits 1 through 20.
    let mut symbols: HashSet<char, ahash::RandomState> = ('\u{2460}'..='\u{2473}').collect();
    symbols.insert('★');
    SpecialCharacters {
        bullet: Some(DEFAULT_BULLET),
        symbols,
    }
});

/// How a token is measured and drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Ordinary text, including break characters.
    Normal,
    /// The bullet glyph. Has a fixed width and is never condensed.
    Bullet,
    /// A large symbol drawn with the tier's symbol font.
    SpecialSymbol,
    /// A single whitespace character.
    Space,
}

impl TokenKind {
    pub fn symbol_class(self) -> Option<SymbolClass> {
        match self {
            TokenKind::Bullet => Some(SymbolClass::Bullet),
            TokenKind::SpecialSymbol => Some(SymbolClass::Symbol),
            TokenKind::Normal | TokenKind::Space => None,
        }
    }

    /// Whether glyphs of this kind are drawn under the condensing transform.
    pub fn is_condensed(self) -> bool {
        matches!(self, TokenKind::Normal | TokenKind::Space)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: SmartString<LazyCompact>,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: &str, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn is_space(&self) -> bool {
        self.kind == TokenKind::Space
    }
}

/// Characters that get their own tokens.
///
/// Whitespace, `-` and `/` are always break opportunities and are not
/// configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialCharacters {
    /// The bullet glyph. `None` disables bullet handling.
    pub bullet: Option<char>,
    /// Glyphs measured and drawn with the symbol font.
    #[serde(default)]
    pub symbols: HashSet<char, ahash::RandomState>,
}

impl Default for SpecialCharacters {
    fn default() -> Self {
        DEFAULT_SPECIALS.clone()
    }
}

impl SpecialCharacters {
    /// No bullets and no symbols. Everything is plain text.
    pub fn none() -> Self {
        Self {
            bullet: None,
            symbols: HashSet::default(),
        }
    }

    fn classify(&self, c: char) -> TokenKind {
        if Some(c) == self.bullet {
            TokenKind::Bullet
        } else if self.symbols.contains(&c) {
            TokenKind::SpecialSymbol
        } else {
            TokenKind::Normal
        }
    }
}

#[derive(Logos, Debug, Copy, Clone, PartialEq, Eq)]
enum RawToken {
    #[regex("[ \t\u{3000}]")]
    Space,

    #[token("-")]
    #[token("/")]
    Break,

    #[regex("[^ \t\u{3000}\\-/]+")]
    Word,

    #[error]
    Error,
}

/// Splits one paragraph (no newlines) into tokens.
pub fn tokenize(paragraph: &str, specials: &SpecialCharacters) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (raw, span) in RawToken::lexer(paragraph).spanned() {
        let text = &paragraph[span];
        match raw {
            RawToken::Space => tokens.push(Token::new(text, TokenKind::Space)),
            RawToken::Break => tokens.push(Token::new(text, TokenKind::Normal)),
            RawToken::Word | RawToken::Error => split_word(text, specials, &mut tokens),
        }
    }
    tokens
}

fn split_word(word: &str, specials: &SpecialCharacters, tokens: &mut Vec<Token>) {
    let mut run_start = 0;
    for (i, c) in word.char_indices() {
        let kind = specials.classify(c);
        if kind == TokenKind::Normal {
            continue;
        }

        if run_start < i {
            tokens.push(Token::new(&word[run_start..i], TokenKind::Normal));
        }
        let end = i + c.len_utf8();
        tokens.push(Token::new(&word[i..end], kind));
        run_start = end;
    }

    if run_start < word.len() {
        tokens.push(Token::new(&word[run_start..], TokenKind::Normal));
    }
}

/// Splits text into paragraphs and tokenizes each one.
pub fn tokenize_paragraphs(text: &str, specials: &SpecialCharacters) -> Vec<Vec<Token>> {
    text.split('\n')
        .map(|paragraph| tokenize(paragraph, specials))
        .collect()
}

/// Normalizes line endings, quotes and hyphens.
///
/// A doubled hyphen becomes an en dash.
///
/// Trailing whitespace is removed from every paragraph. Normalizing twice
/// gives the same result as normalizing once.
pub fn normalize(text: &str) -> String {
    let unified = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace(&['\u{2010}', '\u{2011}'][..], "-")
        .replace("--", "\u{2013}");

    let mut out = String::with_capacity(unified.len());
    for (i, paragraph) in unified.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for c in paragraph.trim_end().chars() {
            out.push(match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                c => c,
            });
        }
    }
    out
}

/// Separates a leading `[material]` bracket from the body text.
///
/// Returns the bracket contents (without brackets) and the remaining
/// body. Text without a leading bracket is returned unchanged.
pub fn split_material(text: &str) -> (Option<&str>, &str) {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('[') {
        return (None, text);
    }

    match trimmed.find(']') {
        Some(end) => {
            let material = trimmed[1..end].trim();
            let rest = trimmed[end + 1..].trim_start();
            if material.is_empty() {
                (None, rest)
            } else {
                (Some(material), rest)
            }
        }
        None => (None, text),
    }
}
