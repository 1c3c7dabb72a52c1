use std::ops::{Deref, DerefMut};

use glam::{vec2, Affine2, Vec2};
use smartstring::{LazyCompact, SmartString};

use crate::{
    font::FontConfig,
    justify::{LineInstruction, SegmentInstruction},
    layout::LayoutResult,
    text::TokenKind,
};

/// Smallest horizontal scale applied while painting.
///
/// Keeps the inverse scale around bullets and symbols finite.
const MIN_PAINT_SCALE: f32 = 0.001;

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replaces the current transform.
    SetTransform(Affine2),
    /// Draws `text` with its baseline origin at `pos`, in the coordinate
    /// space of the current transform.
    DrawText {
        text: SmartString<LazyCompact>,
        font: FontConfig,
        pos: Vec2,
    },
}

/// A canvas to draw text to.
///
/// Records a flat sequence of [`Command`]s for a compositor to consume.
///
/// The canvas maintains a _current transform_. Transforms are changed
/// through [`TransformGuard`]s, which restore the previous transform
/// when dropped, so a drawing function can never leak its transform
/// into whatever is drawn after it.
#[derive(Debug, Default)]
pub struct Canvas {
    commands: Vec<Command>,
    transform: Affine2,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current transform.
    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    /// Applies `transform` on top of the current transform until the
    /// returned guard is dropped.
    pub fn transformed(&mut self, transform: Affine2) -> TransformGuard<'_> {
        let saved = self.transform;
        self.set_transform(saved * transform);
        TransformGuard {
            canvas: self,
            saved,
        }
    }

    /// Scales the canvas until the returned guard is dropped.
    pub fn scaled(&mut self, scale: Vec2) -> TransformGuard<'_> {
        self.transformed(Affine2::from_scale(scale))
    }

    /// Translates the canvas until the returned guard is dropped.
    pub fn translated(&mut self, translation: Vec2) -> TransformGuard<'_> {
        self.transformed(Affine2::from_translation(translation))
    }

    pub fn draw_text(&mut self, text: &str, font: &FontConfig, pos: Vec2) -> &mut Self {
        self.cmd(Command::DrawText {
            text: text.into(),
            font: font.clone(),
            pos,
        })
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Removes and returns all recorded commands.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.transform = transform;
        self.cmd(Command::SetTransform(transform));
    }

    fn cmd(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }
}

/// Restores the canvas transform it was created from when dropped.
///
/// Dereferences to the [`Canvas`], so guards nest.
pub struct TransformGuard<'a> {
    canvas: &'a mut Canvas,
    saved: Affine2,
}

impl Deref for TransformGuard<'_> {
    type Target = Canvas;

    fn deref(&self) -> &Self::Target {
        self.canvas
    }
}

impl DerefMut for TransformGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.canvas
    }
}

impl Drop for TransformGuard<'_> {
    fn drop(&mut self) {
        self.canvas.set_transform(self.saved);
    }
}

/// Records the draw commands for a laid out block of text.
pub fn paint(result: &LayoutResult, canvas: &mut Canvas) {
    if let Some(header) = &result.header {
        paint_single(header, canvas);
    }
    for line in &result.lines {
        paint_line(line, canvas);
    }
    if let Some(footer) = &result.footer {
        paint_single(footer, canvas);
    }
}

fn paint_line(line: &LineInstruction, canvas: &mut Canvas) {
    if line.segments.iter().all(|s| s.token.is_space()) {
        return;
    }

    let scale = line.scale.max(MIN_PAINT_SCALE);
    let mut condensed = canvas.transformed(
        Affine2::from_translation(line.origin) * Affine2::from_scale(vec2(scale, 1.)),
    );

    for segment in &line.segments {
        match segment.token.kind {
            TokenKind::Space => {}
            TokenKind::Normal => {
                condensed.draw_text(
                    &segment.token.text,
                    &segment.font,
                    vec2(segment.glyph_x() / scale, 0.),
                );
            }
            TokenKind::Bullet | TokenKind::SpecialSymbol => {
                let mut natural = condensed.scaled(vec2(1. / scale, 1.));
                natural.draw_text(
                    &segment.token.text,
                    &segment.font,
                    vec2(segment.glyph_x(), 0.),
                );
            }
        }
    }
}

fn paint_single(segment: &SegmentInstruction, canvas: &mut Canvas) {
    if segment.text.is_empty() {
        return;
    }

    let scale = segment.scale.max(MIN_PAINT_SCALE);
    let mut condensed = canvas.transformed(
        Affine2::from_translation(segment.origin) * Affine2::from_scale(vec2(scale, 1.)),
    );
    condensed.draw_text(&segment.text, &segment.font, Vec2::ZERO);
}
