//! Text measurement.
//!
//! The layout engine never touches glyphs directly. It asks a
//! [`MeasurementOracle`] how wide a string is in a given font and
//! decides everything else from those numbers.

use glam::{vec2, Affine2};

use crate::{font::FontConfig, rect::Rect};

/// Reports the rendered width of a string.
///
/// Implementations must be pure with respect to a given `FontConfig`:
/// measuring the same string twice gives the same width. The caller
/// makes sure the font is loaded before laying out text.
///
/// [`FontBook`](crate::FontBook) is the static implementation. Any
/// `Fn(&str, &FontConfig) -> f32` is an oracle too.
pub trait MeasurementOracle {
    fn measure(&self, text: &str, font: &FontConfig) -> f32;
}

impl<F> MeasurementOracle for F
where
    F: Fn(&str, &FontConfig) -> f32,
{
    fn measure(&self, text: &str, font: &FontConfig) -> f32 {
        self(text, font)
    }
}

/// Externally managed layout state that can report where a piece of
/// text ends up once rendered.
///
/// This is usually an interactive preview whose element geometry is
/// recomputed by the host.
pub trait GeometryHost {
    /// Bounding box of `text` rendered with `font` under `transform`.
    fn bounding_box(&self, text: &str, font: &FontConfig, transform: Affine2) -> Rect;
}

/// Live-geometry oracle.
///
/// Samples the host's bounding box under a trial horizontal scale and
/// reports the width the text would have at its natural scale.
///
/// The host geometry must be up to date before a layout runs. Sequencing
/// (and any debouncing) is the caller's job. Ratios computed with this
/// oracle are not guaranteed to match [`FontBook`](crate::FontBook) to the
/// unit, even for identical font metrics.
pub struct GeometryOracle<H> {
    host: H,
    trial_scale: f32,
}

impl<H> GeometryOracle<H>
where
    H: GeometryHost,
{
    pub fn new(host: H) -> Self {
        Self {
            host,
            trial_scale: 1.,
        }
    }

    /// Sets the horizontal scale applied to the element while sampling.
    ///
    /// Non-positive values are ignored.
    pub fn with_trial_scale(mut self, trial_scale: f32) -> Self {
        if trial_scale > 0. {
            self.trial_scale = trial_scale;
        }
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

impl<H> MeasurementOracle for GeometryOracle<H>
where
    H: GeometryHost,
{
    fn measure(&self, text: &str, font: &FontConfig) -> f32 {
        let transform = Affine2::from_scale(vec2(self.trial_scale, 1.));
        self.host.bounding_box(text, font, transform).width() / self.trial_scale
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use glam::Vec2;

    use super::*;

    /// Every character is half an em wide.
    pub fn monospace(text: &str, font: &FontConfig) -> f32 {
        text.chars().count() as f32 * font.size * 0.5
    }

    struct MonospaceHost;

    impl GeometryHost for MonospaceHost {
        fn bounding_box(&self, text: &str, font: &FontConfig, transform: Affine2) -> Rect {
            Rect::new(Vec2::ZERO, vec2(monospace(text, font), font.size))
                .bbox_transformed(transform)
        }
    }

    #[test]
    fn closures_are_oracles() {
        let font = FontConfig::new("Body", 10.);
        assert_eq!(monospace.measure("abcd", &font), 20.);
    }

    #[test]
    fn geometry_oracle_undoes_trial_scale() {
        let font = FontConfig::new("Body", 14.);
        let oracle = GeometryOracle::new(MonospaceHost).with_trial_scale(0.6);
        let expected = monospace("Draw 1 card.", &font);
        assert!((oracle.measure("Draw 1 card.", &font) - expected).abs() < 1e-3);
    }

    #[test]
    fn non_positive_trial_scale_is_ignored() {
        let font = FontConfig::new("Body", 14.);
        let oracle = GeometryOracle::new(MonospaceHost).with_trial_scale(0.);
        assert_eq!(oracle.measure("ab", &font), 14.);
    }
}
