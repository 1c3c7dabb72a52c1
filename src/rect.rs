use glam::{vec2, Affine2, Vec2};
use serde::{Deserialize, Serialize};

/// A rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Rect {
    /// The position of the top-left corner
    /// of this rectangle.
    pub pos: Vec2,
    /// The side lengths of this rectangle.
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn width(self) -> f32 {
        self.size.x
    }

    /// The axis-aligned bounding box of this rectangle after `transform`.
    pub fn bbox_transformed(self, transform: Affine2) -> Self {
        let points = [
            self.pos,
            self.pos + vec2(0., self.size.y),
            self.pos + vec2(self.size.x, 0.),
            self.pos + self.size,
        ]
        .map(|p| transform.transform_point2(p));

        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(-f32::INFINITY);
        for point in points {
            min = min.min(point);
            max = max.max(point);
        }

        Self {
            pos: min,
            size: max - min,
        }
    }
}

/// Destination box for a block of text.
///
/// Only the horizontal extent is fixed; the height follows from the
/// tier's line height and line capacity.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    pub left: f32,
    pub top: f32,
    pub width: f32,
}

impl Region {
    pub fn new(left: f32, top: f32, width: f32) -> Self {
        Self { left, top, width }
    }

    /// The top-left corner of the region.
    pub fn origin(self) -> Vec2 {
        vec2(self.left, self.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_scale_narrows_bbox() {
        let rect = Rect::new(vec2(10., 0.), vec2(200., 20.));
        let scaled = rect.bbox_transformed(Affine2::from_scale(vec2(0.5, 1.0)));
        assert_eq!(scaled.pos, vec2(5., 0.));
        assert_eq!(scaled.size, vec2(100., 20.));
    }
}
