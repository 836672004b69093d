//! # Geometry Module
//!
//! Turns a detector's normalized face box into the pixel rectangle to crop.
//!
//! ## Steps
//! 1. Scale the box to pixels and flip the y axis (bottom-left → top-left origin)
//! 2. Grow it by `margin_factor` of its own size on every side, keeping the center
//! 3. Clamp it to the image; a rectangle with nothing left is rejected
//!
//! The margin keeps hair and chin in the crop; growing symmetrically keeps
//! the face centered.

use crate::core::detector::NormalizedFaceBox;
use crate::error::FaceError;
use serde::{Deserialize, Serialize};

/// Default outward margin, as a fraction of the face size per side
pub const DEFAULT_MARGIN_FACTOR: f64 = 0.6;

/// Integer rectangle, origin top-left. May reach outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// A rectangle known to lie inside its image, with non-zero area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Center point in pixels
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Intersect with `[0, image_width) x [0, image_height)`.
    pub fn clamp(&self, image_width: u32, image_height: u32) -> Result<CropRegion, FaceError> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = self.x.saturating_add(self.width).min(image_width as i64);
        let bottom = self.y.saturating_add(self.height).min(image_height as i64);

        if right <= left || bottom <= top {
            return Err(FaceError::DegenerateCrop {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                image_width,
                image_height,
            });
        }

        // Bounded by the image size above, so these fit in u32
        Ok(CropRegion {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

/// Scale, flip and expand a face box. The result is not clamped.
///
/// The expanded rectangle is snapped outward to whole pixels, so it always
/// covers the exact (fractional) expansion.
pub fn expand_face_box(
    face: &NormalizedFaceBox,
    image_width: u32,
    image_height: u32,
    margin_factor: f64,
) -> PixelRect {
    let (iw, ih) = (image_width as f64, image_height as f64);

    let raw_width = face.width * iw;
    let raw_height = face.height * ih;
    let raw_x = face.x * iw;
    let raw_y = (1.0 - face.y) * ih - raw_height;

    let dx = raw_width * margin_factor;
    let dy = raw_height * margin_factor;

    let left = (raw_x - dx).floor();
    let top = (raw_y - dy).floor();
    let right = (raw_x + raw_width + dx).ceil();
    let bottom = (raw_y + raw_height + dy).ceil();

    // `as` saturates for out-of-range floats
    PixelRect {
        x: left as i64,
        y: top as i64,
        width: (right - left) as i64,
        height: (bottom - top) as i64,
    }
}

/// Map a detector box to the region of the image to crop.
pub fn map_face_box(
    face: &NormalizedFaceBox,
    image_width: u32,
    image_height: u32,
    margin_factor: f64,
) -> Result<CropRegion, FaceError> {
    let rect = if face.is_finite() {
        expand_face_box(face, image_width, image_height, margin_factor)
    } else {
        PixelRect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        }
    };
    rect.clamp(image_width, image_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_frame_box_expands_then_clamps_to_image() {
        let face = NormalizedFaceBox::new(0.0, 0.0, 1.0, 1.0);

        let rect = expand_face_box(&face, 100, 100, 0.6);
        assert_eq!(rect.width, 220);
        assert_eq!(rect.height, 220);
        assert_eq!(rect.center(), (50.0, 50.0));

        let region = rect.clamp(100, 100).unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 0,
                y: 0,
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn y_axis_is_flipped() {
        // Box hugging the bottom-left corner in normalized space
        let face = NormalizedFaceBox::new(0.0, 0.0, 0.25, 0.25);
        let rect = expand_face_box(&face, 200, 100, 0.0);

        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 75); // bottom rows in pixel space
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 25);
    }

    #[test]
    fn expansion_keeps_center_and_scales_size() {
        // Raw box: x=40, y=(1-0.5)*100-20=30, 20x20, center (50, 40)
        let face = NormalizedFaceBox::new(0.4, 0.5, 0.2, 0.2);
        let rect = expand_face_box(&face, 100, 100, 0.5);

        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 40);
        assert_eq!(rect.center(), (50.0, 40.0));
    }

    #[test]
    fn zero_margin_keeps_raw_box() {
        let face = NormalizedFaceBox::new(0.1, 0.1, 0.5, 0.5);
        let rect = expand_face_box(&face, 10, 10, 0.0);

        assert_eq!(
            rect,
            PixelRect {
                x: 1,
                y: 4,
                width: 5,
                height: 5
            }
        );
    }

    #[test]
    fn fractional_edges_snap_outward() {
        // Raw box spans x 1.5..4.5 in a 10px wide image
        let face = NormalizedFaceBox::new(0.15, 0.0, 0.3, 1.0);
        let rect = expand_face_box(&face, 10, 10, 0.0);

        assert_eq!(rect.x, 1);
        assert_eq!(rect.width, 4);
    }

    #[test]
    fn clamp_trims_partial_overlap() {
        let rect = PixelRect {
            x: -10,
            y: 90,
            width: 30,
            height: 30,
        };

        let region = rect.clamp(100, 100).unwrap();

        assert_eq!(
            region,
            CropRegion {
                x: 0,
                y: 90,
                width: 20,
                height: 10
            }
        );
    }

    #[test]
    fn rect_outside_image_is_degenerate() {
        let rect = PixelRect {
            x: 120,
            y: 5,
            width: 10,
            height: 10,
        };

        assert!(matches!(
            rect.clamp(100, 100),
            Err(FaceError::DegenerateCrop { x: 120, .. })
        ));
    }

    #[test]
    fn zero_sized_box_is_degenerate() {
        let face = NormalizedFaceBox::new(0.5, 0.5, 0.0, 0.0);

        let result = map_face_box(&face, 100, 100, DEFAULT_MARGIN_FACTOR);

        assert!(matches!(result, Err(FaceError::DegenerateCrop { .. })));
    }

    #[test]
    fn non_finite_box_is_degenerate() {
        let face = NormalizedFaceBox::new(f64::NAN, 0.5, 0.1, 0.1);

        let result = map_face_box(&face, 100, 100, DEFAULT_MARGIN_FACTOR);

        assert!(matches!(result, Err(FaceError::DegenerateCrop { .. })));
    }

    #[test]
    fn mapped_region_always_fits_the_image() {
        let boxes = [
            NormalizedFaceBox::new(0.9, 0.9, 0.1, 0.1),
            NormalizedFaceBox::new(0.0, 0.8, 0.3, 0.2),
            NormalizedFaceBox::new(0.45, 0.45, 0.1, 0.1),
            NormalizedFaceBox::new(-0.1, 1.05, 0.3, 0.3),
        ];

        for face in boxes {
            if let Ok(region) = map_face_box(&face, 64, 48, 0.6) {
                assert!(region.width > 0 && region.height > 0);
                assert!(region.x + region.width <= 64, "{face:?} -> {region:?}");
                assert!(region.y + region.height <= 48, "{face:?} -> {region:?}");
            }
        }
    }
}
