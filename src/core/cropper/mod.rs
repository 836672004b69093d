//! # Cropper Module
//!
//! Cuts a face out of a decoded image. The source image is never modified.

use crate::core::geometry::CropRegion;
use crate::error::FaceError;
use image::DynamicImage;
use uuid::Uuid;

/// One cropped face, ready to be written
#[derive(Debug, Clone)]
pub struct FaceCrop {
    /// The cropped pixels
    pub image: DynamicImage,
    /// Index of the source image in the batch
    pub source_index: usize,
    /// Run-unique identifier, used as the output file stem
    pub id: Uuid,
}

impl FaceCrop {
    /// Wrap cropped pixels under a freshly generated identifier
    pub fn new(image: DynamicImage, source_index: usize) -> Self {
        Self {
            image,
            source_index,
            id: Uuid::new_v4(),
        }
    }
}

/// Copy `region` out of `image`.
///
/// Fails if the region is empty or does not lie entirely inside the image.
pub fn crop_face(image: &DynamicImage, region: &CropRegion) -> Result<DynamicImage, FaceError> {
    let fits_x = region.x.checked_add(region.width).is_some_and(|r| r <= image.width());
    let fits_y = region.y.checked_add(region.height).is_some_and(|b| b <= image.height());

    if region.width == 0 || region.height == 0 || !fits_x || !fits_y {
        return Err(FaceError::DegenerateCrop {
            x: region.x as i64,
            y: region.y as i64,
            width: region.width as i64,
            height: region.height as i64,
            image_width: image.width(),
            image_height: image.height(),
        });
    }

    Ok(image.crop_imm(region.x, region.y, region.width, region.height))
}
