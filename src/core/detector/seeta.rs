use super::{FaceDetector, NormalizedFaceBox};
use crate::error::DetectorError;
use image::DynamicImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Tuning knobs for the SeetaFace cascade
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Smallest face side, in pixels, the cascade looks for
    pub min_face_size: u32,
    /// Minimum classifier score for a window to count as a face
    pub score_threshold: f64,
    /// Shrink factor between pyramid levels (0..1)
    pub pyramid_scale_factor: f32,
    /// Sliding window step in pixels, both axes
    pub slide_window_step: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_face_size: 20,
            score_threshold: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: 4,
        }
    }
}

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model file (`seeta_fd_frontal_v1.0.bin`) is loaded once; each call
/// builds a fresh cascade from it, so one instance can serve many threads.
pub struct RustfaceDetector {
    model: rustface::Model,
    config: DetectorConfig,
}

impl RustfaceDetector {
    /// Load the SeetaFace model at `model_path`.
    pub fn from_file(model_path: &Path, config: DetectorConfig) -> Result<Self, DetectorError> {
        let load_error = |source: std::io::Error| DetectorError::ModelLoad {
            path: model_path.to_path_buf(),
            source,
        };

        let file = File::open(model_path).map_err(load_error)?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| load_error(std::io::Error::other(e.to_string())))?;

        debug!(path = %model_path.display(), "loaded SeetaFace model");
        Ok(Self { model, config })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<NormalizedFaceBox>, DetectorError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.config.min_face_size);
        detector.set_score_thresh(self.config.score_threshold);
        detector.set_pyramid_scale_factor(self.config.pyramid_scale_factor);
        detector.set_slide_window_step(self.config.slide_window_step, self.config.slide_window_step);

        let gray = image.to_luma8();
        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                NormalizedFaceBox::from_pixel_box(
                    bbox.x() as f64,
                    bbox.y() as f64,
                    bbox.width() as f64,
                    bbox.height() as f64,
                    width,
                    height,
                )
            })
            .collect())
    }
}
