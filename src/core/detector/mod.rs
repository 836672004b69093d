//! # Detector Module
//!
//! The boundary to face localization. The pipeline only depends on the
//! [`FaceDetector`] contract; [`RustfaceDetector`] is the bundled backend.
//!
//! Detectors report boxes in normalized coordinates with the origin at the
//! **bottom-left** of the image. [`crate::core::geometry`] turns them into
//! top-left pixel rectangles.

mod seeta;

pub use seeta::{DetectorConfig, RustfaceDetector};

use crate::error::DetectorError;
use crossbeam_channel::RecvTimeoutError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A detected face as fractions of the image size, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedFaceBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Convert a top-left-origin pixel box into a normalized box.
    pub fn from_pixel_box(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let (iw, ih) = (image_width as f64, image_height as f64);
        Self {
            x: x / iw,
            y: 1.0 - (y + height) / ih,
            width: width / iw,
            height: height / ih,
        }
    }

    /// All four components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Pluggable face detection backend.
///
/// An empty vector means "no faces", which is not an error.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<NormalizedFaceBox>, DetectorError>;
}

/// Run a detector and wait for its answer.
///
/// Without a timeout the call happens inline. With one, it runs on a worker
/// thread that holds its own handles to the detector and the decoded image,
/// so the image stays alive even if we stop waiting.
pub fn detect_blocking(
    detector: &Arc<dyn FaceDetector>,
    image: &Arc<DynamicImage>,
    timeout: Option<Duration>,
) -> Result<Vec<NormalizedFaceBox>, DetectorError> {
    let Some(timeout) = timeout else {
        return detector.detect(image);
    };

    let (tx, rx) = crossbeam_channel::bounded(1);
    let worker_detector = Arc::clone(detector);
    let worker_image = Arc::clone(image);

    thread::Builder::new()
        .name("face-detect".to_string())
        .spawn(move || {
            let _ = tx.send(worker_detector.detect(&worker_image));
        })
        .map_err(|e| DetectorError::Failed(format!("could not start detection worker: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(DetectorError::TimedOut {
            seconds: timeout.as_secs_f64(),
        }),
        Err(RecvTimeoutError::Disconnected) => Err(DetectorError::Disconnected),
    }
}
