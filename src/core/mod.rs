//! # Core Module
//!
//! The UI-agnostic face extraction engine.
//!
//! ## Modules
//! - `scanner` - Lists photos in the input directory
//! - `detector` - Face detection boundary and the SeetaFace backend
//! - `geometry` - Maps detector boxes to pixel crop regions
//! - `cropper` - Cuts faces out of decoded photos
//! - `writer` - Encodes crops as JPEG files
//! - `pipeline` - Orchestrates the full workflow

pub mod cropper;
pub mod detector;
pub mod geometry;
pub mod pipeline;
pub mod scanner;
pub mod writer;

// Re-export commonly used types
pub use cropper::FaceCrop;
pub use detector::{FaceDetector, NormalizedFaceBox, RustfaceDetector};
pub use geometry::{CropRegion, PixelRect};
pub use pipeline::{Pipeline, PipelineResult};
pub use scanner::ImageRecord;
