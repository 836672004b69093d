//! # Error Module
//!
//! User-friendly error types for the face extractor.
//!
//! ## Blast Radius
//! - **Fatal** - [`ScanError`], [`OutputError`]: the whole run stops
//! - **Image-scoped** - [`ImageError`]: that photo is skipped, the run continues
//! - **Face-scoped** - [`FaceError`]: that face is skipped, sibling faces proceed

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum FaceExtractorError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Detector error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while listing the input directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No photos (.png, .jpg, .jpeg) found in {path}")]
    NoImages { path: PathBuf },
}

/// Errors that occur while preparing the output directory
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that skip a single source image
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Face detection failed for {path}: {source}")]
    Detection {
        path: PathBuf,
        #[source]
        source: DetectorError,
    },
}

/// Errors that skip a single detected face
#[derive(Error, Debug)]
pub enum FaceError {
    #[error("Face could not be cropped: box {x},{y} {width}x{height} is empty inside a {image_width}x{image_height} image")]
    DegenerateCrop {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        image_width: u32,
        image_height: u32,
    },

    #[error("Failed to encode face {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to write face {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reported by a face detection backend
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Failed to load detection model {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Detection failed: {0}")]
    Failed(String),

    #[error("Detection did not finish within {seconds:.1}s")]
    TimedOut { seconds: f64 },

    #[error("Detection worker stopped without reporting a result")]
    Disconnected,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FaceExtractorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation"));
    }

    #[test]
    fn empty_input_names_accepted_extensions() {
        let error = ScanError::NoImages {
            path: PathBuf::from("/photos/empty"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/empty"));
        assert!(message.contains(".jpeg"));
    }

    #[test]
    fn decode_error_includes_path_and_reason() {
        let error = ImageError::Decode {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn degenerate_crop_reports_geometry() {
        let error = FaceError::DegenerateCrop {
            x: 120,
            y: 5,
            width: 10,
            height: 10,
            image_width: 100,
            image_height: 100,
        };
        let message = error.to_string();
        assert!(message.contains("120,5 10x10"));
        assert!(message.contains("100x100"));
    }

    #[test]
    fn detection_error_wraps_detector_cause() {
        let error = ImageError::Detection {
            path: PathBuf::from("/photos/slow.png"),
            source: DetectorError::TimedOut { seconds: 2.5 },
        };
        let message = error.to_string();
        assert!(message.contains("/photos/slow.png"));
        assert!(message.contains("2.5s"));
    }
}
