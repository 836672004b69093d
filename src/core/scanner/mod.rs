//! # Scanner Module
//!
//! Lists the photos in an input directory.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//!
//! Only the top level of the directory is listed; the default output folder
//! lives inside the input folder and must never be fed back in.
//!
//! ## Example
//! ```rust,ignore
//! use face_extractor::core::scanner::{DirectoryScanner, ImageSource, ScanConfig};
//!
//! let scanner = DirectoryScanner::new(ScanConfig::default());
//! let result = scanner.list(Path::new("/Users/me/Photos"))?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{DirectoryScanner, ScanConfig};

use crate::error::ScanError;
use crate::events::{null_sender, EventSender};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A photo discovered in the input directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path to the photo file
    pub path: PathBuf,
    /// Position in the batch (0-based, enumeration order)
    pub index: usize,
}

/// Result of a listing
#[derive(Debug)]
pub struct ScanResult {
    /// Eligible photos, in enumeration order
    pub images: Vec<ImageRecord>,
    /// Entries that could not be inspected (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Source of photos for the pipeline
///
/// [`DirectoryScanner`] is the default; another source can be handed to
/// [`crate::core::pipeline::PipelineBuilder::source`].
pub trait ImageSource: Send + Sync {
    /// List eligible photos in `dir`.
    ///
    /// Fails when the directory cannot be listed or holds no eligible photo.
    fn list(&self, dir: &Path) -> Result<ScanResult, ScanError> {
        self.list_with_events(dir, &null_sender())
    }

    /// List with progress reporting via events
    fn list_with_events(&self, dir: &Path, events: &EventSender)
        -> Result<ScanResult, ScanError>;
}
