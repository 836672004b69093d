//! # Writer Module
//!
//! Encodes face crops as JPEG into the output directory.
//!
//! Files are named `<uuid>.jpg` and opened with `create_new`, so a write can
//! never replace an existing file. The directory is created when the writer
//! is constructed, which happens once per run before the first face.

use crate::core::cropper::FaceCrop;
use crate::error::{FaceError, OutputError};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default JPEG quality (the `image` crate's own default)
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Writes face crops into one directory
#[derive(Debug)]
pub struct OutputWriter {
    dir: PathBuf,
    quality: u8,
}

impl OutputWriter {
    /// Create `dir` (and any missing parents) and return a writer for it.
    pub fn create(dir: &Path, quality: u8) -> Result<Self, OutputError> {
        fs::create_dir_all(dir).map_err(|source| OutputError::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
        debug!(dir = %dir.display(), "output directory ready");

        Ok(Self {
            dir: dir.to_path_buf(),
            quality,
        })
    }

    /// Directory the writer puts files into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a crop will be written to
    pub fn path_for(&self, crop: &FaceCrop) -> PathBuf {
        self.dir.join(format!("{}.jpg", crop.id))
    }

    /// Encode `crop` and write it to `<dir>/<id>.jpg`, returning that path.
    pub fn write(&self, crop: &FaceCrop) -> Result<PathBuf, FaceError> {
        let path = self.path_for(crop);

        // JPEG has no alpha channel
        let rgb = crop.image.to_rgb8();

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| FaceError::Write {
                path: path.clone(),
                source,
            })?;
        let mut out = BufWriter::new(file);

        let encoded = JpegEncoder::new_with_quality(&mut out, self.quality).write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        );

        let result = match encoded {
            Ok(()) => out.flush().map_err(|source| FaceError::Write {
                path: path.clone(),
                source,
            }),
            Err(image::ImageError::IoError(source)) => Err(FaceError::Write {
                path: path.clone(),
                source,
            }),
            Err(e) => Err(FaceError::Encode {
                path: path.clone(),
                reason: e.to_string(),
            }),
        };

        if result.is_err() {
            drop(out);
            let _ = fs::remove_file(&path);
        }

        result.map(|()| path)
    }
}
