//! Pipeline execution implementation.

use crate::core::cropper::{crop_face, FaceCrop};
use crate::core::detector::{detect_blocking, FaceDetector, NormalizedFaceBox};
use crate::core::geometry::{map_face_box, CropRegion, DEFAULT_MARGIN_FACTOR};
use crate::core::scanner::{DirectoryScanner, ImageRecord, ImageSource, ScanConfig};
use crate::core::writer::{OutputWriter, DEFAULT_JPEG_QUALITY};
use crate::error::{FaceError, FaceExtractorError, ImageError};
use crate::events::{
    Event, EventSender, ExtractEvent, ExtractProgress, PipelineEvent, PipelinePhase,
    PipelineSummary, null_sender,
};
use image::{DynamicImage, ImageReader};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A face that made it to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedFace {
    /// Identifier used as the file stem
    pub id: Uuid,
    /// Photo the face came from
    pub source: PathBuf,
    /// Index of that photo in the batch
    pub source_index: usize,
    /// Region of the photo that was cropped
    pub region: CropRegion,
    /// Written JPEG
    pub output: PathBuf,
}

/// What happened to one photo
#[derive(Debug)]
pub enum ImageOutcome {
    /// Faces were processed; some may have failed individually
    Extracted {
        faces: Vec<ExtractedFace>,
        failures: Vec<FaceError>,
    },
    /// More than one face in single-face mode; nothing written
    Skipped { faces: usize },
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Eligible photos found in the input directory
    pub total_images: usize,
    /// Every face written, in processing order
    pub faces: Vec<ExtractedFace>,
    /// Photos skipped by the single-face policy
    pub images_skipped: usize,
    /// Photos that failed to decode or detect
    pub images_failed: usize,
    /// Recoverable errors, as messages
    pub errors: Vec<String>,
    /// Where the crops were written
    pub output_dir: PathBuf,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to read photos from
    pub input_dir: PathBuf,
    /// Directory to write crops to (`<input_dir>/faces` when unset)
    pub output_dir: Option<PathBuf>,
    /// When false, photos with more than one face are skipped entirely
    pub detect_all_faces: bool,
    /// Outward margin per side, as a fraction of the face size
    pub margin_factor: f64,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
    /// Give up on a photo whose detection runs longer than this
    pub detect_timeout: Option<Duration>,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: None,
            detect_all_faces: true,
            margin_factor: DEFAULT_MARGIN_FACTOR,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            detect_timeout: None,
            scan_config: ScanConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// The output directory after applying the default
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join("faces"))
    }

    fn validate(&self) -> Result<(), FaceExtractorError> {
        if !self.margin_factor.is_finite() || self.margin_factor < 0.0 {
            return Err(FaceExtractorError::Config(format!(
                "margin factor must be a non-negative number, got {}",
                self.margin_factor
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(FaceExtractorError::Config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    detector: Option<Arc<dyn FaceDetector>>,
    source: Option<Arc<dyn ImageSource>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            detector: None,
            source: None,
        }
    }

    /// Set the directory to read photos from
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    /// Set the directory to write crops to
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    /// Extract every face (true) or only from single-face photos (false)
    pub fn detect_all_faces(mut self, all: bool) -> Self {
        self.config.detect_all_faces = all;
        self
    }

    /// Set the outward crop margin
    pub fn margin_factor(mut self, margin: f64) -> Self {
        self.config.margin_factor = margin;
        self
    }

    /// Set the JPEG quality
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    /// Bound how long detection may take per photo
    pub fn detect_timeout(mut self, timeout: Duration) -> Self {
        self.config.detect_timeout = Some(timeout);
        self
    }

    /// Ignore dot-files in the input directory
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.config.scan_config.skip_hidden = skip;
        self
    }

    /// Set the face detection backend
    pub fn detector(mut self, detector: Arc<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Replace the directory scanner as the source of photos
    pub fn source(mut self, source: Arc<dyn ImageSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Validate the configuration and build the pipeline
    pub fn build(self) -> Result<Pipeline, FaceExtractorError> {
        self.config.validate()?;
        let detector = self
            .detector
            .ok_or_else(|| FaceExtractorError::Config("no face detector configured".to_string()))?;
        let source = self.source.unwrap_or_else(|| {
            Arc::new(DirectoryScanner::new(self.config.scan_config.clone()))
        });

        Ok(Pipeline {
            config: self.config,
            detector,
            source,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The face extraction pipeline
pub struct Pipeline {
    config: PipelineConfig,
    detector: Arc<dyn FaceDetector>,
    source: Arc<dyn ImageSource>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, FaceExtractorError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting.
    ///
    /// Only a missing or empty input directory, or an output directory that
    /// cannot be created, make this return `Err`. Every other failure is
    /// recorded in [`PipelineResult::errors`].
    pub fn run_with_events(
        &self,
        events: &EventSender,
    ) -> Result<PipelineResult, FaceExtractorError> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scan_result = self
            .source
            .list_with_events(&self.config.input_dir, events)
            .map_err(|e| fatal(events, e.into()))?;

        let mut errors: Vec<String> = scan_result.errors.iter().map(|e| e.to_string()).collect();
        let images = scan_result.images;
        let total_images = images.len();
        info!(total_images, dir = %self.config.input_dir.display(), "found photos");

        // Phase 2: Prepare output
        let output_dir = self.config.resolved_output_dir();
        let writer = OutputWriter::create(&output_dir, self.config.jpeg_quality)
            .map_err(|e| fatal(events, e.into()))?;

        // Phase 3: Extracting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Extracting,
        }));

        let mut faces = Vec::new();
        let mut images_skipped = 0;
        let mut images_failed = 0;

        for record in &images {
            match self.process_image(record, &writer, events) {
                Ok(ImageOutcome::Extracted {
                    faces: written,
                    failures,
                }) => {
                    faces.extend(written);
                    errors.extend(failures.iter().map(|e| e.to_string()));
                }
                Ok(ImageOutcome::Skipped { faces: found }) => {
                    info!(path = %record.path.display(), faces = found, "skipping photo with several faces");
                    events.send(Event::Extract(ExtractEvent::ImageSkipped {
                        path: record.path.clone(),
                        faces: found,
                    }));
                    images_skipped += 1;
                }
                Err(e) => {
                    warn!(path = %record.path.display(), error = %e, "skipping photo");
                    events.send(Event::Extract(ExtractEvent::ImageFailed {
                        path: record.path.clone(),
                        message: e.to_string(),
                    }));
                    errors.push(e.to_string());
                    images_failed += 1;
                }
            }

            events.send(Event::Extract(ExtractEvent::Progress(ExtractProgress {
                completed: record.index + 1,
                total: total_images,
                current_path: record.path.clone(),
            })));
        }

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Done,
        }));

        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images,
                faces_written: faces.len(),
                images_skipped,
                images_failed,
                duration_ms,
            },
        }));

        info!(faces = faces.len(), duration_ms, "extraction finished");

        Ok(PipelineResult {
            total_images,
            faces,
            images_skipped,
            images_failed,
            errors,
            output_dir,
            duration_ms,
        })
    }

    /// Decode, detect and extract the faces of one photo.
    ///
    /// `Err` means the whole photo was skipped. Individual face failures are
    /// returned inside [`ImageOutcome::Extracted`].
    pub fn process_image(
        &self,
        record: &ImageRecord,
        writer: &OutputWriter,
        events: &EventSender,
    ) -> Result<ImageOutcome, ImageError> {
        let image = Arc::new(decode(record)?);
        debug!(path = %record.path.display(), width = image.width(), height = image.height(), "decoded");

        let boxes = detect_blocking(&self.detector, &image, self.config.detect_timeout).map_err(
            |source| ImageError::Detection {
                path: record.path.clone(),
                source,
            },
        )?;
        debug!(path = %record.path.display(), faces = boxes.len(), "detected");

        if !self.config.detect_all_faces && boxes.len() > 1 {
            return Ok(ImageOutcome::Skipped { faces: boxes.len() });
        }

        let mut faces = Vec::with_capacity(boxes.len());
        let mut failures = Vec::new();

        for face_box in &boxes {
            match self.extract_face(&image, face_box, record, writer) {
                Ok(face) => {
                    events.send(Event::Extract(ExtractEvent::FaceWritten {
                        source: record.path.clone(),
                        output: face.output.clone(),
                    }));
                    faces.push(face);
                }
                Err(e) => {
                    warn!(path = %record.path.display(), error = %e, "skipping face");
                    events.send(Event::Extract(ExtractEvent::FaceFailed {
                        path: record.path.clone(),
                        message: e.to_string(),
                    }));
                    failures.push(e);
                }
            }
        }

        Ok(ImageOutcome::Extracted { faces, failures })
    }

    fn extract_face(
        &self,
        image: &DynamicImage,
        face_box: &NormalizedFaceBox,
        record: &ImageRecord,
        writer: &OutputWriter,
    ) -> Result<ExtractedFace, FaceError> {
        let region = map_face_box(
            face_box,
            image.width(),
            image.height(),
            self.config.margin_factor,
        )?;
        let crop = FaceCrop::new(crop_face(image, &region)?, record.index);
        let output = writer.write(&crop)?;

        Ok(ExtractedFace {
            id: crop.id,
            source: record.path.clone(),
            source_index: crop.source_index,
            region,
            output,
        })
    }
}

/// Decode by content, not by extension
fn decode(record: &ImageRecord) -> Result<DynamicImage, ImageError> {
    let decode_error = |reason: String| ImageError::Decode {
        path: record.path.clone(),
        reason,
    };

    ImageReader::open(&record.path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(e.to_string()))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))
}

/// Report a run-ending error and hand it back
fn fatal(events: &EventSender, error: FaceExtractorError) -> FaceExtractorError {
    events.send(Event::Pipeline(PipelineEvent::Error {
        message: error.to_string(),
    }));
    error
}
