//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory listing events
    Scan(ScanEvent),
    /// Per-image and per-face extraction events
    Extract(ExtractEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while listing the input directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Listing has started
    Started { path: PathBuf },
    /// An eligible photo was found
    ImageFound { path: PathBuf },
    /// Listing completed
    Completed { total_images: usize },
}

/// Events while extracting faces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractEvent {
    /// One image finished, successfully or not
    Progress(ExtractProgress),
    /// A face crop was written
    FaceWritten { source: PathBuf, output: PathBuf },
    /// A single face was skipped; its siblings still proceed
    FaceFailed { path: PathBuf, message: String },
    /// A whole image was skipped because of an error
    ImageFailed { path: PathBuf, message: String },
    /// An image was skipped by the single-face policy (not an error)
    ImageSkipped { path: PathBuf, faces: usize },
}

/// Progress after an image completes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractProgress {
    /// 1-based index of the image just finished
    pub completed: usize,
    /// Number of eligible images in the run
    pub total: usize,
    /// The image just finished
    pub current_path: PathBuf,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline reached `Done`
    Completed { summary: PipelineSummary },
    /// Pipeline stopped on a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Extracting,
    Done,
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Eligible photos found
    pub total_images: usize,
    /// Face crops written
    pub faces_written: usize,
    /// Images skipped by the single-face policy
    pub images_skipped: usize,
    /// Images that failed to decode or detect
    pub images_failed: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Extracting => write!(f, "Extracting"),
            PipelinePhase::Done => write!(f, "Done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Extract(ExtractEvent::FaceWritten {
            source: PathBuf::from("/photos/a.jpg"),
            output: PathBuf::from("/photos/faces/1234.jpg"),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Extract(ExtractEvent::FaceWritten { source, .. }) => {
                assert_eq!(source, PathBuf::from("/photos/a.jpg"));
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn summary_is_serializable() {
        let summary = PipelineSummary {
            total_images: 12,
            faces_written: 30,
            images_skipped: 2,
            images_failed: 1,
            duration_ms: 5000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"faces_written\":30"));
    }

    #[test]
    fn phase_displays_its_name() {
        assert_eq!(PipelinePhase::Extracting.to_string(), "Extracting");
    }
}
