//! # Pipeline Module
//!
//! Orchestrates the full extraction workflow.
//!
//! ## Pipeline Stages
//! 1. **Scan** - List the photos in the input directory (fatal if none)
//! 2. **Prepare** - Create the output directory (fatal on failure)
//! 3. **Extract** - For each photo: decode, detect, then map, crop and write every face
//!
//! Photos are processed one at a time. Detection for a photo completes before
//! its progress is reported and before the next photo is decoded.

mod executor;

pub use executor::{
    ExtractedFace, ImageOutcome, Pipeline, PipelineBuilder, PipelineConfig, PipelineResult,
};
