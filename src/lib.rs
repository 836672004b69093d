//! # Face Extractor
//!
//! Finds human faces in a folder of photos and writes every face to its own
//! cropped JPEG.
//!
//! ## Core Philosophy
//! - **One bad photo never stops the run** - failures are isolated per image and per face
//! - **Keep the context** - crops include a margin around each face (hair, chin)
//! - **Never overwrite** - every crop gets a fresh random name
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Scanning, detection, geometry, cropping and writing
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{FaceExtractorError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Log output goes to stderr so it never interleaves with the progress line.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber may already be installed (e.g. by an embedding application)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
