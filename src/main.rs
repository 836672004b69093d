//! # face-extract CLI
//!
//! Command-line interface for the face extractor.
//!
//! ## Usage
//! ```bash
//! face-extract ~/Photos
//! face-extract ~/Photos ~/Faces -one
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    face_extractor::init_tracing();
    cli::run()
}
