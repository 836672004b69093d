//! # CLI Module
//!
//! Command-line interface for the face extractor.
//!
//! ## Usage
//! ```bash
//! # Crops go to ~/Photos/faces
//! face-extract ~/Photos
//!
//! # Custom output folder
//! face-extract ~/Photos ~/Faces
//!
//! # Only photos with exactly one face
//! face-extract ~/Photos ~/Faces -one
//!
//! # JSON summary
//! face-extract ~/Photos --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use face_extractor::core::detector::{DetectorConfig, RustfaceDetector};
use face_extractor::core::pipeline::{Pipeline, PipelineResult};
use face_extractor::events::{Event, EventChannel, ExtractEvent, PipelineEvent, ScanEvent};
use face_extractor::FaceExtractorError;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Token that switches to single-face mode when given after the folders
const SINGLE_FACE_TOKEN: &str = "-one";

/// Face Extractor - save every face in a folder of photos as its own image
#[derive(Parser, Debug)]
#[command(name = "face-extract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder with photos (.png, .jpg, .jpeg)
    input: PathBuf,

    /// Folder for the cropped faces [default: <INPUT>/faces]
    output: Option<PathBuf>,

    /// `-one` to skip photos with more than one face; any other word keeps every face
    mode: Option<String>,

    /// Skip photos with more than one face (same as the `-one` mode)
    #[arg(long)]
    one: bool,

    /// SeetaFace model file
    #[arg(long, default_value = "seeta_fd_frontal_v1.0.bin")]
    model: PathBuf,

    /// Margin around each face, as a fraction of its size per side
    #[arg(long, default_value = "0.6")]
    margin: f64,

    /// JPEG quality (1-100)
    #[arg(long, default_value = "75")]
    quality: u8,

    /// Give up on a photo if detection takes longer than this
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Ignore dot-files in the input folder
    #[arg(long)]
    skip_hidden: bool,

    /// Summary format
    #[arg(long, default_value = "pretty")]
    output_format: OutputFormat,

    /// Print every written face
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Whether photos with several faces are skipped
    fn single_face(&self) -> bool {
        self.one || self.mode.as_deref() == Some(SINGLE_FACE_TOKEN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (written files only)
    Minimal,
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    match run_extract(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Failure:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Rewrite the single-dash `-one` token so clap does not read it as `-o -n -e`.
/// Arguments after `--` are left alone.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut escaped = false;
    args.into_iter()
        .map(|arg| {
            if arg == "--" {
                escaped = true;
            }
            if !escaped && arg == SINGLE_FACE_TOKEN {
                OsString::from("--one")
            } else {
                arg
            }
        })
        .collect()
}

/// Where a line of run output is printed
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Out(String),
    Err(String),
}

/// Decides which events print a line, and on which stream.
///
/// Errors always go to stderr. Informational lines go to stdout only in
/// pretty mode, so json and minimal output on stdout stay machine-readable.
struct Reporter {
    format: OutputFormat,
    verbose: bool,
    /// An indicatif bar is drawing progress, so no progress lines are needed
    live_bar: bool,
}

impl Reporter {
    fn line_for(&self, event: &Event) -> Option<Line> {
        match event {
            Event::Extract(ExtractEvent::Progress(p)) if !self.live_bar => Some(self.info(format!(
                "{}/{} -- {}",
                p.completed,
                p.total,
                p.current_path.display()
            ))),
            Event::Extract(ExtractEvent::ImageFailed { message, .. })
            | Event::Extract(ExtractEvent::FaceFailed { message, .. }) => {
                Some(Line::Err(format!("{} {}", style("Error:").red(), message)))
            }
            Event::Extract(ExtractEvent::ImageSkipped { path, faces }) => Some(self.info(format!(
                "{} {} ({} faces)",
                style("Skipping photo").yellow(),
                path.display(),
                faces
            ))),
            Event::Extract(ExtractEvent::FaceWritten { output, .. }) if self.verbose => {
                Some(self.info(format!("  {} {}", style("+").green(), output.display())))
            }
            _ => None,
        }
    }

    fn done_line(&self) -> Line {
        self.info(format!("{} Done", style("✓").green().bold()))
    }

    fn info(&self, text: String) -> Line {
        if self.format == OutputFormat::Pretty {
            Line::Out(text)
        } else {
            Line::Err(text)
        }
    }
}

fn emit(pb: &ProgressBar, line: Line) {
    pb.suspend(|| match line {
        Line::Out(text) => println!("{text}"),
        Line::Err(text) => eprintln!("{text}"),
    });
}

fn run_extract(cli: Cli) -> Result<(), FaceExtractorError> {
    let term = Term::stdout();
    let pretty = cli.output_format == OutputFormat::Pretty;

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Face Extractor").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let detector = RustfaceDetector::from_file(&cli.model, DetectorConfig::default())?;

    let mut builder = Pipeline::builder()
        .input_dir(cli.input.clone())
        .detect_all_faces(!cli.single_face())
        .margin_factor(cli.margin)
        .jpeg_quality(cli.quality)
        .skip_hidden(cli.skip_hidden)
        .detector(Arc::new(detector));

    if let Some(output) = cli.output.clone() {
        builder = builder.output_dir(output);
    }
    if let Some(secs) = cli.timeout_secs {
        builder = builder.detect_timeout(Duration::from_secs(secs));
    }

    let pipeline = builder.build()?;

    let (sender, receiver) = EventChannel::new();

    let reporter = Reporter {
        format: cli.output_format,
        verbose: cli.verbose,
        live_bar: pretty && term.is_term(),
    };

    // The bar redraws in place on a terminal; elsewhere the reporter prints
    // one plain line per photo instead
    let progress = if reporter.live_bar {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        pb.set_style(
            ProgressStyle::with_template("{pos}/{len} -- {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let progress_clone = progress.clone();
    let done = reporter.done_line();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let pb = progress_clone;
        for event in receiver.iter() {
            match &event {
                Event::Scan(ScanEvent::Completed { total_images }) => {
                    pb.set_length(*total_images as u64);
                }
                Event::Extract(ExtractEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    pb.set_message(p.current_path.display().to_string());
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish();
                }
                _ => {}
            }
            if let Some(line) = reporter.line_for(&event) {
                emit(&pb, line);
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;
    emit(&progress, done);

    match cli.output_format {
        OutputFormat::Pretty => print_pretty_results(&term, &result),
        OutputFormat::Json => print_json_results(&result),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, result: &PipelineResult) {
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} photos processed in {:.1}s",
        style(result.total_images).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} faces saved to {}",
        style(result.faces.len()).cyan(),
        result.output_dir.display()
    ))
    .ok();

    if result.images_skipped > 0 {
        term.write_line(&format!(
            "  {} photos skipped (more than one face)",
            style(result.images_skipped).yellow()
        ))
        .ok();
    }

    if !result.errors.is_empty() {
        term.write_line(&format!(
            "  {} errors ({} photos could not be read)",
            style(result.errors.len()).red(),
            result.images_failed
        ))
        .ok();
    }
}

fn print_json_results(result: &PipelineResult) {
    let output = serde_json::json!({
        "total_images": result.total_images,
        "faces_written": result.faces.len(),
        "images_skipped": result.images_skipped,
        "images_failed": result.images_failed,
        "output_dir": result.output_dir,
        "duration_ms": result.duration_ms,
        "errors": result.errors,
        "faces": result.faces,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("{} {}", style("Error:").red(), e),
    }
}

fn print_minimal_results(result: &PipelineResult) {
    for face in &result.faces {
        println!("{}", face.output.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_extractor::events::ExtractProgress;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(normalize_args(args.iter().map(OsString::from)))
    }

    #[test]
    fn input_alone_extracts_all_faces() {
        let cli = parse(&["face-extract", "/photos"]);
        assert_eq!(cli.input, PathBuf::from("/photos"));
        assert!(cli.output.is_none());
        assert!(!cli.single_face());
    }

    #[test]
    fn single_dash_one_switches_to_single_face_mode() {
        let cli = parse(&["face-extract", "/photos", "/faces", "-one"]);
        assert_eq!(cli.output, Some(PathBuf::from("/faces")));
        assert!(cli.one);
        assert!(cli.single_face());
    }

    #[test]
    fn any_other_third_word_keeps_every_face() {
        let cli = parse(&["face-extract", "/photos", "/faces", "all"]);
        assert_eq!(cli.mode.as_deref(), Some("all"));
        assert!(!cli.single_face());
    }

    #[test]
    fn escaped_one_token_is_read_as_the_mode() {
        let cli = parse(&["face-extract", "/photos", "/faces", "--", "-one"]);
        assert_eq!(cli.mode.as_deref(), Some("-one"));
        assert!(!cli.one);
        assert!(cli.single_face());
    }

    #[test]
    fn defaults_match_the_library() {
        let cli = parse(&["face-extract", "/photos"]);
        assert_eq!(cli.margin, 0.6);
        assert_eq!(cli.quality, 75);
        assert!(cli.timeout_secs.is_none());
    }

    #[test]
    fn missing_input_is_a_usage_error() {
        let result = Cli::try_parse_from(["face-extract"]);
        assert!(result.is_err());
    }

    fn reporter(format: OutputFormat, live_bar: bool) -> Reporter {
        Reporter {
            format,
            verbose: true,
            live_bar,
        }
    }

    fn progress_event() -> Event {
        Event::Extract(ExtractEvent::Progress(ExtractProgress {
            completed: 2,
            total: 5,
            current_path: PathBuf::from("/photos/b.jpg"),
        }))
    }

    fn skipped_event() -> Event {
        Event::Extract(ExtractEvent::ImageSkipped {
            path: PathBuf::from("/photos/group.jpg"),
            faces: 3,
        })
    }

    fn written_event() -> Event {
        Event::Extract(ExtractEvent::FaceWritten {
            source: PathBuf::from("/photos/a.jpg"),
            output: PathBuf::from("/faces/x.jpg"),
        })
    }

    fn text(line: Option<Line>) -> String {
        match line {
            Some(Line::Out(text)) | Some(Line::Err(text)) => text,
            None => String::new(),
        }
    }

    #[test]
    fn machine_readable_formats_keep_stdout_clean() {
        for format in [OutputFormat::Json, OutputFormat::Minimal] {
            let reporter = reporter(format, false);
            for event in [progress_event(), skipped_event(), written_event()] {
                assert!(matches!(reporter.line_for(&event), Some(Line::Err(_))));
            }
            assert!(matches!(reporter.done_line(), Line::Err(_)));
        }
    }

    #[test]
    fn pretty_format_prints_informational_lines_to_stdout() {
        let reporter = reporter(OutputFormat::Pretty, true);
        assert!(matches!(reporter.line_for(&skipped_event()), Some(Line::Out(_))));
        assert!(matches!(reporter.line_for(&written_event()), Some(Line::Out(_))));
        assert!(matches!(reporter.done_line(), Line::Out(_)));
    }

    #[test]
    fn errors_always_go_to_stderr() {
        let failed = Event::Extract(ExtractEvent::ImageFailed {
            path: PathBuf::from("/photos/d.jpg"),
            message: "Failed to decode".to_string(),
        });
        for format in [OutputFormat::Pretty, OutputFormat::Json] {
            let line = reporter(format, false).line_for(&failed);
            assert!(matches!(&line, Some(Line::Err(_))));
            assert!(text(line).contains("Failed to decode"));
        }
    }

    #[test]
    fn plain_progress_lines_replace_the_bar_off_a_terminal() {
        let live = reporter(OutputFormat::Pretty, true);
        assert!(live.line_for(&progress_event()).is_none());

        let piped = reporter(OutputFormat::Pretty, false);
        let line = piped.line_for(&progress_event());
        assert!(matches!(&line, Some(Line::Out(_))));
        assert_eq!(text(line), "2/5 -- /photos/b.jpg");
    }

    #[test]
    fn written_faces_print_only_when_verbose() {
        let quiet = Reporter {
            format: OutputFormat::Pretty,
            verbose: false,
            live_bar: true,
        };
        assert!(quiet.line_for(&written_event()).is_none());

        let line = reporter(OutputFormat::Pretty, true).line_for(&written_event());
        assert!(text(line).contains("/faces/x.jpg"));
    }

    #[test]
    fn done_line_is_printed_in_every_format() {
        for format in [OutputFormat::Pretty, OutputFormat::Json, OutputFormat::Minimal] {
            let line = reporter(format, false).done_line();
            assert!(text(Some(line)).contains("Done"));
        }
    }
}
