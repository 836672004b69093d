//! Directory listing implementation using walkdir.

use super::{filter::ImageFilter, ImageRecord, ImageSource, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to ignore dot-files
    pub skip_hidden: bool,
}

/// Lists the top level of a directory with walkdir
pub struct DirectoryScanner {
    filter: ImageFilter,
}

impl DirectoryScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self {
            filter: ImageFilter::new().with_skip_hidden(config.skip_hidden),
        }
    }
}

impl ImageSource for DirectoryScanner {
    fn list_with_events(
        &self,
        dir: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        if !dir.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            path: dir.to_path_buf(),
        }));

        let mut images = Vec::new();
        let mut errors = Vec::new();

        // Links are followed so a symlinked photo is judged by its target;
        // depth 1 keeps linked directories from being entered
        let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                // The root itself could not be read: nothing can be listed
                Err(e) if e.depth() == 0 => {
                    return Err(ScanError::ReadDirectory {
                        path: dir.to_path_buf(),
                        source: std::io::Error::from(e),
                    });
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    errors.push(ScanError::ReadDirectory {
                        path,
                        source: std::io::Error::from(e),
                    });
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !self.filter.should_include(path) {
                debug!(path = %path.display(), "ignoring entry");
                continue;
            }

            events.send(Event::Scan(ScanEvent::ImageFound {
                path: path.to_path_buf(),
            }));

            images.push(ImageRecord {
                path: path.to_path_buf(),
                index: images.len(),
            });
        }

        if images.is_empty() {
            return Err(ScanError::NoImages {
                path: dir.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: images.len(),
        }));

        Ok(ScanResult { images, errors })
    }
}
