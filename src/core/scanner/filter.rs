//! Decides which directory entries are photos.

use std::collections::HashSet;
use std::path::Path;

/// Accepts files by extension, case-insensitively
pub struct ImageFilter {
    extensions: HashSet<String>,
    skip_hidden: bool,
}

impl ImageFilter {
    /// Create a filter accepting `.png`, `.jpg` and `.jpeg`
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png"].iter().map(|e| e.to_string()).collect(),
            skip_hidden: false,
        }
    }

    /// Reject dot-files such as `._IMG_0001.jpg` resource forks
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if self.skip_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_any_case() {
        let filter = ImageFilter::new();
        assert!(filter.should_include(Path::new("/photos/image.jpg")));
        assert!(filter.should_include(Path::new("/photos/image.JPEG")));
        assert!(filter.should_include(Path::new("/photos/image.Png")));
    }

    #[test]
    fn filter_excludes_non_images() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/photos/notes.txt")));
        assert!(!filter.should_include(Path::new("/photos/clip.mp4")));
        assert!(!filter.should_include(Path::new("/photos/IMG_1234.HEIC")));
    }

    #[test]
    fn filter_matches_suffix_not_substring() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/photos/holiday.jpg.txt")));
        assert!(!filter.should_include(Path::new("/photos/png")));
    }

    #[test]
    fn hidden_files_are_kept_unless_asked() {
        let filter = ImageFilter::new();
        assert!(filter.should_include(Path::new("/photos/.hidden.jpg")));

        let filter = ImageFilter::new().with_skip_hidden(true);
        assert!(!filter.should_include(Path::new("/photos/.hidden.jpg")));
    }
}
