//! Classify raw image URLs and normalize them to their largest variant.
//!
//! Pure string-in/string-out so it is testable against literals.

use regex::Regex;

/// Path segment of the largest available image variant.
const LARGEST_SEGMENT: &str = "/originals/";

/// Markers of thumbnail and avatar variants that never qualify.
const THUMBNAIL_MARKERS: &[&str] = &["75x75_RS", "/30x30_RS/", "avatar"];

/// Decides whether a raw URL is a qualifying content image and rewrites it
/// to its canonical highest-quality form.
pub struct UrlClassifier {
    image_host: String,
    size_bucket: Regex,
}

impl UrlClassifier {
    /// Build a classifier for image URLs on `image_host`.
    pub fn new(image_host: &str) -> Self {
        Self {
            image_host: image_host.to_string(),
            // Width buckets like /236x/, /474x/, /564x/, /736x/. Square
            // variants (/75x75_RS/ etc.) are avatars and do not match.
            size_bucket: Regex::new(r"/\d+x/").expect("size bucket pattern is valid"),
        }
    }

    /// Classify a raw URL.
    ///
    /// Returns the normalized largest-variant URL, or `None` when the URL is
    /// off-host, a thumbnail/avatar variant, or in no recognized size form.
    pub fn classify(&self, raw: &str) -> Option<String> {
        if !raw.contains(&self.image_host) {
            return None;
        }
        if THUMBNAIL_MARKERS.iter().any(|m| raw.contains(m)) {
            return None;
        }
        if raw.contains(LARGEST_SEGMENT) {
            return Some(raw.to_string());
        }
        if self.size_bucket.is_match(raw) {
            return Some(self.size_bucket.replace(raw, LARGEST_SEGMENT).into_owned());
        }
        None
    }
}
