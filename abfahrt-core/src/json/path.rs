//! Slash-joined container path tracking
//!
//! Mirrors the tokenizer's structural events as an ordered stack of open
//! container keys. The "full path" is the joined stack plus the most recent
//! key, so a scalar under `{"stationboard":[{"stop":{"departure":...}}]}`
//! is seen at `/stationboard/stop/departure`. Array elements push an empty
//! segment that is skipped when joining, which is what makes suffix matching
//! independent of nesting depth.

use heapless::{String, Vec};

use super::tokenizer::{JsonEvent, MAX_DEPTH, MAX_KEY_LEN};

/// Maximum length of a joined path
pub const MAX_PATH_LEN: usize = 128;

/// Stack of open container keys plus the current leaf key
#[derive(Debug, Default)]
pub struct PathTracker {
    segments: Vec<String<MAX_KEY_LEN>, MAX_DEPTH>,
    current_key: String<MAX_KEY_LEN>,
}

impl PathTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new document
    pub fn reset(&mut self) {
        self.segments.clear();
        self.current_key.clear();
    }

    /// Update the tracker with one structural event
    ///
    /// Scalars and DocumentEnd leave the path untouched; the caller reads
    /// the path while handling the scalar, then the next key replaces it.
    pub fn observe(&mut self, event: &JsonEvent) {
        match event {
            JsonEvent::Key(key) => {
                self.current_key.clear();
                let _ = self.current_key.push_str(key);
            }
            JsonEvent::ObjectStart | JsonEvent::ArrayStart => {
                // Array elements carry no key and push an empty segment
                let _ = self.segments.push(core::mem::take(&mut self.current_key));
            }
            JsonEvent::ObjectEnd | JsonEvent::ArrayEnd => {
                self.segments.pop();
                self.current_key.clear();
            }
            JsonEvent::Scalar(_) | JsonEvent::DocumentEnd => {}
        }
    }

    /// Current container nesting depth
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Build the full slash-joined path (stack + current key)
    pub fn full_path(&self) -> String<MAX_PATH_LEN> {
        let mut path = String::new();
        for segment in self.segments.iter().filter(|s| !s.is_empty()) {
            let _ = path.push('/');
            let _ = path.push_str(segment);
        }
        let _ = path.push('/');
        let _ = path.push_str(&self.current_key);
        path
    }

    /// True if the full path ends with `suffix`
    ///
    /// Suffixes start with `/`, so matching is boundary-safe on the left.
    pub fn matches_suffix(&self, suffix: &str) -> bool {
        self.full_path().ends_with(suffix)
    }

    /// True if the full path equals `path` exactly
    pub fn matches(&self, path: &str) -> bool {
        self.full_path() == path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::Tokenizer;

    fn drive(tracker: &mut PathTracker, doc: &str) -> std::vec::Vec<std::string::String> {
        let mut tok = Tokenizer::new();
        let mut scalar_paths = std::vec::Vec::new();
        for &b in doc.as_bytes() {
            tok.feed(b).unwrap();
            while let Some(ev) = tok.next_event() {
                if matches!(ev, JsonEvent::Scalar(_)) {
                    scalar_paths.push(std::string::String::from(tracker.full_path().as_str()));
                }
                tracker.observe(&ev);
            }
        }
        scalar_paths
    }

    #[test]
    fn test_every_start_pushes_every_end_pops() {
        let mut tracker = PathTracker::new();
        drive(&mut tracker, r#"{"a":{"b":[{"c":1}]}}"#);
        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn test_array_elements_are_transparent_in_path() {
        let mut tracker = PathTracker::new();
        let paths = drive(
            &mut tracker,
            r#"{"stationboard":[{"stop":{"departure":"x"}},{"stop":{"departure":"y"}}]}"#,
        );
        assert_eq!(paths, ["/stationboard/stop/departure"; 2]);
    }

    #[test]
    fn test_station_name_path() {
        let mut tracker = PathTracker::new();
        let paths = drive(&mut tracker, r#"{"station":{"id":"8505000","name":"Luzern"}}"#);
        assert_eq!(paths, ["/station/id", "/station/name"]);
    }

    #[test]
    fn test_suffix_matching() {
        let mut tracker = PathTracker::new();
        let mut tok = Tokenizer::new();
        let doc = br#"{"stationboard":[{"stop":{"departure":"2024-01-01T12:34:00+0100"#;
        for &b in doc.iter() {
            tok.feed(b).unwrap();
            while let Some(ev) = tok.next_event() {
                tracker.observe(&ev);
            }
        }
        assert!(tracker.matches_suffix("/stop/departure"));
        assert!(tracker.matches_suffix("/departure"));
        assert!(!tracker.matches_suffix("/delay"));
        assert!(!tracker.matches("/stop/departure"));
    }

    #[test]
    fn test_key_does_not_go_stale_after_container_end() {
        let mut tracker = PathTracker::new();
        let paths = drive(&mut tracker, r#"{"a":{"b":1},"c":2}"#);
        assert_eq!(paths, ["/a/b", "/c"]);
    }
}
