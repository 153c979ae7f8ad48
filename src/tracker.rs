use std::collections::HashMap;

/// In-memory map of profile -> last engaged post reference.
///
/// Entries are created lazily and only ever overwritten with a different
/// reference after a full successful engagement cycle; they are never
/// cleared. State is volatile — a restart treats every profile as never
/// engaged, and only the duplicate-ref check guards against a re-post.
pub struct PostTracker {
    last_engaged: HashMap<String, String>,
}

impl Default for PostTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PostTracker {
    pub fn new() -> Self {
        Self {
            last_engaged: HashMap::new(),
        }
    }

    pub fn get(&self, profile: &str) -> Option<&str> {
        self.last_engaged.get(profile).map(String::as_str)
    }

    pub fn record(&mut self, profile: &str, post_ref: &str) {
        self.last_engaged
            .insert(profile.to_string(), post_ref.to_string());
    }

    pub fn count(&self) -> usize {
        self.last_engaged.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_empty() {
        let tracker = PostTracker::new();
        assert_eq!(tracker.count(), 0);
        assert!(tracker.get("someprofile").is_none());
    }

    #[test]
    fn test_record_and_get() {
        let mut tracker = PostTracker::new();
        tracker.record("someprofile", "https://example.com/p/abc");

        assert_eq!(
            tracker.get("someprofile"),
            Some("https://example.com/p/abc")
        );
        assert_eq!(tracker.count(), 1);
    }

    #[test]
    fn test_record_overwrites() {
        let mut tracker = PostTracker::new();
        tracker.record("someprofile", "https://example.com/p/abc");
        tracker.record("someprofile", "https://example.com/p/def");

        assert_eq!(
            tracker.get("someprofile"),
            Some("https://example.com/p/def")
        );
        assert_eq!(tracker.count(), 1);
    }

    #[test]
    fn test_profiles_are_independent() {
        let mut tracker = PostTracker::new();
        tracker.record("a", "ref-a");
        tracker.record("b", "ref-b");

        assert_eq!(tracker.get("a"), Some("ref-a"));
        assert_eq!(tracker.get("b"), Some("ref-b"));
        assert!(tracker.get("c").is_none());
    }
}
