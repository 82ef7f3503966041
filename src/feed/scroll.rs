/// Default distance from the bottom, in rows, that counts as "near the end".
pub const DEFAULT_SCROLL_THRESHOLD: usize = 2;

/// Detects when a scrolled viewport is close to the end of its content.
///
/// Stateless: it may report "near bottom" for every scroll event in a row.
/// Deduplicating the resulting loads is the controller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollProximity {
    threshold: usize,
}

impl Default for ScrollProximity {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD)
    }
}

impl ScrollProximity {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// True when `offset` (first visible row) is within the threshold of the
    /// largest reachable offset for `content_rows` shown in `viewport_rows`.
    ///
    /// Content shorter than the viewport is always near the bottom.
    pub fn is_near_bottom(&self, offset: usize, viewport_rows: usize, content_rows: usize) -> bool {
        let max_offset = content_rows.saturating_sub(viewport_rows);
        offset.saturating_add(self.threshold) >= max_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_far_from_bottom() {
        let detector = ScrollProximity::new(2);
        assert!(!detector.is_near_bottom(0, 10, 100));
        assert!(!detector.is_near_bottom(87, 10, 100));
    }

    #[test]
    fn test_within_threshold() {
        let detector = ScrollProximity::new(2);
        // max offset is 90
        assert!(detector.is_near_bottom(88, 10, 100));
        assert!(detector.is_near_bottom(90, 10, 100));
    }

    #[test]
    fn test_short_content_always_near_bottom() {
        let detector = ScrollProximity::new(0);
        assert!(detector.is_near_bottom(0, 10, 3));
        assert!(detector.is_near_bottom(0, 10, 0));
    }

    #[test]
    fn test_zero_threshold_requires_exact_bottom() {
        let detector = ScrollProximity::new(0);
        assert!(!detector.is_near_bottom(89, 10, 100));
        assert!(detector.is_near_bottom(90, 10, 100));
    }
}
