//! Collapsible review comment excerpts.

/// Comments at least this many characters long are collapsed.
pub const COMMENT_EXCERPT_CHARS: usize = 150;

/// A review comment split for "Show more..." display.
///
/// `visible + hidden` always equals the trimmed comment. Lengths are counted
/// in characters, so multi-byte text is never cut inside a code point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentExcerpt {
    visible: String,
    hidden: Option<String>,
}

impl CommentExcerpt {
    /// Split `comment` at [`COMMENT_EXCERPT_CHARS`].
    #[must_use]
    pub fn new(comment: &str) -> Self {
        Self::with_threshold(comment, COMMENT_EXCERPT_CHARS)
    }

    /// Split `comment` at `threshold` characters.
    ///
    /// A trimmed comment shorter than `threshold` is kept whole. Otherwise the
    /// first `threshold` characters are visible and the rest (possibly empty)
    /// is hidden.
    #[must_use]
    pub fn with_threshold(comment: &str, threshold: usize) -> Self {
        let text = comment.trim();
        match text.char_indices().nth(threshold) {
            Some((split, _)) => {
                let (visible, hidden) = text.split_at(split);
                Self {
                    visible: visible.to_owned(),
                    hidden: Some(hidden.to_owned()),
                }
            }
            None if text.chars().count() == threshold => Self {
                visible: text.to_owned(),
                hidden: Some(String::new()),
            },
            None => Self {
                visible: text.to_owned(),
                hidden: None,
            },
        }
    }

    /// Text shown before expanding.
    #[must_use]
    pub fn visible(&self) -> &str {
        &self.visible
    }

    /// Text revealed by "Show more...", if the comment was split.
    #[must_use]
    pub fn hidden(&self) -> Option<&str> {
        self.hidden.as_deref()
    }

    /// Whether the "Show more..." control should be displayed.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.hidden.is_some()
    }

    /// Rejoin both halves.
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut text = self.visible.clone();
        if let Some(hidden) = &self.hidden {
            text.push_str(hidden);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_comment_is_not_split() {
        let comment = "x".repeat(149);
        let excerpt = CommentExcerpt::new(&comment);
        assert!(!excerpt.is_truncated());
        assert_eq!(excerpt.visible(), comment);
        assert_eq!(excerpt.hidden(), None);
    }

    #[test]
    fn test_comment_at_threshold_is_split_with_empty_remainder() {
        let comment = "y".repeat(150);
        let excerpt = CommentExcerpt::new(&comment);
        assert!(excerpt.is_truncated());
        assert_eq!(excerpt.visible().chars().count(), 150);
        assert_eq!(excerpt.hidden(), Some(""));
    }

    #[test]
    fn test_long_comment_split_at_index_150() {
        let comment = format!("{}{}", "a".repeat(150), "tail end");
        let excerpt = CommentExcerpt::new(&comment);
        assert_eq!(excerpt.visible(), "a".repeat(150));
        assert_eq!(excerpt.hidden(), Some("tail end"));
        assert_eq!(excerpt.full_text(), comment);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let comment = "é".repeat(160);
        let excerpt = CommentExcerpt::new(&comment);
        assert_eq!(excerpt.visible().chars().count(), 150);
        assert_eq!(excerpt.hidden().map(|h| h.chars().count()), Some(10));
        assert_eq!(excerpt.full_text(), comment);
    }

    #[test]
    fn test_comment_is_trimmed_before_measuring() {
        let comment = format!("   {}   ", "z".repeat(149));
        let excerpt = CommentExcerpt::new(&comment);
        assert!(!excerpt.is_truncated());
        assert_eq!(excerpt.visible(), "z".repeat(149));
    }

    #[test]
    fn test_custom_threshold() {
        let excerpt = CommentExcerpt::with_threshold("abcdef", 4);
        assert_eq!(excerpt.visible(), "abcd");
        assert_eq!(excerpt.hidden(), Some("ef"));
    }
}
