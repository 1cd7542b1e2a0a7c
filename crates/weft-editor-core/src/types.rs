//! Core editor types: selection and per-notification edit events.
//!
//! These types are framework-agnostic and can be used with any text buffer implementation.

use smol_str::SmolStr;

use crate::actions::{EditedMask, Range};

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is collapsed (empty, cursor only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the selection length.
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Check if empty (same as is_collapsed).
    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Convert to an ordered `Range`.
    pub fn to_range(&self) -> Range {
        Range::new(self.start(), self.end())
    }
}

/// One storage-change notification, as seen by processors.
///
/// Built by the dispatcher for each notification and dropped once the
/// notification's phases complete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditEvent {
    /// Which aspects of the storage changed.
    pub mask: EditedMask,
    /// Affected span after the edit, in chars.
    pub range: Range,
    /// Signed length delta. Zero for selection-only or attribute-only changes.
    pub change_in_length: isize,
    /// Text currently occupying `range`, when the surface could supply it.
    pub changed_text: Option<SmolStr>,
}

impl EditEvent {
    pub fn new(mask: EditedMask, range: Range, change_in_length: isize) -> Self {
        Self {
            mask,
            range,
            change_in_length,
            changed_text: None,
        }
    }

    pub fn with_changed_text(mut self, text: Option<SmolStr>) -> Self {
        self.changed_text = text;
        self
    }

    /// True when the notification carries an actual content change.
    pub fn changes_content(&self) -> bool {
        self.change_in_length != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bounds() {
        // Forward selection
        let sel = Selection::new(5, 10);
        assert_eq!(sel.start(), 5);
        assert_eq!(sel.end(), 10);

        // Backward selection
        let sel = Selection::new(10, 5);
        assert_eq!(sel.start(), 5);
        assert_eq!(sel.end(), 10);
        assert_eq!(sel.to_range(), Range::new(5, 10));
    }

    #[test]
    fn test_selection_collapsed() {
        let sel = Selection::collapsed(7);
        assert!(sel.is_collapsed());
        assert!(sel.is_empty());
        assert_eq!(sel.len(), 0);
    }

    #[test]
    fn test_edit_event_content_change() {
        let event = EditEvent::new(EditedMask::CHARACTERS, Range::new(3, 4), 1)
            .with_changed_text(Some("x".into()));
        assert!(event.changes_content());
        assert_eq!(event.changed_text.as_deref(), Some("x"));

        let event = EditEvent::new(EditedMask::empty(), Range::caret(3), 0);
        assert!(!event.changes_content());
    }
}
