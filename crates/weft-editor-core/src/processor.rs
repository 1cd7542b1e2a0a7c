//! The processor capability contract.
//!
//! A processor is a named, prioritized unit of editing behaviour (list
//! continuation, markdown shortcuts, auto-formatting). Processors are owned by
//! whoever creates them; the dispatcher only keeps `Rc` handles.

use std::fmt;
use std::rc::Rc;

use crate::actions::{Key, Modifiers, Range};
use crate::surface::EditorSurface;
use crate::types::EditEvent;

/// Shared handle to a registered processor.
pub type ProcessorRef = Rc<dyn TextProcessing>;

/// Ordering tier of a processor. Higher runs first.
///
/// `EXCLUSIVE` is the maximum value; a processor at that tier that reports
/// having acted stops every lower-priority processor for the same edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u16);

impl Priority {
    pub const LOW: Self = Self(250);
    pub const MEDIUM: Self = Self(500);
    pub const HIGH: Self = Self(750);
    pub const EXCLUSIVE: Self = Self(1000);

    /// Custom priority. Values above `EXCLUSIVE` are clamped to it.
    pub const fn new(value: u16) -> Self {
        if value > Self::EXCLUSIVE.0 {
            Self::EXCLUSIVE
        } else {
            Self(value)
        }
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub const fn is_exclusive(self) -> bool {
        self.0 == Self::EXCLUSIVE.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::LOW => f.write_str("low"),
            Self::MEDIUM => f.write_str("medium"),
            Self::HIGH => f.write_str("high"),
            Self::EXCLUSIVE => f.write_str("exclusive"),
            Self(v) => write!(f, "{v}"),
        }
    }
}

/// Editing behaviour driven by the dispatcher.
///
/// Only `name`, `priority` and `process` are required. Every other hook is a
/// no-op unless overridden. Hooks take `&self`: keep mutable state behind
/// `Cell`/`RefCell`.
///
/// Names identify processors for unregistration and interruption. They are
/// not required to be unique, but every processor sharing a name is treated
/// as the same processor by those operations.
pub trait TextProcessing {
    /// Identifier used for unregistration.
    fn name(&self) -> &str;

    /// Ordering tier.
    fn priority(&self) -> Priority;

    /// Whether this processor also runs while the surface's content is being
    /// replaced programmatically.
    fn runs_during_bulk_set(&self) -> bool {
        false
    }

    /// Called before content processing for every notification, including
    /// selection-only ones.
    fn will_process_editing(&self, editor: &dyn EditorSurface, edit: &EditEvent) {
        let _ = (editor, edit);
    }

    /// React to a content change. Returns true if the processor acted.
    fn process(&self, editor: &dyn EditorSurface, range: Range, change_in_length: isize) -> bool;

    /// Called once the edit has been applied to the backing content.
    fn did_process_editing(&self, editor: &dyn EditorSurface, edit: &EditEvent) {
        let _ = (editor, edit);
    }

    /// Called before the surface commits a replace-range operation.
    fn will_process(
        &self,
        editor: &dyn EditorSurface,
        deleted_text: &str,
        inserted_text: &str,
        range: Range,
    ) {
        let _ = (editor, deleted_text, inserted_text, range);
    }

    /// Key event, either forwarded by the surface or synthesized from an
    /// inserted newline or tab.
    fn handle_key_with_modifiers(
        &self,
        editor: &dyn EditorSurface,
        key: &Key,
        modifiers: Modifiers,
        range: Range,
    ) {
        let _ = (editor, key, modifiers, range);
    }

    /// An exclusive processor preempted processing of the edit at `range`.
    /// Discard any speculative state for it.
    fn process_interrupted(&self, editor: &dyn EditorSurface, range: Range) {
        let _ = (editor, range);
    }
}

impl fmt::Debug for dyn TextProcessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextProcessing")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .field("runs_during_bulk_set", &self.runs_during_bulk_set())
            .finish()
    }
}
