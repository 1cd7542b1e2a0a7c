//! Rope-backed reference editing surface.
//!
//! `PlainEditor` drives a [`TextProcessor`] the way an interactive text view
//! would: every content mutation is bracketed by the pre-replacement,
//! pre-edit and post-edit notifications, and selection changes produce
//! selection-only notifications.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use smol_str::SmolStr;

use crate::actions::{EditedMask, Key, Modifiers, Range};
use crate::config::DispatcherConfig;
use crate::dispatch::{Dispatch, Phase, TextProcessor};
use crate::error::EditorError;
use crate::processor::ProcessorRef;
use crate::surface::{EditorSurface, ExecutionReport};
use crate::text::{EditorRope, TextBuffer};
use crate::types::Selection;

type Listener = Rc<dyn Fn(&ExecutionReport)>;

/// Marks the editor as being bulk-set until dropped, restoring the previous
/// flag so nested bulk sets unwind correctly.
struct BulkSetGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> BulkSetGuard<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for BulkSetGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// Simple editing surface with plain fields.
///
/// Always lives in an `Rc` because its dispatcher points back at it.
pub struct PlainEditor {
    buffer: RefCell<EditorRope>,
    selection: Cell<Selection>,
    bulk_set: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
    processor: TextProcessor,
}

impl PlainEditor {
    /// Create an editor holding `content`, with the default dispatcher
    /// configuration.
    pub fn new(content: &str) -> Rc<Self> {
        Self::with_config(content, DispatcherConfig::default())
    }

    pub fn with_config(content: &str, config: DispatcherConfig) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let surface: Weak<dyn EditorSurface> = weak.clone();
            Self {
                buffer: RefCell::new(EditorRope::from_str(content)),
                selection: Cell::new(Selection::default()),
                bulk_set: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
                processor: TextProcessor::with_config(surface, config),
            }
        })
    }

    /// The dispatcher owned by this editor.
    pub fn processor(&self) -> &TextProcessor {
        &self.processor
    }

    pub fn register(&self, processor: ProcessorRef) {
        self.processor.register(processor);
    }

    pub fn register_all(&self, processors: impl IntoIterator<Item = ProcessorRef>) {
        self.processor.register_all(processors);
    }

    pub fn unregister(&self, processor: &ProcessorRef) {
        self.processor.unregister(processor);
    }

    pub fn unregister_all(&self, processors: &[ProcessorRef]) {
        self.processor.unregister_all(processors);
    }

    /// Listen for the processors executed on each content edit. Listeners run
    /// in the order they were added.
    pub fn add_listener(&self, listener: impl Fn(&ExecutionReport) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    // === Content access ===

    pub fn text(&self) -> String {
        self.buffer.borrow().to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.borrow().len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.buffer.borrow().char_at(offset)
    }

    pub fn selection(&self) -> Selection {
        self.selection.get()
    }

    fn check_bounds(&self, range: Range) -> Result<(), EditorError> {
        let len = self.len_chars();
        if range.end > len {
            return Err(EditorError::OutOfBounds { range, len });
        }
        Ok(())
    }

    // === Mutations ===

    /// Replace `range` with `text`, notifying processors around the change.
    ///
    /// Returns the outcome of content processing. A rejected reentrant edit
    /// leaves the content untouched.
    pub fn replace(&self, range: Range, text: &str) -> Result<Dispatch, EditorError> {
        let range = range.normalize();
        self.check_bounds(range)?;
        self.processor
            .ensure_can_dispatch(Phase::WillProcessDeletedText)?;

        let deleted = self
            .buffer
            .borrow()
            .slice(range.into())
            .unwrap_or_default();
        self.processor
            .will_process_deleted_text(&deleted, text, range)?;

        // A nested edit from a pre-replacement hook may have shrunk the content.
        self.check_bounds(range)?;
        self.buffer.borrow_mut().replace(range.into(), text);

        let inserted_len = text.chars().count();
        let edited = Range::new(range.start, range.start + inserted_len);
        let delta = inserted_len as isize - range.len() as isize;
        self.selection.set(Selection::collapsed(edited.end));
        tracing::trace!(target: "weft::editor", %range, %edited, delta, "content replaced");

        let outcome = self
            .processor
            .will_process_editing(EditedMask::CHARACTERS, edited, delta)?;
        self.processor
            .did_process_editing(EditedMask::CHARACTERS, edited, delta)?;
        Ok(outcome)
    }

    pub fn insert(&self, offset: usize, text: &str) -> Result<Dispatch, EditorError> {
        self.replace(Range::caret(offset), text)
    }

    pub fn delete(&self, range: Range) -> Result<Dispatch, EditorError> {
        self.replace(range, "")
    }

    /// Type `text` at the current selection, replacing it.
    pub fn type_text(&self, text: &str) -> Result<Dispatch, EditorError> {
        self.replace(self.selection().to_range(), text)
    }

    /// Replace the whole content programmatically. Only processors that run
    /// during bulk sets see the notifications.
    pub fn set_content(&self, text: &str) -> Result<Dispatch, EditorError> {
        let _bulk = BulkSetGuard::new(&self.bulk_set);
        let len = self.len_chars();
        self.replace(Range::new(0, len), text)
    }

    /// Move the selection. Processors see a selection-only notification.
    pub fn set_selection(&self, selection: Selection) -> Result<Dispatch, EditorError> {
        let range = selection.to_range();
        self.check_bounds(range)?;
        self.processor.ensure_can_dispatch(Phase::WillProcessEditing)?;

        self.selection.set(selection);
        let outcome = self
            .processor
            .will_process_editing(EditedMask::empty(), range, 0)?;
        self.processor
            .did_process_editing(EditedMask::empty(), range, 0)?;
        Ok(outcome)
    }

    /// Forward a key press at the current selection to the processors.
    pub fn send_key(&self, key: &Key, modifiers: Modifiers) -> Result<Dispatch, EditorError> {
        let range = self.selection().to_range();
        Ok(self.processor.forward_key(key, modifiers, range)?)
    }
}

impl EditorSurface for PlainEditor {
    fn is_bulk_content_set(&self) -> bool {
        self.bulk_set.get()
    }

    fn text_in(&self, range: Range) -> Option<SmolStr> {
        self.buffer.borrow().slice(range.into())
    }

    fn did_execute_processors(&self, report: &ExecutionReport) {
        // Snapshot so a listener may add listeners.
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in &listeners {
            listener(report);
        }
    }
}

impl std::fmt::Debug for PlainEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainEditor")
            .field("len_chars", &self.len_chars())
            .field("selection", &self.selection.get())
            .field("bulk_set", &self.bulk_set.get())
            .field("processor", &self.processor)
            .finish_non_exhaustive()
    }
}
