//! Edit-notification dispatch.
//!
//! [`TextProcessor`] sits between an editing surface and the registered
//! processors. The surface calls it around every storage change:
//!
//! 1. [`TextProcessor::will_process_deleted_text`] before a replace is
//!    committed,
//! 2. [`TextProcessor::will_process_editing`] once the characters changed,
//!    which broadcasts the pre-edit hook, runs `process` in priority order
//!    and reports which processors acted,
//! 3. [`TextProcessor::did_process_editing`] once the edit is fully applied.
//!
//! All of it is synchronous and single-threaded. Each phase snapshots the
//! eligible processors before calling into them, so hooks may register or
//! unregister processors without disturbing the iteration in progress.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::actions::{EditedMask, Key, Modifiers, Range};
use crate::config::{DispatcherConfig, ReentrancyPolicy};
use crate::error::DispatchError;
use crate::processor::ProcessorRef;
use crate::registry::ProcessorRegistry;
use crate::surface::{EditorSurface, ExecutionReport};
use crate::types::EditEvent;

/// Notification entry points, used to label errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    WillProcessEditing,
    DidProcessEditing,
    WillProcessDeletedText,
    Key,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WillProcessEditing => "will-process-editing",
            Self::DidProcessEditing => "did-process-editing",
            Self::WillProcessDeletedText => "will-process-deleted-text",
            Self::Key => "key",
        })
    }
}

/// Outcome of one notification.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// The surface is gone; nothing ran.
    Skipped,
    /// No content change. Only pre-edit hooks ran and nothing was reported.
    SelectionOnly,
    /// An informational broadcast was delivered to the eligible processors.
    Broadcast,
    /// Content change processed; the report was also sent to the surface.
    Processed(ExecutionReport),
}

impl Dispatch {
    pub fn report(&self) -> Option<&ExecutionReport> {
        match self {
            Self::Processed(report) => Some(report),
            _ => None,
        }
    }

    pub fn into_report(self) -> Option<ExecutionReport> {
        match self {
            Self::Processed(report) => Some(report),
            _ => None,
        }
    }
}

/// Restores the nesting counter when a notification finishes, even if a
/// hook panics.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Priority-ordered dispatcher for editing notifications.
///
/// Holds the surface weakly: if the surface has been dropped every entry
/// point is a no-op returning [`Dispatch::Skipped`].
pub struct TextProcessor {
    registry: RefCell<ProcessorRegistry>,
    surface: Weak<dyn EditorSurface>,
    config: DispatcherConfig,
    depth: Cell<usize>,
}

impl TextProcessor {
    pub fn new(surface: Weak<dyn EditorSurface>) -> Self {
        Self::with_config(surface, DispatcherConfig::default())
    }

    pub fn with_config(surface: Weak<dyn EditorSurface>, config: DispatcherConfig) -> Self {
        Self {
            registry: RefCell::new(ProcessorRegistry::new()),
            surface,
            config,
            depth: Cell::new(0),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// The surface, if it is still alive.
    pub fn surface(&self) -> Option<Rc<dyn EditorSurface>> {
        self.surface.upgrade()
    }

    // === Registration ===

    pub fn register(&self, processor: ProcessorRef) {
        self.registry.borrow_mut().register(processor);
    }

    pub fn register_all(&self, processors: impl IntoIterator<Item = ProcessorRef>) {
        self.registry.borrow_mut().register_all(processors);
    }

    /// Removes every processor sharing `processor`'s name.
    pub fn unregister(&self, processor: &ProcessorRef) {
        self.registry.borrow_mut().unregister(processor);
    }

    pub fn unregister_all(&self, processors: &[ProcessorRef]) {
        self.registry.borrow_mut().unregister_all(processors);
    }

    pub fn unregister_named(&self, name: &str) {
        self.registry.borrow_mut().unregister_named(name);
    }

    /// Registered processors in registration order.
    pub fn active_processors(&self) -> Vec<ProcessorRef> {
        self.registry.borrow().active().to_vec()
    }

    /// Registered processors in dispatch order.
    pub fn sorted_processors(&self) -> Vec<ProcessorRef> {
        self.registry.borrow().sorted().to_vec()
    }

    /// Processors that would run if a notification arrived now. Empty when
    /// the surface is gone.
    pub fn eligible_processors(&self) -> Vec<ProcessorRef> {
        match self.surface.upgrade() {
            Some(surface) => self.registry.borrow().eligible_for(surface.as_ref()),
            None => Vec::new(),
        }
    }

    // === Reentrancy ===

    /// True while a notification is being dispatched.
    pub fn is_dispatching(&self) -> bool {
        self.depth.get() > 0
    }

    /// Check whether a notification for `phase` would be accepted right now.
    ///
    /// Surfaces call this before mutating their content so that an edit
    /// which cannot be dispatched is not applied either.
    pub fn ensure_can_dispatch(&self, phase: Phase) -> Result<(), DispatchError> {
        let depth = self.depth.get();
        if depth == 0 {
            return Ok(());
        }
        match self.config.reentrancy {
            ReentrancyPolicy::Reject => {
                tracing::warn!(target: "weft::dispatch", %phase, depth, "rejecting reentrant notification");
                Err(DispatchError::Reentrant { phase })
            }
            ReentrancyPolicy::Allow if depth >= self.config.max_depth => {
                tracing::warn!(
                    target: "weft::dispatch",
                    %phase,
                    limit = self.config.max_depth,
                    "dispatch nesting limit reached"
                );
                Err(DispatchError::DepthExceeded {
                    limit: self.config.max_depth,
                })
            }
            ReentrancyPolicy::Allow => Ok(()),
        }
    }

    fn enter(&self, phase: Phase) -> Result<DepthGuard<'_>, DispatchError> {
        self.ensure_can_dispatch(phase)?;
        self.depth.set(self.depth.get() + 1);
        Ok(DepthGuard { depth: &self.depth })
    }

    // === Notifications ===

    /// Characters or attributes in `range` changed by `change_in_length`.
    ///
    /// Every eligible processor sees the pre-edit hook. If the length did not
    /// change that is all. Otherwise each processor, highest priority first,
    /// gets a synthesized Enter/Tab key event when the changed text is exactly
    /// a newline/tab, then `process`. An exclusive processor that acts stops
    /// the chain and every other registered processor is told the edit was
    /// interrupted. The processors that acted are reported to the surface.
    pub fn will_process_editing(
        &self,
        mask: EditedMask,
        range: Range,
        change_in_length: isize,
    ) -> Result<Dispatch, DispatchError> {
        let Some(surface) = self.surface.upgrade() else {
            tracing::debug!(target: "weft::dispatch", "surface dropped, skipping will-process-editing");
            return Ok(Dispatch::Skipped);
        };
        let _guard = self.enter(Phase::WillProcessEditing)?;
        let _span = tracing::debug_span!(
            target: "weft::dispatch",
            "will_process_editing",
            %range,
            change_in_length
        )
        .entered();

        let surface = surface.as_ref();
        let edit = EditEvent::new(mask, range, change_in_length)
            .with_changed_text(surface.text_in(range));
        let editable = self.registry.borrow().eligible_for(surface);

        for processor in &editable {
            tracing::trace!(target: "weft::dispatch", processor = processor.name(), "will_process_editing");
            processor.will_process_editing(surface, &edit);
        }

        // Selection moves and attribute-only changes stop here.
        if !edit.changes_content() {
            tracing::debug!(target: "weft::dispatch", "no content change");
            return Ok(Dispatch::SelectionOnly);
        }

        let synthesized = edit.changed_text.as_deref().and_then(Key::synthesized_for);
        let mut executed = Vec::new();
        let mut interrupted_by = None;

        for processor in &editable {
            if let Some(key) = &synthesized {
                tracing::trace!(target: "weft::dispatch", processor = processor.name(), ?key, "synthesized key");
                processor.handle_key_with_modifiers(surface, key, Modifiers::NONE, range);
            }

            let processed = processor.process(surface, range, change_in_length);
            tracing::trace!(target: "weft::dispatch", processor = processor.name(), processed, "process");

            if !processed {
                continue;
            }
            executed.push(processor.clone());

            if processor.priority().is_exclusive() {
                self.notify_interruption(processor, surface, range);
                interrupted_by = Some(processor.clone());
                break;
            }
        }

        let report = ExecutionReport {
            executed,
            range,
            interrupted_by,
        };
        tracing::debug!(
            target: "weft::dispatch",
            executed = ?report.executed_names(),
            interrupted = report.was_interrupted(),
            "edit processed"
        );
        surface.did_execute_processors(&report);
        Ok(Dispatch::Processed(report))
    }

    /// The edit has been applied to the backing content. Broadcast to every
    /// eligible processor, whatever the length change.
    pub fn did_process_editing(
        &self,
        mask: EditedMask,
        range: Range,
        change_in_length: isize,
    ) -> Result<Dispatch, DispatchError> {
        let Some(surface) = self.surface.upgrade() else {
            tracing::debug!(target: "weft::dispatch", "surface dropped, skipping did-process-editing");
            return Ok(Dispatch::Skipped);
        };
        let _guard = self.enter(Phase::DidProcessEditing)?;

        let surface = surface.as_ref();
        let edit = EditEvent::new(mask, range, change_in_length)
            .with_changed_text(surface.text_in(range));
        let editable = self.registry.borrow().eligible_for(surface);

        for processor in &editable {
            tracing::trace!(target: "weft::dispatch", processor = processor.name(), "did_process_editing");
            processor.did_process_editing(surface, &edit);
        }
        Ok(Dispatch::Broadcast)
    }

    /// `deleted_text` in `range` is about to be replaced by `inserted_text`.
    pub fn will_process_deleted_text(
        &self,
        deleted_text: &str,
        inserted_text: &str,
        range: Range,
    ) -> Result<Dispatch, DispatchError> {
        let Some(surface) = self.surface.upgrade() else {
            tracing::debug!(target: "weft::dispatch", "surface dropped, skipping will-process-deleted-text");
            return Ok(Dispatch::Skipped);
        };
        let _guard = self.enter(Phase::WillProcessDeletedText)?;

        let surface = surface.as_ref();
        let editable = self.registry.borrow().eligible_for(surface);

        for processor in &editable {
            tracing::trace!(target: "weft::dispatch", processor = processor.name(), "will_process");
            processor.will_process(surface, deleted_text, inserted_text, range);
        }
        Ok(Dispatch::Broadcast)
    }

    /// Forward a key event from the surface to every eligible processor.
    pub fn forward_key(
        &self,
        key: &Key,
        modifiers: Modifiers,
        range: Range,
    ) -> Result<Dispatch, DispatchError> {
        let Some(surface) = self.surface.upgrade() else {
            return Ok(Dispatch::Skipped);
        };
        let _guard = self.enter(Phase::Key)?;

        let surface = surface.as_ref();
        let editable = self.registry.borrow().eligible_for(surface);

        for processor in &editable {
            tracing::trace!(target: "weft::dispatch", processor = processor.name(), ?key, "forwarded key");
            processor.handle_key_with_modifiers(surface, key, modifiers, range);
        }
        Ok(Dispatch::Broadcast)
    }

    /// Tell every registered processor except `by` (and anything sharing its
    /// name) that `by` preempted the edit at `range`. Ineligible processors
    /// are told too.
    fn notify_interruption(&self, by: &ProcessorRef, surface: &dyn EditorSurface, range: Range) {
        tracing::debug!(target: "weft::dispatch", by = by.name(), %range, "exclusive processor interrupted chain");
        let others: Vec<ProcessorRef> = self
            .registry
            .borrow()
            .active()
            .iter()
            .filter(|p| p.name() != by.name())
            .cloned()
            .collect();

        for processor in &others {
            processor.process_interrupted(surface, range);
        }
    }
}

impl fmt::Debug for TextProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextProcessor")
            .field("processors", &self.registry.borrow().sorted())
            .field("config", &self.config)
            .field("depth", &self.depth.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use smol_str::SmolStr;

    use super::*;
    use crate::processor::{Priority, TextProcessing};

    type Log = Rc<RefCell<Vec<String>>>;

    struct Surface {
        text: String,
        bulk: Cell<bool>,
        reports: RefCell<Vec<Vec<String>>>,
    }

    impl Surface {
        fn new(text: &str) -> Rc<Self> {
            Rc::new(Self {
                text: text.to_string(),
                bulk: Cell::new(false),
                reports: RefCell::new(Vec::new()),
            })
        }
    }

    impl EditorSurface for Surface {
        fn is_bulk_content_set(&self) -> bool {
            self.bulk.get()
        }

        fn text_in(&self, range: Range) -> Option<SmolStr> {
            let text: String = self
                .text
                .chars()
                .skip(range.start)
                .take(range.len())
                .collect();
            Some(text.into())
        }

        fn did_execute_processors(&self, report: &ExecutionReport) {
            self.reports.borrow_mut().push(
                report
                    .executed_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            );
        }
    }

    struct Recorder {
        name: &'static str,
        priority: Priority,
        bulk: bool,
        acts: bool,
        log: Log,
    }

    impl Recorder {
        fn push(&self, hook: &str) {
            self.log.borrow_mut().push(format!("{}:{hook}", self.name));
        }
    }

    impl TextProcessing for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> Priority {
            self.priority
        }

        fn runs_during_bulk_set(&self) -> bool {
            self.bulk
        }

        fn will_process_editing(&self, _: &dyn EditorSurface, _: &EditEvent) {
            self.push("will");
        }

        fn process(&self, _: &dyn EditorSurface, _: Range, _: isize) -> bool {
            self.push("process");
            self.acts
        }

        fn did_process_editing(&self, _: &dyn EditorSurface, _: &EditEvent) {
            self.push("did");
        }

        fn will_process(&self, _: &dyn EditorSurface, deleted: &str, inserted: &str, _: Range) {
            self.push(&format!("replace({deleted:?}->{inserted:?})"));
        }

        fn handle_key_with_modifiers(
            &self,
            _: &dyn EditorSurface,
            key: &Key,
            modifiers: Modifiers,
            _: Range,
        ) {
            assert!(modifiers.is_empty());
            self.push(&format!("key({key:?})"));
        }

        fn process_interrupted(&self, _: &dyn EditorSurface, range: Range) {
            self.push(&format!("interrupted({range})"));
        }
    }

    fn recorder(log: &Log, name: &'static str, priority: Priority, acts: bool) -> ProcessorRef {
        Rc::new(Recorder {
            name,
            priority,
            bulk: false,
            acts,
            log: log.clone(),
        })
    }

    fn dispatcher(surface: &Rc<Surface>) -> TextProcessor {
        let weak: Weak<dyn EditorSurface> = Rc::downgrade(surface) as Weak<dyn EditorSurface>;
        TextProcessor::new(weak)
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn test_selection_only_runs_pre_edit_hooks() {
        let surface = Surface::new("abc");
        let log = Log::default();
        let tp = dispatcher(&surface);
        tp.register(recorder(&log, "a", Priority::HIGH, true));
        tp.register(recorder(&log, "b", Priority::LOW, true));

        let outcome = tp
            .will_process_editing(EditedMask::empty(), Range::caret(1), 0)
            .unwrap();

        assert!(matches!(outcome, Dispatch::SelectionOnly));
        assert_eq!(take(&log), ["a:will", "b:will"]);
        assert!(surface.reports.borrow().is_empty());
    }

    #[test]
    fn test_report_lists_only_acting_processors_in_priority_order() {
        let surface = Surface::new("abcd");
        let log = Log::default();
        let tp = dispatcher(&surface);
        tp.register(recorder(&log, "low", Priority::LOW, true));
        tp.register(recorder(&log, "idle", Priority::MEDIUM, false));
        tp.register(recorder(&log, "high", Priority::HIGH, true));

        let outcome = tp
            .will_process_editing(EditedMask::CHARACTERS, Range::new(3, 4), 1)
            .unwrap();

        let report = outcome.report().unwrap();
        assert_eq!(report.executed_names(), ["high", "low"]);
        assert!(!report.was_interrupted());
        assert_eq!(*surface.reports.borrow(), [vec!["high", "low"]]);
        assert_eq!(
            take(&log),
            [
                "high:will",
                "idle:will",
                "low:will",
                "high:process",
                "idle:process",
                "low:process",
            ]
        );
    }

    #[test]
    fn test_newline_synthesizes_enter_before_process() {
        let surface = Surface::new("a\nb");
        let log = Log::default();
        let tp = dispatcher(&surface);
        tp.register(recorder(&log, "x", Priority::HIGH, false));
        tp.register(recorder(&log, "y", Priority::LOW, false));

        tp.will_process_editing(EditedMask::CHARACTERS, Range::new(1, 2), 1)
            .unwrap();

        assert_eq!(
            take(&log),
            [
                "x:will",
                "y:will",
                "x:key(Enter)",
                "x:process",
                "y:key(Enter)",
                "y:process",
            ]
        );
    }

    #[test]
    fn test_tab_synthesizes_tab_key() {
        let surface = Surface::new("\t");
        let log = Log::default();
        let tp = dispatcher(&surface);
        tp.register(recorder(&log, "x", Priority::HIGH, false));

        tp.will_process_editing(EditedMask::CHARACTERS, Range::new(0, 1), 1)
            .unwrap();

        assert_eq!(take(&log), ["x:will", "x:key(Tab)", "x:process"]);
    }

    #[test]
    fn test_exclusive_interrupts_and_notifies_all_registered() {
        let surface = Surface::new("abc");
        let log = Log::default();
        let tp = dispatcher(&surface);
        tp.register(recorder(&log, "low", Priority::LOW, true));
        tp.register(recorder(&log, "excl", Priority::EXCLUSIVE, true));
        tp.register(recorder(&log, "high", Priority::HIGH, true));

        let report = tp
            .will_process_editing(EditedMask::CHARACTERS, Range::new(2, 3), 1)
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.executed_names(), ["excl"]);
        assert_eq!(report.interrupted_by.as_ref().map(|p| p.name()), Some("excl"));
        // Interruption goes out in registration order, before the report.
        assert_eq!(
            take(&log),
            [
                "excl:will",
                "high:will",
                "low:will",
                "excl:process",
                "low:interrupted(2..3)",
                "high:interrupted(2..3)",
            ]
        );
    }

    #[test]
    fn test_exclusive_that_declines_does_not_interrupt() {
        let surface = Surface::new("abc");
        let log = Log::default();
        let tp = dispatcher(&surface);
        tp.register(recorder(&log, "excl", Priority::EXCLUSIVE, false));
        tp.register(recorder(&log, "low", Priority::LOW, true));

        let report = tp
            .will_process_editing(EditedMask::CHARACTERS, Range::new(0, 1), 1)
            .unwrap()
            .into_report()
            .unwrap();

        assert_eq!(report.executed_names(), ["low"]);
        assert!(report.interrupted_by.is_none());
        assert!(!take(&log).iter().any(|e| e.contains("interrupted")));
    }

    #[test]
    fn test_interruption_reaches_ineligible_processors() {
        let surface = Surface::new("abc");
        let log = Log::default();
        let tp = dispatcher(&surface);
        tp.register(Rc::new(Recorder {
            name: "excl",
            priority: Priority::EXCLUSIVE,
            bulk: true,
            acts: true,
            log: log.clone(),
        }));
        tp.register(recorder(&log, "interactive-only", Priority::HIGH, true));

        surface.bulk.set(true);
        tp.will_process_editing(EditedMask::CHARACTERS, Range::new(0, 3), 3)
            .unwrap();

        assert_eq!(
            take(&log),
            [
                "excl:will",
                "excl:process",
                "interactive-only:interrupted(0..3)",
            ]
        );
    }

    #[test]
    fn test_dropped_surface_is_noop() {
        let surface = Surface::new("abc");
        let log = Log::default();
        let tp = dispatcher(&surface);
        tp.register(recorder(&log, "a", Priority::HIGH, true));
        drop(surface);

        assert!(matches!(
            tp.will_process_editing(EditedMask::CHARACTERS, Range::new(0, 1), 1),
            Ok(Dispatch::Skipped)
        ));
        assert!(matches!(
            tp.did_process_editing(EditedMask::CHARACTERS, Range::new(0, 1), 1),
            Ok(Dispatch::Skipped)
        ));
        assert!(matches!(
            tp.will_process_deleted_text("", "a", Range::caret(0)),
            Ok(Dispatch::Skipped)
        ));
        assert!(tp.eligible_processors().is_empty());
        assert!(take(&log).is_empty());
    }

    #[test]
    fn test_did_process_and_replace_broadcasts_are_unconditional() {
        let surface = Surface::new("abc");
        let log = Log::default();
        let tp = dispatcher(&surface);
        tp.register(recorder(&log, "a", Priority::HIGH, true));

        tp.did_process_editing(EditedMask::empty(), Range::caret(0), 0)
            .unwrap();
        tp.will_process_deleted_text("b", "", Range::new(1, 2))
            .unwrap();

        assert_eq!(take(&log), ["a:did", "a:replace(\"b\"->\"\")"]);
        assert!(surface.reports.borrow().is_empty());
    }

    struct Registrar {
        tp: RefCell<Option<Rc<TextProcessor>>>,
        late: ProcessorRef,
    }

    impl TextProcessing for Registrar {
        fn name(&self) -> &str {
            "registrar"
        }

        fn priority(&self) -> Priority {
            Priority::HIGH
        }

        fn process(&self, _: &dyn EditorSurface, _: Range, _: isize) -> bool {
            if let Some(tp) = self.tp.borrow().as_ref() {
                tp.register(self.late.clone());
            }
            true
        }
    }

    #[test]
    fn test_registration_inside_hook_applies_to_next_phase() {
        let surface = Surface::new("abc");
        let log = Log::default();
        let tp = Rc::new(dispatcher(&surface));
        let registrar = Rc::new(Registrar {
            tp: RefCell::new(Some(tp.clone())),
            late: recorder(&log, "late", Priority::LOW, true),
        });
        tp.register(registrar.clone());

        let report = tp
            .will_process_editing(EditedMask::CHARACTERS, Range::new(0, 1), 1)
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(report.executed_names(), ["registrar"]);
        assert!(take(&log).is_empty());

        tp.did_process_editing(EditedMask::CHARACTERS, Range::new(0, 1), 1)
            .unwrap();
        assert_eq!(take(&log), ["late:did"]);

        // Break the Rc cycle between the registrar and the dispatcher.
        registrar.tp.borrow_mut().take();
    }

    #[test]
    fn test_reject_policy_when_already_dispatching() {
        let surface = Surface::new("abc");
        let tp = dispatcher(&surface);
        let _guard = tp.enter(Phase::WillProcessEditing).unwrap();

        assert!(tp.is_dispatching());
        assert_eq!(
            tp.did_process_editing(EditedMask::CHARACTERS, Range::caret(0), 1)
                .unwrap_err(),
            DispatchError::Reentrant {
                phase: Phase::DidProcessEditing
            }
        );
    }

    #[test]
    fn test_allow_policy_respects_depth_limit() {
        let surface = Surface::new("abc");
        let weak: Weak<dyn EditorSurface> = Rc::downgrade(&surface) as Weak<dyn EditorSurface>;
        let config = DispatcherConfig::default()
            .with_reentrancy(ReentrancyPolicy::Allow)
            .with_max_depth(2);
        let tp = TextProcessor::with_config(weak, config);

        let outer = tp.enter(Phase::WillProcessEditing).unwrap();
        let inner = tp.enter(Phase::WillProcessEditing).unwrap();
        assert_eq!(
            tp.ensure_can_dispatch(Phase::WillProcessEditing),
            Err(DispatchError::DepthExceeded { limit: 2 })
        );
        drop(inner);
        assert!(tp.ensure_can_dispatch(Phase::WillProcessEditing).is_ok());
        drop(outer);
        assert!(!tp.is_dispatching());
    }
}
