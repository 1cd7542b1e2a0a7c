//! The editing surface as seen by the dispatcher.
//!
//! A surface stores the text, decides when notifications happen and owns the
//! listeners interested in which processors acted on an edit.

use smol_str::SmolStr;

use crate::actions::Range;
use crate::processor::ProcessorRef;

/// What the dispatcher needs from the editing surface.
pub trait EditorSurface {
    /// True while the surface's content is being replaced programmatically
    /// rather than edited interactively. Read at dispatch time.
    fn is_bulk_content_set(&self) -> bool;

    /// Text currently in `range`, or None if the range is not valid.
    fn text_in(&self, range: Range) -> Option<SmolStr>;

    /// Aggregate result of one content edit. Forward to external listeners.
    fn did_execute_processors(&self, report: &ExecutionReport) {
        let _ = report;
    }
}

/// Processors that acted on one edit, reported once per content change.
#[derive(Clone, Debug)]
pub struct ExecutionReport {
    /// Processors whose `process` returned true, in priority order.
    pub executed: Vec<ProcessorRef>,
    /// Edited range the processors were run for.
    pub range: Range,
    /// Exclusive processor that stopped the chain, if any.
    pub interrupted_by: Option<ProcessorRef>,
}

impl ExecutionReport {
    /// Names of the executed processors, in execution order.
    pub fn executed_names(&self) -> Vec<&str> {
        self.executed.iter().map(|p| p.name()).collect()
    }

    pub fn was_interrupted(&self) -> bool {
        self.interrupted_by.is_some()
    }
}
