//! Registered processors and their priority-sorted view.

use crate::processor::ProcessorRef;
use crate::surface::EditorSurface;

/// Registered processors in registration order, plus the same processors
/// sorted by descending priority.
///
/// The sorted view is rebuilt on every mutation so it can never be stale.
/// Ties keep registration order.
#[derive(Default)]
pub struct ProcessorRegistry {
    active: Vec<ProcessorRef>,
    sorted: Vec<ProcessorRef>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a processor. Duplicate names are accepted.
    pub fn register(&mut self, processor: ProcessorRef) {
        self.register_all(std::iter::once(processor));
    }

    /// Append processors in the given order.
    pub fn register_all(&mut self, processors: impl IntoIterator<Item = ProcessorRef>) {
        let before = self.active.len();
        self.active.extend(processors);
        self.resort();
        tracing::debug!(
            target: "weft::registry",
            added = self.active.len() - before,
            active = self.active.len(),
            "registered processors"
        );
    }

    /// Remove every processor named like `processor`, including distinct
    /// instances that happen to share its name.
    pub fn unregister(&mut self, processor: &ProcessorRef) {
        self.unregister_names(&[processor.name()]);
    }

    /// Remove every processor whose name matches any of `processors`.
    pub fn unregister_all(&mut self, processors: &[ProcessorRef]) {
        let names: Vec<&str> = processors.iter().map(|p| p.name()).collect();
        self.unregister_names(&names);
    }

    /// Remove every processor called `name`.
    pub fn unregister_named(&mut self, name: &str) {
        self.unregister_names(&[name]);
    }

    fn unregister_names(&mut self, names: &[&str]) {
        let before = self.active.len();
        self.active.retain(|p| !names.contains(&p.name()));
        self.resort();
        tracing::debug!(
            target: "weft::registry",
            removed = before - self.active.len(),
            active = self.active.len(),
            "unregistered processors"
        );
    }

    fn resort(&mut self) {
        let mut sorted = self.active.clone();
        // `sort_by` is stable, so equal priorities keep registration order.
        sorted.sort_by(|a, b| b.priority().cmp(&a.priority()));
        self.sorted = sorted;
    }

    /// Processors allowed to run for the surface's current state.
    ///
    /// During a bulk content set only processors that opted in are returned,
    /// in the same relative order. Computed on every call.
    pub fn eligible_for(&self, surface: &dyn EditorSurface) -> Vec<ProcessorRef> {
        if !surface.is_bulk_content_set() {
            return self.sorted.clone();
        }
        self.sorted
            .iter()
            .filter(|p| p.runs_during_bulk_set())
            .cloned()
            .collect()
    }

    /// Processors in registration order.
    pub fn active(&self) -> &[ProcessorRef] {
        &self.active
    }

    /// Processors in dispatch order.
    pub fn sorted(&self) -> &[ProcessorRef] {
        &self.sorted
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.active.iter().any(|p| p.name() == name)
    }
}
