//! Core types for step pipelines

use futures::future::BoxFuture;
use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::errors::FailureId;

/// Outcome of one step within a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    /// The action ran and produced a value
    Written(T),

    /// The guard evaluated false; the action never ran
    Skipped,
}

/// Append-only, index-addressable store of step outcomes.
///
/// Slot `i` always belongs to step `i`: it is written or marked skipped
/// before slot `i + 1` exists.
#[derive(Debug, Clone)]
pub struct ResultRegister<T> {
    slots: Vec<StepOutcome<T>>,
}

impl<T> ResultRegister<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Number of steps that have finished (written or skipped)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn outcome(&self, index: usize) -> Option<&StepOutcome<T>> {
        self.slots.get(index)
    }

    /// Value written by step `index`; `None` if skipped or not run yet
    pub fn get(&self, index: usize) -> Option<&T> {
        match self.slots.get(index) {
            Some(StepOutcome::Written(value)) => Some(value),
            _ => None,
        }
    }

    pub fn is_skipped(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(StepOutcome::Skipped))
    }

    /// Most recent written value, ignoring trailing skips
    pub fn last_written(&self) -> Option<&T> {
        self.slots.iter().rev().find_map(|slot| match slot {
            StepOutcome::Written(value) => Some(value),
            StepOutcome::Skipped => None,
        })
    }

    pub fn into_last_written(self) -> Option<T> {
        self.slots.into_iter().rev().find_map(|slot| match slot {
            StepOutcome::Written(value) => Some(value),
            StepOutcome::Skipped => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepOutcome<T>> {
        self.slots.iter()
    }

    pub(crate) fn record(&mut self, outcome: StepOutcome<T>) {
        self.slots.push(outcome);
    }

    pub(crate) fn view(&self) -> RegisterView<'_, T> {
        RegisterView {
            slots: &self.slots,
            overreach: Cell::new(None),
        }
    }
}

impl<T> Default for ResultRegister<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read view handed to guards, covering slots `0..i` for step `i`.
///
/// Reading past the end is a contract violation: the access returns `None`
/// and the pipeline fails the run once the guard returns.
pub struct RegisterView<'a, T> {
    slots: &'a [StepOutcome<T>],
    overreach: Cell<Option<usize>>,
}

impl<'a, T> RegisterView<'a, T> {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a T> {
        match self.slot(index)? {
            StepOutcome::Written(value) => Some(value),
            StepOutcome::Skipped => None,
        }
    }

    pub fn is_skipped(&self, index: usize) -> bool {
        matches!(self.slot(index), Some(StepOutcome::Skipped))
    }

    pub fn is_written(&self, index: usize) -> bool {
        matches!(self.slot(index), Some(StepOutcome::Written(_)))
    }

    fn slot(&self, index: usize) -> Option<&'a StepOutcome<T>> {
        let slot = self.slots.get(index);
        if slot.is_none() && self.overreach.get().is_none() {
            self.overreach.set(Some(index));
        }
        slot
    }

    pub(crate) fn overreach(&self) -> Option<usize> {
        self.overreach.get()
    }
}

/// Boxed future returned by a step action
pub type StepFuture<T, E> = BoxFuture<'static, Result<T, E>>;

type Guard<T> = Box<dyn Fn(&RegisterView<'_, T>) -> bool + Send + Sync>;
type Action<T, E> = Box<dyn FnOnce(ResultRegister<T>) -> StepFuture<T, E> + Send>;

/// One asynchronous action plus an optional guard
pub struct Step<T, E> {
    pub(crate) label: String,
    pub(crate) reads: Vec<usize>,
    pub(crate) guard: Option<Guard<T>>,
    pub(crate) action: Action<T, E>,
}

impl<T: 'static, E: 'static> Step<T, E> {
    /// Create a step; the action receives a snapshot of all earlier outcomes.
    pub fn new<F, Fut>(label: impl Into<String>, action: F) -> Self
    where
        F: FnOnce(ResultRegister<T>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            label: label.into(),
            reads: Vec::new(),
            guard: None,
            action: Box::new(move |prior| -> StepFuture<T, E> { Box::pin(action(prior)) }),
        }
    }

    /// Run the action only when `guard` holds against earlier results.
    pub fn when<G>(mut self, guard: G) -> Self
    where
        G: Fn(&RegisterView<'_, T>) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Declare the register slots this step reads, checked at construction.
    pub fn reads(mut self, indices: &[usize]) -> Self {
        self.reads.extend_from_slice(indices);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }
}

impl<T, E> fmt::Debug for Step<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("label", &self.label)
            .field("reads", &self.reads)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// What an error hook learns about a failed step
#[derive(Debug, Clone)]
pub struct FailureReport<'a> {
    /// Label of the pipeline the step belongs to
    pub pipeline: &'a str,

    /// Position of the failing step
    pub index: usize,

    /// The step's description; may span several lines
    pub step: &'a str,

    /// Display text of the step's error
    pub error: String,

    /// Identity of this failure
    pub failure_id: FailureId,

    /// Identity of a nested failure the step's error wraps
    pub cause: Option<FailureId>,
}

/// Callback invoked once per failed run, before the error is returned
pub type ErrorHook = Arc<dyn Fn(&FailureReport<'_>) + Send + Sync>;

/// Run-level options
#[derive(Clone)]
pub struct PipelineOptions {
    pub label: String,
    pub on_error: Option<ErrorHook>,
}

impl PipelineOptions {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            on_error: None,
        }
    }

    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new("pipeline")
    }
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("label", &self.label)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(outcomes: Vec<StepOutcome<u32>>) -> ResultRegister<u32> {
        let mut register = ResultRegister::new();
        for outcome in outcomes {
            register.record(outcome);
        }
        register
    }

    #[test]
    fn last_written_skips_trailing_skips() {
        let register = register(vec![
            StepOutcome::Written(1),
            StepOutcome::Written(2),
            StepOutcome::Skipped,
        ]);
        assert_eq!(register.last_written(), Some(&2));
        assert!(register.is_skipped(2));
        assert_eq!(register.get(2), None);
        assert_eq!(register.into_last_written(), Some(2));
    }

    #[test]
    fn view_flags_reads_past_the_end() {
        let register = register(vec![StepOutcome::Written(7)]);
        let view = register.view();
        assert_eq!(view.get(0), Some(&7));
        assert_eq!(view.overreach(), None);
        assert_eq!(view.get(3), None);
        assert_eq!(view.overreach(), Some(3));
    }

    #[test]
    fn skipped_slot_is_not_overreach() {
        let register = register(vec![StepOutcome::Skipped]);
        let view = register.view();
        assert!(view.is_skipped(0));
        assert!(!view.is_written(0));
        assert_eq!(view.overreach(), None);
    }
}
