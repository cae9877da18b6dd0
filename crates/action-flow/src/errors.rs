//! Pipeline error types

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

/// Identity of one step failure.
///
/// Clones of a [`PipelineError`] share the id, so the same failure seen at
/// several nesting levels can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FailureId(Uuid);

impl FailureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FailureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FailureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Step errors that may carry the failure of a nested pipeline as their cause
pub trait NestedFailure {
    /// Failure id of the wrapped pipeline error, if any
    fn nested_failure(&self) -> Option<FailureId> {
        None
    }
}

fn first_line(label: &str) -> &str {
    label.lines().next().unwrap_or_default().trim()
}

/// Pipeline execution errors
#[derive(Debug, Error)]
pub enum PipelineError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// A step's action failed; no later step ran
    #[error("step {index} ({}) failed: {source}", first_line(.label))]
    Step {
        failure_id: FailureId,
        index: usize,
        label: String,
        source: Arc<E>,
    },

    /// A guard read a register slot that has not been written yet
    #[error("guard of step {index} read result {requested} but only {available} results exist")]
    GuardOutOfRange {
        index: usize,
        requested: usize,
        available: usize,
    },

    /// A step declared a read of its own or a later position
    #[error("step {index} declares a read of result {depends_on}, which is not an earlier step")]
    ForwardDependency { index: usize, depends_on: usize },
}

impl<E> PipelineError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Identity of the failing step, for step failures
    pub fn failure_id(&self) -> Option<FailureId> {
        match self {
            PipelineError::Step { failure_id, .. } => Some(*failure_id),
            _ => None,
        }
    }

    /// Position of the step that failed or was rejected
    pub fn index(&self) -> usize {
        match self {
            PipelineError::Step { index, .. }
            | PipelineError::GuardOutOfRange { index, .. }
            | PipelineError::ForwardDependency { index, .. } => *index,
        }
    }

    /// The error returned by the failing step's action
    pub fn step_error(&self) -> Option<&E> {
        match self {
            PipelineError::Step { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl<E> Clone for PipelineError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        match self {
            PipelineError::Step {
                failure_id,
                index,
                label,
                source,
            } => PipelineError::Step {
                failure_id: *failure_id,
                index: *index,
                label: label.clone(),
                source: Arc::clone(source),
            },
            PipelineError::GuardOutOfRange {
                index,
                requested,
                available,
            } => PipelineError::GuardOutOfRange {
                index: *index,
                requested: *requested,
                available: *available,
            },
            PipelineError::ForwardDependency { index, depends_on } => {
                PipelineError::ForwardDependency {
                    index: *index,
                    depends_on: *depends_on,
                }
            }
        }
    }
}
