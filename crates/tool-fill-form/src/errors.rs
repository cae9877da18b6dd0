use action_flow::{FailureId, NestedFailure, PipelineError};
use action_primitives::DriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FillError {
    #[error("no element matches {target}")]
    ElementNotFound { target: String },

    #[error("{count} elements match {target}, expected exactly one")]
    MultipleElementsFound { target: String, count: usize },

    #[error("required field {element} is empty after fill")]
    RequiredFieldEmpty { element: String },

    #[error("{element} holds {actual:?} after fill, expected {expected:?}")]
    FillValueMismatch {
        element: String,
        expected: String,
        actual: String,
    },

    #[error("{element} has no option with value {value:?}")]
    OptionNotFound { element: String, value: String },

    #[error("stale element: {0}")]
    StaleElement(String),

    #[error("driver error: {0}")]
    Driver(#[source] DriverError),

    #[error("{hook} hook failed: {message}")]
    Hook { hook: &'static str, message: String },

    #[error("filling {element} failed: {source}")]
    Element {
        element: String,
        #[source]
        source: PipelineError<FillError>,
    },

    #[error("field {target} failed: {source} [at {snapshot}]")]
    Field {
        target: String,
        snapshot: String,
        #[source]
        source: PipelineError<FillError>,
    },

    #[error("pipeline contract violated: {0}")]
    Pipeline(String),
}

impl FillError {
    /// Innermost error, looking through element and field wrappers
    pub fn root_cause(&self) -> &FillError {
        match self {
            FillError::Element { source, .. } | FillError::Field { source, .. } => source
                .step_error()
                .map(FillError::root_cause)
                .unwrap_or(self),
            other => other,
        }
    }
}

impl From<DriverError> for FillError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::StaleElement(detail) => FillError::StaleElement(detail),
            other => FillError::Driver(other),
        }
    }
}

impl NestedFailure for FillError {
    fn nested_failure(&self) -> Option<FailureId> {
        match self {
            FillError::Element { source, .. } | FillError::Field { source, .. } => {
                source.failure_id()
            }
            _ => None,
        }
    }
}

/// Problems with a declarative form plan
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid form plan: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("form plan has no fields")]
    Empty,

    #[error("field {index} has an empty target")]
    BlankTarget { index: usize },
}
