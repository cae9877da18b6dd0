//! Step pipeline orchestration
//!
//! Ordered, conditionally-skippable asynchronous steps against a live page:
//! - every step may read the results of any earlier step through a
//!   [`ResultRegister`]
//! - an optional guard decides whether a step runs; a skipped step leaves a
//!   `Skipped` marker so indices stay aligned
//! - the first failing step halts the run and is reported once through the
//!   pipeline's error hook
//! - [`for_each_sequential`] drives one worker per item, never two at once

pub mod errors;
pub mod executor;
pub mod queue;
pub mod types;

pub use errors::{FailureId, NestedFailure, PipelineError};
pub use executor::{run_pipeline, StepPipeline};
pub use queue::for_each_sequential;
pub use types::{
    ErrorHook, FailureReport, PipelineOptions, RegisterView, ResultRegister, Step, StepFuture,
    StepOutcome,
};
