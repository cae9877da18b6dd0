//! Step pipeline executor

use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::errors::{FailureId, NestedFailure, PipelineError};
use crate::types::{FailureReport, PipelineOptions, ResultRegister, Step, StepOutcome};

/// Ordered list of guarded steps sharing one [`ResultRegister`]
pub struct StepPipeline<T, E> {
    steps: Vec<Step<T, E>>,
    options: PipelineOptions,
}

impl<T, E> StepPipeline<T, E>
where
    T: Clone + Send + 'static,
    E: std::error::Error + NestedFailure + Send + Sync + 'static,
{
    /// Build a pipeline, rejecting steps that declare reads of non-earlier slots.
    pub fn new(steps: Vec<Step<T, E>>) -> Result<Self, PipelineError<E>> {
        for (index, step) in steps.iter().enumerate() {
            if let Some(&depends_on) = step.reads.iter().find(|&&read| read >= index) {
                return Err(PipelineError::ForwardDependency { index, depends_on });
            }
        }
        Ok(Self {
            steps,
            options: PipelineOptions::default(),
        })
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order and hand back the full register.
    pub async fn run(self) -> Result<ResultRegister<T>, PipelineError<E>> {
        let StepPipeline { steps, options } = self;
        let total = steps.len();
        let mut register = ResultRegister::new();

        for (index, step) in steps.into_iter().enumerate() {
            let Step {
                label,
                guard,
                action,
                ..
            } = step;

            if let Some(guard) = guard {
                let verdict = {
                    let view = register.view();
                    let allowed = guard(&view);
                    match view.overreach() {
                        Some(requested) => Err((requested, view.len())),
                        None => Ok(allowed),
                    }
                };
                match verdict {
                    Err((requested, available)) => {
                        warn!(
                            pipeline = %options.label,
                            step = index,
                            requested,
                            available,
                            "guard read an unwritten result"
                        );
                        return Err(PipelineError::GuardOutOfRange {
                            index,
                            requested,
                            available,
                        });
                    }
                    Ok(false) => {
                        trace!(pipeline = %options.label, step = index, "guard false, skipping");
                        register.record(StepOutcome::Skipped);
                        continue;
                    }
                    Ok(true) => {}
                }
            }

            debug!(
                pipeline = %options.label,
                step = index,
                total,
                label = %first_line(&label),
                "running step"
            );

            match action(register.clone()).await {
                Ok(value) => register.record(StepOutcome::Written(value)),
                Err(err) => {
                    let failure_id = FailureId::new();
                    let source = Arc::new(err);
                    if let Some(hook) = options.on_error.as_ref() {
                        hook(&FailureReport {
                            pipeline: &options.label,
                            index,
                            step: &label,
                            error: source.to_string(),
                            failure_id,
                            cause: source.nested_failure(),
                        });
                    }
                    return Err(PipelineError::Step {
                        failure_id,
                        index,
                        label,
                        source,
                    });
                }
            }
        }

        Ok(register)
    }

    /// Run every step and resolve with the last written result.
    pub async fn execute(self) -> Result<Option<T>, PipelineError<E>> {
        Ok(self.run().await?.into_last_written())
    }
}

/// Build and execute a pipeline in one call.
pub async fn run_pipeline<T, E>(
    steps: Vec<Step<T, E>>,
    options: PipelineOptions,
) -> Result<Option<T>, PipelineError<E>>
where
    T: Clone + Send + 'static,
    E: std::error::Error + NestedFailure + Send + Sync + 'static,
{
    StepPipeline::new(steps)?.with_options(options).execute().await
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}
