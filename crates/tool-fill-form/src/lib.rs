pub mod api;
pub mod classify;
pub mod errors;
pub mod model;
pub mod plan;
pub mod policy;

mod hooks;
mod runner;
mod strategies;

pub use api::FormFillEngine;
pub use classify::{classify, InputKind};
pub use errors::{FillError, PlanError};
pub use model::{
    CanFillHook, Converter, DoneHook, ElementHook, FieldHooks, FieldParent, FieldSpec,
    FieldSummary, FieldValue, FillCtx, FillOpt, FormHandle, FormHook, HookError, HookFuture,
    SubmitTarget,
};
pub use plan::{FieldEntry, FormPlan};
pub use policy::FillPolicy;
pub use strategies::APPEND_VALUE_SCRIPT;
