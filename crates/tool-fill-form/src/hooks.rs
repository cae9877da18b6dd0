//! Caller hook invocation
//!
//! Hooks are foreign code. An `Err` or a panic, whether raised while building
//! the hook future or while polling it, becomes [`FillError::Hook`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;

use crate::errors::FillError;
use crate::model::{Converter, FieldValue, HookFuture};

pub(crate) async fn invoke<T, F>(hook: &'static str, call: F) -> Result<T, FillError>
where
    F: FnOnce() -> HookFuture<T>,
{
    let future = panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| {
        FillError::Hook {
            hook,
            message: panic_message(payload.as_ref()),
        }
    })?;

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result.map_err(|err| FillError::Hook {
            hook,
            message: err.to_string(),
        }),
        Err(payload) => Err(FillError::Hook {
            hook,
            message: panic_message(payload.as_ref()),
        }),
    }
}

pub(crate) fn convert(converter: &Converter, value: &FieldValue) -> Result<FieldValue, FillError> {
    panic::catch_unwind(AssertUnwindSafe(|| converter(value))).map_err(|payload| {
        FillError::Hook {
            hook: "converter",
            message: panic_message(payload.as_ref()),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
