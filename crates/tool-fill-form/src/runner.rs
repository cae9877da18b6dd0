//! Per-field and per-element pipelines
//!
//! A field runs as one pipeline: locate, convert, classify, fill every
//! matched element, done hook. Filling one element is a nested pipeline:
//! pre-fill, can-fill, on-fill, built-in strategy, stale probe, required
//! check, after-fill. Hook presence and earlier results gate each step.

use std::sync::Arc;

use action_flow::{
    for_each_sequential, PipelineOptions, RegisterView, ResultRegister, Step, StepOutcome,
    StepPipeline,
};
use action_locator::{resolve_all, ScopedLocator};
use action_primitives::{ElementHandle, WebDriverPort};
use parking_lot::Mutex;
use soulform_core_types::ActionId;
use soulform_observe::{truncate_html, ErrorLogger};
use tracing::{debug, instrument};

use crate::classify::{classify, InputKind};
use crate::errors::FillError;
use crate::hooks;
use crate::model::{
    ElementHook, FieldHooks, FieldParent, FieldSpec, FieldSummary, FieldValue, FillCtx,
};
use crate::policy::FillPolicy;
use crate::strategies;

#[derive(Clone)]
pub(crate) struct FillDeps {
    pub driver: Arc<dyn WebDriverPort>,
    pub policy: FillPolicy,
    pub logger: Arc<ErrorLogger>,
}

#[derive(Debug, Clone)]
enum FieldSlot {
    Located(Vec<ElementHandle>),
    Value(FieldValue),
    Classified(Vec<(ElementHandle, InputKind)>),
    Filled(usize),
    Done,
}

type FieldStep = Step<FieldSlot, FillError>;

const LOCATE: usize = 0;
const CONVERT: usize = 1;
const CLASSIFY: usize = 2;

/// Element currently being filled (first match until then), kept for the error snapshot
type Focus = Arc<Mutex<Option<ElementHandle>>>;

fn located(register: &ResultRegister<FieldSlot>) -> Vec<ElementHandle> {
    match register.get(LOCATE) {
        Some(FieldSlot::Located(found)) => found.clone(),
        _ => Vec::new(),
    }
}

fn has_matches(view: &RegisterView<'_, FieldSlot>) -> bool {
    matches!(view.get(LOCATE), Some(FieldSlot::Located(found)) if !found.is_empty())
}

fn missing(slot: &str) -> FillError {
    FillError::Pipeline(format!("{slot} result missing"))
}

#[instrument(
    skip_all,
    fields(action = %ActionId::new(), target = %field.target, session = %deps.logger.tag())
)]
pub(crate) async fn fill_field(
    deps: &FillDeps,
    field: FieldSpec,
    root: Option<ElementHandle>,
) -> Result<(), FillError> {
    let target = field.target.to_string();
    let focus: Focus = Arc::default();
    let steps = field_steps(deps, field, root, Arc::clone(&focus));
    let options = deps.logger.wrap(PipelineOptions::new(format!("field {target}")));

    let outcome = match StepPipeline::new(steps) {
        Ok(pipeline) => pipeline.with_options(options).run().await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(register) => {
            let filled = register
                .iter()
                .find_map(|slot| match slot {
                    StepOutcome::Written(FieldSlot::Filled(count)) => Some(*count),
                    _ => None,
                })
                .unwrap_or(0);
            debug!(filled, "field complete");
            Ok(())
        }
        Err(source) => {
            let focused = focus.lock().clone();
            let snapshot = snapshot(deps, focused, &target).await;
            Err(FillError::Field {
                target,
                snapshot,
                source,
            })
        }
    }
}

/// Truncated outer HTML of the focused element, or the target descriptor.
async fn snapshot(deps: &FillDeps, focused: Option<ElementHandle>, target: &str) -> String {
    let Some(element) = focused else {
        return target.to_string();
    };
    match deps.driver.outer_html(&element).await {
        Ok(html) => truncate_html(&html, deps.policy.snapshot_max_len),
        Err(err) => {
            debug!(element = %element, error = %err, "no snapshot for failed field");
            target.to_string()
        }
    }
}

fn field_steps(
    deps: &FillDeps,
    field: FieldSpec,
    root: Option<ElementHandle>,
    focus: Focus,
) -> Vec<FieldStep> {
    let FieldSpec {
        parent,
        target,
        value,
        optional,
        clear_using_key,
        hooks: field_hooks,
    } = field;
    let FieldHooks {
        converter,
        pre_fill,
        can_fill,
        on_fill,
        after_fill,
        done,
    } = field_hooks;
    let element_hooks = FieldHooks {
        converter: None,
        pre_fill,
        can_fill,
        on_fill,
        after_fill,
        done: None,
    };

    let locate = {
        let driver = Arc::clone(&deps.driver);
        let target = target.clone();
        let focus = Arc::clone(&focus);
        FieldStep::new(
            format!("locate field\n    target: {target}\n    optional: {optional}"),
            move |_| async move {
                let parent = match parent {
                    Some(FieldParent::Element(element)) => Some(element),
                    Some(FieldParent::Locator(locator)) => {
                        let scope = ScopedLocator::for_target(locator, None, root.as_ref());
                        let found = resolve_all(driver.as_ref(), &scope).await?;
                        Some(found.into_iter().next().ok_or_else(|| {
                            FillError::ElementNotFound {
                                target: scope.to_string(),
                            }
                        })?)
                    }
                    None => None,
                };

                let scoped = ScopedLocator::for_target(target, parent, root.as_ref());
                let found = resolve_all(driver.as_ref(), &scoped).await?;
                if found.is_empty() {
                    if !optional {
                        return Err(FillError::ElementNotFound {
                            target: scoped.to_string(),
                        });
                    }
                    debug!(target = %scoped, "optional field absent");
                }
                *focus.lock() = found.first().cloned();
                Ok(FieldSlot::Located(found))
            },
        )
    };

    let convert = {
        let value = value.clone();
        FieldStep::new("convert value", move |_| async move {
            let effective = match converter {
                Some(converter) => hooks::convert(&converter, &value)?,
                None => value,
            };
            Ok(FieldSlot::Value(effective))
        })
        .when(has_matches)
        .reads(&[LOCATE])
    };

    let classify_step = {
        let driver = Arc::clone(&deps.driver);
        let target = target.to_string();
        FieldStep::new(
            format!("classify matches\n    target: {target}"),
            move |prior| async move {
                let found = located(&prior);
                let mut classified = Vec::with_capacity(found.len());
                for element in found {
                    let tag = driver.tag_name(&element).await?;
                    let type_attr = driver.attribute(&element, "type").await?;
                    classified.push((element, classify(&tag, type_attr.as_deref())));
                }
                let mixed = classified.iter().any(|(_, kind)| *kind != InputKind::Radio);
                if classified.len() > 1 && mixed {
                    return Err(FillError::MultipleElementsFound {
                        target,
                        count: classified.len(),
                    });
                }
                Ok(FieldSlot::Classified(classified))
            },
        )
        .when(has_matches)
        .reads(&[LOCATE])
    };

    let fill = {
        let deps = deps.clone();
        FieldStep::new("fill matched elements", move |prior| async move {
            let value = match prior.get(CONVERT) {
                Some(FieldSlot::Value(value)) => value.clone(),
                _ => return Err(missing("converted value")),
            };
            let classified = match prior.get(CLASSIFY) {
                Some(FieldSlot::Classified(classified)) => classified.clone(),
                _ => return Err(missing("classification")),
            };
            let count = classified.len();
            let deps = &deps;
            let element_hooks = &element_hooks;
            for_each_sequential(classified, move |(element, kind)| {
                *focus.lock() = Some(element.clone());
                fill_element(deps, element, kind, value.clone(), element_hooks, clear_using_key)
            })
            .await?;
            Ok(FieldSlot::Filled(count))
        })
        .when(has_matches)
        .reads(&[CONVERT, CLASSIFY])
    };

    let present = done.is_some();
    let finish = FieldStep::new("done hook", move |prior| async move {
        if let Some(done) = done {
            let summary = FieldSummary {
                target,
                elements: located(&prior),
                value,
            };
            hooks::invoke("done", move || done(summary)).await?;
        }
        Ok(FieldSlot::Done)
    })
    .when(move |_| present)
    .reads(&[LOCATE]);

    vec![locate, convert, classify_step, fill, finish]
}

#[derive(Debug, Clone, PartialEq)]
enum ElementSlot {
    Done,
    Handled(bool),
    Stale(bool),
}

type ElementStep = Step<ElementSlot, FillError>;

const CAN_FILL: usize = 1;
const ON_FILL: usize = 2;
const PROBE: usize = 4;

fn handled(view: &RegisterView<'_, ElementSlot>, index: usize) -> bool {
    matches!(view.get(index), Some(ElementSlot::Handled(true)))
}

fn describe(title: &str, ctx: &FillCtx) -> String {
    format!(
        "{title}\n    element: {}\n    kind: {}",
        ctx.element, ctx.kind
    )
}

async fn fill_element(
    deps: &FillDeps,
    element: ElementHandle,
    kind: InputKind,
    value: FieldValue,
    field_hooks: &FieldHooks,
    clear_using_key: bool,
) -> Result<(), FillError> {
    let ctx = FillCtx {
        driver: Arc::clone(&deps.driver),
        element: element.clone(),
        kind,
        value,
    };
    let steps = element_steps(deps, ctx, field_hooks, clear_using_key);
    let options = deps
        .logger
        .wrap(PipelineOptions::new(format!("{kind} {element}")));

    let outcome = match StepPipeline::new(steps) {
        Ok(pipeline) => pipeline.with_options(options).run().await,
        Err(err) => Err(err),
    };
    outcome.map(|_| ()).map_err(|source| FillError::Element {
        element: element.to_string(),
        source,
    })
}

fn hook_step(name: &'static str, hook: Option<ElementHook>, ctx: &FillCtx) -> ElementStep {
    let present = hook.is_some();
    let label = describe(&format!("{name} hook"), ctx);
    let ctx = ctx.clone();
    ElementStep::new(label, move |_| async move {
        if let Some(hook) = hook {
            hooks::invoke(name, move || hook(ctx)).await?;
        }
        Ok(ElementSlot::Done)
    })
    .when(move |_| present)
}

fn element_steps(
    deps: &FillDeps,
    ctx: FillCtx,
    field_hooks: &FieldHooks,
    clear_using_key: bool,
) -> Vec<ElementStep> {
    let pre_fill = hook_step("pre_fill", field_hooks.pre_fill.clone(), &ctx);

    let can_fill = {
        let hook = field_hooks.can_fill.clone();
        let present = hook.is_some();
        let label = describe("can_fill hook", &ctx);
        let ctx = ctx.clone();
        ElementStep::new(label, move |_| async move {
            let handled = match hook {
                Some(hook) => hooks::invoke("can_fill", move || hook(ctx)).await?,
                None => false,
            };
            Ok(ElementSlot::Handled(handled))
        })
        .when(move |_| present)
    };

    let on_fill = {
        let hook = field_hooks.on_fill.clone();
        let present = hook.is_some();
        let label = describe("on_fill hook", &ctx);
        let ctx = ctx.clone();
        ElementStep::new(label, move |_| async move {
            if let Some(hook) = hook {
                hooks::invoke("on_fill", move || hook(ctx)).await?;
            }
            Ok(ElementSlot::Handled(true))
        })
        .when(move |view| present && !handled(view, CAN_FILL))
        .reads(&[CAN_FILL])
    };

    let built_in = {
        let driver = Arc::clone(&deps.driver);
        let policy = deps.policy.clone();
        let label = describe(&format!("fill {}", ctx.kind), &ctx);
        let ctx = ctx.clone();
        ElementStep::new(label, move |_| async move {
            strategies::fill(
                driver.as_ref(),
                &ctx.element,
                ctx.kind,
                &ctx.value,
                clear_using_key,
                &policy,
            )
            .await?;
            Ok(ElementSlot::Done)
        })
        .when(|view| !handled(view, CAN_FILL) && !handled(view, ON_FILL))
        .reads(&[CAN_FILL, ON_FILL])
    };

    let probe = {
        let driver = Arc::clone(&deps.driver);
        let element = ctx.element.clone();
        ElementStep::new(describe("probe staleness", &ctx), move |_| async move {
            match driver.is_enabled(&element).await {
                Ok(_) => Ok(ElementSlot::Stale(false)),
                Err(err) if err.is_stale() => {
                    debug!(element = %element, "element detached after fill");
                    Ok(ElementSlot::Stale(true))
                }
                Err(err) => Err(err.into()),
            }
        })
    };

    let required = {
        let driver = Arc::clone(&deps.driver);
        let element = ctx.element.clone();
        let kind = ctx.kind;
        ElementStep::new(describe("check required value", &ctx), move |_| async move {
            if driver.attribute(&element, "required").await?.as_deref() == Some("true") {
                let value = driver.attribute(&element, "value").await?.unwrap_or_default();
                if value.is_empty() {
                    return Err(FillError::RequiredFieldEmpty {
                        element: element.to_string(),
                    });
                }
            }
            Ok(ElementSlot::Done)
        })
        .when(move |view| {
            kind != InputKind::Checkbox && view.get(PROBE) == Some(&ElementSlot::Stale(false))
        })
        .reads(&[PROBE])
    };

    let after_fill = hook_step("after_fill", field_hooks.after_fill.clone(), &ctx);

    vec![pre_fill, can_fill, on_fill, built_in, probe, required, after_fill]
}
