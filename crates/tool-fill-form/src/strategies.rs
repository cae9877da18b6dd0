//! Built-in fill strategies, one per input kind

use action_primitives::{ElementHandle, KeyInput, Locator, ScriptArg, WebDriverPort};
use tracing::{debug, trace};

use crate::classify::InputKind;
use crate::errors::FillError;
use crate::model::FieldValue;
use crate::policy::FillPolicy;

/// Appends `arguments[1]` to the element's value and fires `change`
pub const APPEND_VALUE_SCRIPT: &str = "arguments[0].value += arguments[1]; \
     arguments[0].dispatchEvent(new Event('change', { bubbles: true }));";

pub(crate) async fn fill(
    driver: &dyn WebDriverPort,
    element: &ElementHandle,
    kind: InputKind,
    value: &FieldValue,
    clear_using_key: bool,
    policy: &FillPolicy,
) -> Result<(), FillError> {
    trace!(element = %element, kind = %kind, "built-in fill");
    match kind {
        InputKind::Select => select_option(driver, element, &value.as_text()).await,
        InputKind::Radio => choose_radio(driver, element, &value.as_text()).await,
        InputKind::Checkbox => set_checkbox(driver, element, value.as_bool()).await,
        InputKind::Textarea => {
            let text = value.as_text();
            clear(driver, element, clear_using_key).await?;
            if policy.slash_safe_textarea && text.contains('/') {
                type_slash_safe(driver, element, &text).await
            } else {
                type_text(driver, element, &text).await
            }
        }
        InputKind::Other => {
            clear(driver, element, clear_using_key).await?;
            type_text(driver, element, &value.as_text()).await
        }
    }
}

async fn select_option(
    driver: &dyn WebDriverPort,
    select: &ElementHandle,
    wanted: &str,
) -> Result<(), FillError> {
    let options = driver
        .find_elements(Some(select), &Locator::tag_name("option"))
        .await?;
    for option in options {
        if driver.attribute(&option, "value").await?.as_deref() == Some(wanted) {
            return Ok(driver.click(&option).await?);
        }
    }
    Err(FillError::OptionNotFound {
        element: select.to_string(),
        value: wanted.to_string(),
    })
}

/// Clicks only the group member whose own value matches; no match fills nothing.
async fn choose_radio(
    driver: &dyn WebDriverPort,
    radio: &ElementHandle,
    wanted: &str,
) -> Result<(), FillError> {
    if driver.attribute(radio, "value").await?.as_deref() == Some(wanted) {
        driver.click(radio).await?;
    }
    Ok(())
}

async fn set_checkbox(
    driver: &dyn WebDriverPort,
    checkbox: &ElementHandle,
    desired: bool,
) -> Result<(), FillError> {
    if driver.is_selected(checkbox).await? != desired {
        driver.click(checkbox).await?;
    }
    Ok(())
}

async fn clear(
    driver: &dyn WebDriverPort,
    element: &ElementHandle,
    using_key: bool,
) -> Result<(), FillError> {
    if using_key {
        driver.send_keys(element, &KeyInput::select_all()).await?;
        driver.send_keys(element, &KeyInput::delete()).await?;
    } else {
        driver.clear(element).await?;
    }
    Ok(())
}

async fn type_text(
    driver: &dyn WebDriverPort,
    element: &ElementHandle,
    text: &str,
) -> Result<(), FillError> {
    Ok(driver.send_keys(element, &KeyInput::text(text)).await?)
}

/// Native key events for the segments, script injection for every `/`.
async fn type_slash_safe(
    driver: &dyn WebDriverPort,
    element: &ElementHandle,
    text: &str,
) -> Result<(), FillError> {
    debug!(element = %element, "typing with slash-safe injection");
    for (index, segment) in text.split('/').enumerate() {
        if index > 0 {
            driver
                .execute_script(
                    APPEND_VALUE_SCRIPT,
                    vec![ScriptArg::from(element.clone()), ScriptArg::from("/")],
                )
                .await?;
        }
        if !segment.is_empty() {
            driver.send_keys(element, &KeyInput::text(segment)).await?;
        }
    }

    let actual = driver.attribute(element, "value").await?.unwrap_or_default();
    if actual != text {
        return Err(FillError::FillValueMismatch {
            element: element.to_string(),
            expected: text.to_string(),
            actual,
        });
    }
    Ok(())
}
