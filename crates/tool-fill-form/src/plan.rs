//! Declarative form plans
//!
//! ```yaml
//! form: { by: id, value: signup }
//! fields:
//!   - target: { by: name, value: email }
//!     value: a@b.com
//!   - target: { by: name, value: terms }
//!     value: true
//! submit: { by: css, value: "button[type=submit]" }
//! delay_ms: 250
//! ```

use std::time::Duration;

use action_primitives::Locator;
use serde::{Deserialize, Serialize};

use crate::errors::PlanError;
use crate::model::{FieldSpec, FieldValue, FillOpt, SubmitTarget};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPlan {
    pub form: Locator,
    pub fields: Vec<FieldEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit: Option<Locator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub target: Locator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Locator>,
    pub value: FieldValue,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub clear_using_key: bool,
}

impl FormPlan {
    pub fn from_yaml(text: &str) -> Result<Self, PlanError> {
        let plan: FormPlan = serde_yaml::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.fields.is_empty() {
            return Err(PlanError::Empty);
        }
        if let Some(index) = self
            .fields
            .iter()
            .position(|field| field.target.value.trim().is_empty())
        {
            return Err(PlanError::BlankTarget { index });
        }
        Ok(())
    }

    pub fn field_specs(&self) -> Vec<FieldSpec> {
        self.fields.iter().map(FieldEntry::to_spec).collect()
    }

    pub fn submit_target(&self) -> SubmitTarget {
        match &self.submit {
            Some(locator) => SubmitTarget::Locator(locator.clone()),
            None => SubmitTarget::None,
        }
    }

    pub fn fill_opt(&self) -> FillOpt {
        FillOpt {
            delay: self.delay_ms.map(Duration::from_millis),
            ..FillOpt::default()
        }
    }
}

impl FieldEntry {
    pub fn to_spec(&self) -> FieldSpec {
        let mut spec = FieldSpec::new(self.target.clone(), self.value.clone());
        if let Some(parent) = &self.parent {
            spec = spec.within_locator(parent.clone());
        }
        spec.optional = self.optional;
        spec.clear_using_key = self.clear_using_key;
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldParent;
    use action_primitives::By;

    const SIGNUP: &str = r#"
form: { by: id, value: signup }
fields:
  - target: { by: name, value: email }
    value: a@b.com
  - target: { by: name, value: terms }
    value: true
    optional: true
  - target: { by: name, value: city }
    parent: { by: css, value: fieldset.address }
    value: "Oslo"
    clear_using_key: true
submit: { by: css, value: "button[type=submit]" }
delay_ms: 250
"#;

    #[test]
    fn parses_and_converts_fields() {
        let plan = FormPlan::from_yaml(SIGNUP).unwrap();
        assert_eq!(plan.form.by, By::Id);

        let specs = plan.field_specs();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].value, FieldValue::Text("a@b.com".into()));
        assert_eq!(specs[1].value, FieldValue::Bool(true));
        assert!(specs[1].optional);
        assert!(specs[2].clear_using_key);
        assert_eq!(
            specs[2].parent,
            Some(FieldParent::Locator(Locator::css("fieldset.address")))
        );

        assert!(matches!(plan.submit_target(), SubmitTarget::Locator(_)));
        assert_eq!(plan.fill_opt().delay, Some(Duration::from_millis(250)));
    }

    #[test]
    fn rejects_empty_plans() {
        let err = FormPlan::from_yaml("form: { by: id, value: f }\nfields: []").unwrap_err();
        assert!(matches!(err, PlanError::Empty));
    }

    #[test]
    fn rejects_blank_targets() {
        let yaml = "form: { by: id, value: f }\nfields:\n  - target: { by: name, value: ' ' }\n    value: x\n";
        assert!(matches!(
            FormPlan::from_yaml(yaml),
            Err(PlanError::BlankTarget { index: 0 })
        ));
    }

    #[test]
    fn reports_yaml_errors() {
        assert!(matches!(
            FormPlan::from_yaml("form: [unclosed"),
            Err(PlanError::Parse(_))
        ));
    }
}
