use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use soulform::fill::{FieldEntry, FormPlan};
use tokio::fs;
use tracing::info;

#[derive(Args, Clone, Debug)]
pub struct PlanArgs {
    /// YAML form plan
    pub file: PathBuf,
}

pub async fn cmd_plan(args: PlanArgs) -> Result<()> {
    let content = fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let plan = FormPlan::from_yaml(&content)
        .with_context(|| format!("Invalid form plan {}", args.file.display()))?;

    info!(fields = plan.fields.len(), "plan is valid");
    for line in describe_plan(&plan) {
        println!("{line}");
    }
    Ok(())
}

fn describe_plan(plan: &FormPlan) -> Vec<String> {
    let mut lines = vec![format!("form {}", plan.form)];
    lines.extend(
        plan.fields
            .iter()
            .enumerate()
            .map(|(index, field)| format!("  {}. {}", index + 1, describe_field(field))),
    );
    if let Some(submit) = &plan.submit {
        lines.push(format!("submit {submit}"));
    }
    if let Some(delay) = plan.delay_ms {
        lines.push(format!("delay {delay}ms"));
    }
    lines
}

fn describe_field(field: &FieldEntry) -> String {
    let mut line = field.target.to_string();
    if let Some(parent) = &field.parent {
        line.push_str(&format!(" within {parent}"));
    }
    line.push_str(&format!(" = {}", field.value));

    let mut flags = Vec::new();
    if field.optional {
        flags.push("optional");
    }
    if field.clear_using_key {
        flags.push("clear with keys");
    }
    if !flags.is_empty() {
        line.push_str(&format!(" ({})", flags.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_fields_with_flags() {
        let plan = FormPlan::from_yaml(
            r#"
form: { by: id, value: signup }
fields:
  - target: { by: name, value: email }
    value: a@b.com
  - target: { by: name, value: city }
    parent: { by: css, value: fieldset }
    value: Oslo
    optional: true
submit: { by: css, value: button }
"#,
        )
        .unwrap();

        assert_eq!(
            describe_plan(&plan),
            vec![
                "form id:signup",
                r#"  1. name:email = "a@b.com""#,
                r#"  2. name:city within css:fieldset = "Oslo" (optional)"#,
                "submit css:button",
            ]
        );
    }
}
