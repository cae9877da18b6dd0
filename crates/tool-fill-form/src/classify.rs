use serde::{Deserialize, Serialize};
use std::fmt;

/// Fill strategy family of a form control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Select,
    Checkbox,
    Radio,
    Textarea,
    Other,
}

impl InputKind {
    pub fn name(&self) -> &'static str {
        match self {
            InputKind::Select => "select",
            InputKind::Checkbox => "checkbox",
            InputKind::Radio => "radio",
            InputKind::Textarea => "textarea",
            InputKind::Other => "other",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Derive the input kind from a tag name and `type` attribute.
pub fn classify(tag_name: &str, type_attr: Option<&str>) -> InputKind {
    let tag = tag_name.trim();
    if tag.eq_ignore_ascii_case("select") {
        return InputKind::Select;
    }
    if tag.eq_ignore_ascii_case("textarea") {
        return InputKind::Textarea;
    }
    if tag.eq_ignore_ascii_case("input") {
        match type_attr.map(str::trim) {
            Some(kind) if kind.eq_ignore_ascii_case("checkbox") => return InputKind::Checkbox,
            Some(kind) if kind.eq_ignore_ascii_case("radio") => return InputKind::Radio,
            _ => {}
        }
    }
    InputKind::Other
}
