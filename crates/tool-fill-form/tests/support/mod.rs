//! In-memory page standing in for a browser session

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};

use action_primitives::{
    By, DriverError, ElementHandle, Key, KeyInput, Locator, ScriptArg, WebDriverPort,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use tool_fill_form::APPEND_VALUE_SCRIPT;

/// Driver call observed by the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Click(String),
    Clear(String),
    Keys(String, KeyInput),
    Script(String, String),
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    value: String,
    selected: bool,
    stale: bool,
    parent: Option<String>,
    children: Vec<String>,
}

#[derive(Default)]
struct PageState {
    nodes: BTreeMap<String, Node>,
    order: Vec<String>,
    calls: Vec<Call>,
    select_all: HashSet<String>,
    detach_after_input: HashSet<String>,
    corrupt_injection: bool,
    next_id: usize,
}

#[derive(Default)]
pub struct FakePage {
    state: Mutex<PageState>,
}

fn stale(id: &str) -> DriverError {
    DriverError::StaleElement(id.to_string())
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element; returns its handle id.
    pub fn add(&self, tag: &str, parent: Option<&str>, attrs: &[(&str, &str)]) -> String {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = format!("e{}", state.next_id);
        let attrs: BTreeMap<String, String> = attrs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let node = Node {
            tag: tag.to_string(),
            value: attrs.get("value").cloned().unwrap_or_default(),
            selected: attrs.contains_key("checked") || attrs.contains_key("selected"),
            attrs,
            stale: false,
            parent: parent.map(str::to_string),
            children: Vec::new(),
        };
        if let Some(parent) = parent {
            if let Some(parent) = state.nodes.get_mut(parent) {
                parent.children.push(id.clone());
            }
        }
        state.nodes.insert(id.clone(), node);
        state.order.push(id.clone());
        id
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Click(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn value(&self, id: &str) -> String {
        self.state
            .lock()
            .nodes
            .get(id)
            .map(|node| node.value.clone())
            .unwrap_or_default()
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.state
            .lock()
            .nodes
            .get(id)
            .map(|node| node.selected)
            .unwrap_or(false)
    }

    /// The element detaches from the DOM after its first keyboard input.
    pub fn detach_after_input(&self, id: &str) {
        self.state.lock().detach_after_input.insert(id.to_string());
    }

    /// Script-injected characters arrive as `\` instead of what was sent.
    pub fn corrupt_injection(&self) {
        self.state.lock().corrupt_injection = true;
    }

    fn descends_from(state: &PageState, id: &str, ancestor: &str) -> bool {
        let mut cursor = state.nodes.get(id).and_then(|node| node.parent.clone());
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = state.nodes.get(&current).and_then(|node| node.parent.clone());
        }
        false
    }

    fn matches(node: &Node, locator: &Locator) -> bool {
        let attr = |name: &str| node.attrs.get(name).map(String::as_str);
        match locator.by {
            By::Name => attr("name") == Some(locator.value.as_str()),
            By::Id => attr("id") == Some(locator.value.as_str()),
            By::TagName => node.tag.eq_ignore_ascii_case(&locator.value),
            By::Css => {
                let selector = locator.value.trim();
                if let Some(id) = selector.strip_prefix('#') {
                    attr("id") == Some(id)
                } else if let Some((tag, class)) = selector.split_once('.') {
                    (tag.is_empty() || node.tag.eq_ignore_ascii_case(tag))
                        && attr("class").is_some_and(|classes| {
                            classes.split_whitespace().any(|c| c == class)
                        })
                } else {
                    node.tag.eq_ignore_ascii_case(selector)
                }
            }
            By::XPath => {
                // `//tag` or `//tag[@attr='value']`, optionally with a leading `.`
                let expr = locator.value.trim().trim_start_matches('.').trim_start_matches('/');
                let (tag, predicate) = match expr.split_once('[') {
                    Some((tag, rest)) => (tag, Some(rest.trim_end_matches(']'))),
                    None => (expr, None),
                };
                let tag_ok = tag == "*" || node.tag.eq_ignore_ascii_case(tag);
                let predicate_ok = match predicate {
                    None => true,
                    Some(predicate) => predicate
                        .trim_start_matches('@')
                        .split_once('=')
                        .map(|(name, value)| {
                            attr(name) == Some(value.trim_matches(|c| c == '\'' || c == '"'))
                        })
                        .unwrap_or(false),
                };
                tag_ok && predicate_ok
            }
            By::LinkText => false,
        }
    }

    fn render(state: &PageState, id: &str, out: &mut String) {
        let Some(node) = state.nodes.get(id) else {
            return;
        };
        out.push('<');
        out.push_str(&node.tag);
        for (key, value) in &node.attrs {
            out.push_str(&format!(" {key}=\"{value}\""));
        }
        out.push('>');
        if node.tag == "input" {
            return;
        }
        if node.tag == "textarea" {
            out.push_str(&node.value);
        }
        for child in &node.children {
            Self::render(state, child, out);
        }
        out.push_str(&format!("</{}>", node.tag));
    }

    fn live<'a>(
        state: &'a mut PageState,
        element: &ElementHandle,
    ) -> Result<&'a mut Node, DriverError> {
        match state.nodes.get_mut(element.id()) {
            Some(node) if !node.stale => Ok(node),
            Some(_) => Err(stale(element.id())),
            None => Err(DriverError::NoSuchElement(element.id().to_string())),
        }
    }

    fn after_input(state: &mut PageState, id: &str) {
        if state.detach_after_input.contains(id) {
            if let Some(node) = state.nodes.get_mut(id) {
                node.stale = true;
            }
        }
    }
}

#[async_trait]
impl WebDriverPort for FakePage {
    async fn find_elements(
        &self,
        scope: Option<&ElementHandle>,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        let state = self.state.lock();
        if let Some(scope) = scope {
            match state.nodes.get(scope.id()) {
                Some(node) if node.stale => return Err(stale(scope.id())),
                None => return Err(DriverError::NoSuchElement(scope.id().to_string())),
                _ => {}
            }
        }
        let found = state
            .order
            .iter()
            .filter(|id| {
                let node = &state.nodes[id.as_str()];
                !node.stale
                    && scope.map_or(true, |scope| Self::descends_from(&state, id, scope.id()))
                    && Self::matches(node, locator)
            })
            .map(|id| ElementHandle::new(id.clone()))
            .collect();
        Ok(found)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let node = Self::live(&mut state, element)?;
        let tag = node.tag.clone();
        let kind = node.attrs.get("type").cloned().unwrap_or_default();
        let name = node.attrs.get("name").cloned();
        let parent = node.parent.clone();

        match (tag.as_str(), kind.as_str()) {
            ("input", "checkbox") => node.selected = !node.selected,
            ("input", "radio") => {
                let id = element.id().to_string();
                for (other_id, other) in state.nodes.iter_mut() {
                    if other.attrs.get("type").map(String::as_str) == Some("radio")
                        && other.attrs.get("name") == name.as_ref()
                    {
                        other.selected = *other_id == id;
                    }
                }
            }
            ("option", _) => {
                let id = element.id().to_string();
                let value = node.attrs.get("value").cloned().unwrap_or_default();
                if let Some(select) = parent {
                    let siblings = state
                        .nodes
                        .get(&select)
                        .map(|select| select.children.clone())
                        .unwrap_or_default();
                    for sibling in siblings {
                        if let Some(option) = state.nodes.get_mut(&sibling) {
                            option.selected = sibling == id;
                        }
                    }
                    if let Some(select) = state.nodes.get_mut(&select) {
                        select.value = value;
                    }
                }
            }
            _ => {}
        }
        state.calls.push(Call::Click(element.id().to_string()));
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        Self::live(&mut state, element)?.value.clear();
        state.calls.push(Call::Clear(element.id().to_string()));
        Ok(())
    }

    async fn send_keys(
        &self,
        element: &ElementHandle,
        keys: &KeyInput,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let id = element.id().to_string();
        Self::live(&mut state, element)?;
        match keys {
            KeyInput::Text(text) => {
                let replace = state.select_all.remove(&id);
                let node = Self::live(&mut state, element)?;
                if replace {
                    node.value.clear();
                }
                node.value.push_str(text);
            }
            KeyInput::Chord(chord) if chord == &[Key::Control, Key::Char('a')] => {
                state.select_all.insert(id.clone());
            }
            KeyInput::Chord(chord) if chord == &[Key::Delete] || chord == &[Key::Backspace] => {
                if state.select_all.remove(&id) {
                    Self::live(&mut state, element)?.value.clear();
                } else {
                    Self::live(&mut state, element)?.value.pop();
                }
            }
            KeyInput::Chord(_) => {}
        }
        state.calls.push(Call::Keys(id.clone(), keys.clone()));
        Self::after_input(&mut state, &id);
        Ok(())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let mut state = self.state.lock();
        let node = Self::live(&mut state, element)?;
        let editable = matches!(node.tag.as_str(), "input" | "textarea" | "select");
        if name == "value" && editable {
            return Ok(Some(node.value.clone()));
        }
        Ok(node.attrs.get(name).cloned())
    }

    async fn tag_name(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let mut state = self.state.lock();
        Ok(Self::live(&mut state, element)?.tag.clone())
    }

    async fn is_selected(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        let mut state = self.state.lock();
        Ok(Self::live(&mut state, element)?.selected)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        let mut state = self.state.lock();
        Ok(!Self::live(&mut state, element)?.attrs.contains_key("disabled"))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        let mut state = self.state.lock();
        Self::live(&mut state, element)?;
        Ok(true)
    }

    async fn outer_html(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let mut state = self.state.lock();
        Self::live(&mut state, element)?;
        let mut out = String::new();
        Self::render(&state, element.id(), &mut out);
        Ok(out)
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<ScriptArg>,
    ) -> Result<serde_json::Value, DriverError> {
        if script != APPEND_VALUE_SCRIPT {
            return Err(DriverError::Script(format!("unsupported script: {script}")));
        }
        let (element, text) = match args.as_slice() {
            [ScriptArg::Element(element), ScriptArg::Value(serde_json::Value::String(text))] => {
                (element.clone(), text.clone())
            }
            _ => return Err(DriverError::Script("bad arguments".into())),
        };

        let mut state = self.state.lock();
        let corrupt = state.corrupt_injection;
        let node = Self::live(&mut state, &element)?;
        if corrupt {
            node.value.push('\\');
        } else {
            node.value.push_str(&text);
        }
        state
            .calls
            .push(Call::Script(element.id().to_string(), text));
        Ok(serde_json::Value::Null)
    }
}
