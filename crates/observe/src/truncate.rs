//! Bounded, well-formed HTML snapshots for error messages
//!
//! The fragment is parsed into an arena tree and shrunk from the end. A
//! cursor starts at the fragment; while the rendering is too long it drops
//! the last child of a node with several children, descends into a single
//! child, and removes leaves on the way back up. Only once the outermost
//! element has no children left does it lose its attributes, oldest first.
//! Output always re-parses to the same tree.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Snapshot length used when none is configured
pub const DEFAULT_MAX_LEN: usize = 100;

const ELLIPSIS: &str = "...";

/// Room kept for the marker; the attribute form `" ..."` is the longest
const MARKER_RESERVE: usize = 4;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Truncator with a fixed length bound
#[derive(Debug, Clone, Copy)]
pub struct HtmlTruncator {
    max_len: usize,
}

impl HtmlTruncator {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn truncate(&self, html: &str) -> String {
        truncate_html(html, self.max_len)
    }
}

impl Default for HtmlTruncator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEN)
    }
}

/// Shrink `html` until its rendering is at most `max_len` characters.
///
/// Input already within the bound is returned unchanged. The result stays
/// well-formed and carries a `...` marker when anything was removed.
pub fn truncate_html(html: &str, max_len: usize) -> String {
    if html.chars().count() <= max_len {
        return html.to_string();
    }

    let mut tree = match Tree::parse(html) {
        Ok(tree) => tree,
        Err(err) => {
            tracing::debug!(error = %err, "snapshot is not parseable markup, cutting as text");
            return truncate_text(html, max_len);
        }
    };

    tree.shrink(max_len);
    tree.render()
}

fn truncate_text(text: &str, max_len: usize) -> String {
    let escaped = escape(text);
    let mut cut = cut_chars(&escaped, max_len.saturating_sub(ELLIPSIS.len()));
    cut.push_str(ELLIPSIS);
    cut
}

/// Cut to `count` chars without leaving a partial entity reference behind.
fn cut_chars(text: &str, count: usize) -> String {
    let end = text
        .char_indices()
        .nth(count)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len());
    let mut cut = &text[..end];
    if let Some(amp) = cut.rfind('&') {
        if !cut[amp..].contains(';') {
            cut = &cut[..amp];
        }
    }
    cut.to_string()
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
}

type NodeId = usize;

const FRAGMENT: NodeId = 0;

#[derive(Debug)]
enum NodeKind {
    Fragment,
    Element {
        name: String,
        attrs: Vec<(String, Option<String>)>,
        void: bool,
    },
    /// Text as written, entities left escaped
    Text(String),
    /// Comments and CDATA, rendered verbatim
    Raw(String),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Fragment,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub(crate) fn parse(html: &str) -> Result<Self, quick_xml::Error> {
        let mut tree = Tree::new();
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.trim_text(false);

        let mut current = FRAGMENT;
        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let id = tree.push_element(current, &start);
                    if !tree.is_void_element(id) {
                        current = id;
                    }
                }
                Event::Empty(start) => {
                    tree.push_element(current, &start);
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    if let Some(open) = tree.find_open(current, &name) {
                        current = tree.nodes[open].parent.unwrap_or(FRAGMENT);
                    }
                }
                Event::Text(text) => {
                    let text = String::from_utf8_lossy(&text).into_owned();
                    tree.push(current, NodeKind::Text(text));
                }
                Event::CData(data) => {
                    let data = String::from_utf8_lossy(&data).into_owned();
                    tree.push(current, NodeKind::Raw(format!("<![CDATA[{data}]]>")));
                }
                Event::Comment(comment) => {
                    let comment = String::from_utf8_lossy(&comment).into_owned();
                    tree.push(current, NodeKind::Raw(format!("<!--{comment}-->")));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(tree)
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn push_element(&mut self, parent: NodeId, start: &BytesStart<'_>) -> NodeId {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let attrs = start
            .html_attributes()
            .filter_map(Result::ok)
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = String::from_utf8_lossy(&attr.value).into_owned();
                (key, Some(value))
            })
            .collect();
        let void = is_void(&name);
        self.push(parent, NodeKind::Element { name, attrs, void })
    }

    fn is_void_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Element { void: true, .. })
    }

    /// Nearest open element named `name`, walking up from `from`
    fn find_open(&self, from: NodeId, name: &str) -> Option<NodeId> {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            if let NodeKind::Element { name: open, .. } = &self.nodes[id].kind {
                if open.eq_ignore_ascii_case(name) {
                    return Some(id);
                }
            }
            cursor = self.nodes[id].parent;
        }
        None
    }

    fn shrink(&mut self, max_len: usize) {
        let mut cursor = FRAGMENT;
        let mut marker: Option<NodeId> = None;
        let mut attrs_trimmed = false;

        while self.rendered_len() + MARKER_RESERVE > max_len {
            let children = self.nodes[cursor].children.len();
            if cursor == FRAGMENT && children == 0 {
                break;
            }
            if children > 1 {
                self.nodes[cursor].children.pop();
                marker = Some(cursor);
                continue;
            }
            if children == 1 {
                cursor = self.nodes[cursor].children[0];
                continue;
            }

            match self.nodes[cursor].parent {
                Some(parent) if parent != FRAGMENT => {
                    self.nodes[parent].children.retain(|&child| child != cursor);
                    marker = Some(parent);
                    cursor = parent;
                }
                _ => {
                    // outermost node: attributes first, then text, then give up
                    let budget = max_len.saturating_sub(ELLIPSIS.len());
                    match &mut self.nodes[cursor].kind {
                        NodeKind::Element { attrs, .. } if !attrs.is_empty() => {
                            attrs.remove(0);
                            attrs_trimmed = true;
                        }
                        NodeKind::Text(text) => {
                            *text = cut_chars(text, budget);
                            marker = Some(FRAGMENT);
                            break;
                        }
                        _ => break,
                    }
                }
            }
        }

        match marker {
            Some(node) => {
                self.push(node, NodeKind::Text(ELLIPSIS.to_string()));
            }
            None if attrs_trimmed => {
                if let NodeKind::Element { attrs, .. } = &mut self.nodes[cursor].kind {
                    attrs.push((ELLIPSIS.to_string(), None));
                }
            }
            None => {}
        }
    }

    fn rendered_len(&self) -> usize {
        self.render().chars().count()
    }

    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(FRAGMENT, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Fragment => {
                for &child in &node.children {
                    self.render_node(child, out);
                }
            }
            NodeKind::Element { name, attrs, void } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attrs {
                    out.push(' ');
                    out.push_str(key);
                    if let Some(value) = value {
                        out.push_str("=\"");
                        out.push_str(&value.replace('"', "&quot;"));
                        out.push('"');
                    }
                }
                out.push('>');
                if *void {
                    return;
                }
                for &child in &node.children {
                    self.render_node(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            NodeKind::Text(text) | NodeKind::Raw(text) => out.push_str(text),
        }
    }
}
