//! Plain-text extraction for Jira comment bodies.
//!
//! Jira returns comment bodies either as plain strings (REST v2, wiki
//! markup) or as an Atlassian Document Format tree: a JSON object whose
//! `content` array holds typed nodes, each optionally containing nested
//! `content`. The tree is first converted into [`Node`], then rendered with
//! two rule sets: block rules for the document and containers, inline rules
//! for paragraph children.

use serde_json::Value;

/// Returned when a comment has no body at all.
pub const NO_CONTENT: &str = "No content";

/// Returned when a body is present but has no recognizable shape.
pub const NO_TEXT_CONTENT: &str = "No text content available";

const BULLET: &str = "• ";

/// A single node of a document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Paragraph(Vec<Node>),
    Mention {
        text: Option<String>,
        display_name: Option<String>,
    },
    InlineCard {
        url: Option<String>,
    },
    CodeBlock(Vec<Node>),
    BulletList(Vec<Node>),
    OrderedList(Vec<Node>),
    ListItem(Vec<Node>),
    /// Any node kind not modeled above, with whatever children it carries.
    Other(Vec<Node>),
}

impl Node {
    /// Converts a JSON node. Never fails: unexpected shapes become an
    /// [`Node::Other`] with no children.
    pub fn from_value(value: &Value) -> Node {
        let Some(obj) = value.as_object() else {
            return Node::Other(Vec::new());
        };
        let children = || match obj.get("content") {
            Some(Value::Array(nodes)) => nodes.iter().map(Node::from_value).collect(),
            _ => Vec::new(),
        };
        let attr = |name: &str| {
            obj.get("attrs")
                .and_then(|attrs| attrs.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match obj.get("type").and_then(Value::as_str) {
            Some("text") => Node::Text(
                obj.get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            ),
            // A paragraph without a content array contributes nothing, not
            // even its line break.
            Some("paragraph") if matches!(obj.get("content"), Some(Value::Array(_))) => {
                Node::Paragraph(children())
            }
            Some("paragraph") => Node::Other(Vec::new()),
            Some("mention") => Node::Mention {
                text: attr("text"),
                display_name: attr("displayName"),
            },
            Some("inlineCard") => Node::InlineCard { url: attr("url") },
            Some("codeBlock") => Node::CodeBlock(children()),
            Some("bulletList") => Node::BulletList(children()),
            Some("orderedList") => Node::OrderedList(children()),
            Some("listItem") => Node::ListItem(children()),
            _ => Node::Other(children()),
        }
    }

    fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph(children)
            | Node::CodeBlock(children)
            | Node::BulletList(children)
            | Node::OrderedList(children)
            | Node::ListItem(children)
            | Node::Other(children) => children,
            Node::Text(_) | Node::Mention { .. } | Node::InlineCard { .. } => &[],
        }
    }
}

/// Extracts plain text from a comment body.
///
/// See the module documentation for the accepted shapes. The result is
/// always trimmed; the two placeholder constants are returned when there is
/// nothing to extract.
pub fn extract_text(body: Option<&Value>) -> String {
    match body {
        None | Some(Value::Null) => NO_CONTENT.to_string(),
        Some(Value::String(s)) if s.is_empty() => NO_CONTENT.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Object(obj)) => match obj.get("content") {
            Some(Value::Array(nodes)) => {
                let nodes: Vec<Node> = nodes.iter().map(Node::from_value).collect();
                render_block(&nodes)
            }
            Some(Value::String(legacy)) if !legacy.is_empty() => legacy.trim().to_string(),
            _ => NO_TEXT_CONTENT.to_string(),
        },
        Some(_) => NO_TEXT_CONTENT.to_string(),
    }
}

/// Renders a sequence of nodes with the block rule set.
pub fn render_block(nodes: &[Node]) -> String {
    let mut text = String::new();
    for node in nodes {
        match node {
            Node::Text(t) => text.push_str(t),
            Node::Paragraph(children) => {
                text.push_str(&render_inline(children));
                text.push('\n');
            }
            Node::BulletList(items) | Node::OrderedList(items) => {
                text.push_str(&render_list(items));
            }
            other => text.push_str(&render_block(other.children())),
        }
    }
    text.trim().to_string()
}

fn render_inline(nodes: &[Node]) -> String {
    let mut text = String::new();
    for node in nodes {
        match node {
            Node::Text(t) => text.push_str(t),
            Node::Mention { text: name, display_name } => {
                let name = name.as_deref().or(display_name.as_deref()).unwrap_or("user");
                text.push('@');
                text.push_str(name);
            }
            Node::InlineCard { url } => text.push_str(url.as_deref().unwrap_or("[link]")),
            other => text.push_str(&render_block(other.children())),
        }
    }
    text
}

fn render_list(items: &[Node]) -> String {
    let mut text = String::new();
    for item in items {
        if let Node::ListItem(children) = item {
            text.push_str(BULLET);
            text.push_str(&render_block(children));
            text.push('\n');
        }
    }
    text
}
