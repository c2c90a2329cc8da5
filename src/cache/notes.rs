//! Rich-text extraction from Granola's nested node trees.
//!
//! Both the per-document `notes` field and the `documentPanels` overlay
//! store content as a tree of typed nodes (`text`, `paragraph`, `heading`,
//! generic containers with a nested `content` sequence). Extraction
//! flattens the tree to plain text in document order. The input is
//! untrusted external data: a malformed node contributes nothing rather
//! than failing the surrounding extraction, and recursion depth is capped.

use serde_json::Value;

/// Depth cap for untrusted trees. Real Granola notes nest a handful of
/// levels; anything deeper is treated as garbage.
const MAX_DEPTH: usize = 64;

/// Classification of a raw JSON value into the node shapes we understand.
enum Node<'a> {
    /// A `text`-typed node carrying literal text.
    Text(&'a str),
    /// Any node with a nested `content` sequence (paragraph, heading, doc,
    /// panel — they all flatten the same way).
    Container(&'a [Value]),
    /// A bare sequence of child nodes, as found in panel `content` arrays.
    Sequence(&'a [Value]),
    /// Anything else contributes nothing.
    Unknown,
}

fn classify(value: &Value) -> Node<'_> {
    match value {
        Value::Array(items) => Node::Sequence(items),
        Value::Object(obj) => {
            if obj.get("type").and_then(Value::as_str) == Some("text") {
                if let Some(text) = obj.get("text").and_then(Value::as_str) {
                    return Node::Text(text);
                }
                return Node::Unknown;
            }
            match obj.get("content") {
                Some(Value::Array(children)) => Node::Container(children),
                _ => Node::Unknown,
            }
        }
        _ => Node::Unknown,
    }
}

/// Flatten a rich-text tree to plain text.
///
/// Accepts either a node object (a `notes` tree or a panel entry) or a
/// bare content array. Order-preserving and idempotent; returns an empty
/// string for shapes it does not recognize.
pub fn extract_text(value: &Value) -> String {
    node_text(value, 0)
}

fn node_text(value: &Value, depth: usize) -> String {
    if depth > MAX_DEPTH {
        return String::new();
    }
    match classify(value) {
        Node::Text(text) => text.to_string(),
        Node::Container(children) | Node::Sequence(children) => {
            let parts: Vec<String> = children
                .iter()
                .map(|child| node_text(child, depth + 1))
                .filter(|part| !part.is_empty())
                .collect();
            parts.join(" ")
        }
        Node::Unknown => String::new(),
    }
}
