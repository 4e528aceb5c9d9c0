//! Ordered nested documents and their YAML-style rendering

use crate::model::ConfigValue;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A node in a nested key/value document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<Node>),
    Map(Mapping),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&ConfigValue> for Node {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Bool(b) => Node::Bool(*b),
            ConfigValue::Text(s) => Node::Text(s.clone()),
            ConfigValue::List(items) => Node::List(items.iter().cloned().map(Node::Text).collect()),
        }
    }
}

impl From<Mapping> for Node {
    fn from(map: Mapping) -> Self {
        Node::Map(map)
    }
}

/// Insertion-ordered mapping of string keys to nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key, keeping its existing position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as block-style YAML with two spaces per nesting level
    pub fn to_yaml(&self) -> String {
        let mut out = String::new();
        write_mapping(&mut out, self, 0);
        out
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Int(i) => serializer.serialize_i64(*i),
            Node::Text(s) => serializer.serialize_str(s),
            Node::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(map) => map.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

fn write_mapping(out: &mut String, map: &Mapping, indent: usize) {
    let spaces = pad(indent);
    for (key, value) in map.iter() {
        let key = render_text(key);
        match value {
            Node::Map(inner) if inner.is_empty() => {
                out.push_str(&format!("{}{}: {{}}\n", spaces, key));
            }
            Node::Map(inner) => {
                out.push_str(&format!("{}{}:\n", spaces, key));
                write_mapping(out, inner, indent + 1);
            }
            Node::List(items) if items.is_empty() => {
                out.push_str(&format!("{}{}: []\n", spaces, key));
            }
            Node::List(items) => {
                out.push_str(&format!("{}{}:\n", spaces, key));
                for item in items {
                    write_list_item(out, item, indent + 1);
                }
            }
            scalar => {
                out.push_str(&format!("{}{}: {}\n", spaces, key, render_scalar(scalar)));
            }
        }
    }
}

fn write_list_item(out: &mut String, item: &Node, indent: usize) {
    let spaces = pad(indent);
    match item {
        Node::Map(inner) if !inner.is_empty() => {
            // Render the mapping one level deeper, then turn the first line's
            // extra indent into the "- " marker.
            let mut block = String::new();
            write_mapping(&mut block, inner, indent + 1);
            let marker_width = spaces.len() + 2;
            out.push_str(&spaces);
            out.push_str("- ");
            out.push_str(&block[marker_width..]);
        }
        Node::List(inner) if !inner.is_empty() => {
            out.push_str(&format!("{}-\n", spaces));
            for nested in inner {
                write_list_item(out, nested, indent + 1);
            }
        }
        Node::Map(_) => out.push_str(&format!("{}- {{}}\n", spaces)),
        Node::List(_) => out.push_str(&format!("{}- []\n", spaces)),
        scalar => out.push_str(&format!("{}- {}\n", spaces, render_scalar(scalar))),
    }
}

fn render_scalar(node: &Node) -> String {
    match node {
        Node::Bool(b) => b.to_string(),
        Node::Int(i) => i.to_string(),
        Node::Text(s) => render_text(s),
        Node::List(_) | Node::Map(_) => String::new(),
    }
}

/// Plain scalar when unambiguous, JSON-style double quotes otherwise
fn render_text(text: &str) -> String {
    if needs_quoting(text) {
        serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
    } else {
        text.to_string()
    }
}

fn needs_quoting(text: &str) -> bool {
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
    ];

    if text.is_empty() || text.trim() != text {
        return true;
    }
    if text.starts_with(INDICATORS) || text.ends_with(':') {
        return true;
    }
    if text.contains(": ") || text.contains(" #") || text.chars().any(|c| c.is_control()) {
        return true;
    }
    matches!(text.to_ascii_lowercase().as_str(), "true" | "false" | "null" | "~") || looks_numeric(text)
}

/// Decimal, radix-prefixed (`0x`, `0o`, `0b`) or special float (`.inf`, `.nan`)
fn looks_numeric(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    let unsigned = lower.strip_prefix(['+', '-']).unwrap_or(&lower);

    if matches!(unsigned, ".inf" | ".nan") {
        return true;
    }
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = unsigned.strip_prefix(prefix) {
            return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
        }
    }
    lower.parse::<f64>().is_ok()
}
