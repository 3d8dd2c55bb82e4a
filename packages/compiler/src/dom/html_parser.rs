//! Markup Parser
//!
//! A lenient, single-pass HTML reader that builds arena nodes. It keeps the
//! input's structure exactly: whitespace text nodes survive, attribute order
//! is document order, nothing is normalized away. Unclosed elements close
//! implicitly at end of input; stray close tags are ignored.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashSet;

use super::document::{Dom, NodeRef};
use super::{Attribute, ElementData, NodeId, NodeKind};

/// Elements that never have children and never take a close tag.
static VOID_ELEMENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ]
    .into_iter()
    .collect()
});

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(name.to_ascii_lowercase().as_str())
}

static ENTITY_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#x?[0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Decode the basic named entities and numeric character references.
/// Unknown entities pass through verbatim.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_REGEXP
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            match decoded {
                Some(ch) => ch.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Parse markup into detached root nodes owned by `dom`.
pub(crate) fn parse_markup(dom: &Dom, markup: &str) -> Vec<NodeRef> {
    let mut reader = Reader {
        dom,
        bytes: markup.as_bytes(),
        src: markup,
        pos: 0,
        roots: Vec::new(),
        stack: Vec::new(),
    };
    reader.run();
    reader.roots.iter().map(|id| dom.node_ref(*id)).collect()
}

struct Reader<'a> {
    dom: &'a Dom,
    bytes: &'a [u8],
    src: &'a str,
    pos: usize,
    roots: Vec<NodeId>,
    stack: Vec<(String, NodeId)>,
}

impl Reader<'_> {
    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            let text_start = self.pos;
            let text_end = self.scan_text();
            if text_end > text_start {
                let src = self.src;
                self.append_text(&src[text_start..text_end]);
            }
            if self.pos >= self.bytes.len() {
                break;
            }
            // positioned at '<'
            if self.eat("<!--") {
                self.consume_comment();
            } else if self.peek_at(1) == Some(b'!') || self.peek_at(1) == Some(b'?') {
                // doctype or processing instruction: skip
                self.skip_past(b'>');
            } else if self.eat("</") {
                self.consume_close_tag();
            } else if self.peek_at(1).is_some_and(|b| b.is_ascii_alphabetic()) {
                self.consume_open_tag();
            } else {
                // stray '<' is literal text
                self.append_text("<");
                self.pos += 1;
            }
        }
    }

    /// Advance to the next '<' (or end of input), returning where the text
    /// run ends.
    fn scan_text(&mut self) -> usize {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'<' {
            self.pos += 1;
        }
        self.pos
    }

    fn consume_comment(&mut self) {
        let start = self.pos;
        let end = self.src[start..].find("-->").map(|i| start + i);
        let (value, next) = match end {
            Some(end) => (self.src[start..end].to_string(), end + 3),
            None => (self.src[start..].to_string(), self.bytes.len()),
        };
        let comment = self.dom.alloc(NodeKind::Comment(value));
        self.append_node(comment.id());
        self.pos = next;
    }

    fn consume_close_tag(&mut self) {
        let name = self.read_name();
        self.skip_past(b'>');
        if name.is_empty() {
            return;
        }
        // pop to the matching open element; ignore a close with no match
        if let Some(depth) = self.stack.iter().rposition(|(open, _)| *open == name) {
            self.stack.truncate(depth);
        }
    }

    fn consume_open_tag(&mut self) {
        self.pos += 1; // '<'
        let name = self.read_name();
        let mut attrs: Vec<Attribute> = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek() == Some(b'>') {
                        self.pos += 1;
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => {
                    if let Some(attr) = self.read_attribute() {
                        if !attrs.iter().any(|existing| existing.name == attr.name) {
                            attrs.push(attr);
                        }
                    }
                }
            }
        }
        let element = self.dom.alloc(NodeKind::Element(ElementData {
            name: name.clone(),
            attrs,
        }));
        self.append_node(element.id());
        if !self_closing && !is_void_element(&name) {
            self.stack.push((name, element.id()));
        }
    }

    fn read_attribute(&mut self) -> Option<Attribute> {
        let src = self.src;
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() || byte == b'=' || byte == b'>' || byte == b'/' {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            // unparsable byte; step over it so the loop makes progress
            self.pos += 1;
            return None;
        }
        let name = src[start..self.pos].to_ascii_lowercase();
        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            return Some(Attribute::new(name, ""));
        }
        self.pos += 1;
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|b| b != quote) {
                    self.pos += 1;
                }
                let value = &src[start..self.pos];
                if self.peek() == Some(quote) {
                    self.pos += 1;
                }
                value
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| !b.is_ascii_whitespace() && b != b'>')
                {
                    self.pos += 1;
                }
                &src[start..self.pos]
            }
        };
        Some(Attribute::new(name, decode_entities(value)))
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b':' || byte == b'-' || byte == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_ascii_lowercase()
    }

    fn append_text(&mut self, raw: &str) {
        let text = self.dom.alloc(NodeKind::Text(decode_entities(raw)));
        self.append_node(text.id());
    }

    fn append_node(&mut self, id: NodeId) {
        match self.stack.last() {
            Some((_, parent)) => {
                let parent = self.dom.node_ref(*parent);
                parent.append_child(&self.dom.node_ref(id));
            }
            None => self.roots.push(id),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_past(&mut self, byte: u8) {
        while let Some(current) = self.peek() {
            self.pos += 1;
            if current == byte {
                break;
            }
        }
    }
}
