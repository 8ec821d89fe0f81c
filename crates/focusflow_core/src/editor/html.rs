//! HTML fragment parsing and serialization for note bodies.
//!
//! # Responsibility
//! - Turn stored `content` strings into document nodes and back.
//! - Match browser `innerHTML` serialization for the markup the editor emits.
//!
//! # Invariants
//! - Parsing never fails: unknown or stray markup degrades to text or is dropped.
//! - Void elements (`br`, `img`, `input`, ...) are serialized without end tags.
//! - Non-breaking spaces serialize as `&nbsp;`.

use crate::editor::dom::{is_void_tag, Document, NodeId, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s/>="']+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*)\s*(/?)>"#,
    )
    .expect("valid tag regex")
});
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s/>="']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("valid attribute regex")
});
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex"));

/// Parses `html` into detached top-level nodes owned by `doc`.
pub fn parse_fragment(doc: &mut Document, html: &str) -> Vec<NodeId> {
    let mut top_level = Vec::new();
    let mut open: Vec<NodeId> = Vec::new();
    let mut cursor = 0;

    for captures in TAG_RE.captures_iter(html) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        push_text(doc, &mut top_level, &open, &html[cursor..whole.start()]);
        cursor = whole.end();

        let Some(name) = captures.get(2) else {
            // Comment.
            continue;
        };
        let tag = name.as_str().to_ascii_lowercase();
        let closing = captures.get(1).is_some_and(|m| !m.as_str().is_empty());

        if closing {
            if let Some(depth) = open
                .iter()
                .rposition(|node| doc.tag(*node) == Some(tag.as_str()))
            {
                open.truncate(depth);
            }
            continue;
        }

        let element = doc.create_element(&tag);
        if let Some(attrs) = captures.get(3) {
            for attr in ATTR_RE.captures_iter(attrs.as_str()) {
                let key = attr[1].to_ascii_lowercase();
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .or_else(|| attr.get(4))
                    .map_or(String::new(), |m| decode_entities(m.as_str()));
                if doc.attr(element, &key).is_none() {
                    doc.set_attr(element, &key, &value);
                }
            }
        }
        attach(doc, &mut top_level, &open, element);

        let self_closing = captures.get(4).is_some_and(|m| !m.as_str().is_empty());
        if !is_void_tag(&tag) && !self_closing {
            open.push(element);
        }
    }
    push_text(doc, &mut top_level, &open, &html[cursor..]);

    top_level
}

/// Replaces all children of `parent` with the parsed `html`.
pub fn set_inner_html(doc: &mut Document, parent: NodeId, html: &str) {
    doc.clear_children(parent);
    for node in parse_fragment(doc, html) {
        doc.append_child(parent, node);
    }
}

/// Serializes the children of `id`, like `element.innerHTML`.
pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    for child in doc.children(id) {
        write_node(doc, *child, &mut out);
    }
    out
}

/// Escapes text for use inside element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes text for use inside a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
    out
}

/// Decodes character references; unknown names are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            decoded.map_or_else(|| caps[0].to_string(), |ch| ch.to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

fn push_text(doc: &mut Document, top_level: &mut Vec<NodeId>, open: &[NodeId], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let text = doc.create_text(decode_entities(raw));
    attach(doc, top_level, open, text);
}

fn attach(doc: &mut Document, top_level: &mut Vec<NodeId>, open: &[NodeId], node: NodeId) {
    match open.last() {
        Some(parent) => doc.append_child(*parent, node),
        None => top_level.push(node),
    }
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (key, value) in &element.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if is_void_tag(&element.tag) {
                return;
            }
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_entities, inner_html, parse_fragment, set_inner_html};
    use crate::editor::dom::Document;

    fn roundtrip(html: &str) -> String {
        let mut doc = Document::new();
        let root = doc.root();
        set_inner_html(&mut doc, root, html);
        inner_html(&doc, root)
    }

    #[test]
    fn checkbox_line_serializes_like_a_browser() {
        assert_eq!(
            roundtrip(r#"<div><input type="checkbox">&nbsp;</div>"#),
            r#"<div><input type="checkbox">&nbsp;</div>"#
        );
    }

    #[test]
    fn boolean_and_self_closing_markup_is_normalized() {
        assert_eq!(
            roundtrip(r#"<IMG SRC='a.png' /><input type=checkbox checked>"#),
            r#"<img src="a.png"><input type="checkbox" checked="">"#
        );
    }

    #[test]
    fn stray_end_tags_are_ignored_and_unclosed_tags_close_at_end() {
        assert_eq!(roundtrip("a</b><i>b"), "a<i>b</i>");
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(roundtrip("<div>a<!-- hidden -->b</div>"), "<div>ab</div>");
    }

    #[test]
    fn entities_decode_to_text_and_reescape() {
        let mut doc = Document::new();
        let nodes = parse_fragment(&mut doc, "1 &lt; 2 &amp;&amp; &#65;&#x42; &bogus;");
        assert_eq!(doc.text(nodes[0]), Some("1 < 2 && AB &bogus;"));
        assert_eq!(decode_entities("x&nbsp;y"), "x\u{a0}y");
        assert_eq!(roundtrip("1 &lt; 2"), "1 &lt; 2");
    }
}
