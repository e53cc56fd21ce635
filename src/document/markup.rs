//! Markup fragments: lenient parsing and serialization of content nodes

use crate::document::{Child, ContentNode};
use crate::error::MarkupError;
use quick_xml::escape::{escape, partial_escape, resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::rc::Rc;

/// Elements that never have content or a closing tag
pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "param" | "source" | "track" | "wbr"
    )
}

/// Parse a markup fragment into top-level children
pub fn parse_fragment(src: &str) -> Result<Vec<Child>, MarkupError> {
    let mut reader = Reader::from_str(src);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack: Vec<ContentNode> = vec![ContentNode::new("#root")];
    let mut entity_buf = String::with_capacity(16);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let node = element_from_start(&reader, &e)?;
                if is_void_tag(node.tag()) {
                    append(&mut stack, Child::element(node));
                } else {
                    stack.push(node);
                }
            }
            Ok(Event::Empty(e)) => {
                let node = element_from_start(&reader, &e)?;
                append(&mut stack, Child::element(node));
            }
            Ok(Event::End(e)) => {
                let tag = decode(&reader, e.name().as_ref())?.to_ascii_lowercase();
                // Close up to the nearest matching element; stray end tags are ignored
                if let Some(depth) = stack.iter().skip(1).rposition(|n| n.tag() == tag) {
                    while stack.len() > depth + 1 {
                        close_top(&mut stack);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.decode().map_err(|err| syntax_error(&reader, err))?;
                append(&mut stack, Child::text(&text));
            }
            Ok(Event::CData(e)) => {
                let text = decode(&reader, &e)?;
                append(&mut stack, Child::text(&text));
            }
            Ok(Event::GeneralRef(e)) => {
                let name = e.decode().map_err(|err| syntax_error(&reader, err))?;
                entity_buf.clear();
                entity_buf.push('&');
                entity_buf.push_str(&name);
                entity_buf.push(';');
                match unescape_with(&entity_buf, resolve_html5_entity) {
                    Ok(resolved) => append(&mut stack, Child::text(&resolved)),
                    Err(err) => {
                        log::debug!("keeping unknown entity {entity_buf} literally: {err:?}");
                        append(&mut stack, Child::text(&entity_buf));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(syntax_error(&reader, err)),
        }
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    let root = stack.pop().unwrap_or_default();
    Ok(root.children().to_vec())
}

/// Parse a fragment that must contain exactly one root element
pub fn parse_block(src: &str) -> Result<ContentNode, MarkupError> {
    parse_fragment(src)?
        .into_iter()
        .find_map(|child| match child {
            Child::Element(node) => Some(Rc::unwrap_or_clone(node)),
            Child::Text(_) => None,
        })
        .ok_or(MarkupError::MissingRoot)
}

/// Value of `key` on the first start tag.
///
/// Reads no further than that tag, so fragments that fail [`parse_block`]
/// later on (or inside the tag itself) can still be identified.
pub fn root_attr(src: &str, key: &str) -> Option<String> {
    let mut reader = Reader::from_str(src);
    reader.config_mut().check_end_names = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return e
                    .html_attributes()
                    .flatten()
                    .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(key.as_bytes()))
                    .map(|attr| String::from_utf8_lossy(&attr.value).into_owned());
            }
            Ok(Event::Eof) => return None,
            Ok(_) => {}
            Err(_) => return raw_start_attr(src, key),
        }
    }
}

/// Scan an unterminated or otherwise unreadable start tag for `key=value`
fn raw_start_attr(src: &str, key: &str) -> Option<String> {
    let tag = &src[src.find('<')?..];
    let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
    let lower = tag.to_ascii_lowercase();

    let mut from = 0;
    while let Some(pos) = lower[from..].find(key) {
        let at = from + pos;
        from = at + key.len();
        if !lower[..at].ends_with(char::is_whitespace) {
            continue;
        }
        let Some(value) = tag[from..].trim_start().strip_prefix('=') else {
            continue;
        };
        let value = value.trim_start();
        return match value.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &value[1..];
                Some(body[..body.find(quote).unwrap_or(body.len())].to_string())
            }
            _ => value
                .split(|c: char| c.is_whitespace() || c == '/')
                .next()
                .map(str::to_string),
        };
    }
    None
}

/// Parse a document body into its top-level blocks.
///
/// Whitespace between blocks is dropped; stray top-level text is wrapped
/// in a paragraph.
pub fn parse_blocks(src: &str) -> Result<Vec<Rc<ContentNode>>, MarkupError> {
    let blocks = parse_fragment(src)?
        .into_iter()
        .filter_map(|child| match child {
            Child::Element(node) => Some(node),
            Child::Text(text) if text.trim().is_empty() => None,
            Child::Text(text) => Some(Rc::new(ContentNode::new("p").with_text(text.trim()))),
        })
        .collect();
    Ok(blocks)
}

/// Serialize a node to markup
pub fn to_markup(node: &ContentNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

impl ContentNode {
    /// Serialize this node to markup
    pub fn to_markup(&self) -> String {
        to_markup(self)
    }
}

fn write_node(node: &ContentNode, out: &mut String) {
    out.push('<');
    out.push_str(node.tag());
    for (key, value) in node.attributes() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    if node.children().is_empty() && is_void_tag(node.tag()) {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in node.children() {
        match child {
            Child::Text(text) => out.push_str(&partial_escape(&**text)),
            Child::Element(el) => write_node(el, out),
        }
    }
    out.push_str("</");
    out.push_str(node.tag());
    out.push('>');
}

fn append(stack: &mut [ContentNode], child: Child) {
    if let Some(top) = stack.last_mut() {
        top.push_child(child);
    }
}

fn close_top(stack: &mut Vec<ContentNode>) {
    if let Some(node) = stack.pop() {
        append(stack, Child::element(node));
    }
}

fn element_from_start(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> Result<ContentNode, MarkupError> {
    let name = e.name();
    let tag = decode(reader, name.as_ref())?;
    let mut node = ContentNode::new(tag.as_ref());
    for attr in e.html_attributes().flatten() {
        let key = match reader.decoder().decode(attr.key.as_ref()) {
            Ok(k) => k.to_ascii_lowercase(),
            Err(_) => continue,
        };
        let raw = decode(reader, &attr.value)?;
        let value = unescape_with(&raw, resolve_html5_entity)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.into_owned());
        node.set_attr(key, value);
    }
    Ok(node)
}

fn decode<'b>(
    reader: &Reader<&[u8]>,
    raw: &'b [u8],
) -> Result<std::borrow::Cow<'b, str>, MarkupError> {
    reader
        .decoder()
        .decode(raw)
        .map_err(|err| syntax_error(reader, err))
}

fn syntax_error(reader: &Reader<&[u8]>, err: impl std::fmt::Debug) -> MarkupError {
    MarkupError::Syntax {
        position: reader.buffer_position(),
        message: format!("{err:?}"),
    }
}
