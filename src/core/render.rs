//! Purpose: Render a document tree back to pretty JSON text.
//! Exports: `to_string`.
//! Invariants: Output layout is fixed: 2-space indent per depth, members
//! as `"key" : value`, siblings joined by `,\n`, root ends with a newline.
//! Invariants: Rendering a parsed document and reparsing it round-trips;
//! rendering twice is byte-identical.

use std::fmt::Write as _;

use crate::core::error::{Error, ErrorKind};
use crate::core::node::{Kind, Node, Payload};

const INDENT: &str = "  ";

// Numbers with no fractional remainder print as integers; this is the
// largest magnitude where f64 still holds exact integers.
const INTEGER_EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;

pub fn to_string(document: &Node) -> Result<String, Error> {
    if !matches!(document.kind(), Kind::Object | Kind::Array) {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message("document root must be an object or an array"));
    }
    let mut out = String::new();
    write_value(document, 0, &mut out);
    out.push('\n');
    Ok(out)
}

fn write_member(node: &Node, depth: usize, out: &mut String) {
    push_indent(depth, out);
    if let Some(key) = node.key() {
        out.push('"');
        out.push_str(key);
        out.push_str("\" : ");
    }
    write_value(node, depth, out);
}

fn write_value(node: &Node, depth: usize, out: &mut String) {
    match &node.payload {
        Payload::Null => out.push_str("null"),
        Payload::Boolean(value) => out.push_str(if *value { "true" } else { "false" }),
        Payload::Number(value) => write_number(*value, out),
        Payload::String(value) => {
            out.push('"');
            out.push_str(value);
            out.push('"');
        }
        Payload::Array(items) => write_container(items, depth, b'[', b']', out),
        Payload::Object(members) => write_container(members, depth, b'{', b'}', out),
    }
}

fn write_container(children: &[Node], depth: usize, open: u8, close: u8, out: &mut String) {
    if children.is_empty() {
        out.push(open as char);
        out.push(close as char);
        return;
    }
    out.push(open as char);
    out.push('\n');
    for (index, child) in children.iter().enumerate() {
        write_member(child, depth + 1, out);
        if index + 1 < children.len() {
            out.push(',');
        }
        out.push('\n');
    }
    push_indent(depth, out);
    out.push(close as char);
}

fn write_number(value: f64, out: &mut String) {
    if value.fract() == 0.0 && value.abs() < INTEGER_EXACT_LIMIT {
        let _ = write!(out, "{}", value as i64);
    } else {
        let _ = write!(out, "{value}");
    }
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
