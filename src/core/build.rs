// Construction-only tree builders, independent of parsing. String nodes
// store the wire form, so raw text is escaped on the way in.

use crate::core::codec;
use crate::core::error::{Error, ErrorKind};
use crate::core::node::{Node, Payload};

pub fn string(value: &str) -> Node {
    Node::new(Payload::String(codec::encode(value)))
}

/// Builds a string node from text that is already in wire form. The
/// parser uses this for raw captures; callers with escaped input can too.
pub fn string_raw(value: impl Into<String>) -> Node {
    Node::new(Payload::String(value.into()))
}

pub fn number(value: f64) -> Node {
    Node::new(Payload::Number(value))
}

pub fn boolean(value: bool) -> Node {
    Node::new(Payload::Boolean(value))
}

pub fn null() -> Node {
    Node::new(Payload::Null)
}

pub fn empty_object() -> Node {
    Node::new(Payload::Object(Vec::new()))
}

/// Builds an object holding one initial member; grow it with `append_pair`.
pub fn object(first: Node) -> Result<Node, Error> {
    let mut node = empty_object();
    append_pair(&mut node, first)?;
    Ok(node)
}

/// Appends a member to an object, preserving insertion order. Every
/// object member must carry a key, Null-valued members included.
pub fn append_pair(object: &mut Node, pair: Node) -> Result<(), Error> {
    if pair.key.is_none() {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message("object members require a key"));
    }
    match &mut object.payload {
        Payload::Object(children) => {
            children.push(pair);
            Ok(())
        }
        _ => Err(Error::new(ErrorKind::InvalidArgument)
            .with_message("append target is not an object")),
    }
}

/// Builds an array from an ordered item list. Array members are keyless;
/// any keys on the inputs are cleared.
pub fn array(items: impl IntoIterator<Item = Node>) -> Node {
    let items = items
        .into_iter()
        .map(|mut item| {
            item.key = None;
            item
        })
        .collect();
    Node::new(Payload::Array(items))
}

pub fn with_key(mut node: Node, key: impl Into<String>) -> Node {
    node.key = Some(key.into());
    node
}
