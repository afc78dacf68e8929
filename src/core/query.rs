//! Purpose: Lookup, removal, and typed access over a parsed or built tree.
//! Exports: child lookups, remove operations, strict and lenient accessors.
//! Invariants: Duplicate keys are legal; declaration order decides matches.
//! Invariants: Removals drop the detached subtree and keep sibling order.

use crate::core::error::{Error, ErrorKind};
use crate::core::node::{Kind, Node};

pub fn has_child(parent: &Node, key: &str) -> bool {
    child(parent, key).is_some()
}

/// First member with the given key, in declaration order. Null-valued
/// members are keyed like any other and participate in lookup. Non-object
/// parents have no members to find.
pub fn child<'a>(parent: &'a Node, key: &str) -> Option<&'a Node> {
    if parent.kind() != Kind::Object {
        return None;
    }
    parent
        .children()?
        .iter()
        .find(|member| member.key() == Some(key))
}

/// Every member with the given key, preserving declaration order.
pub fn children_by_key<'a>(parent: &'a Node, key: &str) -> Vec<&'a Node> {
    if parent.kind() != Kind::Object {
        return Vec::new();
    }
    parent
        .children()
        .map(|members| {
            members
                .iter()
                .filter(|member| member.key() == Some(key))
                .collect()
        })
        .unwrap_or_default()
}

/// All immediate children of an object or array, in order. Null members
/// are present as real nodes, so positions still line up with keys.
pub fn children(parent: &Node) -> Option<&[Node]> {
    parent.children()
}

/// Splices out and drops the first member matching `key`. A second
/// member under the same key survives in place.
pub fn remove_child(parent: &mut Node, key: &str) -> Result<(), Error> {
    if parent.kind() != Kind::Object {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message("remove target is not an object"));
    }
    let Some(members) = parent.children_mut() else {
        return Err(Error::new(ErrorKind::Internal).with_message("object without member storage"));
    };
    match members.iter().position(|member| member.key() == Some(key)) {
        Some(index) => {
            members.remove(index);
            Ok(())
        }
        None => Err(Error::new(ErrorKind::NotFound)
            .with_message(format!("no member with key `{key}`"))),
    }
}

/// Splices out and drops every member matching `key`, returning how many
/// went. A key that matches nothing is `NotFound`, the expected outcome
/// for a miss rather than a failure.
pub fn remove_children(parent: &mut Node, key: &str) -> Result<usize, Error> {
    if parent.kind() != Kind::Object {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message("remove target is not an object"));
    }
    let Some(members) = parent.children_mut() else {
        return Err(Error::new(ErrorKind::Internal).with_message("object without member storage"));
    };
    let before = members.len();
    members.retain(|member| member.key() != Some(key));
    let removed = before - members.len();
    if removed == 0 {
        return Err(Error::new(ErrorKind::NotFound)
            .with_message(format!("no member with key `{key}`")));
    }
    Ok(removed)
}

/// Strict accessor: the stored wire-form string, or an error when the
/// node is absent or not a string.
pub fn string_value<'a>(node: Option<&'a Node>) -> Result<&'a str, Error> {
    let node = node.ok_or_else(absent)?;
    node.as_string_raw().ok_or_else(|| mismatch(node, Kind::String))
}

pub fn number_value(node: Option<&Node>) -> Result<f64, Error> {
    let node = node.ok_or_else(absent)?;
    node.as_number().ok_or_else(|| mismatch(node, Kind::Number))
}

pub fn boolean_value(node: Option<&Node>) -> Result<bool, Error> {
    let node = node.ok_or_else(absent)?;
    node.as_boolean().ok_or_else(|| mismatch(node, Kind::Boolean))
}

/// Lenient accessor: the string, or "" with no error channel.
pub fn string_or_default(node: Option<&Node>) -> &str {
    node.and_then(Node::as_string_raw).unwrap_or_default()
}

/// Lenient accessor: the number, or 0.0 with no error channel.
pub fn number_or_default(node: Option<&Node>) -> f64 {
    node.and_then(Node::as_number).unwrap_or_default()
}

/// Lenient accessor: the boolean, or false with no error channel.
pub fn boolean_or_default(node: Option<&Node>) -> bool {
    node.and_then(Node::as_boolean).unwrap_or_default()
}

/// An array's elements as one flat ordered slice.
pub fn array_items(node: &Node) -> Result<&[Node], Error> {
    if node.kind() != Kind::Array {
        return Err(Error::new(ErrorKind::InvalidArgument).with_message("node is not an array"));
    }
    node.children()
        .ok_or_else(|| Error::new(ErrorKind::Internal).with_message("array without storage"))
}

/// Ordered keys of an object's immediate members.
pub fn element_keys(parent: &Node) -> Result<Vec<&str>, Error> {
    if parent.kind() != Kind::Object {
        return Err(Error::new(ErrorKind::InvalidArgument)
            .with_message("key enumeration needs an object"));
    }
    let members = parent
        .children()
        .ok_or_else(|| Error::new(ErrorKind::Internal).with_message("object without storage"))?;
    Ok(members
        .iter()
        .map(|member| member.key().unwrap_or_default())
        .collect())
}

fn absent() -> Error {
    Error::new(ErrorKind::NotFound).with_message("no such member")
}

fn mismatch(node: &Node, wanted: Kind) -> Error {
    Error::new(ErrorKind::InvalidArgument).with_message(format!(
        "expected {wanted:?}, found {:?}",
        node.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::{
        array_items, boolean_or_default, boolean_value, child, children, children_by_key,
        element_keys, has_child, number_or_default, number_value, remove_child, remove_children,
        string_or_default, string_value,
    };
    use crate::core::build::{append_pair, array, boolean, null, number, object, string, with_key};
    use crate::core::error::ErrorKind;
    use crate::core::node::{Kind, Node};

    fn sample() -> Node {
        let mut doc = object(with_key(string("first"), "dup")).expect("object");
        append_pair(&mut doc, with_key(number(7.0), "count")).expect("append");
        append_pair(&mut doc, with_key(null(), "gap")).expect("append");
        append_pair(&mut doc, with_key(string("second"), "dup")).expect("append");
        append_pair(&mut doc, with_key(array([number(1.0), boolean(true)]), "items"))
            .expect("append");
        doc
    }

    #[test]
    fn lookup_returns_first_declared_match() {
        let doc = sample();
        assert!(has_child(&doc, "dup"));
        let found = child(&doc, "dup").expect("dup");
        assert_eq!(found.as_string_raw(), Some("first"));

        let all = children_by_key(&doc, "dup");
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].as_string_raw(), Some("second"));
    }

    #[test]
    fn null_members_are_real_and_keyed() {
        let doc = sample();
        let gap = child(&doc, "gap").expect("gap");
        assert_eq!(gap.kind(), Kind::Null);

        let keys = element_keys(&doc).expect("keys");
        assert_eq!(keys, ["dup", "count", "gap", "dup", "items"]);

        // Positional alignment: children and keys line up index by index.
        let members = children(&doc).expect("members");
        assert_eq!(members.len(), keys.len());
        assert_eq!(members[2].kind(), Kind::Null);
    }

    #[test]
    fn remove_first_keeps_the_second_in_place() {
        let mut doc = sample();
        remove_child(&mut doc, "dup").expect("remove first");
        assert_eq!(doc.child_count(), 4);

        let keys = element_keys(&doc).expect("keys");
        assert_eq!(keys, ["count", "gap", "dup", "items"]);
        let survivor = child(&doc, "dup").expect("second survives");
        assert_eq!(survivor.as_string_raw(), Some("second"));
    }

    #[test]
    fn remove_all_takes_every_match() {
        let mut doc = sample();
        let removed = remove_children(&mut doc, "dup").expect("remove all");
        assert_eq!(removed, 2);
        assert!(!has_child(&doc, "dup"));
        assert_eq!(doc.child_count(), 3);
    }

    #[test]
    fn remove_miss_is_not_found() {
        let mut doc = sample();
        let err = remove_child(&mut doc, "missing").expect_err("miss");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(doc.child_count(), 5);

        let err = remove_children(&mut doc, "missing").expect_err("miss");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn remove_from_non_object_is_invalid() {
        let mut arr = array([number(1.0)]);
        let err = remove_child(&mut arr, "k").expect_err("not object");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn strict_accessors_report_absence_and_mismatch() {
        let doc = sample();
        assert_eq!(number_value(child(&doc, "count")).expect("count"), 7.0);

        let err = number_value(child(&doc, "missing")).expect_err("absent");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = boolean_value(child(&doc, "count")).expect_err("mismatch");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = string_value(child(&doc, "gap")).expect_err("null is not a string");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn lenient_accessors_return_zero_values() {
        let doc = sample();
        assert_eq!(string_or_default(child(&doc, "missing")), "");
        assert_eq!(number_or_default(child(&doc, "missing")), 0.0);
        assert!(!boolean_or_default(child(&doc, "missing")));

        // Kind mismatch is also a zero value, not an error.
        assert_eq!(number_or_default(child(&doc, "dup")), 0.0);
        assert_eq!(string_or_default(child(&doc, "count")), "");
    }

    #[test]
    fn array_items_flattens_in_order() {
        let doc = sample();
        let items = array_items(child(&doc, "items").expect("items")).expect("array");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_number(), Some(1.0));
        assert_eq!(items[1].as_boolean(), Some(true));

        let err = array_items(&doc).expect_err("object is not an array");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
