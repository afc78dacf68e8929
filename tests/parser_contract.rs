//! Purpose: Lock parser contract expectations with corpus + differential coverage.
//! Exports: Integration tests only (no runtime exports).
//! Role: Catch semantic drift between the ramify parser and the serde_json baseline.
//! Invariants: Differential checks assert parity where behavior should match today.
//! Notes: Known divergences (comments, concatenation, scalar roots, recursion
//! limits) are asserted explicitly instead of papered over.

use ramify::api::{Kind, Node, Parser, codec, query};
use serde_json::Value;

fn parse_ramify(input: &str) -> Result<Node, String> {
    Parser::new()
        .parse(input)
        .map(|parsed| parsed.document)
        .map_err(|err| err.to_string())
}

fn parse_serde(input: &str) -> Result<Value, String> {
    serde_json::from_str::<Value>(input).map_err(|err| err.to_string())
}

/// Rebuilds a serde_json value from a ramify tree so the two parses can
/// be compared structurally. Number caveat: the tree stores every number
/// as f64, so the corpus sticks to plain integers and fractional
/// decimals, where both parsers agree on representation.
fn to_value(node: &Node) -> Value {
    match node.kind() {
        Kind::Null => Value::Null,
        Kind::Boolean => Value::from(node.as_boolean().expect("boolean")),
        Kind::Number => {
            let number = node.as_number().expect("number");
            if number.fract() == 0.0 && number.abs() < 9.007199254740992e15 {
                Value::from(number as i64)
            } else {
                Value::from(number)
            }
        }
        Kind::String => {
            let raw = node.as_string_raw().expect("string");
            Value::from(codec::decode(raw).expect("decodable string"))
        }
        Kind::Array => Value::Array(
            query::children(node)
                .expect("array items")
                .iter()
                .map(to_value)
                .collect(),
        ),
        Kind::Object => {
            let mut map = serde_json::Map::new();
            for member in query::children(node).expect("object members") {
                map.insert(member.key().expect("member key").to_string(), to_value(member));
            }
            Value::Object(map)
        }
    }
}

fn assert_differential_parity(input: &str) {
    let ours = parse_ramify(input);
    let baseline = parse_serde(input);
    match (ours, baseline) {
        (Ok(tree), Ok(value)) => assert_eq!(to_value(&tree), value, "parser value mismatch"),
        (Err(_), Err(_)) => {}
        (left, right) => panic!("parser outcome mismatch: ramify={left:?}, serde={right:?}"),
    }
}

#[test]
fn corpus_valid_payloads_match_serde() {
    let corpus = [
        r#"{"a":1,"b":"ok"}"#,
        r#"[1,2,3,{"x":true}]"#,
        r#"{"nested":{"arr":[{"k":"v"}]}}"#,
        r#"{"unicode":"☃"}"#,
        r#"{"mixed":[null,false,-2,0.5,"s"]}"#,
        r#"{"escapes":"tab\tquote\"slash\\"}"#,
        "[]",
        "{}",
    ];

    for case in corpus {
        assert_differential_parity(case);
    }
}

#[test]
fn corpus_malformed_payloads_match_serde() {
    let corpus = [
        r#"{"a":}"#,
        r#"{"a":1,}"#,
        "[1,,2]",
        r#"{"a" "b"}"#,
        r#"{"a":tru}"#,
        "[1 2]",
        r#"{"a":1"#,
    ];

    for case in corpus {
        assert!(parse_ramify(case).is_err(), "ramify accepted: {case}");
        assert!(parse_serde(case).is_err(), "serde accepted: {case}");
    }
}

#[test]
fn corpus_duplicate_keys_matches_current_behavior() {
    // The tree keeps both members; flattening to a map makes the later
    // one win, which is also serde_json's duplicate policy.
    let input = r#"{"a":1,"a":2}"#;
    assert_differential_parity(input);

    let tree = parse_ramify(input).expect("ramify parse");
    assert_eq!(tree.child_count(), 2);
}

#[test]
fn divergence_comments_are_a_ramify_extension() {
    let input = "// note\n{\"a\": 1}";
    assert!(parse_ramify(input).is_ok(), "ramify should accept comments");
    assert!(parse_serde(input).is_err(), "serde_json should reject comments");
}

#[test]
fn divergence_scalar_roots_are_rejected_here() {
    for input in ["42", "\"text\"", "true", "null"] {
        assert!(
            parse_ramify(input).is_err(),
            "ramify requires an object or array root: {input}"
        );
        assert!(
            parse_serde(input).is_ok(),
            "serde_json accepts scalar roots: {input}"
        );
    }
}

#[test]
fn divergence_deep_nesting_beyond_serde_recursion_limit() {
    let depth = 200usize;
    let mut payload = String::with_capacity(depth * 2 + 1);
    for _ in 0..depth {
        payload.push('[');
    }
    payload.push('0');
    for _ in 0..depth {
        payload.push(']');
    }
    assert!(
        parse_ramify(&payload).is_ok(),
        "ramify allows nesting up to its own 256 depth cap"
    );
    assert!(
        parse_serde(&payload).is_err(),
        "serde_json baseline rejects nesting beyond its recursion limit"
    );
}
