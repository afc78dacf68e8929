//! Purpose: Recursive-descent JSON parser producing the document tree.
//! Exports: `Parser`, `Parsed`, `MAX_DEPTH`.
//! Role: Text-to-tree boundary; the only writer of parser scan state.
//! Invariants: One in-flight parse per instance; scan state resets at entry.
//! Invariants: `Incomplete` is the only retryable failure and never leaves a
//! partial tree behind; all other errors abort the whole call unchanged.
//! Invariants: Nesting depth and the pending-key stack are capped at 256.

use crate::core::build;
use crate::core::error::{Error, ErrorKind};
use crate::core::node::Node;

pub const MAX_DEPTH: u32 = 256;
const KEY_STACK_LIMIT: usize = 256;
const LITERAL_LIMIT: usize = 6;

/// Result of one successful parse. `next_offset` is the byte offset of the
/// next concatenated document in the same input, if one follows.
#[derive(Debug)]
pub struct Parsed {
    pub document: Node,
    pub next_offset: Option<usize>,
}

/// What the current container frame will accept next. Close is legal
/// before the first member and after a complete member, never after a
/// comma, so trailing commas fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Expect {
    KeyOrClose,
    Key,
    Delimiter,
    Value,
    ValueOrClose,
    SeparatorOrClose,
}

impl Expect {
    fn allows_value(self) -> bool {
        matches!(self, Expect::Value | Expect::ValueOrClose)
    }

    fn allows_key(self) -> bool {
        matches!(self, Expect::Key | Expect::KeyOrClose)
    }

    fn allows_close(self) -> bool {
        matches!(
            self,
            Expect::KeyOrClose | Expect::ValueOrClose | Expect::SeparatorOrClose
        )
    }
}

/// Mutable, call-scoped scan state. Reusable across messages; `reset`
/// clears scan state while the accounting counters survive.
#[derive(Debug)]
pub struct Parser {
    offset: usize,
    line: u32,
    depth: u32,
    key_stack: Vec<String>,
    messages_parsed: u64,
    incomplete_messages: u64,
    last_kind: Option<ErrorKind>,
    last_trace: Option<String>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            offset: 0,
            line: 1,
            depth: 0,
            key_stack: Vec::new(),
            messages_parsed: 0,
            incomplete_messages: 0,
            last_kind: None,
            last_trace: None,
        }
    }

    /// Clears scan state and the last-error record so the instance can
    /// take another message. Counters are accounting data and survive.
    pub fn reset(&mut self) {
        self.begin();
    }

    pub fn messages_parsed(&self) -> u64 {
        self.messages_parsed
    }

    pub fn incomplete_messages(&self) -> u64 {
        self.incomplete_messages
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_kind
    }

    /// Formatted diagnostic for the most recent failure: routine,
    /// condition, and parser position.
    pub fn last_trace(&self) -> Option<&str> {
        self.last_trace.as_deref()
    }

    /// Parses one document out of `input`. On success the returned
    /// `next_offset` points at the start of a following `{`/`[` so
    /// concatenated documents can be fed through one instance. An
    /// `Incomplete` error means the input ended before the document
    /// closed: retry with a longer buffer from the same start; no partial
    /// state is kept across the retry.
    pub fn parse(&mut self, input: &str) -> Result<Parsed, Error> {
        self.begin();
        match self.parse_message(input) {
            Ok(parsed) => {
                self.messages_parsed += 1;
                Ok(parsed)
            }
            Err(err) => {
                if err.is_incomplete() {
                    self.incomplete_messages += 1;
                }
                self.last_kind = Some(err.kind());
                if self.last_trace.is_none() {
                    self.last_trace = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    fn begin(&mut self) {
        self.offset = 0;
        self.line = 1;
        self.depth = 0;
        self.key_stack.clear();
        self.last_kind = None;
        self.last_trace = None;
    }

    fn parse_message(&mut self, input: &str) -> Result<Parsed, Error> {
        let bytes = input.as_bytes();
        self.skip_leading(bytes);
        let Some(&start) = bytes.get(self.offset) else {
            return Err(self.fail(
                ErrorKind::InvalidMessage,
                "parse_message",
                "no document start found",
            ));
        };

        let document = match start {
            b'{' => {
                self.offset += 1;
                self.parse_object(input)?
            }
            b'[' => {
                self.offset += 1;
                self.parse_array(input)?
            }
            _ => {
                return Err(self.fail(
                    ErrorKind::InvalidMessage,
                    "parse_message",
                    "document must start with '{' or '['",
                ));
            }
        };

        let next_offset = self.scan_trailing(bytes);
        Ok(Parsed {
            document,
            next_offset,
        })
    }

    fn parse_object(&mut self, input: &str) -> Result<Node, Error> {
        self.enter("parse_object")?;
        let bytes = input.as_bytes();
        let mut node = build::empty_object();
        let mut expect = Expect::KeyOrClose;

        while let Some(&byte) = bytes.get(self.offset) {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.offset += 1;
                }
                _ if byte.is_ascii_whitespace() => self.offset += 1,
                _ if byte.is_ascii_alphabetic() => {
                    if !expect.allows_value() {
                        return Err(self.fail(
                            ErrorKind::UnexpectedLiteral,
                            "parse_object",
                            "literal found outside value position",
                        ));
                    }
                    let value = self.parse_literal(input)?;
                    self.attach(&mut node, value)?;
                    expect = Expect::SeparatorOrClose;
                }
                b'0'..=b'9' | b'-' => {
                    if !expect.allows_value() {
                        return Err(self.fail(
                            ErrorKind::UnexpectedNumber,
                            "parse_object",
                            "number found outside value position",
                        ));
                    }
                    let value = self.parse_number(input)?;
                    self.attach(&mut node, value)?;
                    expect = Expect::SeparatorOrClose;
                }
                b'"' => {
                    self.offset += 1;
                    if expect.allows_key() {
                        let key = self.parse_key(input)?;
                        self.push_key(key)?;
                        expect = Expect::Delimiter;
                    } else if expect.allows_value() {
                        let raw = self.parse_string(input)?;
                        self.attach(&mut node, build::string_raw(raw))?;
                        expect = Expect::SeparatorOrClose;
                    } else {
                        return Err(self.fail(
                            ErrorKind::UnexpectedString,
                            "parse_object",
                            "quote found outside key or value position",
                        ));
                    }
                }
                b':' => {
                    if expect != Expect::Delimiter {
                        return Err(self.fail(
                            ErrorKind::UnexpectedDelimiter,
                            "parse_object",
                            "delimiter without a preceding key",
                        ));
                    }
                    self.offset += 1;
                    expect = Expect::Value;
                }
                b'{' => {
                    if !expect.allows_value() {
                        return Err(self.fail(
                            ErrorKind::UnexpectedObject,
                            "parse_object",
                            "nested object outside value position",
                        ));
                    }
                    self.offset += 1;
                    let child = self.parse_object(input)?;
                    self.attach(&mut node, child)?;
                    expect = Expect::SeparatorOrClose;
                }
                b'[' => {
                    if !expect.allows_value() {
                        return Err(self.fail(
                            ErrorKind::UnexpectedArray,
                            "parse_object",
                            "nested array outside value position",
                        ));
                    }
                    self.offset += 1;
                    let child = self.parse_array(input)?;
                    self.attach(&mut node, child)?;
                    expect = Expect::SeparatorOrClose;
                }
                b',' => {
                    if expect != Expect::SeparatorOrClose {
                        return Err(self.fail(
                            ErrorKind::UnexpectedComma,
                            "parse_object",
                            "comma outside member position",
                        ));
                    }
                    self.offset += 1;
                    expect = Expect::Key;
                }
                b'}' => {
                    if !expect.allows_close() {
                        return Err(self.fail(
                            ErrorKind::BraceMismatch,
                            "parse_object",
                            "closing brace with an unfinished member",
                        ));
                    }
                    self.offset += 1;
                    self.depth -= 1;
                    return Ok(node);
                }
                b']' => {
                    return Err(self.fail(
                        ErrorKind::BracketMismatch,
                        "parse_object",
                        "closing bracket inside object",
                    ));
                }
                _ => {
                    return Err(self.fail(
                        ErrorKind::UnexpectedCharacter,
                        "parse_object",
                        "character has no meaning here",
                    ));
                }
            }
        }

        Err(self.fail(
            ErrorKind::Incomplete,
            "parse_object",
            "input ended before object closed",
        ))
    }

    fn parse_array(&mut self, input: &str) -> Result<Node, Error> {
        self.enter("parse_array")?;
        let bytes = input.as_bytes();
        let mut items: Vec<Node> = Vec::new();
        let mut expect = Expect::ValueOrClose;

        while let Some(&byte) = bytes.get(self.offset) {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.offset += 1;
                }
                _ if byte.is_ascii_whitespace() => self.offset += 1,
                _ if byte.is_ascii_alphabetic() => {
                    if !expect.allows_value() {
                        return Err(self.fail(
                            ErrorKind::UnexpectedLiteral,
                            "parse_array",
                            "literal found outside value position",
                        ));
                    }
                    let value = self.parse_literal(input)?;
                    items.push(value);
                    expect = Expect::SeparatorOrClose;
                }
                b'0'..=b'9' | b'-' => {
                    if !expect.allows_value() {
                        return Err(self.fail(
                            ErrorKind::UnexpectedNumber,
                            "parse_array",
                            "number found outside value position",
                        ));
                    }
                    let value = self.parse_number(input)?;
                    items.push(value);
                    expect = Expect::SeparatorOrClose;
                }
                b'"' => {
                    if !expect.allows_value() {
                        return Err(self.fail(
                            ErrorKind::UnexpectedString,
                            "parse_array",
                            "string found outside value position",
                        ));
                    }
                    self.offset += 1;
                    let raw = self.parse_string(input)?;
                    items.push(build::string_raw(raw));
                    expect = Expect::SeparatorOrClose;
                }
                b'{' => {
                    if !expect.allows_value() {
                        return Err(self.fail(
                            ErrorKind::UnexpectedObject,
                            "parse_array",
                            "nested object outside value position",
                        ));
                    }
                    self.offset += 1;
                    let child = self.parse_object(input)?;
                    items.push(child);
                    expect = Expect::SeparatorOrClose;
                }
                b'[' => {
                    if !expect.allows_value() {
                        return Err(self.fail(
                            ErrorKind::UnexpectedArray,
                            "parse_array",
                            "nested array outside value position",
                        ));
                    }
                    self.offset += 1;
                    let child = self.parse_array(input)?;
                    items.push(child);
                    expect = Expect::SeparatorOrClose;
                }
                b',' => {
                    if expect != Expect::SeparatorOrClose {
                        return Err(self.fail(
                            ErrorKind::UnexpectedComma,
                            "parse_array",
                            "comma outside element position",
                        ));
                    }
                    self.offset += 1;
                    expect = Expect::Value;
                }
                b']' => {
                    if !expect.allows_close() {
                        return Err(self.fail(
                            ErrorKind::BracketMismatch,
                            "parse_array",
                            "closing bracket with an unfinished element",
                        ));
                    }
                    self.offset += 1;
                    self.depth -= 1;
                    return Ok(build::array(items));
                }
                b'}' => {
                    return Err(self.fail(
                        ErrorKind::BraceMismatch,
                        "parse_array",
                        "closing brace inside array",
                    ));
                }
                _ => {
                    return Err(self.fail(
                        ErrorKind::UnexpectedCharacter,
                        "parse_array",
                        "character has no meaning here",
                    ));
                }
            }
        }

        Err(self.fail(
            ErrorKind::Incomplete,
            "parse_array",
            "input ended before array closed",
        ))
    }

    /// Accumulates consecutive letters and requires an exact,
    /// case-sensitive `true`/`false`/`null`. Letters running into end of
    /// input mean the surrounding container never closed.
    fn parse_literal(&mut self, input: &str) -> Result<Node, Error> {
        let bytes = input.as_bytes();
        let start = self.offset;
        while self.offset < bytes.len()
            && bytes[self.offset].is_ascii_alphabetic()
            && self.offset - start < LITERAL_LIMIT
        {
            self.offset += 1;
        }
        if self.offset >= bytes.len() {
            return Err(self.fail(
                ErrorKind::Incomplete,
                "parse_literal",
                "input ended inside a literal",
            ));
        }

        match &input[start..self.offset] {
            "true" => Ok(build::boolean(true)),
            "false" => Ok(build::boolean(false)),
            "null" => Ok(build::null()),
            other => {
                let condition = format!("`{other}` is not true, false, or null");
                Err(self.fail(ErrorKind::InvalidLiteral, "parse_literal", &condition))
            }
        }
    }

    /// Accumulates sign/digit/exponent/decimal characters and converts
    /// through the standard float parser. Overflow to a non-finite value
    /// is `NumberOutOfRange`.
    fn parse_number(&mut self, input: &str) -> Result<Node, Error> {
        let bytes = input.as_bytes();
        let start = self.offset;
        while self.offset < bytes.len()
            && matches!(bytes[self.offset], b'0'..=b'9' | b'-' | b'+' | b'e' | b'E' | b'.')
        {
            self.offset += 1;
        }
        if self.offset >= bytes.len() {
            return Err(self.fail(
                ErrorKind::Incomplete,
                "parse_number",
                "input ended inside a number",
            ));
        }

        let token = &input[start..self.offset];
        let value: f64 = match token.parse() {
            Ok(value) => value,
            Err(_) => {
                let condition = format!("`{token}` is not a number");
                return Err(self.fail(ErrorKind::InvalidLiteral, "parse_number", &condition));
            }
        };
        if !value.is_finite() {
            let condition = format!("`{token}` overflows a double");
            return Err(self.fail(ErrorKind::NumberOutOfRange, "parse_number", &condition));
        }
        Ok(build::number(value))
    }

    /// Captures a string value in wire form: escapes are preserved
    /// verbatim and expanded later through the codec on demand. `\u`
    /// sequences are hex-checked eagerly so garbage fails at parse time.
    fn parse_string(&mut self, input: &str) -> Result<String, Error> {
        let bytes = input.as_bytes();
        let start = self.offset;
        while let Some(&byte) = bytes.get(self.offset) {
            match byte {
                b'"' => {
                    let raw = input[start..self.offset].to_string();
                    self.offset += 1;
                    return Ok(raw);
                }
                b'\\' => match bytes.get(self.offset + 1) {
                    Some(b'u') => {
                        self.offset += 2;
                        for _ in 0..4 {
                            match bytes.get(self.offset) {
                                Some(digit) if digit.is_ascii_hexdigit() => self.offset += 1,
                                Some(_) => {
                                    return Err(self.fail(
                                        ErrorKind::InvalidUnicode,
                                        "parse_string",
                                        "\\u requires 4 hex digits",
                                    ));
                                }
                                None => break,
                            }
                        }
                    }
                    Some(_) => self.offset += 2,
                    None => self.offset += 1,
                },
                b'\n' => {
                    self.line += 1;
                    self.offset += 1;
                }
                _ => self.offset += 1,
            }
        }
        Err(self.fail(
            ErrorKind::Incomplete,
            "parse_string",
            "input ended inside a string",
        ))
    }

    /// Keys are decoded eagerly, unlike string values, and only the
    /// two-character escape set applies; `\u` is not recognized here.
    fn parse_key(&mut self, input: &str) -> Result<String, Error> {
        let rest = &input[self.offset..];
        let mut key = String::new();
        let mut chars = rest.char_indices();
        loop {
            let Some((idx, ch)) = chars.next() else {
                self.offset = input.len();
                return Err(self.fail(
                    ErrorKind::Incomplete,
                    "parse_key",
                    "input ended inside a key",
                ));
            };
            match ch {
                '"' => {
                    self.offset += idx + 1;
                    return Ok(key);
                }
                '\\' => {
                    let escaped = chars.next().map(|(_, esc)| esc);
                    match escaped {
                        Some('n') => key.push('\n'),
                        Some('t') => key.push('\t'),
                        Some('b') => key.push('\u{0008}'),
                        Some('f') => key.push('\u{000c}'),
                        Some('r') => key.push('\r'),
                        Some('\\') => key.push('\\'),
                        Some('"') => key.push('"'),
                        Some('/') => key.push('/'),
                        Some(other) => {
                            self.offset += idx;
                            let condition = format!("`\\{other}` is not a valid key escape");
                            return Err(self.fail(ErrorKind::InvalidKey, "parse_key", &condition));
                        }
                        None => {
                            self.offset = input.len();
                            return Err(self.fail(
                                ErrorKind::Incomplete,
                                "parse_key",
                                "input ended inside a key escape",
                            ));
                        }
                    }
                }
                other => key.push(other),
            }
        }
    }

    /// Pops the pending key and attaches it to a freshly parsed value,
    /// then appends the pair to the enclosing object.
    fn attach(&mut self, object: &mut Node, value: Node) -> Result<(), Error> {
        let Some(key) = self.key_stack.pop() else {
            return Err(self.fail(
                ErrorKind::Internal,
                "attach",
                "value arrived without a pending key",
            ));
        };
        build::append_pair(object, build::with_key(value, key))
    }

    fn push_key(&mut self, key: String) -> Result<(), Error> {
        if self.key_stack.len() >= KEY_STACK_LIMIT {
            return Err(self.fail(
                ErrorKind::MessageTooLarge,
                "push_key",
                "pending-key stack exhausted",
            ));
        }
        self.key_stack.push(key);
        Ok(())
    }

    fn enter(&mut self, routine: &str) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.fail(
                ErrorKind::MessageTooLarge,
                routine,
                "nesting exceeds the depth limit",
            ));
        }
        Ok(())
    }

    /// Skips whitespace and `//` / `/* */` comments ahead of the document.
    fn skip_leading(&mut self, bytes: &[u8]) {
        while let Some(&byte) = bytes.get(self.offset) {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.offset += 1;
                }
                _ if byte.is_ascii_whitespace() => self.offset += 1,
                b'/' => match bytes.get(self.offset + 1) {
                    Some(b'/') => {
                        self.offset += 2;
                        while let Some(&b) = bytes.get(self.offset) {
                            self.offset += 1;
                            if b == b'\n' {
                                self.line += 1;
                                break;
                            }
                        }
                    }
                    Some(b'*') => {
                        self.offset += 2;
                        self.skip_block_comment(bytes);
                    }
                    _ => return,
                },
                _ => return,
            }
        }
    }

    /// Looks past the closed document for the start of the next one,
    /// skipping whitespace and block comments. Anything else ends the
    /// stream.
    fn scan_trailing(&mut self, bytes: &[u8]) -> Option<usize> {
        while let Some(&byte) = bytes.get(self.offset) {
            match byte {
                b'{' | b'[' => return Some(self.offset),
                b'\n' => {
                    self.line += 1;
                    self.offset += 1;
                }
                _ if byte.is_ascii_whitespace() => self.offset += 1,
                b'/' if bytes.get(self.offset + 1) == Some(&b'*') => {
                    self.offset += 2;
                    self.skip_block_comment(bytes);
                }
                _ => return None,
            }
        }
        None
    }

    fn skip_block_comment(&mut self, bytes: &[u8]) {
        while let Some(&byte) = bytes.get(self.offset) {
            self.offset += 1;
            match byte {
                b'\n' => self.line += 1,
                b'*' if bytes.get(self.offset) == Some(&b'/') => {
                    self.offset += 1;
                    return;
                }
                _ => {}
            }
        }
    }

    fn fail(&mut self, kind: ErrorKind, routine: &str, condition: &str) -> Error {
        self.last_kind = Some(kind);
        self.last_trace = Some(format!(
            "core::parse::{routine}: {condition} [line {}, offset {}]",
            self.line, self.offset
        ));
        Error::new(kind)
            .with_message(condition.to_string())
            .with_line(self.line)
            .with_offset(self.offset)
    }
}
