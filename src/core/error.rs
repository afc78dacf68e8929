//! Purpose: Error kinds, rich error values, and exit-code mapping for the whole crate.
//! Exports: `ErrorKind`, `Category`, `Error`, `to_exit_code`.
//! Invariants: `ErrorKind` stays a flat Copy enum; context lives on `Error`.
//! Invariants: Exit codes are stable once published; the table test locks them.

use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidMessage,
    InvalidKey,
    InvalidLiteral,
    UnexpectedCharacter,
    UnexpectedLiteral,
    UnexpectedNumber,
    UnexpectedString,
    UnexpectedObject,
    UnexpectedArray,
    UnexpectedDelimiter,
    UnexpectedComma,
    BraceMismatch,
    BracketMismatch,
    MessageTooLarge,
    Incomplete,
    InvalidUnicode,
    NumberOutOfRange,
    NotFound,
    Internal,
}

/// Coarse grouping used for exit codes and retry decisions. Only
/// `Completeness` is retryable (supply a longer buffer and parse again).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Category {
    Argument,
    Syntax,
    Limit,
    Completeness,
    Value,
    Internal,
}

impl ErrorKind {
    pub fn category(self) -> Category {
        match self {
            ErrorKind::InvalidArgument => Category::Argument,
            ErrorKind::InvalidMessage
            | ErrorKind::InvalidKey
            | ErrorKind::InvalidLiteral
            | ErrorKind::UnexpectedCharacter
            | ErrorKind::UnexpectedLiteral
            | ErrorKind::UnexpectedNumber
            | ErrorKind::UnexpectedString
            | ErrorKind::UnexpectedObject
            | ErrorKind::UnexpectedArray
            | ErrorKind::UnexpectedDelimiter
            | ErrorKind::UnexpectedComma
            | ErrorKind::BraceMismatch
            | ErrorKind::BracketMismatch => Category::Syntax,
            ErrorKind::MessageTooLarge => Category::Limit,
            ErrorKind::Incomplete => Category::Completeness,
            ErrorKind::InvalidUnicode | ErrorKind::NumberOutOfRange | ErrorKind::NotFound => {
                Category::Value
            }
            ErrorKind::Internal => Category::Internal,
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    line: Option<u32>,
    offset: Option<usize>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            line: None,
            offset: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// True exactly when the caller may retry with a longer input buffer.
    pub fn is_incomplete(&self) -> bool {
        self.kind == ErrorKind::Incomplete
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(line) = self.line {
            write!(f, " (line: {line})")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " (offset: {offset})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind.category() {
        Category::Internal => 1,
        Category::Argument => 2,
        Category::Syntax => 3,
        Category::Limit => 4,
        Category::Completeness => 5,
        Category::Value => 6,
    }
}
