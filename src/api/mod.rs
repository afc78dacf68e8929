//! Purpose: Define the stable public Rust API boundary for ramify.
//! Exports: Parser, tree, builder, query, render, and error types.
//! Role: Public, additive-only surface; callers should not reach into
//! `core` paths directly.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Category, Error, ErrorKind};
pub use crate::core::node::{Kind, Node};
pub use crate::core::parse::{MAX_DEPTH, Parsed, Parser};
pub use crate::core::{build, codec, query, render};
