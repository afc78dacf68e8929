//! Purpose: DOM-style JSON engine shared by the `ramify` CLI and library users.
//! Exports: `api` (stable surface) and `core` (parser, tree, codec, render).
//! Role: Parse text into an owned document tree, query and mutate it, and
//! render it back; concatenated documents stream through one parser.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
