//! Thrift IDL parser
//!
//! This module transforms IDL source text into a lossless syntax tree:
//! - [`token`]: Token kinds and the shared token chain
//! - [`lexer`]: Tokenization (source text → tokens), trivia included
//! - [`parser`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions
//! - [`index`]: Secondary lookups for struct fields and service functions
//! - [`config`]: Parser options
//!
//! # Round-trip guarantee
//!
//! Every character of the input, whitespace and comments included, ends up
//! in exactly one token of the chain. Nodes only reference token ranges, so
//! printing the whole chain (or any node's range) reproduces the input
//! byte for byte.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser over a lazily scanned token stream
//! with one token of pushback. No external parser generator dependencies.

pub mod ast;
pub mod config;
pub mod index;
pub mod lexer;
pub mod parser;
pub mod token;

mod declarations;
mod fields;
mod types;
mod values;
