//! # Introduction
//!
//! Thrifter parses Thrift IDL files into a syntax tree that remembers every
//! character of the input. Whitespace and comments are kept as tokens, so a
//! parsed file can be printed back exactly as it was written, and any node
//! can be turned back into its original source text.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Token chain ← Parser → AST (spans over the chain)
//! ```
//!
//! 1. [`parser::lexer`] scans characters into tokens on demand, trivia
//!    included, and appends them to a [`parser::token::TokenChain`].
//! 2. [`parser::parser`] drives the lexer with a recursive descent grammar
//!    and builds [`parser::ast`] nodes that point into the chain.
//! 3. [`parser::index`] gives structs, services and functions constant-time
//!    lookup of their children by name or by token.
//!
//! ## Example
//!
//! ```
//! let source = "struct User {\n  1: required string name // display name\n}\n";
//! let tree = thrifter::parse(source).unwrap();
//!
//! assert_eq!(tree.to_string(), source);
//! ```

pub mod parser;

use std::io::Read;

pub use parser::ast::SyntaxTree;
pub use parser::config::{EnumNumbering, ParseOptions, TrailingComma};
pub use parser::parser::{ParseError, Parser};

/// Parse a complete document with the default options.
pub fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    Parser::new(source).parse()
}

pub fn parse_with_options(source: &str, options: ParseOptions) -> Result<SyntaxTree, ParseError> {
    Parser::with_options(source, options).parse()
}

/// Read `reader` to the end and parse it. The input must be UTF-8.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<SyntaxTree, ParseError> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    parse(&source)
}
