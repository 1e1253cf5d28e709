//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, helper methods, and the document entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and top-level dispatch
//! - `declarations`: namespace, include, const, typedef, enum, struct, service
//! - `fields`: fields and annotation lists
//! - `types`: field types (base, named, map, list, set)
//! - `values`: constant values
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared lexer state. Tokens are pulled lazily from
//! the [`Lexer`]; the only backtracking is its one-slot pushback.

use crate::parser::ast::*;
use crate::parser::config::{ParseOptions, TrailingComma};
use crate::parser::lexer::{LexError, Lexer, QualifiedIdent};
use crate::parser::token::{
    classify_number, NumberKind, SourceLocation, Token, TokenChain, TokenId, TokenKind,
};
use thiserror::Error;
use tracing::debug;

const EXPECTED_DEFINITION: &str =
    "one of {namespace, enum, const, service, struct, include, typedef, union, exception}";

/// Parser error type
#[derive(Debug, Error)]
pub enum ParseError {
    /// The current token matches no grammar alternative.
    #[error("Parse error at {location}: found {found:?} but expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        location: SourceLocation,
    },

    #[error(
        "Parse error at {location}: typedef of named type '{name}', \
         expected a base type or map or list or set"
    )]
    NamedTypedef {
        name: String,
        location: SourceLocation,
    },

    /// Enum value or field id that is not an `i64` integer.
    #[error("Parse error at {location}: '{found}' is not a valid integer")]
    InvalidInteger {
        found: String,
        location: SourceLocation,
    },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            ParseError::UnexpectedToken { location, .. }
            | ParseError::NamedTypedef { location, .. }
            | ParseError::InvalidInteger { location, .. } => Some(*location),
            ParseError::Lex(
                LexError::UnexpectedCharacter { location, .. }
                | LexError::UnterminatedBlockComment { location }
                | LexError::UnterminatedString { location },
            ) => Some(*location),
            ParseError::Io(_) => None,
        }
    }
}

/// Recursive descent parser for Thrift IDL
pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) options: ParseOptions,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    pub fn with_options(source: &str, options: ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(source),
            options,
        }
    }

    /// Tokens chained so far, for reconstructing fragments.
    pub fn tokens(&self) -> &TokenChain {
        self.lexer.chain()
    }

    /// Parse the whole input and hand back the tree with its token chain.
    pub fn parse(mut self) -> Result<SyntaxTree, ParseError> {
        let document = self.parse_document()?;
        Ok(SyntaxTree {
            tokens: self.lexer.into_chain(),
            document,
        })
    }

    /// Parse the entire document (top-level declarations)
    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let mut definitions = Vec::new();

        loop {
            let keyword = self.lexer.next_non_whitespace()?;
            let kind = self.token(keyword).kind;
            let location = self.token(keyword).location;

            if kind != TokenKind::Eof {
                debug!(?kind, line = location.line, column = location.column, "definition");
            }

            let definition = match kind {
                TokenKind::Eof => {
                    return Ok(Document {
                        span: Span::new(0, keyword),
                        definitions,
                    });
                }
                TokenKind::Namespace => Definition::Namespace(self.parse_namespace(keyword)?),
                TokenKind::Include | TokenKind::CppInclude => {
                    Definition::Include(self.parse_include(keyword)?)
                }
                TokenKind::Const => Definition::Const(self.parse_const(keyword)?),
                TokenKind::Typedef => Definition::TypeDef(self.parse_typedef(keyword)?),
                TokenKind::Enum => Definition::Enum(self.parse_enum(keyword)?),
                TokenKind::Struct | TokenKind::Union | TokenKind::Exception => {
                    Definition::Struct(self.parse_struct(keyword)?)
                }
                TokenKind::Service => Definition::Service(self.parse_service(keyword)?),
                _ => return Err(self.unexpected_at(keyword, EXPECTED_DEFINITION)),
            };
            definitions.push(definition);
        }
    }

    // ===== Helper methods =====

    pub(crate) fn token(&self, id: TokenId) -> &Token {
        &self.lexer.chain()[id]
    }

    pub(crate) fn unexpected_at(&self, id: TokenId, expected: &str) -> ParseError {
        let token = self.token(id);
        ParseError::UnexpectedToken {
            found: token.describe(),
            expected: expected.to_string(),
            location: token.location,
        }
    }

    /// Consume the next significant token and report it as unexpected.
    pub(crate) fn unexpected<T>(&mut self, expected: &str) -> Result<T, ParseError> {
        let id = self.lexer.next_non_whitespace()?;
        Err(self.unexpected_at(id, expected))
    }

    /// Whether the next significant character is `ch`.
    pub(crate) fn check(&mut self, ch: char) -> Result<bool, ParseError> {
        Ok(self.lexer.peek_non_whitespace()? == Some(ch))
    }

    /// Consume the next token if it starts with `ch`.
    pub(crate) fn match_token(&mut self, ch: char) -> Result<Option<TokenId>, ParseError> {
        if self.check(ch)? {
            Ok(Some(self.lexer.next()?))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: TokenKind,
        expected: &str,
    ) -> Result<TokenId, ParseError> {
        let id = self.lexer.next_non_whitespace()?;
        if self.token(id).kind == kind {
            Ok(id)
        } else {
            Err(self.unexpected_at(id, expected))
        }
    }

    pub(crate) fn expect_identifier(
        &mut self,
        keyword_allowed: bool,
    ) -> Result<QualifiedIdent, ParseError> {
        match self.lexer.next_ident(keyword_allowed)? {
            Some(ident) => Ok(ident),
            None => self.unexpected("identifier"),
        }
    }

    pub(crate) fn expect_string(&mut self) -> Result<TokenId, ParseError> {
        match self.lexer.next_string()? {
            Some(id) => Ok(id),
            None => self.unexpected("' or \""),
        }
    }

    /// Integer literal, optionally negative, that fits in an `i64`.
    pub(crate) fn expect_integer(&mut self) -> Result<(TokenId, i64), ParseError> {
        let id = self.lexer.next_number()?;
        let token = self.token(id);
        if token.kind != TokenKind::Number {
            return Err(self.unexpected_at(id, "integer"));
        }

        let parsed = match classify_number(&token.raw) {
            Some(NumberKind::Int) => token.raw.parse::<i64>().ok(),
            _ => None,
        };
        parsed.map(|value| (id, value)).ok_or_else(|| ParseError::InvalidInteger {
            found: token.raw.clone(),
            location: token.location,
        })
    }

    /// Optional `,` or `;` list separator.
    pub(crate) fn eat_separator(&mut self) -> Result<Option<TokenId>, ParseError> {
        match self.lexer.peek_non_whitespace()? {
            Some(',') | Some(';') => Ok(Some(self.lexer.next()?)),
            _ => Ok(None),
        }
    }

    /// Consume the next token if it is a word (identifier or keyword).
    ///
    /// Callers that do not want the word push it back.
    pub(crate) fn peek_word(&mut self) -> Result<Option<TokenId>, ParseError> {
        match self.lexer.peek_non_whitespace()? {
            Some(ch) if ch.is_alphabetic() || ch == '_' => Ok(Some(self.lexer.next()?)),
            _ => Ok(None),
        }
    }

    /// Optional `( annotations )` after a construct whose last token so far
    /// is `end`. Returns the annotations and the new last token.
    pub(crate) fn parse_trailing_annotations(
        &mut self,
        end: TokenId,
    ) -> Result<(Vec<Annotation>, TokenId), ParseError> {
        if self.match_token('(')?.is_some() {
            self.parse_annotation_list(TrailingComma::Allow)
        } else {
            Ok((Vec::new(), end))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::config::EnumNumbering;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> SyntaxTree {
        Parser::new(source).parse().unwrap()
    }

    #[test]
    fn test_parse_empty_document() {
        for source in ["", "  \n", "// only a comment\n", "/* a */ # b"] {
            let tree = parse(source);
            assert!(tree.document.definitions.is_empty());
            assert_eq!(tree.to_string(), source);
        }
    }

    #[test]
    fn test_parse_simple_const() {
        let source = "const i32 test = 123;";
        let tree = parse(source);

        assert_eq!(tree.document.definitions.len(), 1);
        match &tree.document.definitions[0] {
            Definition::Const(node) => {
                assert_eq!(node.field_type.kind, FieldTypeKind::Base(BaseType::I32));
                assert_eq!(node.name, "test");
                assert_eq!(node.value.kind, ConstValueKind::Int("123".to_string()));
                assert_eq!(tree.tokens[node.span.end].raw, ";");
                assert_eq!(tree.text(node), source);
            }
            _ => panic!("Expected const definition"),
        }
    }

    #[test]
    fn test_dispatch_every_definition() {
        let source = r#"
namespace go a.b
include "shared.thrift"
cpp_include "<vector>"
const string NAME = "x"
typedef i64 UserId
enum E { A }
struct S { 1: i32 a }
union U { 1: i32 a }
exception X { 1: string msg }
service Svc { void ping() }
"#;
        let tree = parse(source);
        let names: Vec<_> = tree
            .definitions()
            .iter()
            .map(|definition| definition.as_node().name())
            .collect();

        assert_eq!(
            names,
            vec![
                "Namespace",
                "Include",
                "Include",
                "Const",
                "TypeDef",
                "Enum",
                "Struct",
                "Union",
                "Exception",
                "Service",
            ]
        );
        assert_eq!(tree.to_string(), source);
    }

    #[test]
    fn test_unexpected_top_level_token() {
        let err = Parser::new("\n  foo bar").parse().unwrap_err();
        match err {
            ParseError::UnexpectedToken {
                found,
                expected,
                location,
            } => {
                assert_eq!(found, "foo");
                assert_eq!(expected, EXPECTED_DEFINITION);
                assert_eq!(location.line, 2);
                assert_eq!(location.column, 3);
            }
            other => panic!("Expected unexpected token error, got {other:?}"),
        }
    }

    #[test]
    fn test_lex_error_aborts_parse() {
        let err = Parser::new("struct A { 1: i32 a } /* open").parse().unwrap_err();
        assert!(matches!(
            err,
            ParseError::Lex(LexError::UnterminatedBlockComment { .. })
        ));
        assert!(err.location().is_some());
    }

    #[test]
    fn test_error_message_mentions_location() {
        let err = Parser::new("enum E { A = x }").parse().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 1, column 14"), "{message}");
        assert!(message.contains("integer"), "{message}");
    }

    #[test]
    fn test_options_are_threaded_through() {
        let options = ParseOptions::new().with_enum_numbering(EnumNumbering::Sequential);
        let tree = Parser::with_options("enum E { A, B = 5, C }", options)
            .parse()
            .unwrap();
        let Definition::Enum(node) = &tree.definitions()[0] else {
            panic!("Expected enum definition");
        };
        let ids: Vec<_> = node.elements.iter().map(|element| element.id).collect();
        assert_eq!(ids, vec![0, 5, 6]);
    }
}
