//! Declaration parsing implementation
//!
//! This module handles parsing of the top-level definitions of a document:
//!
//! - Namespaces and includes
//! - Constants and typedefs
//! - Enums and their elements
//! - Structs, unions and exceptions
//! - Services and their functions
//!
//! # Grammar
//!
//! ```text
//! namespace ::= "namespace" ( "*" | ident ) ident [ annotations ]
//! include   ::= ( "include" | "cpp_include" ) string
//! const     ::= "const" field_type ident "=" const_value [ "," | ";" ]
//! typedef   ::= "typedef" field_type ident [ annotations ] [ "," | ";" ]
//! enum      ::= "enum" ident "{" element* "}" [ annotations ]
//! element   ::= ident [ "=" integer ] [ annotations ] [ "," | ";" ]
//! struct    ::= ( "struct" | "union" | "exception" ) ident "{" field* "}" [ annotations ]
//! service   ::= "service" ident [ "extends" ident ] "{" function* "}" [ annotations ]
//! function  ::= [ "oneway" ] ( "void" | field_type ) ident "(" field* ")"
//!               [ annotations ] [ "throws" "(" field* ")" ] [ annotations ] [ "," | ";" ]
//! ```
//!
//! Every method receives the already-consumed keyword token, which becomes
//! the first token of the node's span. All parsing methods are implemented
//! as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::config::{EnumNumbering, TrailingComma};
use crate::parser::index::ChildIndex;
use crate::parser::parser::{ParseError, Parser};
use crate::parser::token::{TokenId, TokenKind};
use tracing::debug;

impl Parser {
    /// Parse `namespace <scope> <target> [(annotations)]`
    pub(crate) fn parse_namespace(&mut self, keyword: TokenId) -> Result<Namespace, ParseError> {
        let scope = match self.match_token('*')? {
            Some(star) => self.token(star).raw.clone(),
            None => self.expect_identifier(true)?.text,
        };
        let target = self.expect_identifier(true)?;

        let mut annotations = Vec::new();
        let mut end = target.end;
        if self.match_token('(')?.is_some() {
            let policy = self.options.namespace_trailing_comma;
            (annotations, end) = self.parse_annotation_list(policy)?;
        }

        Ok(Namespace {
            span: Span::new(keyword, end),
            scope,
            target: target.text,
            annotations,
        })
    }

    /// Parse `include "path"` or `cpp_include "path"`
    pub(crate) fn parse_include(&mut self, keyword: TokenId) -> Result<Include, ParseError> {
        let kind = match self.token(keyword).kind {
            TokenKind::CppInclude => IncludeKind::CppInclude,
            _ => IncludeKind::Include,
        };
        let path = self.expect_string()?;

        Ok(Include {
            span: Span::new(keyword, path),
            kind,
            path: self.token(path).value.clone(),
        })
    }

    /// Parse `const <type> <name> = <value> [sep]`
    pub(crate) fn parse_const(&mut self, keyword: TokenId) -> Result<Const, ParseError> {
        let field_type = self.parse_field_type()?;
        let name = self.expect_identifier(false)?;
        self.expect_token(TokenKind::Equals, "=")?;
        let value = self.parse_const_value()?;
        let separator = self.eat_separator()?;

        debug!(name = %name.text, "const");
        Ok(Const {
            span: Span::new(keyword, separator.unwrap_or(value.span.end)),
            field_type,
            name: name.text,
            value,
            separator,
        })
    }

    /// Parse `typedef <type> <name> [(annotations)] [sep]`
    ///
    /// Aliasing a named type is rejected; only base and container types can
    /// be given a new name.
    pub(crate) fn parse_typedef(&mut self, keyword: TokenId) -> Result<TypeDef, ParseError> {
        let field_type = self.parse_field_type()?;
        if let FieldTypeKind::Named(name) = &field_type.kind {
            return Err(ParseError::NamedTypedef {
                name: name.clone(),
                location: self.token(field_type.span.start).location,
            });
        }

        let name = self.expect_identifier(true)?;
        let (annotations, end) = self.parse_trailing_annotations(name.end)?;
        let separator = self.eat_separator()?;

        debug!(name = %name.text, "typedef");
        Ok(TypeDef {
            span: Span::new(keyword, separator.unwrap_or(end)),
            field_type,
            name: name.text,
            annotations,
            separator,
        })
    }

    /// Parse `enum <name> { elements } [(annotations)]`
    pub(crate) fn parse_enum(&mut self, keyword: TokenId) -> Result<Enum, ParseError> {
        let name = self.expect_identifier(false)?;
        self.expect_token(TokenKind::LeftCurly, "{")?;

        let mut elements: Vec<EnumElement> = Vec::new();
        let close = loop {
            if let Some(close) = self.match_token('}')? {
                break close;
            }
            let next_id = elements
                .last()
                .map_or(0, |element| element.id.saturating_add(1));
            elements.push(self.parse_enum_element(next_id)?);
        };
        let (annotations, end) = self.parse_trailing_annotations(close)?;

        debug!(name = %name.text, elements = elements.len(), "enum");
        Ok(Enum {
            span: Span::new(keyword, end),
            name: name.text,
            elements,
            annotations,
        })
    }

    /// Parse `<name> [= <integer>] [(annotations)] [sep]`
    ///
    /// `next_id` is the id the element gets under sequential numbering.
    pub(crate) fn parse_enum_element(&mut self, next_id: i64) -> Result<EnumElement, ParseError> {
        let name = self.expect_identifier(false)?;

        let mut value = None;
        let mut end = name.end;
        if self.match_token('=')?.is_some() {
            let (number, n) = self.expect_integer()?;
            value = Some(n);
            end = number;
        }

        let (annotations, end) = self.parse_trailing_annotations(end)?;
        let separator = self.eat_separator()?;

        let id = match (value, self.options.enum_numbering) {
            (Some(n), _) => n,
            (None, EnumNumbering::Explicit) => 0,
            (None, EnumNumbering::Sequential) => next_id,
        };

        Ok(EnumElement {
            span: Span::new(name.start, separator.unwrap_or(end)),
            name: name.text,
            value,
            id,
            annotations,
            separator,
        })
    }

    /// Parse `struct|union|exception <name> { fields } [(annotations)]`
    pub(crate) fn parse_struct(&mut self, keyword: TokenId) -> Result<Struct, ParseError> {
        let kind = match self.token(keyword).kind {
            TokenKind::Union => StructKind::Union,
            TokenKind::Exception => StructKind::Exception,
            _ => StructKind::Struct,
        };
        let name = self.expect_identifier(false)?;
        self.expect_token(TokenKind::LeftCurly, "{")?;

        let mut fields = Vec::new();
        let mut index = ChildIndex::new();
        let close = loop {
            if let Some(close) = self.match_token('}')? {
                break close;
            }
            let field = self.parse_field()?;
            index.insert(self.tokens().key(field.span.start), &field.name, fields.len());
            fields.push(field);
        };
        let (annotations, end) = self.parse_trailing_annotations(close)?;

        debug!(?kind, name = %name.text, fields = fields.len(), "struct");
        Ok(Struct {
            span: Span::new(keyword, end),
            kind,
            name: name.text,
            fields,
            annotations,
            index,
        })
    }

    /// Parse `service <name> [extends <base>] { functions } [(annotations)]`
    pub(crate) fn parse_service(&mut self, keyword: TokenId) -> Result<Service, ParseError> {
        let name = self.expect_identifier(false)?;

        let mut extends = None;
        if let Some(word) = self.peek_word()? {
            if self.token(word).raw != "extends" {
                return Err(self.unexpected_at(word, "extends or {"));
            }
            extends = Some(self.expect_identifier(false)?.text);
        }
        self.expect_token(TokenKind::LeftCurly, "{")?;

        let mut functions = Vec::new();
        let mut index = ChildIndex::new();
        let close = loop {
            if let Some(close) = self.match_token('}')? {
                break close;
            }
            let function = self.parse_function()?;
            index.insert(
                self.tokens().key(function.span.start),
                &function.name,
                functions.len(),
            );
            functions.push(function);
        };
        let (annotations, end) = self.parse_trailing_annotations(close)?;

        debug!(name = %name.text, functions = functions.len(), "service");
        Ok(Service {
            span: Span::new(keyword, end),
            name: name.text,
            extends,
            functions,
            annotations,
            index,
        })
    }

    /// Parse one service function
    pub(crate) fn parse_function(&mut self) -> Result<Function, ParseError> {
        let start = self.lexer.next_non_whitespace()?;

        let mut oneway = false;
        let mut head = start;
        if self.token(start).kind == TokenKind::Oneway {
            oneway = true;
            head = self.lexer.next_non_whitespace()?;
        }

        let return_type = if self.token(head).kind == TokenKind::Void {
            ReturnType::Void
        } else {
            self.lexer.push_back(head);
            ReturnType::Type(self.parse_field_type()?)
        };

        let name = self.expect_identifier(false)?;
        self.expect_token(TokenKind::LeftParen, "(")?;
        let (args, arg_index, mut end) = self.parse_field_list()?;

        // At most one annotation list, either before or after `throws`.
        let mut annotations = None;
        if self.match_token('(')?.is_some() {
            let (list, close) = self.parse_annotation_list(TrailingComma::Allow)?;
            annotations = Some(list);
            end = close;
        }

        let mut throws = None;
        let mut throws_index = ChildIndex::new();
        if let Some(word) = self.peek_word()? {
            if self.token(word).kind == TokenKind::Throws {
                self.expect_token(TokenKind::LeftParen, "(")?;
                let (fields, index, close) = self.parse_field_list()?;
                throws = Some(fields);
                throws_index = index;
                end = close;
            } else {
                self.lexer.push_back(word);
            }
        }

        if annotations.is_none() && self.match_token('(')?.is_some() {
            let (list, close) = self.parse_annotation_list(TrailingComma::Allow)?;
            annotations = Some(list);
            end = close;
        }

        let separator = self.eat_separator()?;

        Ok(Function {
            span: Span::new(start, separator.unwrap_or(end)),
            oneway,
            return_type,
            name: name.text,
            args,
            arg_index,
            throws,
            throws_index,
            annotations: annotations.unwrap_or_default(),
            separator,
        })
    }
}
