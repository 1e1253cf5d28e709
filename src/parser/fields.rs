//! Field and annotation parsing
//!
//! Fields appear in struct bodies, function argument lists and `throws`
//! clauses. Annotation lists can follow most constructs.
//!
//! # Grammar
//!
//! ```text
//! field       ::= integer ":" [ "required" | "optional" ] field_type ident
//!                 [ "=" const_value ] [ annotations ] [ "," | ";" ]
//! annotations ::= "(" [ annotation { ( "," | ";" ) annotation } [ "," | ";" ] ] ")"
//! annotation  ::= ident "=" string
//! ```

use crate::parser::ast::*;
use crate::parser::config::TrailingComma;
use crate::parser::index::ChildIndex;
use crate::parser::parser::{ParseError, Parser};
use crate::parser::token::{TokenId, TokenKind};

impl Parser {
    /// Parse a single field: `1: required i32 name = 0 (a = "b");`
    pub fn parse_field(&mut self) -> Result<Field, ParseError> {
        let (start, id) = self.expect_integer()?;
        self.expect_token(TokenKind::Colon, ":")?;

        let requiredness = match self.peek_word()? {
            Some(word) => match self.token(word).kind {
                TokenKind::Required => Some(Requiredness::Required),
                TokenKind::Optional => Some(Requiredness::Optional),
                _ => {
                    self.lexer.push_back(word);
                    None
                }
            },
            None => None,
        };

        let field_type = self.parse_field_type()?;
        let name = self.expect_identifier(false)?;

        let mut end = name.end;
        let mut default = None;
        if self.match_token('=')?.is_some() {
            let value = self.parse_const_value()?;
            end = value.span.end;
            default = Some(value);
        }

        let (annotations, end) = self.parse_trailing_annotations(end)?;
        let separator = self.eat_separator()?;

        Ok(Field {
            span: Span::new(start, separator.unwrap_or(end)),
            id,
            requiredness,
            field_type,
            name: name.text,
            default,
            annotations,
            separator,
        })
    }

    /// Parse fields up to and including the closing `)`; the opening `(` is
    /// already consumed.
    pub(crate) fn parse_field_list(
        &mut self,
    ) -> Result<(Vec<Field>, ChildIndex, TokenId), ParseError> {
        let mut fields = Vec::new();
        let mut index = ChildIndex::new();

        loop {
            if let Some(close) = self.match_token(')')? {
                return Ok((fields, index, close));
            }
            let field = self.parse_field()?;
            index.insert(self.tokens().key(field.span.start), &field.name, fields.len());
            fields.push(field);
        }
    }

    /// Parse a parenthesized annotation list, `(` included.
    pub fn parse_annotations(&mut self) -> Result<Vec<Annotation>, ParseError> {
        self.expect_token(TokenKind::LeftParen, "(")?;
        let (annotations, _) = self.parse_annotation_list(TrailingComma::Allow)?;
        Ok(annotations)
    }

    /// Parse annotations up to and including the closing `)`; the opening
    /// `(` is already consumed.
    pub(crate) fn parse_annotation_list(
        &mut self,
        trailing: TrailingComma,
    ) -> Result<(Vec<Annotation>, TokenId), ParseError> {
        let mut annotations = Vec::new();

        loop {
            if let Some(close) = self.match_token(')')? {
                return Ok((annotations, close));
            }
            annotations.push(self.parse_annotation()?);

            let separator = self.eat_separator()?;
            if separator.is_some() && trailing == TrailingComma::Reject && self.check(')')? {
                return self.unexpected("annotation");
            }
        }
    }

    /// Parse `name = "value"`
    pub(crate) fn parse_annotation(&mut self) -> Result<Annotation, ParseError> {
        let name = self.expect_identifier(false)?;
        self.expect_token(TokenKind::Equals, "=")?;
        let value = self.expect_string()?;
        let token = self.token(value);

        Ok(Annotation {
            span: Span::new(name.start, value),
            name: name.text,
            value: token.value.clone(),
            raw_value: token.raw.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parser::{ParseError, Parser};
    use pretty_assertions::assert_eq;

    fn field(source: &str) -> (Field, String) {
        let mut parser = Parser::new(source);
        let field = parser.parse_field().unwrap();
        let text = parser.tokens().text(field.span);
        (field, text)
    }

    #[test]
    fn test_field_full() {
        let source = "1: required i32 Foo = 123 (api.test = \"./test\");";
        let (field, text) = field(source);

        assert_eq!(field.id, 1);
        assert_eq!(field.requiredness, Some(Requiredness::Required));
        assert_eq!(field.field_type.kind, FieldTypeKind::Base(BaseType::I32));
        assert_eq!(field.name, "Foo");
        assert_eq!(field.default.as_ref().and_then(ConstValue::as_i64), Some(123));
        assert_eq!(field.annotations[0].name, "api.test");
        assert_eq!(field.annotations[0].value, "./test");
        assert_eq!(text, source);
    }

    #[test]
    fn test_field_minimal() {
        let (field, text) = field("7:Foo bar");
        assert_eq!(field.id, 7);
        assert_eq!(field.requiredness, None);
        assert_eq!(field.field_type.kind, FieldTypeKind::Named("Foo".to_string()));
        assert!(field.default.is_none());
        assert!(field.separator.is_none());
        assert_eq!(text, "7:Foo bar");
    }

    #[test]
    fn test_field_negative_id() {
        let (field, _) = field("-1: optional string s");
        assert_eq!(field.id, -1);
        assert_eq!(field.requiredness, Some(Requiredness::Optional));
    }

    #[test]
    fn test_field_id_must_be_integer() {
        let err = Parser::new("1.5: i32 a").parse_field().unwrap_err();
        assert!(matches!(err, ParseError::InvalidInteger { .. }));

        let err = Parser::new("a: i32 a").parse_field().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "integer"));
    }

    #[test]
    fn test_field_id_out_of_range() {
        let err = Parser::new("99999999999999999999: i32 a")
            .parse_field()
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidInteger { .. }));
    }

    #[test]
    fn test_map_field_with_trailing_comma_annotations() {
        let source = "1: required map< string , string > Test = { \"abc\": \"def\" } \
                      (api.test = \"./test\", api.a = 'asd',);";
        let (field, text) = field(source);

        assert!(matches!(field.field_type.kind, FieldTypeKind::Map { .. }));
        let default = field.default.as_ref().unwrap();
        let entries: Vec<_> = default
            .entries()
            .unwrap()
            .map(|(key, value)| (key.as_str().unwrap(), value.as_str().unwrap()))
            .collect();
        assert_eq!(entries, vec![("abc", "def")]);

        let annotations: Vec<_> = field
            .annotations
            .iter()
            .map(|annotation| (annotation.name.as_str(), annotation.raw_value.as_str()))
            .collect();
        assert_eq!(annotations, vec![("api.test", "\"./test\""), ("api.a", "'asd'")]);
        assert_eq!(text, source);
    }

    #[test]
    fn test_annotations_fragment() {
        let mut parser = Parser::new("(a = 'b'; c = \"d\")");
        let annotations = parser.parse_annotations().unwrap();
        let names: Vec<_> = annotations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_annotation_list() {
        let mut parser = Parser::new("( )");
        assert!(parser.parse_annotations().unwrap().is_empty());
    }

    #[test]
    fn test_annotation_value_must_be_string() {
        let err = Parser::new("(a = 1)").parse_annotations().unwrap_err();
        match err {
            ParseError::UnexpectedToken { found, .. } => assert_eq!(found, "1"),
            other => panic!("Expected unexpected token error, got {other:?}"),
        }
    }

    #[test]
    fn test_annotation_name_cannot_be_keyword() {
        let err = Parser::new("(struct = 'x')").parse_annotations().unwrap_err();
        match err {
            ParseError::UnexpectedToken {
                found, expected, ..
            } => {
                assert_eq!(found, "struct");
                assert_eq!(expected, "identifier");
            }
            other => panic!("Expected unexpected token error, got {other:?}"),
        }
    }
}
