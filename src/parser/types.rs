//! Field type parsing
//!
//! # Grammar
//!
//! ```text
//! field_type ::= ( base_type | map | set | list | ident ) [ annotations ]
//! map        ::= "map" [ cpp_type ] "<" field_type "," field_type ">"
//! set        ::= "set" [ cpp_type ] "<" field_type ">"
//! list       ::= "list" "<" field_type ">" [ cpp_type ]
//! cpp_type   ::= "cpp_type" string
//! ```

use crate::parser::ast::*;
use crate::parser::parser::{ParseError, Parser};
use crate::parser::token::{TokenId, TokenKind};

impl Parser {
    /// Parse a field type, including any annotations attached to it.
    pub fn parse_field_type(&mut self) -> Result<FieldType, ParseError> {
        let ident = self.expect_identifier(true)?;

        let (kind, end) = match ident.text.as_str() {
            "map" => self.parse_map_type()?,
            "set" => self.parse_set_type()?,
            "list" => self.parse_list_type()?,
            name => match BaseType::from_name(name) {
                Some(base) => (FieldTypeKind::Base(base), ident.end),
                None if ident.start == ident.end && self.token(ident.start).kind.is_keyword() => {
                    return Err(self.unexpected_at(ident.start, "field type"));
                }
                None => (FieldTypeKind::Named(ident.text.clone()), ident.end),
            },
        };
        let (annotations, end) = self.parse_trailing_annotations(end)?;

        Ok(FieldType {
            span: Span::new(ident.start, end),
            kind,
            annotations,
        })
    }

    /// `map` has been consumed.
    fn parse_map_type(&mut self) -> Result<(FieldTypeKind, TokenId), ParseError> {
        let cpp_type = self.parse_cpp_type()?.map(|(name, _)| name);
        self.expect_token(TokenKind::Less, "<")?;
        let key = self.parse_field_type()?;
        self.expect_token(TokenKind::Comma, ",")?;
        let value = self.parse_field_type()?;
        let close = self.expect_token(TokenKind::Greater, ">")?;

        let kind = FieldTypeKind::Map {
            key: Box::new(key),
            value: Box::new(value),
            cpp_type,
        };
        Ok((kind, close))
    }

    /// `set` has been consumed.
    fn parse_set_type(&mut self) -> Result<(FieldTypeKind, TokenId), ParseError> {
        let cpp_type = self.parse_cpp_type()?.map(|(name, _)| name);
        self.expect_token(TokenKind::Less, "<")?;
        let elem = self.parse_field_type()?;
        let close = self.expect_token(TokenKind::Greater, ">")?;

        let kind = FieldTypeKind::Set {
            elem: Box::new(elem),
            cpp_type,
        };
        Ok((kind, close))
    }

    /// `list` has been consumed. Its `cpp_type` comes after the `>`.
    fn parse_list_type(&mut self) -> Result<(FieldTypeKind, TokenId), ParseError> {
        self.expect_token(TokenKind::Less, "<")?;
        let elem = self.parse_field_type()?;
        let close = self.expect_token(TokenKind::Greater, ">")?;

        let (cpp_type, end) = match self.parse_cpp_type()? {
            Some((name, literal)) => (Some(name), literal),
            None => (None, close),
        };

        let kind = FieldTypeKind::List {
            elem: Box::new(elem),
            cpp_type,
        };
        Ok((kind, end))
    }

    /// Optional `cpp_type "name"`, returning the name and its string token.
    /// Any other word is pushed back.
    fn parse_cpp_type(&mut self) -> Result<Option<(String, TokenId)>, ParseError> {
        let Some(word) = self.peek_word()? else {
            return Ok(None);
        };
        if self.token(word).raw != "cpp_type" {
            self.lexer.push_back(word);
            return Ok(None);
        }

        let literal = self.expect_string()?;
        Ok(Some((self.token(literal).value.clone(), literal)))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parser::{ParseError, Parser};
    use pretty_assertions::assert_eq;

    fn field_type(source: &str) -> FieldType {
        let mut parser = Parser::new(source);
        let ty = parser.parse_field_type().unwrap();
        assert_eq!(parser.tokens().text(ty.span), source.trim());
        ty
    }

    #[test]
    fn test_base_types() {
        for name in ["bool", "byte", "i8", "i16", "i32", "i64", "double", "string", "binary"] {
            let ty = field_type(name);
            assert_eq!(ty.kind, FieldTypeKind::Base(BaseType::from_name(name).unwrap()));
        }
    }

    #[test]
    fn test_named_type() {
        let ty = field_type("shared.SharedStruct");
        assert_eq!(ty.kind, FieldTypeKind::Named("shared.SharedStruct".to_string()));
        assert!(ty.is_named());
    }

    #[test]
    fn test_nested_containers() {
        let ty = field_type("map<string, list<set<i32>>>");
        let FieldTypeKind::Map { key, value, cpp_type } = &ty.kind else {
            panic!("Expected map type");
        };
        assert_eq!(key.kind, FieldTypeKind::Base(BaseType::String));
        assert!(cpp_type.is_none());

        let FieldTypeKind::List { elem, .. } = &value.kind else {
            panic!("Expected list type");
        };
        let FieldTypeKind::Set { elem, .. } = &elem.kind else {
            panic!("Expected set type");
        };
        assert_eq!(elem.kind, FieldTypeKind::Base(BaseType::I32));
    }

    #[test]
    fn test_deeply_nested_annotated_types() {
        let source = "list<map<set<i32> (python.immutable = \"\"), \
                      map<i32,set<list<map<Insanity,string>(python.immutable = \"\")> \
                      (python.immutable = \"\")>>>>";
        let ty = field_type(source);

        let FieldTypeKind::List { elem: outer_map, .. } = &ty.kind else {
            panic!("Expected list type");
        };
        let FieldTypeKind::Map { key, value, .. } = &outer_map.kind else {
            panic!("Expected map type");
        };
        assert!(matches!(key.kind, FieldTypeKind::Set { .. }));
        assert_eq!(key.annotations.len(), 1);

        let FieldTypeKind::Map { value: set, .. } = &value.kind else {
            panic!("Expected map type");
        };
        let FieldTypeKind::Set { elem: list, .. } = &set.kind else {
            panic!("Expected set type");
        };
        assert_eq!(list.annotations.len(), 1);
        let FieldTypeKind::List { elem: inner_map, .. } = &list.kind else {
            panic!("Expected list type");
        };
        assert_eq!(inner_map.annotations[0].name, "python.immutable");
        assert_eq!(inner_map.annotations[0].raw_value, "\"\"");
    }

    #[test]
    fn test_cpp_type() {
        let ty = field_type("map cpp_type \"std::unordered_map\" <i64, string>");
        assert_eq!(ty.cpp_type(), Some("std::unordered_map"));

        let ty = field_type("set cpp_type 'std::set' <i64>");
        assert_eq!(ty.cpp_type(), Some("std::set"));

        let ty = field_type("list<i64> cpp_type \"std::deque\"");
        assert_eq!(ty.cpp_type(), Some("std::deque"));
    }

    #[test]
    fn test_list_pushes_back_following_word() {
        let mut parser = Parser::new("list<i32> values");
        let ty = parser.parse_field_type().unwrap();
        assert_eq!(parser.tokens().text(ty.span), "list<i32>");

        let name = parser.parse_field_type().unwrap();
        assert_eq!(name.kind, FieldTypeKind::Named("values".to_string()));
    }

    #[test]
    fn test_type_annotations() {
        let ty = field_type("i64 (js.type = \"string\")");
        assert_eq!(ty.annotations.len(), 1);
        assert_eq!(ty.annotations[0].value, "string");
    }

    #[test]
    fn test_keyword_is_not_a_type() {
        let err = Parser::new("struct").parse_field_type().unwrap_err();
        match err {
            ParseError::UnexpectedToken {
                found, expected, ..
            } => {
                assert_eq!(found, "struct");
                assert_eq!(expected, "field type");
            }
            other => panic!("Expected unexpected token error, got {other:?}"),
        }
    }

    #[test]
    fn test_map_requires_comma() {
        let err = Parser::new("map<i32 string>").parse_field_type().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found, .. } if found == "string"));
    }
}
