//! Constant value parsing
//!
//! # Grammar
//!
//! ```text
//! const_value ::= number | string | ident | list | map
//! list        ::= "[" { const_value [ "," | ";" ] } "]"
//! map         ::= "{" { const_value ":" const_value [ "," | ";" ] } "}"
//! ```

use crate::parser::ast::*;
use crate::parser::parser::{ParseError, Parser};
use crate::parser::token::{classify_number, NumberKind, TokenKind};

impl Parser {
    /// Parse a constant value: number, string, identifier, list or map.
    pub fn parse_const_value(&mut self) -> Result<ConstValue, ParseError> {
        match self.lexer.peek_non_whitespace()? {
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number_value(),
            Some('"' | '\'') => {
                let literal = self.expect_string()?;
                Ok(ConstValue {
                    span: Span::single(literal),
                    kind: ConstValueKind::Literal(self.token(literal).value.clone()),
                })
            }
            Some('[') => self.parse_list_value(),
            Some('{') => self.parse_map_value(),
            _ => self.parse_ident_value(),
        }
    }

    fn parse_number_value(&mut self) -> Result<ConstValue, ParseError> {
        let number = self.lexer.next_number()?;
        let token = self.token(number);

        let kind = match (token.kind, classify_number(&token.raw)) {
            (TokenKind::Number, Some(NumberKind::Int)) => ConstValueKind::Int(token.raw.clone()),
            (TokenKind::Number, Some(NumberKind::Float)) => {
                ConstValueKind::Float(token.raw.clone())
            }
            _ => return Err(self.unexpected_at(number, "number")),
        };

        Ok(ConstValue {
            span: Span::single(number),
            kind,
        })
    }

    /// Dotted identifier; it must start and end with a name, not a dot.
    fn parse_ident_value(&mut self) -> Result<ConstValue, ParseError> {
        let ident = self.expect_identifier(false)?;
        let starts_with_name = self.token(ident.start).kind == TokenKind::Ident;
        let ends_with_name = self.token(ident.end).kind == TokenKind::Ident;

        if !(starts_with_name && ends_with_name) {
            return Err(ParseError::UnexpectedToken {
                found: ident.text,
                expected: "constant value".to_string(),
                location: self.token(ident.start).location,
            });
        }

        Ok(ConstValue {
            span: Span::new(ident.start, ident.end),
            kind: ConstValueKind::Ident(ident.text),
        })
    }

    fn parse_list_value(&mut self) -> Result<ConstValue, ParseError> {
        let open = self.lexer.next()?;
        let mut items = Vec::new();

        let close = loop {
            if let Some(close) = self.match_token(']')? {
                break close;
            }
            items.push(self.parse_const_value()?);
            self.eat_separator()?;
        };

        Ok(ConstValue {
            span: Span::new(open, close),
            kind: ConstValueKind::List(items),
        })
    }

    fn parse_map_value(&mut self) -> Result<ConstValue, ParseError> {
        let open = self.lexer.next()?;
        let mut keys = Vec::new();
        let mut values = Vec::new();

        let close = loop {
            if let Some(close) = self.match_token('}')? {
                break close;
            }
            keys.push(self.parse_const_value()?);
            self.expect_token(TokenKind::Colon, ":")?;
            values.push(self.parse_const_value()?);
            self.eat_separator()?;
        };

        Ok(ConstValue {
            span: Span::new(open, close),
            kind: ConstValueKind::Map { keys, values },
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parser::{ParseError, Parser};
    use pretty_assertions::assert_eq;

    fn value(source: &str) -> ConstValue {
        let mut parser = Parser::new(source);
        let value = parser.parse_const_value().unwrap();
        assert_eq!(parser.tokens().text(value.span), source.trim());
        value
    }

    #[test]
    fn test_numbers() {
        assert_eq!(value("42").kind, ConstValueKind::Int("42".to_string()));
        assert_eq!(value("-7").as_i64(), Some(-7));
        assert_eq!(value("3.25").kind, ConstValueKind::Float("3.25".to_string()));
        assert_eq!(value("-0.5").as_f64(), Some(-0.5));
    }

    #[test]
    fn test_literals() {
        assert_eq!(value("\"hello // world\"").as_str(), Some("hello // world"));
        assert_eq!(value("'single'").as_str(), Some("single"));
    }

    #[test]
    fn test_identifier() {
        let v = value("Numberz.FIVE");
        assert_eq!(v.kind, ConstValueKind::Ident("Numberz.FIVE".to_string()));
    }

    #[test]
    fn test_identifier_rejects_dangling_dots() {
        for source in [".a.b", "a.b."] {
            let err = Parser::new(source).parse_const_value().unwrap_err();
            match err {
                ParseError::UnexpectedToken { found, .. } => assert_eq!(found, source),
                other => panic!("Expected unexpected token error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_list() {
        let v = value("[1, 2; 3 'x']");
        let ConstValueKind::List(items) = &v.kind else {
            panic!("Expected list");
        };
        let texts: Vec<_> = items.iter().map(|item| item.as_str().unwrap()).collect();
        assert_eq!(texts, vec!["1", "2", "3", "x"]);
    }

    #[test]
    fn test_map_preserves_order() {
        let v = value("{ 'z': 1, 'a': [2, 3], 'm': { 'k': v.w } }");
        let keys: Vec<_> = v
            .entries()
            .unwrap()
            .map(|(key, _)| key.as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);

        let (_, nested) = v.entries().unwrap().last().unwrap();
        let (_, inner) = nested.entries().unwrap().next().unwrap();
        assert_eq!(inner.kind, ConstValueKind::Ident("v.w".to_string()));
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(value("[]").kind, ConstValueKind::List(Vec::new()));
        assert_eq!(
            value("{ }").kind,
            ConstValueKind::Map {
                keys: Vec::new(),
                values: Vec::new(),
            }
        );
    }

    #[test]
    fn test_map_requires_colon() {
        let err = Parser::new("{ 'a' 1 }").parse_const_value().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found, .. } if found == "1"));
    }

    #[test]
    fn test_lone_minus() {
        let err = Parser::new("- 1").parse_const_value().unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found, .. } if found == "-"));
    }
}
