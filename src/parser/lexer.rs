//! Lexer (tokenizer) for Thrift IDL source
//!
//! Unlike a conventional lexer nothing is skipped: whitespace characters and
//! comments become tokens of their own and are chained into the same
//! [`TokenChain`] as the significant tokens. Scanning is lazy; the grammar
//! pulls tokens one at a time and may hand at most one back through the
//! pushback slot.

use super::token::{
    starts_comment, SourceLocation, Token, TokenChain, TokenId, TokenKind,
};
use thiserror::Error;
use tracing::trace;

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Lexer error at {location}: unexpected character '{ch}'")]
    UnexpectedCharacter { ch: char, location: SourceLocation },

    #[error("Lexer error at {location}: unterminated block comment")]
    UnterminatedBlockComment { location: SourceLocation },

    #[error("Lexer error at {location}: unterminated string literal")]
    UnterminatedString { location: SourceLocation },
}

/// A possibly dot-qualified identifier, e.g. `a.b.c` or `.a.b.`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedIdent {
    /// Text exactly as written, dots included
    pub text: String,
    pub start: TokenId,
    pub end: TokenId,
}

/// Lexer for Thrift IDL source
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    offset: usize,
    line: usize,
    column: usize,
    chain: TokenChain,
    /// One-slot pushback buffer
    buffered: Option<TokenId>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
            chain: TokenChain::new(),
            buffered: None,
        }
    }

    /// Tokens chained so far.
    pub fn chain(&self) -> &TokenChain {
        &self.chain
    }

    pub fn into_chain(self) -> TokenChain {
        self.chain
    }

    /// Hand a token back; the next call to [`Lexer::next`] returns it again.
    ///
    /// # Panics
    ///
    /// If the pushback slot is already occupied.
    pub fn push_back(&mut self, id: TokenId) {
        assert!(
            self.buffered.is_none(),
            "pushback slot already holds token {:?}",
            self.buffered
        );
        trace!(id, raw = %self.chain[id].raw, "push_back");
        self.buffered = Some(id);
    }

    /// Next token, whatever it is.
    ///
    /// Drains the pushback slot first; otherwise scans one lexeme and chains
    /// it. At end of input a single `Eof` token is chained and returned on
    /// every subsequent call.
    pub fn next(&mut self) -> Result<TokenId, LexError> {
        if let Some(id) = self.buffered.take() {
            return Ok(id);
        }
        self.scan_token()
    }

    /// Next character without consuming anything. A buffered token is
    /// reported through its first character.
    pub fn peek(&self) -> Option<char> {
        match self.buffered {
            Some(id) => self.chain[id].raw.chars().next(),
            None => self.current(),
        }
    }

    /// Chain whitespace and comments until a significant character shows up,
    /// and return that character without consuming it.
    ///
    /// A buffered significant token is reported through its first character.
    pub fn peek_non_whitespace(&mut self) -> Result<Option<char>, LexError> {
        if let Some(id) = self.buffered {
            if self.chain[id].kind.is_trivia() {
                self.buffered = None;
            } else {
                return Ok(self.chain[id].raw.chars().next());
            }
        }

        loop {
            match self.current() {
                Some(ch) if TokenKind::whitespace(ch).is_some() => {
                    self.scan_token()?;
                }
                Some(ch) if starts_comment(ch, self.peek_ahead(1)) => {
                    self.scan_token()?;
                }
                other => return Ok(other),
            }
        }
    }

    /// Like [`Lexer::next`], but whitespace and comments are chained silently
    /// first.
    pub fn next_non_whitespace(&mut self) -> Result<TokenId, LexError> {
        self.peek_non_whitespace()?;
        self.next()
    }

    /// Scan a possibly dot-qualified identifier such as `a.b.c`.
    ///
    /// Leading and trailing dots are kept literally. With `keyword_allowed`,
    /// reserved words are accepted as segments. Returns `None` if the first
    /// significant token cannot start an identifier; that token is left in
    /// the pushback slot.
    pub fn next_ident(
        &mut self,
        keyword_allowed: bool,
    ) -> Result<Option<QualifiedIdent>, LexError> {
        let first = self.next_non_whitespace()?;
        let first_kind = self.chain[first].kind;
        if !first_kind.is_ident_like(keyword_allowed) && first_kind != TokenKind::Dot {
            self.push_back(first);
            return Ok(None);
        }

        let mut text = self.chain[first].raw.clone();
        let mut end = first;
        // A leading dot is already consumed; go straight to the next segment.
        let mut skip_dot = first_kind == TokenKind::Dot;

        loop {
            if skip_dot {
                skip_dot = false;
            } else {
                if self.current() != Some('.') {
                    break;
                }
                end = self.next()?;
                text.push('.');
            }

            let segment = self.next()?;
            if self.chain[segment].kind.is_ident_like(keyword_allowed) {
                text.push_str(&self.chain[segment].raw);
                end = segment;
            } else {
                // Trailing dot: keep it, leave the scanned token for later.
                self.push_back(segment);
                break;
            }
        }

        Ok(Some(QualifiedIdent {
            text,
            start: first,
            end,
        }))
    }

    /// Scan a `'` or `"` quoted string literal.
    ///
    /// Characters are taken raw, so `//` inside the literal is not a comment.
    /// `raw` keeps the quotes; `value` drops one layer of them. No escape
    /// processing is done. Returns `None` if the next significant character is
    /// not a quote.
    pub fn next_string(&mut self) -> Result<Option<TokenId>, LexError> {
        let quote = match self.peek_non_whitespace()? {
            Some(ch @ ('"' | '\'')) if self.buffered.is_none() => ch,
            _ => return Ok(None),
        };

        let loc = self.current_location();
        let mut raw = String::new();
        raw.push(quote);
        self.advance();

        loop {
            match self.advance() {
                None | Some('\n') | Some('\r') => {
                    return Err(LexError::UnterminatedString { location: loc });
                }
                Some(ch) => {
                    raw.push(ch);
                    if ch == quote {
                        break;
                    }
                }
            }
        }

        let value = raw[quote.len_utf8()..raw.len() - quote.len_utf8()].to_string();
        Ok(Some(self.chain_token(TokenKind::String, raw, value, loc)))
    }

    /// Scan a numeric literal, binding a leading `-` to the digits.
    ///
    /// The returned token has kind `Number` on success; anything else means
    /// no number was found at this position.
    pub fn next_number(&mut self) -> Result<TokenId, LexError> {
        let ch = self.peek_non_whitespace()?;
        if ch == Some('-') && self.buffered.is_none() {
            let loc = self.current_location();
            self.advance();
            if !self.current().is_some_and(|ch| ch.is_ascii_digit()) {
                return Ok(self.chain_token(TokenKind::Minus, "-".into(), "-".into(), loc));
            }
            let mut raw = String::from("-");
            self.scan_digits(&mut raw);
            return Ok(self.chain_token(TokenKind::Number, raw.clone(), raw, loc));
        }
        self.next()
    }

    /// Scan one lexeme from the input and chain it.
    fn scan_token(&mut self) -> Result<TokenId, LexError> {
        if let Some(last) = self.chain.last() {
            if self.chain[last].kind == TokenKind::Eof {
                return Ok(last);
            }
        }

        let loc = self.current_location();
        let Some(ch) = self.current() else {
            return Ok(self.chain_token(TokenKind::Eof, String::new(), String::new(), loc));
        };

        if let Some(kind) = TokenKind::whitespace(ch) {
            self.advance();
            return Ok(self.chain_token(kind, ch.to_string(), ch.to_string(), loc));
        }

        if starts_comment(ch, self.peek_ahead(1)) {
            return self.comment(loc);
        }

        if ch.is_ascii_digit() {
            let mut raw = String::new();
            self.scan_digits(&mut raw);
            return Ok(self.chain_token(TokenKind::Number, raw.clone(), raw, loc));
        }

        if ch.is_alphabetic() || ch == '_' {
            let mut ident = String::new();
            while let Some(ch) = self.current() {
                if ch.is_alphanumeric() || ch == '_' {
                    ident.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            let kind = TokenKind::keyword(&ident).unwrap_or(TokenKind::Ident);
            return Ok(self.chain_token(kind, ident.clone(), ident, loc));
        }

        if let Some(kind) = TokenKind::punctuation(ch) {
            self.advance();
            return Ok(self.chain_token(kind, ch.to_string(), ch.to_string(), loc));
        }

        Err(LexError::UnexpectedCharacter { ch, location: loc })
    }

    /// `digits [ '.' digits ]`, appended to `raw`.
    fn scan_digits(&mut self, raw: &mut String) {
        while let Some(ch) = self.current().filter(char::is_ascii_digit) {
            raw.push(ch);
            self.advance();
        }
        let fraction_follows = self.current() == Some('.')
            && self.peek_ahead(1).is_some_and(|ch| ch.is_ascii_digit());
        if fraction_follows {
            raw.push('.');
            self.advance();
            while let Some(ch) = self.current().filter(char::is_ascii_digit) {
                raw.push(ch);
                self.advance();
            }
        }
    }

    /// Scan `// ...`, `# ...` (up to, not including, the line break) or
    /// `/* ... */`.
    fn comment(&mut self, loc: SourceLocation) -> Result<TokenId, LexError> {
        let mut raw = String::new();

        if self.current() == Some('/') && self.peek_ahead(1) == Some('*') {
            raw.push_str("/*");
            self.advance();
            self.advance();
            loop {
                match self.current() {
                    None => return Err(LexError::UnterminatedBlockComment { location: loc }),
                    Some('*') if self.peek_ahead(1) == Some('/') => {
                        raw.push_str("*/");
                        self.advance();
                        self.advance();
                        break;
                    }
                    Some(ch) => {
                        raw.push(ch);
                        self.advance();
                    }
                }
            }
            let value = raw[2..raw.len() - 2].to_string();
            return Ok(self.chain_token(TokenKind::Comment, raw, value, loc));
        }

        let prefix_len = if self.current() == Some('#') { 1 } else { 2 };
        while let Some(ch) = self.current() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            raw.push(ch);
            self.advance();
        }
        let value = raw[prefix_len..].to_string();
        Ok(self.chain_token(TokenKind::Comment, raw, value, loc))
    }

    fn chain_token(
        &mut self,
        kind: TokenKind,
        raw: String,
        value: String,
        location: SourceLocation,
    ) -> TokenId {
        trace!(?kind, offset = location.offset, "token");
        self.chain.push(Token::new(kind, raw, value, location))
    }

    /// Unscanned character at the cursor
    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;
        self.offset += ch.len_utf8();

        // `\r\n` counts once, on its `\n`; a lone `\r` ends a line too.
        let line_break = ch == '\n' || (ch == '\r' && self.current() != Some('\n'));
        if line_break {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.offset, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &str) -> (Vec<TokenKind>, TokenChain) {
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        loop {
            let id = lexer.next().unwrap();
            let kind = lexer.chain()[id].kind;
            kinds.push(kind);
            if kind == TokenKind::Eof {
                break;
            }
        }
        (kinds, lexer.into_chain())
    }

    #[test]
    fn test_every_character_is_tokenized() {
        let source = "struct A {\r\n\t1: i32 x; // tail\n}";
        let (kinds, chain) = drain(source);

        assert_eq!(chain.source(), source);
        assert_eq!(kinds[0], TokenKind::Struct);
        assert_eq!(kinds[1], TokenKind::Space);
        assert_eq!(kinds[2], TokenKind::Ident);
        assert!(kinds.contains(&TokenKind::Return));
        assert!(kinds.contains(&TokenKind::Tab));
        assert!(kinds.contains(&TokenKind::Comment));
        assert_eq!(*kinds.last().unwrap(), TokenKind::Eof);
    }

    #[test]
    fn test_comments() {
        let (_, chain) = drain("// first\n/* block\ncomment */# bash\n");
        let comments: Vec<_> = chain
            .iter()
            .filter(|token| token.kind == TokenKind::Comment)
            .map(|token| (token.raw.as_str(), token.value.as_str()))
            .collect();

        assert_eq!(
            comments,
            vec![
                ("// first", " first"),
                ("/* block\ncomment */", " block\ncomment "),
                ("# bash", " bash"),
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut lexer = Lexer::new("/* never closed");
        let err = lexer.next().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedBlockComment { .. }));
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("@");
        let err = lexer.next().unwrap_err();
        assert!(matches!(err, LexError::UnexpectedCharacter { ch: '@', .. }));
    }

    #[test]
    fn test_lone_slash_is_rejected() {
        let mut lexer = Lexer::new("/ x");
        let err = lexer.next().unwrap_err();
        assert!(matches!(err, LexError::UnexpectedCharacter { ch: '/', .. }));
    }

    #[test]
    fn test_buffered_trivia_is_skipped() {
        let mut lexer = Lexer::new("a. (");
        let ident = lexer.next_ident(false).unwrap().unwrap();
        assert_eq!(ident.text, "a.");

        // The space after the dot sits in the pushback slot.
        assert_eq!(lexer.peek_non_whitespace().unwrap(), Some('('));
        let id = lexer.next_non_whitespace().unwrap();
        assert_eq!(lexer.chain()[id].kind, TokenKind::LeftParen);
        assert_eq!(lexer.chain().source(), "a. (");
    }

    #[test]
    fn test_peek_reports_buffered_token() {
        let mut lexer = Lexer::new("a.(");
        let ident = lexer.next_ident(false).unwrap().unwrap();
        assert_eq!(ident.text, "a.");
        assert_eq!(lexer.peek(), Some('('));
        assert_eq!(lexer.peek_non_whitespace().unwrap(), Some('('));
    }

    #[test]
    fn test_line_breaks_advance_line() {
        for source in ["a\nb", "a\r\nb", "a\rb"] {
            let (_, chain) = drain(source);
            let b = chain.iter().find(|token| token.raw == "b").unwrap();
            assert_eq!((b.location.line, b.location.column), (2, 1), "{source:?}");
        }

        let mut lexer = Lexer::new("x\r\r@");
        let err = loop {
            match lexer.next() {
                Ok(_) => continue,
                Err(err) => break err,
            }
        };
        assert!(matches!(
            err,
            LexError::UnexpectedCharacter { ch: '@', location } if location.line == 3
        ));
    }

    #[test]
    fn test_eof_is_chained_once() {
        let mut lexer = Lexer::new("a");
        lexer.next().unwrap();
        let first = lexer.next().unwrap();
        let second = lexer.next().unwrap();
        assert_eq!(first, second);
        assert_eq!(lexer.chain().len(), 2);
    }

    #[test]
    fn test_peek_non_whitespace_chains_trivia() {
        let mut lexer = Lexer::new("  /* c */ \n x");
        assert_eq!(lexer.peek_non_whitespace().unwrap(), Some('x'));
        assert_eq!(lexer.chain().source(), "  /* c */ \n ");
        let id = lexer.next().unwrap();
        assert_eq!(lexer.chain()[id].raw, "x");
    }

    #[test]
    fn test_qualified_ident() {
        for source in ["a.b.c", ".a.b.", "a.b.", ".a.b"] {
            let mut lexer = Lexer::new(source);
            let ident = lexer.next_ident(false).unwrap().unwrap();
            assert_eq!(ident.text, source);
            assert_eq!(lexer.chain().text(crate::parser::ast::Span::new(ident.start, ident.end)), source);
        }
    }

    #[test]
    fn test_qualified_ident_keywords() {
        let mut lexer = Lexer::new("foo.struct.bar");
        let ident = lexer.next_ident(true).unwrap().unwrap();
        assert_eq!(ident.text, "foo.struct.bar");
        // The keyword token keeps its kind in the chain.
        assert_eq!(lexer.chain()[2].kind, TokenKind::Struct);

        let mut lexer = Lexer::new("foo.struct");
        let ident = lexer.next_ident(false).unwrap().unwrap();
        assert_eq!(ident.text, "foo.");
        let pushed = lexer.next().unwrap();
        assert_eq!(lexer.chain()[pushed].kind, TokenKind::Struct);
    }

    #[test]
    fn test_qualified_ident_rejects_non_ident() {
        let mut lexer = Lexer::new(" {");
        assert!(lexer.next_ident(false).unwrap().is_none());
        let id = lexer.next().unwrap();
        assert_eq!(lexer.chain()[id].kind, TokenKind::LeftCurly);
    }

    #[test]
    fn test_string_literal() {
        let mut lexer = Lexer::new(r#" "a//b" 'c"d'"#);
        let first = lexer.next_string().unwrap().unwrap();
        assert_eq!(lexer.chain()[first].raw, r#""a//b""#);
        assert_eq!(lexer.chain()[first].value, "a//b");

        let second = lexer.next_string().unwrap().unwrap();
        assert_eq!(lexer.chain()[second].raw, r#"'c"d'"#);
        assert_eq!(lexer.chain()[second].value, "c\"d");
    }

    #[test]
    fn test_string_literal_stops_at_line_break() {
        let mut lexer = Lexer::new("\"abc\ndef\"");
        let err = lexer.next_string().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn test_string_literal_unterminated_at_eof() {
        let err = Lexer::new("'abc").next_string().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn test_numbers() {
        let mut lexer = Lexer::new("-12 0.5 -0.123 7");
        let values: Vec<String> = (0..4)
            .map(|_| {
                let id = lexer.next_number().unwrap();
                assert_eq!(lexer.chain()[id].kind, TokenKind::Number);
                lexer.chain()[id].raw.clone()
            })
            .collect();
        assert_eq!(values, vec!["-12", "0.5", "-0.123", "7"]);
    }

    #[test]
    #[should_panic(expected = "pushback slot")]
    fn test_double_push_back_panics() {
        let mut lexer = Lexer::new("a b");
        let a = lexer.next().unwrap();
        let b = lexer.next().unwrap();
        lexer.push_back(a);
        lexer.push_back(b);
    }
}
