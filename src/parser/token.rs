//! Tokens and the token chain
//!
//! Every character of the input belongs to exactly one [`Token`]. Whitespace
//! characters are tokenized one by one and comments are tokens too, so the
//! concatenation of every token's `raw` text is the original source.
//!
//! Tokens live in a [`TokenChain`], an append-only arena. AST nodes refer to
//! tokens by [`TokenId`] and never own them.

use super::ast::Span;
use std::fmt;

/// Index of a token inside its [`TokenChain`].
pub type TokenId = usize;

/// Source location information for error reporting and token identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    /// Byte offset from the start of the input
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Classification of a lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Ident,
    /// Quoted string literal, quotes included in `raw`
    String,
    /// Integer or float literal, sign included when scanned by `next_number`
    Number,
    Comment,

    // Whitespace, one character per token
    Space,
    LineBreak, // \n
    Return,    // \r
    Tab,       // \t

    // Punctuation
    Semicolon,   // ;
    Colon,       // :
    Equals,      // =
    Quote,       // "
    SingleQuote, // '
    LeftParen,   // (
    RightParen,  // )
    LeftCurly,   // {
    RightCurly,  // }
    LeftSquare,  // [
    RightSquare, // ]
    Less,        // <
    Greater,     // >
    Comma,       // ,
    Dot,         // .
    Plus,        // +
    Minus,       // -
    Star,        // *

    // Declaration keywords
    Namespace,
    Enum,
    Senum,
    Const,
    Service,
    Struct,
    Include,
    CppInclude,
    Typedef,
    Union,
    Exception,

    // Field keywords
    Optional,
    Required,

    // Container type keywords
    Map,
    Set,
    List,

    // Function keywords
    Oneway,
    Void,
    Throws,
}

impl TokenKind {
    /// Keyword kind for a reserved word, if `word` is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "namespace" => TokenKind::Namespace,
            "enum" => TokenKind::Enum,
            "senum" => TokenKind::Senum,
            "const" => TokenKind::Const,
            "service" => TokenKind::Service,
            "struct" => TokenKind::Struct,
            "include" => TokenKind::Include,
            "cpp_include" => TokenKind::CppInclude,
            "typedef" => TokenKind::Typedef,
            "union" => TokenKind::Union,
            "exception" => TokenKind::Exception,
            "optional" => TokenKind::Optional,
            "required" => TokenKind::Required,
            "map" => TokenKind::Map,
            "set" => TokenKind::Set,
            "list" => TokenKind::List,
            "oneway" => TokenKind::Oneway,
            "void" => TokenKind::Void,
            "throws" => TokenKind::Throws,
            _ => return None,
        };
        Some(kind)
    }

    /// Single-character punctuation kind, if `ch` is one.
    pub fn punctuation(ch: char) -> Option<TokenKind> {
        let kind = match ch {
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Equals,
            '"' => TokenKind::Quote,
            '\'' => TokenKind::SingleQuote,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftCurly,
            '}' => TokenKind::RightCurly,
            '[' => TokenKind::LeftSquare,
            ']' => TokenKind::RightSquare,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            _ => return None,
        };
        Some(kind)
    }

    /// Whitespace kind for a single character, if `ch` is one.
    pub fn whitespace(ch: char) -> Option<TokenKind> {
        match ch {
            ' ' => Some(TokenKind::Space),
            '\n' => Some(TokenKind::LineBreak),
            '\r' => Some(TokenKind::Return),
            '\t' => Some(TokenKind::Tab),
            _ => None,
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Namespace
                | TokenKind::Enum
                | TokenKind::Senum
                | TokenKind::Const
                | TokenKind::Service
                | TokenKind::Struct
                | TokenKind::Include
                | TokenKind::CppInclude
                | TokenKind::Typedef
                | TokenKind::Union
                | TokenKind::Exception
                | TokenKind::Optional
                | TokenKind::Required
                | TokenKind::Map
                | TokenKind::Set
                | TokenKind::List
                | TokenKind::Oneway
                | TokenKind::Void
                | TokenKind::Throws
        )
    }

    pub fn is_whitespace(self) -> bool {
        matches!(
            self,
            TokenKind::Space | TokenKind::LineBreak | TokenKind::Return | TokenKind::Tab
        )
    }

    /// Whitespace or comment: carries no grammatical meaning.
    pub fn is_trivia(self) -> bool {
        self.is_whitespace() || self == TokenKind::Comment
    }

    /// Whether a token of this kind can serve as an identifier segment.
    ///
    /// Keywords count as identifiers only when `keyword_allowed` is set, e.g.
    /// for the segments of `foo.struct.bar`. The token itself keeps its kind.
    pub fn is_ident_like(self, keyword_allowed: bool) -> bool {
        self == TokenKind::Ident || (keyword_allowed && self.is_keyword())
    }
}

/// Whether `ch` starts a line comment, block comment or `#` comment when
/// followed by `next`.
pub(crate) fn starts_comment(ch: char, next: Option<char>) -> bool {
    ch == '#' || (ch == '/' && matches!(next, Some('/') | Some('*')))
}

/// Integer vs float, by the shape of the literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Int,
    Float,
}

/// Classify `text` as `-?digits` (integer) or `-?digits.digits` (float).
///
/// Anything else, such as `.5`, `1.` or `--1`, is not a number.
pub fn classify_number(text: &str) -> Option<NumberKind> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match unsigned.split_once('.') {
        None if all_digits(unsigned) => Some(NumberKind::Int),
        Some((int, frac)) if all_digits(int) && all_digits(frac) => Some(NumberKind::Float),
        _ => None,
    }
}

/// A single lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text, e.g. `//123` or `"abc"`
    pub raw: String,
    /// Meaningful projection, e.g. `123` or `abc`
    pub value: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, raw: String, value: String, location: SourceLocation) -> Self {
        Self {
            kind,
            raw,
            value,
            location,
        }
    }

    /// Human readable description used in error messages.
    pub fn describe(&self) -> String {
        if self.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            self.raw.clone()
        }
    }
}

/// Hashable identity of a token: where it is plus what it says.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKey {
    pub location: SourceLocation,
    pub lexeme: String,
}

/// Append-only arena holding every token of one parse session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenChain {
    tokens: Vec<Token>,
}

impl TokenChain {
    pub fn new() -> Self {
        TokenChain::default()
    }

    pub(crate) fn push(&mut self, token: Token) -> TokenId {
        self.tokens.push(token);
        self.tokens.len() - 1
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn last(&self) -> Option<TokenId> {
        self.tokens.len().checked_sub(1)
    }

    /// Token chained before `id`.
    pub fn prev(&self, id: TokenId) -> Option<TokenId> {
        id.checked_sub(1).filter(|prev| *prev < self.tokens.len())
    }

    /// Token chained after `id`.
    pub fn next(&self, id: TokenId) -> Option<TokenId> {
        let next = id + 1;
        (next < self.tokens.len()).then_some(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Identity of token `id`, used as a secondary index key.
    pub fn key(&self, id: TokenId) -> TokenKey {
        let token = &self[id];
        TokenKey {
            location: token.location,
            lexeme: token.raw.clone(),
        }
    }

    /// Reconstruct the exact source text covered by `span`.
    ///
    /// Walks the chain from `span.start` to `span.end` inclusive, emitting each
    /// token's raw text. Performs no parsing.
    pub fn text(&self, span: Span) -> String {
        let end = span.end.min(self.tokens.len().saturating_sub(1));
        if self.tokens.is_empty() || span.start > end {
            return String::new();
        }
        self.tokens[span.start..=end]
            .iter()
            .map(|token| token.raw.as_str())
            .collect()
    }

    /// Reconstruct the whole chain.
    pub fn source(&self) -> String {
        self.tokens.iter().map(|token| token.raw.as_str()).collect()
    }
}

impl std::ops::Index<TokenId> for TokenChain {
    type Output = Token;

    fn index(&self, id: TokenId) -> &Token {
        &self.tokens[id]
    }
}
