//! Parser configuration
//!
//! The defaults reproduce the historical behaviour of the format: enum
//! elements without `=` get id 0, and namespace annotation lists reject a
//! trailing comma while every other annotation list accepts one.

/// How enum elements without an explicit `= n` are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumNumbering {
    /// Missing ids are 0.
    #[default]
    Explicit,
    /// Missing ids continue from the previous element (first element: 0).
    Sequential,
}

/// Whether an annotation list may end in `,` or `;` before `)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingComma {
    Allow,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub enum_numbering: EnumNumbering,
    /// Policy for `namespace ... (a = "b",)`
    pub namespace_trailing_comma: TrailingComma,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            enum_numbering: EnumNumbering::Explicit,
            namespace_trailing_comma: TrailingComma::Reject,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        ParseOptions::default()
    }

    pub fn with_enum_numbering(mut self, numbering: EnumNumbering) -> Self {
        self.enum_numbering = numbering;
        self
    }

    pub fn with_namespace_trailing_comma(mut self, policy: TrailingComma) -> Self {
        self.namespace_trailing_comma = policy;
        self
    }
}
