//! AST definitions for Thrift IDL documents
//!
//! Nodes never own source text. Each node records the [`Span`] of tokens it
//! was parsed from; its text is recovered by walking the shared
//! [`TokenChain`] over that span. Semantic fields (names, values, types) are
//! convenience projections of the same tokens.

use super::index::ChildIndex;
use super::token::{TokenChain, TokenId, TokenKey};
use std::fmt;

/// First and last token owned by a node, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: TokenId,
    pub end: TokenId,
}

impl Span {
    pub fn new(start: TokenId, end: TokenId) -> Self {
        debug_assert!(start <= end, "span starts after it ends");
        Span { start, end }
    }

    pub fn single(id: TokenId) -> Self {
        Span { start: id, end: id }
    }
}

/// Anything that covers a range of the token chain.
pub trait Spanned {
    fn span(&self) -> Span;

    /// Exact source text of this node.
    fn text(&self, tokens: &TokenChain) -> String {
        tokens.text(self.span())
    }
}

macro_rules! impl_spanned {
    ($($node:ty),* $(,)?) => {
        $(impl Spanned for $node {
            fn span(&self) -> Span {
                self.span
            }
        })*
    };
}

impl_spanned!(
    Document,
    Annotation,
    Namespace,
    Include,
    Const,
    ConstValue,
    TypeDef,
    Enum,
    EnumElement,
    Struct,
    Field,
    FieldType,
    Service,
    Function,
);

/// Parenthesized `name = "value"` annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub span: Span,
    pub name: String,
    /// Value with one layer of quotes removed
    pub value: String,
    /// Value as written, quotes included
    pub raw_value: String,
}

/// `namespace <scope> <target> [(annotations)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub span: Span,
    /// Target language, or `*`
    pub scope: String,
    pub target: String,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    Include,
    CppInclude,
}

/// `include "path"` / `cpp_include "path"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub span: Span,
    pub kind: IncludeKind,
    /// Unquoted path
    pub path: String,
}

/// `const <type> <name> = <value>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Const {
    pub span: Span,
    pub field_type: FieldType,
    pub name: String,
    pub value: ConstValue,
    pub separator: Option<TokenId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstValue {
    pub span: Span,
    pub kind: ConstValueKind,
}

/// Constant literal forms. Numbers keep their source text, so no range
/// checking happens at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValueKind {
    Int(String),
    Float(String),
    /// Quoted string, one layer of quotes removed
    Literal(String),
    /// Dotted identifier, typically an enum value reference
    Ident(String),
    List(Vec<ConstValue>),
    /// Entries in source order; `keys[i]` maps to `values[i]`
    Map {
        keys: Vec<ConstValue>,
        values: Vec<ConstValue>,
    },
}

impl ConstValue {
    pub fn as_i64(&self) -> Option<i64> {
        match &self.kind {
            ConstValueKind::Int(text) => text.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.kind {
            ConstValueKind::Int(text) | ConstValueKind::Float(text) => text.parse().ok(),
            _ => None,
        }
    }

    /// Text of a scalar value: the number, the unquoted string or the
    /// identifier.
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ConstValueKind::Int(text)
            | ConstValueKind::Float(text)
            | ConstValueKind::Literal(text)
            | ConstValueKind::Ident(text) => Some(text),
            ConstValueKind::List(_) | ConstValueKind::Map { .. } => None,
        }
    }

    /// Map entries as `(key, value)` pairs, in source order.
    pub fn entries(&self) -> Option<impl Iterator<Item = (&ConstValue, &ConstValue)>> {
        match &self.kind {
            ConstValueKind::Map { keys, values } => Some(keys.iter().zip(values.iter())),
            _ => None,
        }
    }
}

/// `typedef <type> <name> [(annotations)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub span: Span,
    /// Never a bare named type
    pub field_type: FieldType,
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub separator: Option<TokenId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub span: Span,
    pub name: String,
    pub elements: Vec<EnumElement>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumElement {
    pub span: Span,
    pub name: String,
    /// Explicit `= n`, if written
    pub value: Option<i64>,
    /// Effective id, see [`super::config::EnumNumbering`]
    pub id: i64,
    pub annotations: Vec<Annotation>,
    pub separator: Option<TokenId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    Union,
    Exception,
}

/// Struct, union or exception; they share one grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub span: Span,
    pub kind: StructKind,
    pub name: String,
    pub fields: Vec<Field>,
    pub annotations: Vec<Annotation>,
    pub index: ChildIndex,
}

impl Struct {
    /// Field declared as `name`.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.by_ident(name).map(|slot| &self.fields[slot])
    }

    /// Field whose first token has identity `key`.
    pub fn field_by_token(&self, key: &TokenKey) -> Option<&Field> {
        self.index.by_token(key).map(|slot| &self.fields[slot])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requiredness {
    Required,
    Optional,
}

/// `<id>: [required|optional] <type> <name> [= <default>] [(annotations)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub span: Span,
    pub id: i64,
    pub requiredness: Option<Requiredness>,
    pub field_type: FieldType,
    pub name: String,
    pub default: Option<ConstValue>,
    pub annotations: Vec<Annotation>,
    pub separator: Option<TokenId>,
}

/// Primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Bool,
    Byte,
    I8,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    Slist,
}

impl BaseType {
    pub fn from_name(name: &str) -> Option<BaseType> {
        let base = match name {
            "bool" => BaseType::Bool,
            "byte" => BaseType::Byte,
            "i8" => BaseType::I8,
            "i16" => BaseType::I16,
            "i32" => BaseType::I32,
            "i64" => BaseType::I64,
            "double" => BaseType::Double,
            "string" => BaseType::String,
            "binary" => BaseType::Binary,
            "slist" => BaseType::Slist,
            _ => return None,
        };
        Some(base)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BaseType::Bool => "bool",
            BaseType::Byte => "byte",
            BaseType::I8 => "i8",
            BaseType::I16 => "i16",
            BaseType::I32 => "i32",
            BaseType::I64 => "i64",
            BaseType::Double => "double",
            BaseType::String => "string",
            BaseType::Binary => "binary",
            BaseType::Slist => "slist",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub span: Span,
    pub kind: FieldTypeKind,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTypeKind {
    Base(BaseType),
    /// Reference to a user-defined type, possibly qualified
    Named(String),
    /// `map [cpp_type "x"] <K, V>`
    Map {
        key: Box<FieldType>,
        value: Box<FieldType>,
        cpp_type: Option<String>,
    },
    /// `list <T> [cpp_type "x"]`
    List {
        elem: Box<FieldType>,
        cpp_type: Option<String>,
    },
    /// `set [cpp_type "x"] <T>`
    Set {
        elem: Box<FieldType>,
        cpp_type: Option<String>,
    },
}

impl FieldType {
    pub fn is_named(&self) -> bool {
        matches!(self.kind, FieldTypeKind::Named(_))
    }

    pub fn cpp_type(&self) -> Option<&str> {
        match &self.kind {
            FieldTypeKind::Map { cpp_type, .. }
            | FieldTypeKind::List { cpp_type, .. }
            | FieldTypeKind::Set { cpp_type, .. } => cpp_type.as_deref(),
            FieldTypeKind::Base(_) | FieldTypeKind::Named(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub span: Span,
    pub name: String,
    pub extends: Option<String>,
    pub functions: Vec<Function>,
    pub annotations: Vec<Annotation>,
    pub index: ChildIndex,
}

impl Service {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.index.by_ident(name).map(|slot| &self.functions[slot])
    }

    pub fn function_by_token(&self, key: &TokenKey) -> Option<&Function> {
        self.index.by_token(key).map(|slot| &self.functions[slot])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub span: Span,
    pub oneway: bool,
    pub return_type: ReturnType,
    pub name: String,
    pub args: Vec<Field>,
    pub arg_index: ChildIndex,
    /// `None` when there is no `throws` clause at all
    pub throws: Option<Vec<Field>>,
    pub throws_index: ChildIndex,
    pub annotations: Vec<Annotation>,
    pub separator: Option<TokenId>,
}

impl Function {
    pub fn arg(&self, name: &str) -> Option<&Field> {
        self.arg_index.by_ident(name).map(|slot| &self.args[slot])
    }

    pub fn arg_by_token(&self, key: &TokenKey) -> Option<&Field> {
        self.arg_index.by_token(key).map(|slot| &self.args[slot])
    }

    pub fn throw(&self, name: &str) -> Option<&Field> {
        let throws = self.throws.as_ref()?;
        self.throws_index.by_ident(name).map(|slot| &throws[slot])
    }

    pub fn throw_by_token(&self, key: &TokenKey) -> Option<&Field> {
        let throws = self.throws.as_ref()?;
        self.throws_index.by_token(key).map(|slot| &throws[slot])
    }
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Namespace(Namespace),
    Include(Include),
    Const(Const),
    TypeDef(TypeDef),
    Enum(Enum),
    Struct(Struct),
    Service(Service),
}

impl Definition {
    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            Definition::Namespace(node) => NodeRef::Namespace(node),
            Definition::Include(node) => NodeRef::Include(node),
            Definition::Const(node) => NodeRef::Const(node),
            Definition::TypeDef(node) => NodeRef::TypeDef(node),
            Definition::Enum(node) => NodeRef::Enum(node),
            Definition::Struct(node) => NodeRef::Struct(node),
            Definition::Service(node) => NodeRef::Service(node),
        }
    }
}

impl Spanned for Definition {
    fn span(&self) -> Span {
        self.as_node().span()
    }
}

/// Root node: every top-level declaration in source order.
///
/// Its span runs from the first token of the input to the end-of-input
/// token, so leading and trailing trivia are covered too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub span: Span,
    pub definitions: Vec<Definition>,
}

impl Document {
    /// Visit every node pre-order, together with its parent.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(NodeRef<'a>, Option<NodeRef<'a>>)) {
        fn go<'a>(
            node: NodeRef<'a>,
            parent: Option<NodeRef<'a>>,
            visit: &mut dyn FnMut(NodeRef<'a>, Option<NodeRef<'a>>),
        ) {
            visit(node, parent);
            for child in node.children() {
                go(child, Some(node), visit);
            }
        }
        go(NodeRef::Document(self), None, &mut visit);
    }
}

/// Borrowed view of any node, for exhaustive matching and traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Document(&'a Document),
    Namespace(&'a Namespace),
    Include(&'a Include),
    Const(&'a Const),
    ConstValue(&'a ConstValue),
    TypeDef(&'a TypeDef),
    Enum(&'a Enum),
    EnumElement(&'a EnumElement),
    Struct(&'a Struct),
    Field(&'a Field),
    FieldType(&'a FieldType),
    Service(&'a Service),
    Function(&'a Function),
    Annotation(&'a Annotation),
}

impl<'a> NodeRef<'a> {
    /// Node type name; structs report `Union`/`Exception` per their keyword.
    pub fn name(&self) -> &'static str {
        match self {
            NodeRef::Document(_) => "Document",
            NodeRef::Namespace(_) => "Namespace",
            NodeRef::Include(_) => "Include",
            NodeRef::Const(_) => "Const",
            NodeRef::ConstValue(_) => "ConstValue",
            NodeRef::TypeDef(_) => "TypeDef",
            NodeRef::Enum(_) => "Enum",
            NodeRef::EnumElement(_) => "EnumElement",
            NodeRef::Struct(node) => match node.kind {
                StructKind::Struct => "Struct",
                StructKind::Union => "Union",
                StructKind::Exception => "Exception",
            },
            NodeRef::Field(_) => "Field",
            NodeRef::FieldType(_) => "FieldType",
            NodeRef::Service(_) => "Service",
            NodeRef::Function(_) => "Function",
            NodeRef::Annotation(_) => "Annotation",
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        let annotations = |out: &mut Vec<NodeRef<'a>>, list: &'a [Annotation]| {
            out.extend(list.iter().map(NodeRef::Annotation));
        };

        match *self {
            NodeRef::Document(doc) => {
                out.extend(doc.definitions.iter().map(Definition::as_node));
            }
            NodeRef::Namespace(node) => annotations(&mut out, &node.annotations),
            NodeRef::Include(_) | NodeRef::Annotation(_) => {}
            NodeRef::Const(node) => {
                out.push(NodeRef::FieldType(&node.field_type));
                out.push(NodeRef::ConstValue(&node.value));
            }
            NodeRef::ConstValue(node) => match &node.kind {
                ConstValueKind::List(items) => out.extend(items.iter().map(NodeRef::ConstValue)),
                ConstValueKind::Map { keys, values } => {
                    for (key, value) in keys.iter().zip(values) {
                        out.push(NodeRef::ConstValue(key));
                        out.push(NodeRef::ConstValue(value));
                    }
                }
                _ => {}
            },
            NodeRef::TypeDef(node) => {
                out.push(NodeRef::FieldType(&node.field_type));
                annotations(&mut out, &node.annotations);
            }
            NodeRef::Enum(node) => {
                out.extend(node.elements.iter().map(NodeRef::EnumElement));
                annotations(&mut out, &node.annotations);
            }
            NodeRef::EnumElement(node) => annotations(&mut out, &node.annotations),
            NodeRef::Struct(node) => {
                out.extend(node.fields.iter().map(NodeRef::Field));
                annotations(&mut out, &node.annotations);
            }
            NodeRef::Field(node) => {
                out.push(NodeRef::FieldType(&node.field_type));
                if let Some(default) = &node.default {
                    out.push(NodeRef::ConstValue(default));
                }
                annotations(&mut out, &node.annotations);
            }
            NodeRef::FieldType(node) => {
                match &node.kind {
                    FieldTypeKind::Map { key, value, .. } => {
                        out.push(NodeRef::FieldType(key));
                        out.push(NodeRef::FieldType(value));
                    }
                    FieldTypeKind::List { elem, .. } | FieldTypeKind::Set { elem, .. } => {
                        out.push(NodeRef::FieldType(elem));
                    }
                    FieldTypeKind::Base(_) | FieldTypeKind::Named(_) => {}
                }
                annotations(&mut out, &node.annotations);
            }
            NodeRef::Service(node) => {
                out.extend(node.functions.iter().map(NodeRef::Function));
                annotations(&mut out, &node.annotations);
            }
            NodeRef::Function(node) => {
                if let ReturnType::Type(ty) = &node.return_type {
                    out.push(NodeRef::FieldType(ty));
                }
                out.extend(node.args.iter().map(NodeRef::Field));
                annotations(&mut out, &node.annotations);
                if let Some(throws) = &node.throws {
                    out.extend(throws.iter().map(NodeRef::Field));
                }
                // Annotations may sit before or after `throws`.
                out.sort_by_key(|child| child.span().start);
            }
        }
        out
    }
}

impl Spanned for NodeRef<'_> {
    fn span(&self) -> Span {
        match self {
            NodeRef::Document(node) => node.span,
            NodeRef::Namespace(node) => node.span,
            NodeRef::Include(node) => node.span,
            NodeRef::Const(node) => node.span,
            NodeRef::ConstValue(node) => node.span,
            NodeRef::TypeDef(node) => node.span,
            NodeRef::Enum(node) => node.span,
            NodeRef::EnumElement(node) => node.span,
            NodeRef::Struct(node) => node.span,
            NodeRef::Field(node) => node.span,
            NodeRef::FieldType(node) => node.span,
            NodeRef::Service(node) => node.span,
            NodeRef::Function(node) => node.span,
            NodeRef::Annotation(node) => node.span,
        }
    }
}

/// Result of a successful parse: the token chain plus the tree over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub tokens: TokenChain,
    pub document: Document,
}

impl SyntaxTree {
    /// Exact source text of any node in this tree.
    pub fn text(&self, node: &impl Spanned) -> String {
        node.text(&self.tokens)
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.document.definitions
    }
}

/// Reconstructs the original input byte for byte.
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text(&self.document))
    }
}
