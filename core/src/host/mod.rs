//! The boundary with the host compiler.
//!
//! The host resolves symbols and argument expressions; the pipeline only sees
//! the resolved result, modelled here as plain data. Everything is
//! serializable so a pass can be fingerprinted, cached, stored as a snapshot
//! and replayed by the CLI.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{Box, String, Vec};

/// 1-based position of a token in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub path: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

/// Everything the host hands to one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compilation {
    /// Candidate call expressions, pre-filtered by invoked member name.
    #[serde(default)]
    pub calls: Vec<CandidateCall>,

    /// Concrete marshaller types referenced by generic factory overloads.
    #[serde(default)]
    pub marshallers: Vec<MarshallerType>,

    /// Source text, used only to render diagnostics.
    #[serde(default)]
    pub sources: Vec<SourceFile>,
}

impl Compilation {
    pub fn marshaller(&self, name: &str) -> Option<&MarshallerType> {
        self.marshallers.iter().find(|m| m.name == name)
    }

    pub fn source(&self, path: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.path == path)
            .map(|s| s.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

/// How the syntax around the member-name token is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallShape {
    /// `Receiver.Member(...)`, the only shape that can be redirected.
    MemberAccessInvocation,
    /// The name token's parent chain is not an invocation of a member access.
    Unexpected,
}

/// One call expression whose invoked member name matched the factory surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCall {
    /// Position of the invoked member-name token.
    pub location: SourceLocation,
    pub shape: CallShape,
    /// `None` when the host could not resolve the invoked member.
    pub member: Option<ResolvedMember>,
    #[serde(default)]
    pub arguments: Vec<BoundArgument>,
    /// Concrete instantiations observed for an open call site.
    #[serde(default)]
    pub instantiations: Vec<Instantiation>,
}

impl CandidateCall {
    pub fn argument(&self, parameter: &str) -> Option<&BoundArgument> {
        self.arguments.iter().find(|a| a.parameter == parameter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMember {
    pub name: String,
    pub containing_type: NamedType,
    #[serde(default)]
    pub type_arguments: Vec<TypeRef>,
    /// Declared parameter names, in order.
    #[serde(default)]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    /// Fully qualified name without type arguments, e.g. `NativeDelegates.INativeAction`.
    pub name: String,
    #[serde(default)]
    pub type_arguments: Vec<TypeRef>,
}

impl NamedType {
    /// The unqualified name, e.g. `INativeAction`.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn namespace(&self) -> &str {
        match self.name.rfind('.') {
            Some(index) => &self.name[..index],
            None => "",
        }
    }
}

/// A resolved type, as far as generation cares about it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// A named type. `name` is the display text used in generated code.
    Named {
        name: String,
        #[serde(default)]
        type_arguments: Vec<TypeRef>,
    },
    /// A type parameter that is still unbound at the call site.
    Parameter { name: String },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        TypeRef::Parameter { name: name.into() }
    }

    /// Whether this type contains no unbound type parameter.
    pub fn is_closed(&self) -> bool {
        match self {
            TypeRef::Named { type_arguments, .. } => type_arguments.iter().all(TypeRef::is_closed),
            TypeRef::Parameter { .. } => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named {
                name,
                type_arguments,
            } => {
                write!(f, "{}", name)?;
                if !type_arguments.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in type_arguments.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Parameter { name } => write!(f, "{}", name),
        }
    }
}

/// An argument expression bound to a named parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundArgument {
    pub parameter: String,
    pub location: SourceLocation,
    pub value: Operation,
}

/// Compile-time constant values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

/// A resolved argument expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Literal(Constant),
    /// A constant enum member such as `CallingConvention.Cdecl`.
    EnumMember {
        type_name: String,
        member: String,
        value: i64,
    },
    /// `new T(arguments) { member = value, ... }`, with the argument and
    /// initializer expressions as source text.
    ObjectCreation {
        type_name: String,
        #[serde(default)]
        arguments: Vec<String>,
        #[serde(default)]
        initializers: Vec<Initializer>,
    },
    FieldReference(FieldSymbol),
    /// `new T[] { ... }`; `initializer` is `None` for `new T[n]`.
    ArrayCreation {
        element_type: String,
        initializer: Option<Vec<Operation>>,
    },
    /// A collection expression `[a, b, ..c]`.
    Collection { elements: Vec<CollectionElement> },
    /// An implicit conversion, e.g. to a nullable type.
    Conversion { operand: Box<Operation> },
    Invocation { method: String },
    /// Any other expression (locals, parameters, operators, ...).
    Other { text: String },
}

impl Operation {
    /// Strip implicit conversions.
    pub fn unwrap_conversions(&self) -> &Operation {
        let mut op = self;
        while let Operation::Conversion { operand } = op {
            op = operand;
        }
        op
    }

    /// The constant value, if the expression is a compile-time constant.
    pub fn constant(&self) -> Option<Constant> {
        match self.unwrap_conversions() {
            Operation::Literal(value) => Some(value.clone()),
            Operation::EnumMember { value, .. } => Some(Constant::Int(*value)),
            Operation::FieldReference(field) if field.is_const => {
                field.initializer.as_ref().and_then(|init| init.constant())
            }
            _ => None,
        }
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self.constant(), Some(Constant::Null))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initializer {
    pub member: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CollectionElement {
    Item(Operation),
    Spread(Operation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSymbol {
    pub name: String,
    pub containing_type: String,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default)]
    pub is_const: bool,
    /// The field's declared initializer, when it has one in source.
    pub initializer: Option<Box<Operation>>,
}

/// A concrete marshaller type used by the generic factory overloads.
///
/// Its statically declared marshalling members are given as bound arguments
/// named after the factory parameters they replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarshallerType {
    pub name: String,
    #[serde(default)]
    pub members: Vec<BoundArgument>,
}

impl MarshallerType {
    pub fn member(&self, parameter: &str) -> Option<&BoundArgument> {
        self.members.iter().find(|m| m.parameter == parameter)
    }
}

/// A concrete instantiation of an open call site observed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instantiation {
    pub contract_type_arguments: Vec<TypeRef>,
    #[serde(default)]
    pub method_type_arguments: Vec<TypeRef>,
}
