//! Structured model of generated source.
//!
//! Synthesizers build a tree of typed fragments and [`render`] turns it into
//! text. All layout decisions (indentation, blank lines, brace placement)
//! live in the renderer, so equal trees always render to equal bytes.

mod render;

pub use render::{render, render_type};

use crate::{String, ToString, Vec};

/// One generated file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    /// Leading lines such as `// <auto-generated/>` and `#nullable enable`.
    pub header: Vec<String>,
    pub usings: Vec<String>,
    pub namespaces: Vec<Namespace>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// `///` documentation lines, without the marker.
    pub doc: Vec<String>,
    pub attributes: Vec<String>,
    pub modifiers: Vec<&'static str>,
    pub kind: TypeKind,
    pub name: String,
    pub type_parameters: Vec<String>,
    pub bases: Vec<String>,
    pub constraints: Vec<String>,
    pub members: Vec<Member>,
}

impl TypeDecl {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            doc: Vec::new(),
            attributes: Vec::new(),
            modifiers: Vec::new(),
            kind,
            name: name.into(),
            type_parameters: Vec::new(),
            bases: Vec::new(),
            constraints: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, name)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Interface, name)
    }

    pub fn modifiers(mut self, modifiers: &[&'static str]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Field(FieldDecl),
    Delegate(DelegateDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub modifiers: Vec<&'static str>,
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateDecl {
    /// Includes `return:` targeted attributes.
    pub attributes: Vec<String>,
    pub modifiers: Vec<&'static str>,
    pub return_type: String,
    pub name: String,
    pub parameters: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub doc: Vec<String>,
    pub attributes: Vec<String>,
    pub modifiers: Vec<&'static str>,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub name: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<Param>,
    pub constraints: Vec<String>,
    pub body: Body,
}

impl MethodDecl {
    pub fn new(return_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            doc: Vec::new(),
            attributes: Vec::new(),
            modifiers: Vec::new(),
            return_type: Some(return_type.into()),
            name: name.into(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            constraints: Vec::new(),
            body: Body::Abstract,
        }
    }

    pub fn constructor(name: impl Into<String>) -> Self {
        Self {
            return_type: None,
            ..Self::new("", name)
        }
    }

    pub fn modifiers(mut self, modifiers: &[&'static str]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub doc: Vec<String>,
    pub modifiers: Vec<&'static str>,
    pub ty: String,
    pub name: String,
    /// `None` renders `{ get; }`.
    pub getter: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub attributes: Vec<String>,
    pub ty: String,
    pub name: String,
    pub default: Option<String>,
}

impl Param {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            attributes: Vec::new(),
            ty: ty.into(),
            name: name.into(),
            default: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// `;` (interface members, delegates).
    Abstract,
    /// `=> expr;`
    Expression(Expr),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    Return(Expr),
    Throw(Expr),
    If { condition: String, then: Vec<Stmt> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Text(String),
    /// `scrutinee switch { pattern => value, ... }`.
    Switch {
        scrutinee: String,
        arms: Vec<(String, Expr)>,
    },
}

impl Expr {
    pub fn text(text: impl Into<String>) -> Self {
        Expr::Text(text.into())
    }
}

impl From<&str> for Expr {
    fn from(text: &str) -> Self {
        Expr::Text(text.to_string())
    }
}

impl From<String> for Expr {
    fn from(text: String) -> Self {
        Expr::Text(text)
    }
}
