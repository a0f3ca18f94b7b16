//! Deterministic text rendering of the emission model.

use super::{
    Body, CompilationUnit, DelegateDecl, Expr, FieldDecl, Member, MethodDecl, Namespace, Param,
    PropertyDecl, Stmt, TypeDecl, TypeKind,
};
use crate::{String, Vec, format};

const INDENT: &str = "    ";

/// Render a compilation unit to source text.
pub fn render(unit: &CompilationUnit) -> String {
    let mut w = Writer::default();
    for line in &unit.header {
        w.line(line);
    }
    if !unit.header.is_empty() {
        w.blank();
    }
    for using in &unit.usings {
        w.line(&format!("using {};", using));
    }
    if !unit.usings.is_empty() {
        w.blank();
    }
    for (i, namespace) in unit.namespaces.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        w.namespace(namespace);
    }
    w.out
}

/// Render a single type declaration at top level.
pub fn render_type(decl: &TypeDecl) -> String {
    let mut w = Writer::default();
    w.type_decl(decl);
    w.out
}

#[derive(Default)]
struct Writer {
    out: String,
    level: usize,
}

impl Writer {
    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.level {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self) {
        self.line("{");
        self.level += 1;
    }

    fn close(&mut self, suffix: &str) {
        self.level -= 1;
        self.line(&format!("}}{}", suffix));
    }

    fn doc(&mut self, doc: &[String]) {
        for line in doc {
            if line.is_empty() {
                self.line("///");
            } else {
                self.line(&format!("/// {}", line));
            }
        }
    }

    fn attributes(&mut self, attributes: &[String]) {
        for attribute in attributes {
            self.line(&format!("[{}]", attribute));
        }
    }

    fn constraints(&mut self, constraints: &[String]) {
        self.level += 1;
        for constraint in constraints {
            self.line(constraint);
        }
        self.level -= 1;
    }

    fn namespace(&mut self, namespace: &Namespace) {
        self.line(&format!("namespace {}", namespace.name));
        self.open();
        for (i, decl) in namespace.types.iter().enumerate() {
            if i > 0 {
                self.blank();
            }
            self.type_decl(decl);
        }
        self.close("");
    }

    fn type_decl(&mut self, decl: &TypeDecl) {
        self.doc(&decl.doc);
        self.attributes(&decl.attributes);
        let keyword = match decl.kind {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        };
        let mut head = modifiers(&decl.modifiers);
        head.push_str(keyword);
        head.push(' ');
        head.push_str(&decl.name);
        head.push_str(&type_parameters(&decl.type_parameters));
        if !decl.bases.is_empty() {
            head.push_str(" : ");
            head.push_str(&decl.bases.join(", "));
        }
        self.line(&head);
        self.constraints(&decl.constraints);
        self.open();
        let mut previous: Option<&Member> = None;
        for member in &decl.members {
            if let Some(previous) = previous {
                let both_fields =
                    matches!(previous, Member::Field(_)) && matches!(member, Member::Field(_));
                if !both_fields {
                    self.blank();
                }
            }
            self.member(member);
            previous = Some(member);
        }
        self.close("");
    }

    fn member(&mut self, member: &Member) {
        match member {
            Member::Field(field) => self.field(field),
            Member::Delegate(delegate) => self.delegate(delegate),
            Member::Method(method) => self.method(method),
            Member::Property(property) => self.property(property),
        }
    }

    fn field(&mut self, field: &FieldDecl) {
        self.line(&format!(
            "{}{} {};",
            modifiers(&field.modifiers),
            field.ty,
            field.name
        ));
    }

    fn delegate(&mut self, delegate: &DelegateDecl) {
        self.attributes(&delegate.attributes);
        self.line(&format!(
            "{}delegate {} {}({});",
            modifiers(&delegate.modifiers),
            delegate.return_type,
            delegate.name,
            parameters(&delegate.parameters)
        ));
    }

    fn method(&mut self, method: &MethodDecl) {
        self.doc(&method.doc);
        self.attributes(&method.attributes);
        let mut head = modifiers(&method.modifiers);
        if let Some(return_type) = &method.return_type {
            head.push_str(return_type);
            head.push(' ');
        }
        head.push_str(&method.name);
        head.push_str(&type_parameters(&method.type_parameters));
        head.push('(');
        head.push_str(&parameters(&method.parameters));
        head.push(')');

        match &method.body {
            Body::Abstract if method.constraints.is_empty() => {
                head.push(';');
                self.line(&head);
            }
            Body::Abstract => {
                self.line(&head);
                let (last, rest) = split_last(&method.constraints);
                self.constraints(rest);
                self.constraints(&[format!("{};", last)]);
            }
            Body::Expression(expr) => {
                self.line(&head);
                self.constraints(&method.constraints);
                self.level += 1;
                self.expr("=> ", expr, ";");
                self.level -= 1;
            }
            Body::Block(stmts) => {
                self.line(&head);
                self.constraints(&method.constraints);
                self.open();
                self.stmts(stmts);
                self.close("");
            }
        }
    }

    fn property(&mut self, property: &PropertyDecl) {
        self.doc(&property.doc);
        let head = format!(
            "{}{} {}",
            modifiers(&property.modifiers),
            property.ty,
            property.name
        );
        match &property.getter {
            None => self.line(&format!("{} {{ get; }}", head)),
            Some(expr) => self.expr(&format!("{} => ", head), expr, ";"),
        }
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::Expr(expr) => self.expr("", expr, ";"),
                Stmt::Return(expr) => self.expr("return ", expr, ";"),
                Stmt::Throw(expr) => self.expr("throw ", expr, ";"),
                Stmt::If { condition, then } => {
                    self.line(&format!("if ({})", condition));
                    self.open();
                    self.stmts(then);
                    self.close("");
                }
            }
        }
    }

    fn expr(&mut self, prefix: &str, expr: &Expr, suffix: &str) {
        match expr {
            Expr::Text(text) => self.line(&format!("{}{}{}", prefix, text, suffix)),
            Expr::Switch { scrutinee, arms } => {
                self.line(&format!("{}{} switch", prefix, scrutinee));
                self.open();
                for (pattern, value) in arms {
                    self.expr(&format!("{} => ", pattern), value, ",");
                }
                self.close(suffix);
            }
        }
    }
}

fn modifiers(modifiers: &[&str]) -> String {
    let mut out = String::new();
    for modifier in modifiers {
        out.push_str(modifier);
        out.push(' ');
    }
    out
}

fn type_parameters(names: &[String]) -> String {
    if names.is_empty() {
        String::new()
    } else {
        format!("<{}>", names.join(", "))
    }
}

fn parameters(params: &[Param]) -> String {
    let rendered: Vec<String> = params
        .iter()
        .map(|param| {
            let mut out = String::new();
            for attribute in &param.attributes {
                out.push('[');
                out.push_str(attribute);
                out.push_str("] ");
            }
            out.push_str(&param.ty);
            out.push(' ');
            out.push_str(&param.name);
            if let Some(default) = &param.default {
                out.push_str(" = ");
                out.push_str(default);
            }
            out
        })
        .collect();
    rendered.join(", ")
}

fn split_last(items: &[String]) -> (&str, &[String]) {
    match items.split_last() {
        Some((last, rest)) => (last.as_str(), rest),
        None => ("", items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Namespace;
    use crate::{ToString, vec};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_class_with_members() {
        let mut decl = TypeDecl::class("Sample").modifiers(&["file", "sealed"]);
        decl.bases.push("global::IThing".to_string());
        decl.members.push(Member::Field(FieldDecl {
            modifiers: vec!["private", "readonly"],
            ty: "int".to_string(),
            name: "_a".to_string(),
        }));
        decl.members.push(Member::Field(FieldDecl {
            modifiers: vec!["private", "readonly"],
            ty: "int".to_string(),
            name: "_b".to_string(),
        }));
        decl.members.push(Member::Method(
            MethodDecl::new("int", "Sum")
                .modifiers(&["public"])
                .body(Body::Expression(Expr::text("_a + _b"))),
        ));
        assert_eq!(
            render_type(&decl),
            indoc! {"
                file sealed class Sample : global::IThing
                {
                    private readonly int _a;
                    private readonly int _b;

                    public int Sum()
                        => _a + _b;
                }
            "}
        );
    }

    #[test]
    fn test_switch_and_guards() {
        let mut method = MethodDecl::new("int", "Pick").modifiers(&["public", "static"]);
        method.type_parameters.push("T".to_string());
        method.constraints.push("where T : struct".to_string());
        method.parameters.push(Param::new("int", "value"));
        method.body = Body::Block(vec![
            Stmt::If {
                condition: "typeof(T) == typeof(int)".to_string(),
                then: vec![Stmt::Return(Expr::Switch {
                    scrutinee: "value".to_string(),
                    arms: vec![
                        ("1".to_string(), Expr::text("10")),
                        ("_".to_string(), Expr::text("throw new global::System.Exception()")),
                    ],
                })],
            },
            Stmt::Throw(Expr::text("new global::System.NotImplementedException()")),
        ]);
        let unit = CompilationUnit {
            header: vec!["// <auto-generated/>".to_string()],
            usings: vec!["System".to_string()],
            namespaces: vec![Namespace {
                name: "Demo".to_string(),
                types: vec![TypeDecl {
                    members: vec![Member::Method(method)],
                    ..TypeDecl::class("Holder").modifiers(&["file", "static"])
                }],
            }],
        };
        assert_eq!(
            render(&unit),
            indoc! {"
                // <auto-generated/>

                using System;

                namespace Demo
                {
                    file static class Holder
                    {
                        public static int Pick<T>(int value)
                            where T : struct
                        {
                            if (typeof(T) == typeof(int))
                            {
                                return value switch
                                {
                                    1 => 10,
                                    _ => throw new global::System.Exception(),
                                };
                            }
                            throw new global::System.NotImplementedException();
                        }
                    }
                }
            "}
        );
    }

    #[test]
    fn test_abstract_members_and_properties() {
        let mut decl = TypeDecl::interface("IShape");
        decl.type_parameters.push("TSelf".to_string());
        decl.members.push(Member::Property(PropertyDecl {
            doc: vec!["The area.".to_string()],
            modifiers: vec!["static", "abstract"],
            ty: "int".to_string(),
            name: "Area".to_string(),
            getter: None,
        }));
        let mut method = MethodDecl::new("void", "Draw");
        method.type_parameters.push("T".to_string());
        method.constraints.push("where T : class".to_string());
        decl.members.push(Member::Method(method));
        assert_eq!(
            render_type(&decl),
            indoc! {"
                interface IShape<TSelf>
                {
                    /// The area.
                    static abstract int Area { get; }

                    void Draw<T>()
                        where T : class;
                }
            "}
        );
    }
}
