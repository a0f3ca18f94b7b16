//! The declaration surface the generated code targets.
//!
//! Both contract interfaces for every invoke-parameter count plus the
//! `IMarshaller<TSelf>` interface. The factory bodies only throw: every
//! supported call is redirected at compile time.

use crate::api::GeneratorOptions;
use crate::descriptors::{ContractCategory, FactoryKind, qualified, with_type_arguments};
use crate::emit::{
    self, Body, CompilationUnit, Expr, Member, MethodDecl, Namespace, Param, PropertyDecl,
    TypeDecl,
};
use crate::surface::{self, INVOKE_PARAMETERS, MAX_INVOKE_PARAMETERS, ParameterRole};
use crate::synth::{HEADER, parameter_type};
use crate::{String, ToString, Vec, format, vec};

/// Render the declaration surface as a standalone source file.
pub fn render_declarations(options: &GeneratorOptions) -> String {
    emit::render(&build_declarations(options))
}

pub fn build_declarations(options: &GeneratorOptions) -> CompilationUnit {
    let mut types = vec![marshaller_interface(options)];
    for category in [ContractCategory::Action, ContractCategory::Func] {
        for count in 0..=MAX_INVOKE_PARAMETERS {
            types.push(contract_interface(category, count, options));
        }
    }
    CompilationUnit {
        header: HEADER.iter().map(|line| line.to_string()).collect(),
        usings: Vec::new(),
        namespaces: vec![Namespace {
            name: options.contract_namespace.clone(),
            types,
        }],
    }
}

fn marshaller_interface(options: &GeneratorOptions) -> TypeDecl {
    let mut decl = TypeDecl::interface(surface::MARSHALLER_INTERFACE).modifiers(&["public"]);
    decl.doc = vec![
        "<summary>".to_string(),
        "Supplies marshalling options to the generic factory overloads.".to_string(),
        "</summary>".to_string(),
    ];
    decl.type_parameters.push("TSelf".to_string());
    decl.constraints.push(format!(
        "where TSelf : {}<TSelf>",
        qualified(&options.contract_namespace, surface::MARSHALLER_INTERFACE)
    ));
    for role in [
        ParameterRole::CallingConvention,
        ParameterRole::MarshalReturnAs,
        ParameterRole::MarshalParamsAs,
    ] {
        decl.members.push(Member::Property(PropertyDecl {
            doc: Vec::new(),
            modifiers: vec!["static", "abstract"],
            ty: parameter_type(role, ""),
            name: pascal_case(role.default_name(ContractCategory::Func)),
            getter: None,
        }));
    }
    decl
}

fn contract_interface(
    category: ContractCategory,
    invoke_parameter_count: usize,
    options: &GeneratorOptions,
) -> TypeDecl {
    let type_parameters = surface::contract_type_parameters(category, invoke_parameter_count);
    let interface = with_type_arguments(
        category.qualified_interface_name(&options.contract_namespace),
        &type_parameters,
    );
    let delegate = with_type_arguments(category.delegate_name().to_string(), &type_parameters);
    let return_type = if category.has_return() {
        surface::RESULT_TYPE_PARAMETER
    } else {
        "void"
    };

    let mut decl = TypeDecl::interface(category.interface_name()).modifiers(&["public"]);
    decl.doc = vec![
        "<summary>".to_string(),
        format!(
            "A native-callable wrapper with {} parameter(s){}.",
            invoke_parameter_count,
            if category.has_return() { " and a return value" } else { "" }
        ),
        "</summary>".to_string(),
    ];
    decl.type_parameters = type_parameters.iter().map(|name| name.to_string()).collect();

    for kind in [FactoryKind::FromCallable, FactoryKind::FromFunctionPointer] {
        for generic in [false, true] {
            decl.members.push(Member::Method(factory(
                kind,
                category,
                invoke_parameter_count,
                generic,
                &interface,
                &delegate,
                options,
            )));
        }
    }

    decl.members.push(Member::Method(MethodDecl::new("nint", "GetFunctionPointer")));
    let mut invoke = MethodDecl::new(return_type, "Invoke");
    invoke.parameters = type_parameters[..invoke_parameter_count]
        .iter()
        .zip(INVOKE_PARAMETERS)
        .map(|(ty, name)| Param::new(*ty, name))
        .collect();
    decl.members.push(Member::Method(invoke));
    decl.members.push(Member::Method(MethodDecl::new(
        delegate,
        category.to_delegate_method(),
    )));
    decl
}

fn factory(
    kind: FactoryKind,
    category: ContractCategory,
    invoke_parameter_count: usize,
    generic: bool,
    interface: &str,
    delegate: &str,
    options: &GeneratorOptions,
) -> MethodDecl {
    let mut decl = MethodDecl::new(interface, surface::factory_name(kind, category))
        .modifiers(&["public", "static"])
        .body(Body::Expression(Expr::Text(format!(
            "throw new {}(\"Calls to this factory are redirected at compile time.\")",
            surface::NOT_IMPLEMENTED_EXCEPTION
        ))));
    decl.parameters = surface::factory_parameters(kind, category, generic, invoke_parameter_count)
        .into_iter()
        .map(|role| {
            let mut param = Param::new(parameter_type(role, delegate), role.default_name(category));
            param.default = match role {
                ParameterRole::MarshalReturnAs | ParameterRole::MarshalParamsAs => {
                    Some("null".to_string())
                }
                ParameterRole::CallingConvention => Some(format!(
                    "{}.Winapi",
                    surface::CALLING_CONVENTION_TYPE
                )),
                _ => None,
            };
            param
        })
        .collect();
    if generic {
        decl.type_parameters
            .push(surface::MARSHALLER_TYPE_PARAMETER.to_string());
        decl.constraints.push(crate::synth::marshaller_constraint(options));
    }
    decl
}

fn pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
