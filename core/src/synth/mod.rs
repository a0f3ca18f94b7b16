//! Source synthesis.
//!
//! Builds the emission model for one pass: implementation classes, the
//! closed-site `Interceptors` class and the open-site dispatchers, plus the
//! optional declaration surface.

pub mod declarations;
pub mod dispatch;
pub mod implementation;
pub mod redirect;

#[cfg(test)]
mod synth_test;

use crate::api::GeneratorOptions;
use crate::descriptors::{
    CallConvention, ContractCategory, ContractDescriptor, MethodDescriptor, qualified,
    with_type_arguments,
};
use crate::emit::{Body, CompilationUnit, Expr, Member, MethodDecl, Namespace, Param, TypeDecl};
use crate::grouping::{Construction, Grouping};
use crate::host::SourceLocation;
use crate::surface::{self, ParameterRole};
use crate::{String, ToString, Vec, format, vec};

/// Leading lines of every generated file.
pub const HEADER: [&str; 3] = [
    "// <auto-generated/>",
    "#nullable enable",
    "#pragma warning disable CS1591",
];

/// Imported so verbatim `MarshalAs(UnmanagedType...)` text resolves.
pub const USINGS: [&str; 1] = ["System.Runtime.InteropServices"];

const COMPILER_SERVICES: &str = "System.Runtime.CompilerServices";

/// Build the generated compilation unit for a grouped pass.
pub fn build_unit(grouping: &Grouping, options: &GeneratorOptions) -> CompilationUnit {
    let mut namespaces = Vec::new();
    if options.emit_intercepts_attribute {
        namespaces.push(Namespace {
            name: COMPILER_SERVICES.to_string(),
            types: vec![intercepts_location_attribute()],
        });
    }

    let mut types = Vec::new();
    if let Some(interceptors) = redirect::interceptors(grouping, options) {
        types.push(interceptors);
    }
    types.extend(
        grouping
            .implementations
            .iter()
            .map(|class| implementation::declaration(class, options)),
    );
    types.extend(
        grouping
            .open
            .iter()
            .map(|entry| dispatch::dispatcher(entry, grouping, options)),
    );
    if !types.is_empty() {
        namespaces.push(Namespace {
            name: options.generated_namespace.clone(),
            types,
        });
    }

    CompilationUnit {
        header: HEADER.iter().map(|line| line.to_string()).collect(),
        usings: USINGS.iter().map(|using| using.to_string()).collect(),
        namespaces,
    }
}

fn intercepts_location_attribute() -> TypeDecl {
    let mut decl = TypeDecl::class("InterceptsLocationAttribute").modifiers(&["file", "sealed"]);
    decl.attributes.push(
        "global::System.AttributeUsage(global::System.AttributeTargets.Method, AllowMultiple = true)"
            .to_string(),
    );
    decl.bases.push("global::System.Attribute".to_string());
    let mut constructor = MethodDecl::constructor("InterceptsLocationAttribute")
        .modifiers(&["public"])
        .body(Body::Block(Vec::new()));
    constructor.parameters = vec![
        Param::new("string", "filePath"),
        Param::new("int", "line"),
        Param::new("int", "column"),
    ];
    decl.members.push(Member::Method(constructor));
    decl
}

/// `InterceptsLocation(@"path", line, column)`.
pub fn intercepts_location(location: &SourceLocation) -> String {
    format!(
        "{}(@\"{}\", {}, {})",
        surface::INTERCEPTS_LOCATION,
        location.path.replace('"', "\"\""),
        location.line,
        location.column
    )
}

/// Type of the parameter playing `role`.
pub fn parameter_type(role: ParameterRole, delegate_type: &str) -> String {
    match role {
        ParameterRole::Callable => delegate_type.to_string(),
        ParameterRole::Address => "nint".to_string(),
        ParameterRole::MarshalReturnAs => format!("{}?", surface::MARSHAL_AS_ATTRIBUTE),
        ParameterRole::MarshalParamsAs => format!("{}?[]?", surface::MARSHAL_AS_ATTRIBUTE),
        ParameterRole::CallingConvention => surface::CALLING_CONVENTION_TYPE.to_string(),
    }
}

/// The factory signature of `method`, rendered over `type_arguments`
/// (concrete types for closed sites, type parameters for dispatchers).
pub struct FactorySignature {
    pub return_type: String,
    pub parameters: Vec<Param>,
    /// Name of the callable or address parameter.
    pub source: String,
    /// Name of the calling-convention parameter, if the overload has one.
    pub convention: Option<String>,
}

impl FactorySignature {
    pub fn new<S: AsRef<str>>(
        method: &MethodDescriptor,
        category: ContractCategory,
        type_arguments: &[S],
        options: &GeneratorOptions,
    ) -> Self {
        let invoke_parameter_count = method.contract().invoke_parameter_count();
        let interface = with_type_arguments(
            category.qualified_interface_name(&options.contract_namespace),
            type_arguments,
        );
        let delegate = with_type_arguments(category.delegate_name().to_string(), type_arguments);
        let roles = surface::factory_parameters(
            method.kind(),
            category,
            method.is_marshaller_overload(),
            invoke_parameter_count,
        );

        let mut parameters = Vec::with_capacity(roles.len());
        let mut source = String::new();
        let mut convention = None;
        for (index, role) in roles.into_iter().enumerate() {
            let name = method
                .parameters()
                .get(index)
                .map(|name| name.to_string())
                .unwrap_or_else(|| role.default_name(category).to_string());
            match role {
                ParameterRole::Callable | ParameterRole::Address => source = name.clone(),
                ParameterRole::CallingConvention => convention = Some(name.clone()),
                _ => {}
            }
            parameters.push(Param::new(parameter_type(role, &delegate), name));
        }

        Self {
            return_type: interface,
            parameters,
            source,
            convention,
        }
    }
}

/// `where TMarshaller : global::NS.IMarshaller<TMarshaller>`.
pub fn marshaller_constraint(options: &GeneratorOptions) -> String {
    format!(
        "where {} : {}<{}>",
        surface::MARSHALLER_TYPE_PARAMETER,
        qualified(&options.contract_namespace, surface::MARSHALLER_INTERFACE),
        surface::MARSHALLER_TYPE_PARAMETER
    )
}

/// The expression a runtime convention branch switches on.
pub fn convention_scrutinee(method: &MethodDescriptor, signature: &FactorySignature) -> String {
    if method.is_marshaller_overload() {
        format!("{}.CallingConvention", surface::MARSHALLER_TYPE_PARAMETER)
    } else {
        signature
            .convention
            .clone()
            .unwrap_or_else(|| surface::CALLING_CONVENTION.to_string())
    }
}

/// The contract's own type parameters, `T1..Tn` (plus `TResult`).
pub fn contract_type_parameters(category: ContractCategory, invoke_parameter_count: usize) -> Vec<String> {
    surface::contract_type_parameters(category, invoke_parameter_count)
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Construct an implementation of the concrete `contract` from a method
/// generic over the contract's type parameters, casting through `object`
/// between the generic and concrete views.
pub fn generic_construction_expr(
    grouping: &Grouping,
    construction: Construction,
    contract: &ContractDescriptor,
    signature: &FactorySignature,
    scrutinee: &str,
    from_pointer: bool,
) -> Expr {
    let source = if from_pointer {
        signature.source.clone()
    } else {
        format!("({})(object){}", contract.delegate_type(), signature.source)
    };
    let return_type = &signature.return_type;
    construction_expr(grouping, construction, scrutinee, |class| {
        format!("({})(object)new {}({})", return_type, class, source)
    })
}

/// Build the construction expression of `construction`.
///
/// `wrap` maps an implementation class name to the value of one arm.
pub fn construction_expr(
    grouping: &Grouping,
    construction: Construction,
    scrutinee: &str,
    wrap: impl Fn(&str) -> String,
) -> Expr {
    match construction {
        Construction::Direct(index) => Expr::Text(wrap(&grouping.implementation(index).name)),
        Construction::ByConvention(variants) => {
            let mut arms: Vec<(String, Expr)> = variants
                .iter()
                .zip(CallConvention::ALL)
                .map(|(index, convention)| {
                    (
                        format!(
                            "{}.{}",
                            surface::CALLING_CONVENTION_TYPE,
                            convention.member_name()
                        ),
                        Expr::Text(wrap(&grouping.implementation(*index).name)),
                    )
                })
                .collect();
            arms.push((
                "_".to_string(),
                Expr::Text(format!(
                    "throw new {}($\"Calling convention {{{}}} is not supported.\")",
                    surface::NOT_SUPPORTED_EXCEPTION,
                    scrutinee
                )),
            ));
            Expr::Switch {
                scrutinee: scrutinee.to_string(),
                arms,
            }
        }
    }
}
