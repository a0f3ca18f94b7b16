//! Implementation classes.
//!
//! One `file sealed class` per [`ImplementationClass`], implementing the
//! contract interface over a private, convention-tagged `Handle` delegate.

use crate::api::GeneratorOptions;
use crate::descriptors::{CallConvention, MarshallingDescriptor};
use crate::emit::{Body, DelegateDecl, Expr, FieldDecl, Member, MethodDecl, Param, Stmt, TypeDecl};
use crate::grouping::ImplementationClass;
use crate::surface::{self, INVOKE_PARAMETERS, ParameterRole};
use crate::{String, ToString, Vec, format, vec};

const HANDLE: &str = "Handle";
const HANDLE_FIELD: &str = "_handle";
const POINTER_FIELD: &str = "_functionPointer";

/// Declaration of one implementation class.
pub fn declaration(class: &ImplementationClass, options: &GeneratorOptions) -> TypeDecl {
    let method = &class.key.method;
    let marshalling = &class.key.marshalling;
    let contract = method.contract();
    let category = contract.category();
    let convention = marshalling
        .calling_convention
        .unwrap_or(CallConvention::Winapi);

    let return_type = contract
        .return_type()
        .map(|ty| ty.to_string())
        .unwrap_or_else(|| "void".to_string());
    let invoke_parameters: Vec<Param> = contract
        .parameter_types()
        .iter()
        .zip(INVOKE_PARAMETERS)
        .map(|(ty, name)| Param::new(ty.as_str(), name))
        .collect();
    let arguments = INVOKE_PARAMETERS[..contract.invoke_parameter_count()].join(", ");

    let mut decl = TypeDecl::class(class.name.as_str()).modifiers(&["file", "sealed"]);
    decl.bases.push(contract.interface_type(&options.contract_namespace));

    decl.members.push(Member::Delegate(handle(
        marshalling,
        convention,
        &return_type,
        &invoke_parameters,
    )));
    decl.members.push(Member::Field(FieldDecl {
        modifiers: vec!["private", "readonly"],
        ty: HANDLE.to_string(),
        name: HANDLE_FIELD.to_string(),
    }));
    decl.members.push(Member::Field(FieldDecl {
        modifiers: vec!["private", "readonly"],
        ty: "nint".to_string(),
        name: POINTER_FIELD.to_string(),
    }));

    let delegate_type = contract.delegate_type();
    let constructor = if method.is_from_function_pointer() {
        from_pointer(&class.name, parameter_name(class, ParameterRole::Address))
    } else {
        from_callable(
            &class.name,
            &delegate_type,
            parameter_name(class, ParameterRole::Callable),
        )
    };
    decl.members.push(Member::Method(constructor));

    decl.members.push(Member::Method(
        MethodDecl::new("nint", "GetFunctionPointer")
            .modifiers(&["public"])
            .body(Body::Expression(Expr::text(POINTER_FIELD))),
    ));

    let mut invoke = MethodDecl::new(return_type, "Invoke")
        .modifiers(&["public"])
        .body(Body::Expression(Expr::Text(format!(
            "{}({})",
            HANDLE_FIELD, arguments
        ))));
    invoke.attributes.push(format!(
        "{}({})",
        surface::METHOD_IMPL,
        surface::AGGRESSIVE_INLINING
    ));
    if method.is_from_function_pointer() {
        if let Some(call_conv) = convention.call_conv_type() {
            invoke.attributes.push(format!(
                "{}(CallConvs = new[] {{ typeof({}) }})",
                surface::UNMANAGED_CALL_CONV,
                call_conv
            ));
        }
    }
    invoke.parameters = invoke_parameters;
    decl.members.push(Member::Method(invoke));

    decl.members.push(Member::Method(
        MethodDecl::new(delegate_type, category.to_delegate_method())
            .modifiers(&["public"])
            .body(Body::Expression(Expr::Text(format!("{}.Invoke", HANDLE_FIELD)))),
    ));

    decl
}

/// The private delegate carrying the convention and marshalling overrides.
fn handle(
    marshalling: &MarshallingDescriptor,
    convention: CallConvention,
    return_type: &str,
    parameters: &[Param],
) -> DelegateDecl {
    let mut attributes = vec![format!(
        "{}({}.{})",
        surface::UNMANAGED_FUNCTION_POINTER,
        surface::CALLING_CONVENTION_TYPE,
        convention.member_name()
    )];
    if return_type != "void" {
        if let Some(value) = &marshalling.marshal_return_as {
            attributes.push(format!("return: {}", value));
        }
    }
    let parameters = parameters
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let mut param = param.clone();
            if let Some(value) = marshalling.parameter_override(index) {
                param.attributes.push(value.render());
            }
            param
        })
        .collect();
    DelegateDecl {
        attributes,
        modifiers: vec!["private"],
        return_type: return_type.to_string(),
        name: HANDLE.to_string(),
        parameters,
    }
}

fn from_callable(class_name: &str, delegate_type: &str, source: String) -> MethodDecl {
    let mut constructor = MethodDecl::constructor(class_name).modifiers(&["public"]);
    constructor.parameters.push(Param::new(delegate_type, source.as_str()));
    constructor.body = Body::Block(vec![
        Stmt::Expr(Expr::Text(format!(
            "{}.ThrowIfNull({})",
            surface::ARGUMENT_NULL_EXCEPTION,
            source
        ))),
        Stmt::Expr(Expr::Text(format!(
            "{} = ({}){}.CreateDelegate(typeof({}), {}.Target, {}.Method)",
            HANDLE_FIELD,
            HANDLE,
            surface::DELEGATE,
            HANDLE,
            source,
            source
        ))),
        Stmt::Expr(Expr::Text(format!(
            "{} = {}.GetFunctionPointerForDelegate({})",
            POINTER_FIELD,
            surface::MARSHAL,
            HANDLE_FIELD
        ))),
    ]);
    constructor
}

fn from_pointer(class_name: &str, source: String) -> MethodDecl {
    let mut constructor = MethodDecl::constructor(class_name).modifiers(&["public"]);
    constructor.parameters.push(Param::new("nint", source.as_str()));
    constructor.body = Body::Block(vec![
        Stmt::If {
            condition: format!("{} == 0", source),
            then: vec![Stmt::Throw(Expr::Text(format!(
                "new {}(nameof({}))",
                surface::ARGUMENT_NULL_EXCEPTION,
                source
            )))],
        },
        Stmt::Expr(Expr::Text(format!("{} = {}", POINTER_FIELD, source))),
        Stmt::Expr(Expr::Text(format!(
            "{} = {}.GetDelegateForFunctionPointer<{}>({})",
            HANDLE_FIELD,
            surface::MARSHAL,
            HANDLE,
            source
        ))),
    ]);
    constructor
}

/// Name of the source parameter as declared on the intercepted factory.
fn parameter_name(class: &ImplementationClass, role: ParameterRole) -> String {
    let category = class.key.contract().category();
    class
        .key
        .method
        .parameters()
        .first()
        .map(|name| name.to_string())
        .unwrap_or_else(|| role.default_name(category).to_string())
}
