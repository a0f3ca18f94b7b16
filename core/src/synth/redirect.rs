//! Closed-site redirects.
//!
//! Every closed group becomes one static method of the file-local
//! `Interceptors` class, annotated once per contributing location and
//! matching the intercepted factory's signature.
//!
//! A generic factory can only be intercepted by a method generic over the
//! containing contract's type parameters followed by the method's own, so
//! marshaller overloads are rendered over `T1..Tn, TMarshaller` and cast to
//! the concrete contract of the group.

use crate::api::GeneratorOptions;
use crate::emit::{Body, Member, MethodDecl, TypeDecl};
use crate::grouping::{ClosedGroup, Grouping};
use crate::synth::{
    FactorySignature, construction_expr, contract_type_parameters, convention_scrutinee,
    generic_construction_expr, intercepts_location, marshaller_constraint,
};
use crate::surface;
use crate::{ToString, format};

pub const INTERCEPTORS_CLASS: &str = "Interceptors";

/// The `Interceptors` class, or `None` if there are no closed sites.
pub fn interceptors(grouping: &Grouping, options: &GeneratorOptions) -> Option<TypeDecl> {
    if grouping.closed.is_empty() {
        return None;
    }
    let mut decl = TypeDecl::class(INTERCEPTORS_CLASS).modifiers(&["file", "static"]);
    decl.members.extend(
        grouping
            .closed
            .iter()
            .map(|group| Member::Method(redirect(group, grouping, options))),
    );
    Some(decl)
}

/// One redirect method for a closed group.
pub fn redirect(group: &ClosedGroup, grouping: &Grouping, options: &GeneratorOptions) -> MethodDecl {
    let method = &group.key.method;
    let contract = method.contract();
    if method.is_marshaller_overload() {
        return generic_redirect(group, grouping, options);
    }

    let signature = FactorySignature::new(
        method,
        contract.category(),
        contract.type_arguments(),
        options,
    );
    let mut decl = MethodDecl::new(signature.return_type.clone(), group.name.as_str())
        .modifiers(&["public", "static"]);
    decl.attributes = group.locations.iter().map(intercepts_location).collect();

    let scrutinee = convention_scrutinee(method, &signature);
    let source = signature.source.clone();
    decl.body = Body::Expression(construction_expr(
        grouping,
        group.construction,
        &scrutinee,
        |class| format!("new {}({})", class, source),
    ));
    decl.parameters = signature.parameters;
    decl
}

fn generic_redirect(group: &ClosedGroup, grouping: &Grouping, options: &GeneratorOptions) -> MethodDecl {
    let method = &group.key.method;
    let contract = method.contract();
    let mut type_parameters =
        contract_type_parameters(contract.category(), contract.invoke_parameter_count());
    let signature = FactorySignature::new(method, contract.category(), &type_parameters, options);
    type_parameters.push(surface::MARSHALLER_TYPE_PARAMETER.to_string());

    let mut decl = MethodDecl::new(signature.return_type.clone(), group.name.as_str())
        .modifiers(&["public", "static"]);
    decl.attributes = group.locations.iter().map(intercepts_location).collect();
    decl.type_parameters = type_parameters;
    decl.constraints.push(marshaller_constraint(options));

    let scrutinee = convention_scrutinee(method, &signature);
    decl.body = Body::Expression(generic_construction_expr(
        grouping,
        group.construction,
        contract,
        &signature,
        &scrutinee,
        method.is_from_function_pointer(),
    ));
    decl.parameters = signature.parameters;
    decl
}
