//! Open-site dispatchers.
//!
//! An open call site is intercepted by a method generic over the contract's
//! own type parameters. At run time it compares those parameters (and the
//! marshaller, for marshaller overloads) against every concrete
//! instantiation seen during the scan and constructs the matching
//! implementation class. No match means the instantiation was never seen,
//! which is a scan invariant violation.

use crate::api::GeneratorOptions;
use crate::emit::{Body, Expr, Member, MethodDecl, Stmt, TypeDecl};
use crate::grouping::{DispatchCandidate, Grouping, OpenDispatchEntry};
use crate::synth::{
    FactorySignature, contract_type_parameters, convention_scrutinee, generic_construction_expr,
    intercepts_location, marshaller_constraint,
};
use crate::surface;
use crate::{String, ToString, Vec, format, vec};

/// The dispatcher class of one open entry.
pub fn dispatcher(entry: &OpenDispatchEntry, grouping: &Grouping, options: &GeneratorOptions) -> TypeDecl {
    let method = &entry.method;
    let category = entry.key.category;
    let invoke_parameter_count = method.contract().invoke_parameter_count();

    let mut type_parameters = contract_type_parameters(category, invoke_parameter_count);
    let contract_parameters = type_parameters.clone();
    let signature = FactorySignature::new(method, category, &contract_parameters, options);

    let mut decl = MethodDecl::new(signature.return_type.clone(), method.name().as_str())
        .modifiers(&["public", "static"]);
    decl.attributes = entry.locations.iter().map(intercepts_location).collect();
    if method.is_marshaller_overload() {
        type_parameters.push(surface::MARSHALLER_TYPE_PARAMETER.to_string());
        decl.constraints.push(marshaller_constraint(options));
    }

    let scrutinee = convention_scrutinee(method, &signature);
    let mut body: Vec<Stmt> = entry
        .candidates
        .iter()
        .map(|candidate| Stmt::If {
            condition: guard(&type_parameters, candidate),
            then: vec![Stmt::Return(generic_construction_expr(
                grouping,
                candidate.construction,
                &candidate.contract,
                &signature,
                &scrutinee,
                method.is_from_function_pointer(),
            ))],
        })
        .collect();
    body.push(Stmt::Throw(Expr::Text(format!(
        "new {}(\"No generated implementation matches this instantiation of {}.\")",
        surface::NOT_IMPLEMENTED_EXCEPTION,
        method.name()
    ))));

    decl.type_parameters = type_parameters;
    decl.parameters = signature.parameters;
    decl.body = Body::Block(body);

    let mut class = TypeDecl::class(entry.name.as_str()).modifiers(&["file", "static"]);
    class.members.push(Member::Method(decl));
    class
}

/// `typeof(T1) == typeof(int) && ...`; `true` for a candidate with no type
/// parameters to compare.
fn guard(type_parameters: &[String], candidate: &DispatchCandidate) -> String {
    let checks: Vec<String> = type_parameters
        .iter()
        .zip(&candidate.type_arguments)
        .map(|(parameter, argument)| format!("typeof({}) == typeof({})", parameter, argument))
        .collect();
    if checks.is_empty() {
        "true".to_string()
    } else {
        checks.join(" && ")
    }
}
