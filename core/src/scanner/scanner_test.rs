use alloc::sync::Arc;

use super::*;
use crate::host::{CallShape, Compilation};
use crate::test_utils::{CallBuilder, init_test_logging, ty, type_param};

fn scan(calls: Vec<CandidateCall>) -> (usize, Diagnostics) {
    let compilation = Compilation {
        calls,
        ..Compilation::default()
    };
    let mut diagnostics = Diagnostics::new();
    let mut scanner = Scanner::new("NativeDelegates");
    let scanned = scanner
        .scan(&compilation, &mut diagnostics, &CancellationToken::new())
        .unwrap();
    (scanned.len(), diagnostics)
}

#[test]
fn test_matches_closed_action_call() {
    init_test_logging();
    let call = CallBuilder::action(&[ty("int"), ty("bool")]).build();
    let mut scanner = Scanner::new("NativeDelegates");
    let site = scanner.scan_call(&call).unwrap();
    assert!(!site.is_open);
    assert_eq!(site.contract.invoke_parameter_count(), 2);
    assert_eq!(site.method.name(), "FromAction");
    assert_eq!(
        site.method.parameters(),
        &[EcoString::from("action"), EcoString::from("marshalParamsAs"), EcoString::from("callingConvention")]
    );
}

#[test]
fn test_contracts_are_shared() {
    let a = CallBuilder::func(&[ty("int"), ty("int")]).at("a.cs", 1, 1).build();
    let b = CallBuilder::func(&[ty("int"), ty("int")]).from_pointer().at("b.cs", 2, 2).build();
    let mut scanner = Scanner::new("NativeDelegates");
    let first = scanner.scan_call(&a).unwrap();
    let second = scanner.scan_call(&b).unwrap();
    assert!(Arc::ptr_eq(&first.contract, &second.contract));
    assert!(second.method.is_from_function_pointer());
}

#[test]
fn test_skip_reasons() {
    let mut scanner = Scanner::new("NativeDelegates");

    let mut shaped = CallBuilder::action(&[]).build();
    shaped.shape = CallShape::Unexpected;
    assert_eq!(scanner.scan_call(&shaped).unwrap_err(), SkipReason::UnexpectedShape);

    let mut unresolved = CallBuilder::action(&[]).build();
    unresolved.member = None;
    assert_eq!(scanner.scan_call(&unresolved).unwrap_err(), SkipReason::Unresolved);

    let foreign = CallBuilder::action(&[]).namespace("Elsewhere").build();
    assert_eq!(scanner.scan_call(&foreign).unwrap_err(), SkipReason::NotAContract);

    let too_wide = CallBuilder::action(&vec![ty("int"); 17]).build();
    assert_eq!(scanner.scan_call(&too_wide).unwrap_err(), SkipReason::UnsupportedArity);

    let mut wrong_factory = CallBuilder::action(&[ty("int")]).build();
    if let Some(member) = wrong_factory.member.as_mut() {
        member.name = "FromFunc".into();
    }
    assert_eq!(scanner.scan_call(&wrong_factory).unwrap_err(), SkipReason::NotAFactory);

    let mut two_generics = CallBuilder::action(&[ty("int")]).marshaller(ty("global::M")).build();
    if let Some(member) = two_generics.member.as_mut() {
        member.type_arguments.push(ty("global::N"));
    }
    assert_eq!(
        scanner.scan_call(&two_generics).unwrap_err(),
        SkipReason::UnsupportedGenericArity
    );

    let mut extra_parameter = CallBuilder::action(&[ty("int")]).build();
    if let Some(member) = extra_parameter.member.as_mut() {
        member.parameters.push("state".into());
    }
    assert_eq!(
        scanner.scan_call(&extra_parameter).unwrap_err(),
        SkipReason::ParameterMismatch
    );
}

#[test]
fn test_marshaller_overload_takes_only_the_callable() {
    let call = CallBuilder::func(&[ty("int"), ty("int")])
        .marshaller(ty("global::Sample.Marshaller"))
        .build();
    let mut scanner = Scanner::new("NativeDelegates");
    let site = scanner.scan_call(&call).unwrap();
    assert!(site.method.is_marshaller_overload());
    assert_eq!(site.method.parameters(), &[EcoString::from("func")]);
}

#[test]
fn test_generic_pointer_overload_has_marshaller_arity() {
    let mut scanner = Scanner::new("NativeDelegates");

    let marshalled = CallBuilder::action(&[ty("int"), ty("string")])
        .from_pointer()
        .marshaller(ty("global::App.Marshaller"))
        .build();
    let site = scanner.scan_call(&marshalled).unwrap();
    assert!(site.method.is_from_function_pointer());
    assert!(site.method.is_marshaller_overload());
    assert_eq!(site.method.generic_arity(), 1);

    let mut contract_arity = CallBuilder::action(&[ty("int"), ty("string")])
        .from_pointer()
        .marshaller(ty("global::App.Marshaller"))
        .build();
    if let Some(member) = contract_arity.member.as_mut() {
        member.type_arguments = vec![ty("int"), ty("string")];
    }
    assert_eq!(
        scanner.scan_call(&contract_arity).unwrap_err(),
        SkipReason::UnsupportedGenericArity
    );
}

#[test]
fn test_open_site_collects_concrete_instantiations() {
    let call = CallBuilder::action(&[type_param("T")])
        .instantiation(&[ty("int")], &[])
        .instantiation(&[ty("int")], &[])
        .instantiation(&[ty("long")], &[])
        .instantiation(&[type_param("U")], &[])
        .build();
    let mut scanner = Scanner::new("NativeDelegates");
    let site = scanner.scan_call(&call).unwrap();
    assert!(site.is_open);
    let tuples: Vec<_> = site
        .instantiations
        .iter()
        .map(|i| i.type_arguments.clone())
        .collect();
    assert_eq!(
        tuples,
        vec![vec![EcoString::from("int")], vec![EcoString::from("long")]]
    );
    assert_eq!(site.instantiations[1].contract.type_arguments(), &[EcoString::from("long")]);
}

#[test]
fn test_uninstantiated_open_site_is_reported() {
    let open = CallBuilder::action(&[type_param("T")]).build();
    let closed = CallBuilder::action(&[ty("int")]).at("Program.cs", 4, 9).build();
    let (count, diagnostics) = scan(vec![open, closed]);
    assert_eq!(count, 2);
    let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec!["TR004"]);
}

#[test]
fn test_cancellation_aborts_the_scan() {
    let compilation = Compilation {
        calls: vec![CallBuilder::action(&[]).build()],
        ..Compilation::default()
    };
    let token = CancellationToken::new();
    token.cancel();
    let mut diagnostics = Diagnostics::new();
    let result = Scanner::new("NativeDelegates").scan(&compilation, &mut diagnostics, &token);
    assert!(matches!(result, Err(Error::Cancelled)));
}
