//! Call-site scanner.
//!
//! Matches candidate calls against the fixed factory surface and builds the
//! contract and method descriptors for each one. Anything that does not
//! match is unrelated code and is skipped without a diagnostic.

use alloc::sync::Arc;

use ecow::EcoString;
use hashbrown::{HashMap, HashSet};

use crate::cancel::CancellationToken;
use crate::descriptors::{ContractCategory, ContractDescriptor, MethodDescriptor};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::errors::Error;
use crate::host::{CallShape, CandidateCall, Compilation, TypeRef};
use crate::surface;
use crate::{ToString, Vec};

/// A call that matched the surface; marshalling is attached later.
#[derive(Debug, Clone)]
pub struct ScannedCall<'c> {
    pub call: &'c CandidateCall,
    pub contract: Arc<ContractDescriptor>,
    pub method: MethodDescriptor,
    pub is_open: bool,
    pub instantiations: Vec<ScannedInstantiation>,
}

/// A concrete instantiation of an open call site.
#[derive(Debug, Clone)]
pub struct ScannedInstantiation {
    pub contract: Arc<ContractDescriptor>,
    pub method: MethodDescriptor,
    /// Contract type arguments followed by method type arguments.
    pub type_arguments: Vec<EcoString>,
}

/// Why a candidate was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnexpectedShape,
    Unresolved,
    NotAContract,
    UnsupportedArity,
    NotAFactory,
    UnsupportedGenericArity,
    ParameterMismatch,
}

pub struct Scanner<'a> {
    contract_namespace: &'a str,
    contracts: HashMap<ContractDescriptor, Arc<ContractDescriptor>>,
}

impl<'a> Scanner<'a> {
    pub fn new(contract_namespace: &'a str) -> Self {
        Self {
            contract_namespace,
            contracts: HashMap::new(),
        }
    }

    /// Scan every candidate call of a compilation, in host order.
    pub fn scan<'c>(
        &mut self,
        compilation: &'c Compilation,
        diagnostics: &mut Diagnostics,
        token: &CancellationToken,
    ) -> Result<Vec<ScannedCall<'c>>, Error> {
        let mut scanned = Vec::with_capacity(compilation.calls.len());
        for call in &compilation.calls {
            token.check()?;
            match self.scan_call(call) {
                Ok(site) => {
                    if site.is_open && site.instantiations.is_empty() {
                        diagnostics.report(
                            DiagnosticKind::UninstantiatedOpenCallSite {
                                member: site.method.name().to_string(),
                            },
                            &call.location,
                        );
                    }
                    tracing::trace!(
                        location = %call.location,
                        method = %site.method.name(),
                        is_open = site.is_open,
                        "Matched factory call"
                    );
                    scanned.push(site);
                }
                Err(reason) => {
                    tracing::trace!(location = %call.location, ?reason, "Skipped candidate call");
                }
            }
        }
        tracing::debug!(
            candidates = compilation.calls.len(),
            matched = scanned.len(),
            contracts = self.contracts.len(),
            "Scanned call sites"
        );
        Ok(scanned)
    }

    /// Match one candidate against the surface.
    pub fn scan_call<'c>(&mut self, call: &'c CandidateCall) -> Result<ScannedCall<'c>, SkipReason> {
        if call.shape != CallShape::MemberAccessInvocation {
            return Err(SkipReason::UnexpectedShape);
        }
        let member = call.member.as_ref().ok_or(SkipReason::Unresolved)?;

        let owner = &member.containing_type;
        if owner.namespace() != self.contract_namespace {
            return Err(SkipReason::NotAContract);
        }
        let category =
            ContractCategory::from_interface_name(owner.simple_name()).ok_or(SkipReason::NotAContract)?;
        let contract = self
            .intern(category, &owner.type_arguments)
            .ok_or(SkipReason::UnsupportedArity)?;

        let kind = surface::factory_kind(&member.name, category).ok_or(SkipReason::NotAFactory)?;
        // Every contract declares its generic overloads, the function-pointer
        // one included, with the single `TMarshaller` parameter.
        let generic_arity = member.type_arguments.len();
        if !surface::is_known_generic_arity(generic_arity) {
            return Err(SkipReason::UnsupportedGenericArity);
        }
        let expected = surface::factory_parameters(
            kind,
            category,
            generic_arity > 0,
            contract.invoke_parameter_count(),
        );
        if member.parameters.len() != expected.len() {
            return Err(SkipReason::ParameterMismatch);
        }

        let method = MethodDescriptor::new(
            EcoString::from(member.name.as_str()),
            kind,
            contract.clone(),
            display_all(&member.type_arguments),
            member.parameters.iter().map(|p| EcoString::from(p.as_str())),
        );

        let is_open = !owner.type_arguments.iter().all(TypeRef::is_closed)
            || !member.type_arguments.iter().all(TypeRef::is_closed);

        let instantiations = if is_open {
            self.instantiations(call, category, &method)
        } else {
            Vec::new()
        };

        Ok(ScannedCall {
            call,
            contract,
            method,
            is_open,
            instantiations,
        })
    }

    /// Concrete instantiations of an open site, first occurrence wins.
    fn instantiations(
        &mut self,
        call: &CandidateCall,
        category: ContractCategory,
        method: &MethodDescriptor,
    ) -> Vec<ScannedInstantiation> {
        let arity = method.contract().arity();
        let generic_arity = usize::from(method.generic_arity());
        let mut seen: HashSet<Vec<EcoString>> = HashSet::new();
        let mut out = Vec::new();
        for instantiation in &call.instantiations {
            let contract_args = &instantiation.contract_type_arguments;
            let method_args = &instantiation.method_type_arguments;
            if contract_args.len() != arity
                || method_args.len() != generic_arity
                || !contract_args.iter().chain(method_args).all(TypeRef::is_closed)
            {
                tracing::trace!(location = %call.location, "Ignored non-concrete instantiation");
                continue;
            }
            let Some(contract) = self.intern(category, contract_args) else {
                continue;
            };
            let mut type_arguments = display_all(contract_args);
            type_arguments.extend(display_all(method_args));
            if !seen.insert(type_arguments.clone()) {
                continue;
            }
            out.push(ScannedInstantiation {
                method: method.instantiate(contract.clone(), display_all(method_args)),
                contract,
                type_arguments,
            });
        }
        out
    }

    fn intern(
        &mut self,
        category: ContractCategory,
        type_arguments: &[TypeRef],
    ) -> Option<Arc<ContractDescriptor>> {
        let descriptor = ContractDescriptor::new(category, display_all(type_arguments))?;
        let shared = self
            .contracts
            .entry(descriptor)
            .or_insert_with_key(|key| Arc::new(key.clone()));
        Some(shared.clone())
    }
}

fn display_all(types: &[TypeRef]) -> Vec<EcoString> {
    types
        .iter()
        .map(|ty| EcoString::from(ty.to_string().as_str()))
        .collect()
}

#[cfg(test)]
mod scanner_test;
