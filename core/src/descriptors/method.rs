use alloc::sync::Arc;
use core::hash::{Hash, Hasher};

use ecow::EcoString;
use smallvec::SmallVec;

use super::contract::ContractDescriptor;
use crate::hash::StableHash;
use crate::surface;

/// Which factory entry point was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StableHash)]
pub enum FactoryKind {
    /// `FromAction` / `FromFunc`: wraps a managed callable.
    FromCallable,
    /// `FromFunctionPointer`: wraps a raw native address.
    FromFunctionPointer,
}

/// A resolved factory method on a contract.
///
/// Equality and both hashes cover the member name, its generic arity and the
/// owning contract only. Parameter names and the method's own type arguments
/// (the marshaller type) are carried for rendering but never distinguish two
/// descriptors: call sites that differ only there share an implementation.
#[derive(Debug, Clone, StableHash)]
pub struct MethodDescriptor {
    name: EcoString,
    generic_arity: u8,
    contract: Arc<ContractDescriptor>,
    #[stable_hash(skip)]
    kind: FactoryKind,
    #[stable_hash(skip)]
    type_arguments: SmallVec<[EcoString; 1]>,
    #[stable_hash(skip)]
    parameters: SmallVec<[EcoString; 4]>,
}

impl MethodDescriptor {
    pub fn new(
        name: EcoString,
        kind: FactoryKind,
        contract: Arc<ContractDescriptor>,
        type_arguments: impl IntoIterator<Item = EcoString>,
        parameters: impl IntoIterator<Item = EcoString>,
    ) -> Self {
        let type_arguments: SmallVec<[EcoString; 1]> = type_arguments.into_iter().collect();
        Self {
            name,
            generic_arity: type_arguments.len() as u8,
            contract,
            kind,
            type_arguments,
            parameters: parameters.into_iter().collect(),
        }
    }

    /// The same factory on another instantiation of the contract.
    pub fn instantiate(
        &self,
        contract: Arc<ContractDescriptor>,
        type_arguments: impl IntoIterator<Item = EcoString>,
    ) -> Self {
        Self::new(
            self.name.clone(),
            self.kind,
            contract,
            type_arguments,
            self.parameters.iter().cloned(),
        )
    }

    pub fn name(&self) -> &EcoString {
        &self.name
    }

    pub fn kind(&self) -> FactoryKind {
        self.kind
    }

    pub fn is_from_function_pointer(&self) -> bool {
        self.kind == FactoryKind::FromFunctionPointer
    }

    pub fn generic_arity(&self) -> u8 {
        self.generic_arity
    }

    /// Whether this is a marshaller overload (`FromAction<TMarshaller>` etc.).
    pub fn is_marshaller_overload(&self) -> bool {
        self.generic_arity == surface::MARSHALLER_GENERIC_ARITY
    }

    pub fn contract(&self) -> &Arc<ContractDescriptor> {
        &self.contract
    }

    pub fn type_arguments(&self) -> &[EcoString] {
        &self.type_arguments
    }

    /// The marshaller type argument of a marshaller overload.
    pub fn marshaller(&self) -> Option<&EcoString> {
        if self.is_marshaller_overload() {
            self.type_arguments.first()
        } else {
            None
        }
    }

    pub fn parameters(&self) -> &[EcoString] {
        &self.parameters
    }
}

impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.generic_arity == other.generic_arity
            && self.contract == other.contract
            && self.name == other.name
    }
}

impl Eq for MethodDescriptor {}

impl Hash for MethodDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.generic_arity.hash(state);
        self.contract.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::ContractCategory;
    use crate::hash::StableId;

    fn contract(args: &[&str]) -> Arc<ContractDescriptor> {
        Arc::new(
            ContractDescriptor::new(
                ContractCategory::Action,
                args.iter().map(|a| EcoString::from(*a)),
            )
            .unwrap(),
        )
    }

    fn method(params: &[&str]) -> MethodDescriptor {
        MethodDescriptor::new(
            "FromAction".into(),
            FactoryKind::FromCallable,
            contract(&["int"]),
            [],
            params.iter().map(|p| EcoString::from(*p)),
        )
    }

    #[test]
    fn test_parameter_names_are_ignored() {
        let a = method(&["action", "marshalParamsAs", "callingConvention"]);
        let b = method(&["callback", "paramsAs", "convention"]);
        assert_eq!(a, b);
        assert_eq!(StableId::of(&a), StableId::of(&b));
    }

    #[test]
    fn test_contract_distinguishes_methods() {
        let a = method(&[]);
        let b = a.instantiate(contract(&["long"]), []);
        assert_ne!(a, b);
        assert_ne!(StableId::of(&a), StableId::of(&b));
    }

    #[test]
    fn test_marshaller_type_argument_is_ignored() {
        let base = MethodDescriptor::new(
            "FromAction".into(),
            FactoryKind::FromCallable,
            contract(&["int"]),
            [EcoString::from("global::A")],
            [EcoString::from("action")],
        );
        let other = base.instantiate(contract(&["int"]), [EcoString::from("global::B")]);
        assert!(base.is_marshaller_overload());
        assert_eq!(base.marshaller().map(|m| m.as_str()), Some("global::A"));
        assert_eq!(base, other);
    }
}
