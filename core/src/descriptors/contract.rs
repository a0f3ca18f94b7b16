use core::fmt::Write;

use ecow::EcoString;
use smallvec::SmallVec;

use crate::hash::StableHash;
use crate::surface::{self, MAX_INVOKE_PARAMETERS};
use crate::{String, format};

/// The two contract families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, StableHash)]
pub enum ContractCategory {
    /// `INativeAction<...>`: no return value.
    Action,
    /// `INativeFunc<..., TResult>`: the last type argument is the return type.
    Func,
}

impl ContractCategory {
    pub fn from_interface_name(name: &str) -> Option<Self> {
        match name {
            surface::ACTION_INTERFACE => Some(ContractCategory::Action),
            surface::FUNC_INTERFACE => Some(ContractCategory::Func),
            _ => None,
        }
    }

    pub fn interface_name(self) -> &'static str {
        match self {
            ContractCategory::Action => surface::ACTION_INTERFACE,
            ContractCategory::Func => surface::FUNC_INTERFACE,
        }
    }

    /// Prefix of generated implementation class names.
    pub fn class_prefix(self) -> &'static str {
        match self {
            ContractCategory::Action => "NativeAction",
            ContractCategory::Func => "NativeFunc",
        }
    }

    /// The plain managed delegate family (`Action` / `Func`).
    pub fn delegate_name(self) -> &'static str {
        match self {
            ContractCategory::Action => surface::ACTION_DELEGATE,
            ContractCategory::Func => surface::FUNC_DELEGATE,
        }
    }

    /// Name of the "convert back to plain callable" member.
    pub fn to_delegate_method(self) -> &'static str {
        match self {
            ContractCategory::Action => "ToAction",
            ContractCategory::Func => "ToFunc",
        }
    }

    /// `global::{namespace}.INativeAction`, without type arguments.
    pub fn qualified_interface_name(self, namespace: &str) -> String {
        qualified(namespace, self.interface_name())
    }

    pub fn has_return(self) -> bool {
        matches!(self, ContractCategory::Func)
    }

    /// Type arity for a given invoke-parameter count.
    pub fn arity_for(self, invoke_parameter_count: usize) -> usize {
        invoke_parameter_count + usize::from(self.has_return())
    }
}

/// A generic contract instantiation, e.g. `INativeFunc<int, bool>`.
///
/// Built once per distinct value and shared between call sites through
/// `Arc`. The invoke-parameter count is derived in the constructor:
/// it equals the arity for actions and is one less for funcs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, StableHash)]
pub struct ContractDescriptor {
    category: ContractCategory,
    arity: usize,
    invoke_parameter_count: usize,
    type_arguments: SmallVec<[EcoString; 4]>,
}

impl ContractDescriptor {
    /// Build a descriptor, or `None` if the arity is outside the family.
    pub fn new(
        category: ContractCategory,
        type_arguments: impl IntoIterator<Item = EcoString>,
    ) -> Option<Self> {
        let type_arguments: SmallVec<[EcoString; 4]> = type_arguments.into_iter().collect();
        let arity = type_arguments.len();
        let invoke_parameter_count = match category {
            ContractCategory::Action => arity,
            ContractCategory::Func => arity.checked_sub(1)?,
        };
        if invoke_parameter_count > MAX_INVOKE_PARAMETERS {
            return None;
        }
        Some(Self {
            category,
            arity,
            invoke_parameter_count,
            type_arguments,
        })
    }

    pub fn category(&self) -> ContractCategory {
        self.category
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn invoke_parameter_count(&self) -> usize {
        self.invoke_parameter_count
    }

    pub fn type_arguments(&self) -> &[EcoString] {
        &self.type_arguments
    }

    /// Types of the invoke parameters, in order.
    pub fn parameter_types(&self) -> &[EcoString] {
        &self.type_arguments[..self.invoke_parameter_count]
    }

    pub fn return_type(&self) -> Option<&EcoString> {
        if self.category.has_return() {
            self.type_arguments.last()
        } else {
            None
        }
    }

    /// `global::{namespace}.INativeAction<...>`.
    pub fn interface_type(&self, namespace: &str) -> String {
        with_type_arguments(
            self.category.qualified_interface_name(namespace),
            &self.type_arguments,
        )
    }

    /// The managed delegate type with the same shape, e.g. `global::System.Action<int>`.
    pub fn delegate_type(&self) -> String {
        with_type_arguments(String::from(self.category.delegate_name()), &self.type_arguments)
    }
}

/// `global::{namespace}.{name}`.
pub(crate) fn qualified(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        format!("global::{}", name)
    } else {
        format!("global::{}.{}", namespace, name)
    }
}

/// Append `<a, b, ...>` unless the list is empty.
pub(crate) fn with_type_arguments<S: AsRef<str>>(mut base: String, args: &[S]) -> String {
    if args.is_empty() {
        return base;
    }
    base.push('<');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            base.push_str(", ");
        }
        let _ = write!(base, "{}", arg.as_ref());
    }
    base.push('>');
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec;

    fn args(n: usize) -> Vec<EcoString> {
        (0..n).map(|i| EcoString::from(format!("A{}", i))).collect()
    }

    #[test]
    fn test_arity_invariant_for_every_family_member() {
        for count in 0..=MAX_INVOKE_PARAMETERS {
            let action = ContractDescriptor::new(ContractCategory::Action, args(count)).unwrap();
            assert_eq!(action.arity(), count);
            assert_eq!(action.invoke_parameter_count(), action.arity());

            let func = ContractDescriptor::new(ContractCategory::Func, args(count + 1)).unwrap();
            assert_eq!(func.invoke_parameter_count(), count);
            assert_eq!(func.arity(), func.invoke_parameter_count() + 1);
        }
    }

    #[test]
    fn test_out_of_range_arities_are_rejected() {
        assert!(ContractDescriptor::new(ContractCategory::Func, args(0)).is_none());
        assert!(ContractDescriptor::new(ContractCategory::Action, args(17)).is_none());
        assert!(ContractDescriptor::new(ContractCategory::Func, args(18)).is_none());
    }

    #[test]
    fn test_rendered_types() {
        let func = ContractDescriptor::new(
            ContractCategory::Func,
            [EcoString::from("int"), EcoString::from("bool")],
        )
        .unwrap();
        assert_eq!(
            func.interface_type("NativeDelegates"),
            "global::NativeDelegates.INativeFunc<int, bool>"
        );
        assert_eq!(func.delegate_type(), "global::System.Func<int, bool>");
        assert_eq!(func.parameter_types(), &[EcoString::from("int")]);
        assert_eq!(func.return_type(), Some(&EcoString::from("bool")));

        let action = ContractDescriptor::new(ContractCategory::Action, []).unwrap();
        assert_eq!(action.delegate_type(), "global::System.Action");
        assert_eq!(action.return_type(), None);
    }
}
