//! The fixed factory surface the generator intercepts.
//!
//! Two contract families, `INativeAction` and `INativeFunc`, exist for every
//! invoke-parameter count from 0 to [`MAX_INVOKE_PARAMETERS`]. Each exposes
//! `FromAction`/`FromFunc` and `FromFunctionPointer`, both with a non-generic
//! overload and an overload generic over a marshaller type.
//!
//! The per-arity name tables below are plain immutable data.

use crate::Vec;
use crate::descriptors::{ContractCategory, FactoryKind};

/// Largest invoke-parameter count of the contract family.
pub const MAX_INVOKE_PARAMETERS: usize = 16;

pub const ACTION_INTERFACE: &str = "INativeAction";
pub const FUNC_INTERFACE: &str = "INativeFunc";
pub const MARSHALLER_INTERFACE: &str = "IMarshaller";

pub const FROM_ACTION: &str = "FromAction";
pub const FROM_FUNC: &str = "FromFunc";
pub const FROM_FUNCTION_POINTER: &str = "FromFunctionPointer";

pub const ACTION_PARAMETER: &str = "action";
pub const FUNC_PARAMETER: &str = "func";
pub const FUNCTION_POINTER_PARAMETER: &str = "functionPtr";
pub const MARSHAL_RETURN_AS: &str = "marshalReturnAs";
pub const MARSHAL_PARAMS_AS: &str = "marshalParamsAs";
pub const CALLING_CONVENTION: &str = "callingConvention";

/// Type parameter of the generic factory overloads.
pub const MARSHALLER_TYPE_PARAMETER: &str = "TMarshaller";
/// Generic arity of the marshaller overloads.
pub const MARSHALLER_GENERIC_ARITY: u8 = 1;

pub const RESULT_TYPE_PARAMETER: &str = "TResult";

pub const TYPE_PARAMETERS: [&str; MAX_INVOKE_PARAMETERS] = [
    "T1", "T2", "T3", "T4", "T5", "T6", "T7", "T8", "T9", "T10", "T11", "T12", "T13", "T14",
    "T15", "T16",
];

pub const INVOKE_PARAMETERS: [&str; MAX_INVOKE_PARAMETERS] = [
    "t1", "t2", "t3", "t4", "t5", "t6", "t7", "t8", "t9", "t10", "t11", "t12", "t13", "t14",
    "t15", "t16",
];

// Fully qualified platform names used by generated code.
pub const ACTION_DELEGATE: &str = "global::System.Action";
pub const FUNC_DELEGATE: &str = "global::System.Func";
pub const MARSHAL_AS_ATTRIBUTE: &str = "global::System.Runtime.InteropServices.MarshalAsAttribute";
pub const CALLING_CONVENTION_TYPE: &str = "global::System.Runtime.InteropServices.CallingConvention";
pub const MARSHAL: &str = "global::System.Runtime.InteropServices.Marshal";
pub const UNMANAGED_FUNCTION_POINTER: &str =
    "global::System.Runtime.InteropServices.UnmanagedFunctionPointer";
pub const UNMANAGED_CALL_CONV: &str = "global::System.Runtime.InteropServices.UnmanagedCallConv";
pub const METHOD_IMPL: &str = "global::System.Runtime.CompilerServices.MethodImpl";
pub const AGGRESSIVE_INLINING: &str =
    "global::System.Runtime.CompilerServices.MethodImplOptions.AggressiveInlining";
pub const INTERCEPTS_LOCATION: &str = "global::System.Runtime.CompilerServices.InterceptsLocation";
pub const ARGUMENT_NULL_EXCEPTION: &str = "global::System.ArgumentNullException";
pub const NOT_SUPPORTED_EXCEPTION: &str = "global::System.NotSupportedException";
pub const NOT_IMPLEMENTED_EXCEPTION: &str = "global::System.NotImplementedException";
pub const DELEGATE: &str = "global::System.Delegate";

/// Role of one parameter of a factory overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRole {
    /// The managed callable (`action` / `func`).
    Callable,
    /// The raw native address (`functionPtr`).
    Address,
    MarshalReturnAs,
    MarshalParamsAs,
    CallingConvention,
}

impl ParameterRole {
    pub fn default_name(self, category: ContractCategory) -> &'static str {
        match self {
            ParameterRole::Callable => match category {
                ContractCategory::Action => ACTION_PARAMETER,
                ContractCategory::Func => FUNC_PARAMETER,
            },
            ParameterRole::Address => FUNCTION_POINTER_PARAMETER,
            ParameterRole::MarshalReturnAs => MARSHAL_RETURN_AS,
            ParameterRole::MarshalParamsAs => MARSHAL_PARAMS_AS,
            ParameterRole::CallingConvention => CALLING_CONVENTION,
        }
    }
}

/// Resolve a factory member name against a contract category.
///
/// `FromAction` only exists on actions and `FromFunc` only on funcs.
pub fn factory_kind(member: &str, category: ContractCategory) -> Option<FactoryKind> {
    match (member, category) {
        (FROM_ACTION, ContractCategory::Action) | (FROM_FUNC, ContractCategory::Func) => {
            Some(FactoryKind::FromCallable)
        }
        (FROM_FUNCTION_POINTER, _) => Some(FactoryKind::FromFunctionPointer),
        _ => None,
    }
}

/// Member name of a factory on a contract category.
pub fn factory_name(kind: FactoryKind, category: ContractCategory) -> &'static str {
    match (kind, category) {
        (FactoryKind::FromCallable, ContractCategory::Action) => FROM_ACTION,
        (FactoryKind::FromCallable, ContractCategory::Func) => FROM_FUNC,
        (FactoryKind::FromFunctionPointer, _) => FROM_FUNCTION_POINTER,
    }
}

/// Whether `generic_arity` names an overload that exists on the surface.
pub fn is_known_generic_arity(generic_arity: usize) -> bool {
    generic_arity == 0 || generic_arity == MARSHALLER_GENERIC_ARITY as usize
}

/// Parameter roles of one factory overload, in declaration order.
///
/// Marshaller overloads take only the callable or address; everything else
/// comes from the marshaller type. `marshalReturnAs` only exists when there
/// is a return value and `marshalParamsAs` only when there are parameters.
pub fn factory_parameters(
    kind: FactoryKind,
    category: ContractCategory,
    generic: bool,
    invoke_parameter_count: usize,
) -> Vec<ParameterRole> {
    let mut roles = Vec::with_capacity(4);
    roles.push(match kind {
        FactoryKind::FromCallable => ParameterRole::Callable,
        FactoryKind::FromFunctionPointer => ParameterRole::Address,
    });
    if generic {
        return roles;
    }
    if category.has_return() {
        roles.push(ParameterRole::MarshalReturnAs);
    }
    if invoke_parameter_count > 0 {
        roles.push(ParameterRole::MarshalParamsAs);
    }
    roles.push(ParameterRole::CallingConvention);
    roles
}

/// Contract type parameter names for one arity: `T1..Tn`, plus `TResult` for funcs.
pub fn contract_type_parameters(
    category: ContractCategory,
    invoke_parameter_count: usize,
) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = TYPE_PARAMETERS[..invoke_parameter_count].to_vec();
    if category.has_return() {
        names.push(RESULT_TYPE_PARAMETER);
    }
    names
}
