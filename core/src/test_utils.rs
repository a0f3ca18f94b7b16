//! Test utilities: logging setup and builders for host snapshots.

use crate::descriptors::{ContractCategory, FactoryKind};
use crate::host::{
    BoundArgument, CallShape, CandidateCall, Constant, FieldSymbol, Initializer, Instantiation,
    NamedType, Operation, ResolvedMember, SourceLocation, TypeRef,
};
use crate::surface;
use crate::{Box, String, ToString, Vec, vec};

/// Initialize tracing subscriber for tests with DEBUG level
/// Call this at the start of tests where you want to see logging output
///
/// # Example
/// ```ignore
/// #[test]
/// fn test_grouping() {
///     test_utils::init_test_logging();
///     // ... your test code
/// }
/// ```
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    // Try to initialize, ignore error if already initialized
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn ty(name: &str) -> TypeRef {
    TypeRef::named(name)
}

pub fn type_param(name: &str) -> TypeRef {
    TypeRef::parameter(name)
}

pub fn null() -> Operation {
    Operation::Literal(Constant::Null)
}

pub fn convention(member: &str, value: i64) -> Operation {
    Operation::EnumMember {
        type_name: "global::System.Runtime.InteropServices.CallingConvention".to_string(),
        member: member.to_string(),
        value,
    }
}

/// `new MarshalAsAttribute(arguments) { name = value, ... }`.
pub fn marshal_as(arguments: &[&str], initializers: &[(&str, &str)]) -> Operation {
    Operation::ObjectCreation {
        type_name: "global::System.Runtime.InteropServices.MarshalAsAttribute".to_string(),
        arguments: arguments.iter().map(|a| a.to_string()).collect(),
        initializers: initializers
            .iter()
            .map(|(member, value)| Initializer {
                member: member.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

pub fn readonly_field(name: &str, initializer: Operation) -> Operation {
    Operation::FieldReference(FieldSymbol {
        name: name.to_string(),
        containing_type: "Interop".to_string(),
        is_readonly: true,
        is_const: false,
        initializer: Some(Box::new(initializer)),
    })
}

pub fn array(items: Vec<Operation>) -> Operation {
    Operation::ArrayCreation {
        element_type: "global::System.Runtime.InteropServices.MarshalAsAttribute?".to_string(),
        initializer: Some(items),
    }
}

pub fn invocation(method: &str) -> Operation {
    Operation::Invocation {
        method: method.to_string(),
    }
}

/// Builds a [`CandidateCall`] that resolves to a factory of the surface.
pub struct CallBuilder {
    category: ContractCategory,
    kind: FactoryKind,
    contract_arguments: Vec<TypeRef>,
    method_arguments: Vec<TypeRef>,
    location: SourceLocation,
    arguments: Vec<BoundArgument>,
    instantiations: Vec<Instantiation>,
    namespace: String,
}

impl CallBuilder {
    pub fn new(category: ContractCategory, kind: FactoryKind, contract_arguments: &[TypeRef]) -> Self {
        Self {
            category,
            kind,
            contract_arguments: contract_arguments.to_vec(),
            method_arguments: Vec::new(),
            location: SourceLocation::new("Program.cs", 1, 1),
            arguments: Vec::new(),
            instantiations: Vec::new(),
            namespace: "NativeDelegates".to_string(),
        }
    }

    pub fn action(contract_arguments: &[TypeRef]) -> Self {
        Self::new(ContractCategory::Action, FactoryKind::FromCallable, contract_arguments)
    }

    pub fn func(contract_arguments: &[TypeRef]) -> Self {
        Self::new(ContractCategory::Func, FactoryKind::FromCallable, contract_arguments)
    }

    pub fn from_pointer(mut self) -> Self {
        self.kind = FactoryKind::FromFunctionPointer;
        self
    }

    pub fn at(mut self, path: &str, line: u32, column: u32) -> Self {
        self.location = SourceLocation::new(path, line, column);
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn marshaller(mut self, marshaller: TypeRef) -> Self {
        self.method_arguments = vec![marshaller];
        self
    }

    pub fn argument(mut self, parameter: &str, value: Operation) -> Self {
        let column = self.location.column + 20 + self.arguments.len() as u32 * 10;
        self.arguments.push(BoundArgument {
            parameter: parameter.to_string(),
            location: SourceLocation::new(self.location.path.clone(), self.location.line, column),
            value,
        });
        self
    }

    pub fn instantiation(mut self, contract: &[TypeRef], method: &[TypeRef]) -> Self {
        self.instantiations.push(Instantiation {
            contract_type_arguments: contract.to_vec(),
            method_type_arguments: method.to_vec(),
        });
        self
    }

    pub fn build(self) -> CandidateCall {
        let invoke_parameter_count =
            self.contract_arguments.len() - usize::from(self.category.has_return());
        let parameters = surface::factory_parameters(
            self.kind,
            self.category,
            !self.method_arguments.is_empty(),
            invoke_parameter_count,
        )
        .into_iter()
        .map(|role| role.default_name(self.category).to_string())
        .collect();
        CandidateCall {
            location: self.location,
            shape: CallShape::MemberAccessInvocation,
            member: Some(ResolvedMember {
                name: surface::factory_name(self.kind, self.category).to_string(),
                containing_type: NamedType {
                    name: crate::format!("{}.{}", self.namespace, self.category.interface_name()),
                    type_arguments: self.contract_arguments,
                },
                type_arguments: self.method_arguments,
                parameters,
            }),
            arguments: self.arguments,
            instantiations: self.instantiations,
        }
    }
}
