use ecow::EcoString;

use crate::cancel::CancellationToken;
use crate::descriptors::{CallConvention, ContractDescriptor, MarshalOverride, MarshallingDescriptor};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::errors::Error;
use crate::host::{BoundArgument, CollectionElement, Constant, MarshallerType, Operation};
use crate::surface::{CALLING_CONVENTION, MARSHAL_PARAMS_AS, MARSHAL_RETURN_AS};
use crate::Vec;

/// How many readonly/const field hops are followed before giving up.
pub const MAX_FIELD_DEPTH: usize = 8;

const MARSHAL_AS_TYPE: &str = "MarshalAsAttribute";

/// Outcome of resolving one scalar override expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scalar {
    /// A constant `null`.
    Null,
    Value(MarshalOverride),
    /// Not statically analyzable.
    Invalid,
}

/// Extracts [`MarshallingDescriptor`]s from resolved argument expressions.
///
/// Unanalyzable arguments never fail the parse: the override is treated as
/// absent and a diagnostic is appended. Cancellation is the only error.
pub struct MarshallingParser<'a> {
    diagnostics: &'a mut Diagnostics,
    token: &'a CancellationToken,
}

impl<'a> MarshallingParser<'a> {
    pub fn new(diagnostics: &'a mut Diagnostics, token: &'a CancellationToken) -> Self {
        Self { diagnostics, token }
    }

    /// Marshalling options passed as arguments of a non-generic factory call.
    pub fn parse_arguments(
        &mut self,
        arguments: &[BoundArgument],
        contract: &ContractDescriptor,
    ) -> Result<MarshallingDescriptor, Error> {
        self.parse_with(
            |name| arguments.iter().find(|a| a.parameter == name),
            contract,
        )
    }

    /// Marshalling options declared statically on a marshaller type.
    pub fn parse_marshaller(
        &mut self,
        marshaller: &MarshallerType,
        contract: &ContractDescriptor,
    ) -> Result<MarshallingDescriptor, Error> {
        self.parse_with(|name| marshaller.member(name), contract)
    }

    fn parse_with<'b>(
        &mut self,
        find: impl Fn(&str) -> Option<&'b BoundArgument>,
        contract: &ContractDescriptor,
    ) -> Result<MarshallingDescriptor, Error> {
        self.token.check()?;

        let calling_convention = self.calling_convention(find(CALLING_CONVENTION));

        let marshal_return_as = if contract.category().has_return() {
            find(MARSHAL_RETURN_AS).and_then(|argument| self.marshal_override(argument))
        } else {
            None
        };

        let count = contract.invoke_parameter_count();
        let marshal_params_as = match find(MARSHAL_PARAMS_AS) {
            Some(argument) if count > 0 => self.marshal_overrides(argument, count)?,
            _ => None,
        };

        Ok(MarshallingDescriptor {
            calling_convention,
            marshal_return_as,
            marshal_params_as,
        })
    }

    /// Resolve a calling-convention argument.
    ///
    /// Absent means the platform default; a non-constant value means the
    /// convention is chosen at run time (`None`).
    pub fn calling_convention(&mut self, argument: Option<&BoundArgument>) -> Option<CallConvention> {
        let Some(argument) = argument else {
            return Some(CallConvention::Winapi);
        };
        match convention_value(&argument.value, 0) {
            Some(value) => match CallConvention::from_value(value) {
                Some(convention) => Some(convention),
                None => {
                    self.diagnostics.report(
                        DiagnosticKind::UnsupportedCallingConvention {
                            argument: argument.parameter.clone(),
                            value,
                        },
                        &argument.location,
                    );
                    None
                }
            },
            None => None,
        }
    }

    /// Resolve a single `MarshalAsAttribute?` argument.
    pub fn marshal_override(&mut self, argument: &BoundArgument) -> Option<MarshalOverride> {
        match scalar(&argument.value, 0) {
            Scalar::Null => None,
            Scalar::Value(value) => Some(value),
            Scalar::Invalid => {
                self.invalid(argument, "");
                None
            }
        }
    }

    /// Resolve a `MarshalAsAttribute?[]?` argument for `length` parameters.
    ///
    /// The result never has more than `length` entries; a shorter array is
    /// padded with absent entries and an all-absent result collapses to `None`.
    pub fn marshal_overrides(
        &mut self,
        argument: &BoundArgument,
        length: usize,
    ) -> Result<Option<Vec<Option<MarshalOverride>>>, Error> {
        if length == 0 {
            return Ok(None);
        }
        let entries = self.array(argument, &argument.value, length, 0)?;
        Ok(entries.and_then(|mut entries| {
            entries.resize(length, None);
            if entries.iter().all(Option::is_none) {
                None
            } else {
                Some(entries)
            }
        }))
    }

    fn array(
        &mut self,
        argument: &BoundArgument,
        value: &Operation,
        length: usize,
        depth: usize,
    ) -> Result<Option<Vec<Option<MarshalOverride>>>, Error> {
        if value.is_null_constant() {
            return Ok(None);
        }
        match value.unwrap_conversions() {
            Operation::ArrayCreation {
                initializer: Some(items),
                ..
            } => {
                let mut entries = Vec::with_capacity(length.min(items.len()));
                for item in items.iter().take(length) {
                    self.token.check()?;
                    entries.push(self.element(argument, scalar(item, depth)));
                }
                Ok(Some(entries))
            }
            Operation::Collection { elements } => {
                for element in elements {
                    if let CollectionElement::Spread(_) = element {
                        self.diagnostics.report(
                            DiagnosticKind::UnsupportedSpreadElement {
                                argument: argument.parameter.clone(),
                            },
                            &argument.location,
                        );
                    }
                }
                let mut entries = Vec::with_capacity(length.min(elements.len()));
                let items = elements.iter().filter_map(|element| match element {
                    CollectionElement::Item(item) => Some(item),
                    CollectionElement::Spread(_) => None,
                });
                for item in items.take(length) {
                    self.token.check()?;
                    let resolved = match item.unwrap_conversions() {
                        Operation::Literal(_) | Operation::ObjectCreation { .. } => {
                            scalar(item, depth)
                        }
                        _ => Scalar::Invalid,
                    };
                    entries.push(self.element(argument, resolved));
                }
                Ok(Some(entries))
            }
            Operation::FieldReference(field) if field.is_readonly || field.is_const => {
                match &field.initializer {
                    Some(initializer) if depth < MAX_FIELD_DEPTH => {
                        self.array(argument, initializer, length, depth + 1)
                    }
                    _ => {
                        self.invalid(argument, "");
                        Ok(None)
                    }
                }
            }
            _ => {
                self.invalid(argument, "");
                Ok(None)
            }
        }
    }

    fn element(&mut self, argument: &BoundArgument, resolved: Scalar) -> Option<MarshalOverride> {
        match resolved {
            Scalar::Null => None,
            Scalar::Value(value) => Some(value),
            Scalar::Invalid => {
                self.invalid(argument, "[]");
                None
            }
        }
    }

    fn invalid(&mut self, argument: &BoundArgument, suffix: &'static str) {
        self.diagnostics.report(
            DiagnosticKind::InvalidMarshallingArgument {
                argument: argument.parameter.clone(),
                suffix,
            },
            &argument.location,
        );
    }
}

/// The scalar rule: `null`, an inline `new MarshalAsAttribute(...)`, or a
/// readonly/const field whose initializer satisfies the same rule.
fn scalar(value: &Operation, depth: usize) -> Scalar {
    if value.is_null_constant() {
        return Scalar::Null;
    }
    match value.unwrap_conversions() {
        Operation::ObjectCreation {
            type_name,
            arguments,
            initializers,
        } if is_marshal_as_type(type_name) => Scalar::Value(MarshalOverride::new(
            arguments.iter().map(|a| EcoString::from(a.trim())),
            initializers
                .iter()
                .map(|i| (EcoString::from(i.member.trim()), EcoString::from(i.value.trim()))),
        )),
        Operation::FieldReference(field) if field.is_readonly || field.is_const => {
            match &field.initializer {
                Some(initializer) if depth < MAX_FIELD_DEPTH => scalar(initializer, depth + 1),
                _ => Scalar::Invalid,
            }
        }
        _ => Scalar::Invalid,
    }
}

fn convention_value(value: &Operation, depth: usize) -> Option<i64> {
    if let Some(Constant::Int(value)) = value.constant() {
        return Some(value);
    }
    match value.unwrap_conversions() {
        Operation::FieldReference(field) if field.is_readonly && depth < MAX_FIELD_DEPTH => field
            .initializer
            .as_ref()
            .and_then(|initializer| convention_value(initializer, depth + 1)),
        _ => None,
    }
}

fn is_marshal_as_type(type_name: &str) -> bool {
    let name = type_name.trim_end_matches('?');
    name.rsplit('.').next() == Some(MARSHAL_AS_TYPE)
        || name.trim_start_matches("global::") == MARSHAL_AS_TYPE
}
