//! Marshalling parser.
//!
//! Turns the resolved `callingConvention`, `marshalReturnAs` and
//! `marshalParamsAs` arguments of a call site (or the static members of a
//! marshaller type) into a [`MarshallingDescriptor`](crate::descriptors::MarshallingDescriptor).

mod marshal_as;
mod parser;


pub use marshal_as::{MarshalAsParser, ParseOverrideError, Rule};
pub use parser::{MAX_FIELD_DEPTH, MarshallingParser};

use hashbrown::HashMap;

use crate::cancel::CancellationToken;
use crate::descriptors::{
    CallSiteRecord, ClosedInstantiation, ContractDescriptor, MarshallingDescriptor,
    MethodDescriptor,
};
use crate::diagnostics::Diagnostics;
use crate::errors::Error;
use crate::host::Compilation;
use crate::scanner::ScannedCall;
use crate::{String, ToString, Vec};

/// Attach marshalling descriptors to scanned call sites.
///
/// Marshaller types are parsed once per contract shape, so diagnostics about
/// a marshaller's members are reported once no matter how many call sites
/// use it.
pub fn attach(
    scanned: Vec<ScannedCall<'_>>,
    compilation: &Compilation,
    diagnostics: &mut Diagnostics,
    token: &CancellationToken,
) -> Result<Vec<CallSiteRecord>, Error> {
    let mut parser = MarshallingParser::new(diagnostics, token);
    let mut marshallers: HashMap<(String, usize, bool), MarshallingDescriptor> = HashMap::new();
    let mut records = Vec::with_capacity(scanned.len());

    for site in scanned {
        token.check()?;
        let marshalling = if site.method.is_marshaller_overload() {
            marshaller_descriptor(&mut parser, &mut marshallers, compilation, &site.method, &site.contract)?
        } else {
            parser.parse_arguments(&site.call.arguments, &site.contract)?
        };

        let mut instantiations = Vec::with_capacity(site.instantiations.len());
        for instantiation in site.instantiations {
            token.check()?;
            let marshalling = if instantiation.method.is_marshaller_overload() {
                marshaller_descriptor(
                    &mut parser,
                    &mut marshallers,
                    compilation,
                    &instantiation.method,
                    &instantiation.contract,
                )?
            } else {
                marshalling.clone()
            };
            instantiations.push(ClosedInstantiation {
                method: instantiation.method,
                marshalling,
                type_arguments: instantiation.type_arguments,
            });
        }

        records.push(CallSiteRecord {
            location: site.call.location.clone(),
            contract: site.contract,
            method: site.method,
            marshalling,
            is_open: site.is_open,
            instantiations,
        });
    }

    tracing::debug!(
        records = records.len(),
        marshallers = marshallers.len(),
        "Attached marshalling descriptors"
    );
    Ok(records)
}

/// Marshalling declared by the marshaller type argument of a generic overload.
///
/// An unbound or unknown marshaller contributes the defaults.
fn marshaller_descriptor(
    parser: &mut MarshallingParser<'_>,
    cache: &mut HashMap<(String, usize, bool), MarshallingDescriptor>,
    compilation: &Compilation,
    method: &MethodDescriptor,
    contract: &ContractDescriptor,
) -> Result<MarshallingDescriptor, Error> {
    let Some(name) = method.marshaller() else {
        return Ok(MarshallingDescriptor::default());
    };
    let key = (
        name.to_string(),
        contract.invoke_parameter_count(),
        contract.category().has_return(),
    );
    if let Some(known) = cache.get(&key) {
        return Ok(known.clone());
    }
    let descriptor = match compilation.marshaller(name) {
        Some(marshaller) => parser.parse_marshaller(marshaller, contract)?,
        None => {
            tracing::trace!(marshaller = %name, "Marshaller type not in snapshot, using defaults");
            MarshallingDescriptor::default()
        }
    };
    cache.insert(key, descriptor.clone());
    Ok(descriptor)
}
