//! Deduplication and grouping of call-site records.
//!
//! Implementation classes are shared by every call site with an equal
//! `(method, marshalling)` key, across closed redirects, open dispatchers and
//! the per-convention branches of runtime-convention sites. Closed sites with
//! an equal key share one redirect method; open sites converge on one
//! dispatcher per [`OpenDispatchKey`].
//!
//! Everything is stored in insertion-ordered vectors with hash-map indexes
//! on the side, so output order follows host order and never hash order.

use alloc::sync::Arc;

use ecow::EcoString;
use hashbrown::{HashMap, HashSet};

use crate::cancel::CancellationToken;
use crate::descriptors::{
    CallConvention, CallSiteRecord, ContractCategory, ContractDescriptor, MarshallingDescriptor,
    MethodDescriptor,
};
use crate::errors::Error;
use crate::hash::{StableHash, StableId};
use crate::host::SourceLocation;
use crate::{String, Vec, format, vec};

/// Key under which one implementation class is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, StableHash)]
pub struct ImplementationKey {
    pub method: MethodDescriptor,
    pub marshalling: MarshallingDescriptor,
}

impl ImplementationKey {
    pub fn contract(&self) -> &Arc<ContractDescriptor> {
        self.method.contract()
    }
}

/// One synthesized wrapper type. Its calling convention is always fixed.
#[derive(Debug, Clone)]
pub struct ImplementationClass {
    pub id: StableId,
    pub name: String,
    pub key: ImplementationKey,
}

/// How a redirect or dispatch branch constructs its wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construction {
    /// Index of the single implementation class.
    Direct(usize),
    /// One implementation per [`CallConvention::ALL`] entry, chosen at run time.
    ByConvention([usize; 4]),
}

/// Closed call sites sharing one redirect method.
#[derive(Debug, Clone)]
pub struct ClosedGroup {
    pub id: StableId,
    /// Name of the redirect method, e.g. `FromAction_0123456789abcdef`.
    pub name: String,
    pub key: ImplementationKey,
    pub construction: Construction,
    pub locations: Vec<SourceLocation>,
}

/// Coarse key of an open dispatcher: ignores concrete type arguments.
///
/// `marshalling` is `None` for marshaller overloads, whose options come from
/// the marshaller type and vary per candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, StableHash)]
pub struct OpenDispatchKey {
    pub member: EcoString,
    pub generic_arity: u8,
    pub category: ContractCategory,
    pub contract_arity: usize,
    pub marshalling: Option<MarshallingDescriptor>,
}

impl OpenDispatchKey {
    pub fn of(record: &CallSiteRecord) -> Self {
        let marshalling = if record.method.is_marshaller_overload() {
            None
        } else {
            Some(record.marshalling.clone())
        };
        Self {
            member: record.method.name().clone(),
            generic_arity: record.method.generic_arity(),
            category: record.contract.category(),
            contract_arity: record.contract.arity(),
            marshalling,
        }
    }
}

/// One concrete instantiation a dispatcher can serve.
#[derive(Debug, Clone)]
pub struct DispatchCandidate {
    /// Contract type arguments followed by method type arguments.
    pub type_arguments: Vec<EcoString>,
    pub contract: Arc<ContractDescriptor>,
    pub construction: Construction,
}

/// A runtime type-matching dispatcher shared by open call sites.
#[derive(Debug, Clone)]
pub struct OpenDispatchEntry {
    pub id: StableId,
    /// Name of the dispatcher class, e.g. `NativeDelegateDispatch_0123456789abcdef`.
    pub name: String,
    pub key: OpenDispatchKey,
    /// Method of the first contributing site; provides the signature shape.
    pub method: MethodDescriptor,
    pub locations: Vec<SourceLocation>,
    /// Pairwise distinct type-argument tuples, in first-seen order.
    pub candidates: Vec<DispatchCandidate>,
}

impl OpenDispatchEntry {
    /// Linear scan by tuple equality.
    pub fn candidate(&self, type_arguments: &[EcoString]) -> Option<&DispatchCandidate> {
        self.candidates
            .iter()
            .find(|c| c.type_arguments.as_slice() == type_arguments)
    }
}

/// Result of grouping one pass.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    pub implementations: Vec<ImplementationClass>,
    pub closed: Vec<ClosedGroup>,
    pub open: Vec<OpenDispatchEntry>,
}

impl Grouping {
    pub fn implementation(&self, index: usize) -> &ImplementationClass {
        &self.implementations[index]
    }

    /// The closed group whose redirect covers `location`.
    pub fn closed_group_of(&self, location: &SourceLocation) -> Option<&ClosedGroup> {
        self.closed.iter().find(|g| g.locations.contains(location))
    }

    /// The dispatcher whose annotations cover `location`.
    pub fn open_entry_of(&self, location: &SourceLocation) -> Option<&OpenDispatchEntry> {
        self.open.iter().find(|e| e.locations.contains(location))
    }
}

#[derive(Default)]
struct Builder {
    grouping: Grouping,
    implementations: HashMap<ImplementationKey, usize>,
    closed: HashMap<ImplementationKey, usize>,
    open: HashMap<OpenDispatchKey, usize>,
    open_tuples: Vec<HashSet<Vec<EcoString>>>,
    class_names: HashSet<String>,
    method_names: HashSet<String>,
}

/// Group call-site records into implementation classes, closed redirects and
/// open dispatchers.
///
/// A location seen twice is only grouped the first time, so every location
/// ends up in exactly one redirect annotation.
pub fn group(records: &[CallSiteRecord], token: &CancellationToken) -> Result<Grouping, Error> {
    let mut builder = Builder::default();
    let mut seen: HashSet<&SourceLocation> = HashSet::new();

    for record in records {
        token.check()?;
        if !seen.insert(&record.location) {
            tracing::trace!(location = %record.location, "Duplicate call-site location");
            continue;
        }
        if record.is_open {
            builder.add_open(record, token)?;
        } else {
            builder.add_closed(record);
        }
    }

    let grouping = builder.grouping;
    tracing::debug!(
        implementations = grouping.implementations.len(),
        closed = grouping.closed.len(),
        open = grouping.open.len(),
        "Grouped call sites"
    );
    Ok(grouping)
}

impl Builder {
    fn add_closed(&mut self, record: &CallSiteRecord) {
        let key = ImplementationKey {
            method: record.method.clone(),
            marshalling: record.marshalling.clone(),
        };
        if let Some(&index) = self.closed.get(&key) {
            self.grouping.closed[index]
                .locations
                .push(record.location.clone());
            return;
        }
        let construction = self.construction(&key);
        let id = StableId::of(&key);
        let name = unique(
            &mut self.method_names,
            format!("{}_{}", record.method.name(), id),
        );
        self.closed.insert(key.clone(), self.grouping.closed.len());
        self.grouping.closed.push(ClosedGroup {
            id,
            name,
            key,
            construction,
            locations: vec![record.location.clone()],
        });
    }

    fn add_open(&mut self, record: &CallSiteRecord, token: &CancellationToken) -> Result<(), Error> {
        let key = OpenDispatchKey::of(record);
        let index = match self.open.get(&key) {
            Some(&index) => index,
            None => {
                let id = StableId::of(&key);
                let name = unique(
                    &mut self.class_names,
                    format!("NativeDelegateDispatch_{}", id),
                );
                let index = self.grouping.open.len();
                self.open.insert(key.clone(), index);
                self.open_tuples.push(HashSet::new());
                self.grouping.open.push(OpenDispatchEntry {
                    id,
                    name,
                    key,
                    method: record.method.clone(),
                    locations: Vec::new(),
                    candidates: Vec::new(),
                });
                index
            }
        };
        self.grouping.open[index]
            .locations
            .push(record.location.clone());

        for instantiation in &record.instantiations {
            token.check()?;
            if !self.open_tuples[index].insert(instantiation.type_arguments.clone()) {
                continue;
            }
            let key = ImplementationKey {
                method: instantiation.method.clone(),
                marshalling: instantiation.marshalling.clone(),
            };
            let construction = self.construction(&key);
            self.grouping.open[index].candidates.push(DispatchCandidate {
                type_arguments: instantiation.type_arguments.clone(),
                contract: instantiation.method.contract().clone(),
                construction,
            });
        }
        Ok(())
    }

    fn construction(&mut self, key: &ImplementationKey) -> Construction {
        if !key.marshalling.is_runtime_convention() {
            return Construction::Direct(self.implementation(key.clone()));
        }
        let mut indices = [0; 4];
        for (slot, convention) in indices.iter_mut().zip(CallConvention::ALL) {
            *slot = self.implementation(ImplementationKey {
                method: key.method.clone(),
                marshalling: key.marshalling.with_convention(convention),
            });
        }
        Construction::ByConvention(indices)
    }

    fn implementation(&mut self, key: ImplementationKey) -> usize {
        if let Some(&index) = self.implementations.get(&key) {
            return index;
        }
        let id = StableId::of(&key);
        let prefix = key.contract().category().class_prefix();
        let name = unique(&mut self.class_names, format!("{}_{}", prefix, id));
        let index = self.grouping.implementations.len();
        self.implementations.insert(key.clone(), index);
        self.grouping
            .implementations
            .push(ImplementationClass { id, name, key });
        index
    }
}

/// `base`, or `base_2`, `base_3`... if a distinct key already took it.
fn unique(used: &mut HashSet<String>, base: String) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if used.insert(candidate.clone()) {
            tracing::debug!(name = %candidate, "Stable id collision");
            return candidate;
        }
        n += 1;
    }
}
