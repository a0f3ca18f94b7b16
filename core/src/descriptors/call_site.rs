use alloc::sync::Arc;
use core::hash::{Hash, Hasher};

use ecow::EcoString;

use super::{ContractDescriptor, MarshallingDescriptor, MethodDescriptor};
use crate::Vec;
use crate::host::SourceLocation;

/// One resolved factory call.
///
/// As a call site it is identified by its location alone; implementation
/// sharing uses the coarser `(method, marshalling)` key instead.
#[derive(Debug, Clone)]
pub struct CallSiteRecord {
    pub location: SourceLocation,
    pub contract: Arc<ContractDescriptor>,
    pub method: MethodDescriptor,
    pub marshalling: MarshallingDescriptor,
    /// The contract or the method still has unbound type parameters.
    pub is_open: bool,
    /// Concrete instantiations observed for an open call site.
    pub instantiations: Vec<ClosedInstantiation>,
}

impl PartialEq for CallSiteRecord {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for CallSiteRecord {}

impl Hash for CallSiteRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

/// A concrete instantiation of an open call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedInstantiation {
    pub method: MethodDescriptor,
    pub marshalling: MarshallingDescriptor,
    /// Contract type arguments followed by method type arguments; the tuple
    /// a dispatcher compares its own type parameters against.
    pub type_arguments: Vec<EcoString>,
}
