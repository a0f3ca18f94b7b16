//! Structural descriptors of factory call sites.
//!
//! Descriptors are immutable values whose identity is defined purely by
//! their fields: `Eq`/`Hash` drive deduplication within a pass, and
//! [`StableHash`](crate::hash::StableHash) derives the names that must stay
//! identical across passes.

mod call_site;
mod contract;
mod marshalling;
mod method;

pub use call_site::{CallSiteRecord, ClosedInstantiation};
pub use contract::{ContractCategory, ContractDescriptor};
pub(crate) use contract::{qualified, with_type_arguments};
pub use marshalling::{CallConvention, MarshalOverride, MarshallingDescriptor};
pub use method::{FactoryKind, MethodDescriptor};
