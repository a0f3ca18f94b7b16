//! Procedural macros for Trampoline.
//!
//! This crate provides `#[derive(StableHash)]`, which implements the versioned
//! structural-hash combinator used to derive stable identifiers for generated
//! implementation classes.

extern crate proc_macro;

use proc_macro::TokenStream;

mod stable_hash;

/// Derive `trampoline_core::hash::StableHash` for a struct or enum.
///
/// The generated implementation feeds the type name, then every field in
/// declaration order, into the hasher. Enums additionally write the variant
/// index before the variant's fields, so `A(x)` and `B(x)` never collide.
///
/// # Example
///
/// ```ignore
/// #[derive(StableHash)]
/// struct MethodDescriptor {
///     name: EcoString,
///     generic_arity: u8,
///     #[stable_hash(skip)]
///     parameters: Vec<EcoString>,
/// }
/// ```
///
/// # Field Attributes
///
/// - `#[stable_hash(skip)]`: leave the field out of the hash. Use this for
///   fields that do not take part in structural equality either.
#[proc_macro_derive(StableHash, attributes(stable_hash))]
pub fn derive_stable_hash(item: TokenStream) -> TokenStream {
    stable_hash::derive_impl(item)
}
