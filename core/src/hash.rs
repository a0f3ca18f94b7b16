//! Versioned structural hashing.
//!
//! Generated type names must be identical across passes and processes, so
//! they cannot come from `core::hash::Hash` (whose hashers are seeded per
//! process). [`StableHash`] feeds a value's fields, in declaration order, into
//! a BLAKE3-backed [`StableHasher`]. Every variable-length value is length
//! prefixed and every derived type writes its name first, so concatenation
//! ambiguities (`["ab", "c"]` vs `["a", "bc"]`) cannot produce equal streams.
//!
//! Bump [`HASH_VERSION`] whenever the byte stream of any implementation changes.

use alloc::sync::Arc;
use core::fmt;

use ecow::EcoString;
use smallvec::{Array, SmallVec};

pub use trampoline_macros::StableHash;

use crate::{String, Vec};

/// Domain separator mixed into every stable hash.
pub const HASH_VERSION: &str = "trampoline.stable-hash.v1";

/// A 64-bit stable identifier derived from a structural hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StableId(pub u64);

impl StableId {
    /// Hash a single value with a fresh hasher.
    pub fn of<T: StableHash + ?Sized>(value: &T) -> Self {
        let mut hasher = StableHasher::new();
        value.stable_hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Order-sensitive hasher producing [`StableId`]s.
pub struct StableHasher {
    inner: blake3::Hasher,
}

impl StableHasher {
    pub fn new() -> Self {
        let mut inner = blake3::Hasher::new();
        inner.update(HASH_VERSION.as_bytes());
        Self { inner }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.inner.update(&[value]);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.inner.update(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.inner.update(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// Write a length-prefixed string.
    pub fn write_str(&mut self, value: &str) {
        self.write_u64(value.len() as u64);
        self.inner.update(value.as_bytes());
    }

    /// Write a type or variant tag.
    pub fn write_tag(&mut self, tag: &str) {
        self.write_u8(0xfe);
        self.write_str(tag);
    }

    /// Finalize into a 64-bit identifier (the first 8 digest bytes).
    pub fn finish(&self) -> StableId {
        let digest = self.inner.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.as_bytes()[..8]);
        StableId(u64::from_le_bytes(bytes))
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// A value with a process-independent structural hash.
///
/// Implementations must hash exactly the fields that take part in the type's
/// `PartialEq`, so that equal values hash equally.
pub trait StableHash {
    fn stable_hash(&self, hasher: &mut StableHasher);
}

impl StableHash for u8 {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_u8(*self);
    }
}

impl StableHash for u32 {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_u32(*self);
    }
}

impl StableHash for u64 {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_u64(*self);
    }
}

impl StableHash for usize {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_u64(*self as u64);
    }
}

impl StableHash for bool {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_bool(*self);
    }
}

impl StableHash for str {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_str(self);
    }
}

impl StableHash for String {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_str(self);
    }
}

impl StableHash for EcoString {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_str(self);
    }
}

impl<T: StableHash + ?Sized> StableHash for &T {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        (**self).stable_hash(hasher);
    }
}

impl<T: StableHash + ?Sized> StableHash for Arc<T> {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        (**self).stable_hash(hasher);
    }
}

impl<T: StableHash> StableHash for Option<T> {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        match self {
            None => hasher.write_u8(0),
            Some(value) => {
                hasher.write_u8(1);
                value.stable_hash(hasher);
            }
        }
    }
}

impl<T: StableHash> StableHash for [T] {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_u64(self.len() as u64);
        for item in self {
            item.stable_hash(hasher);
        }
    }
}

impl<T: StableHash> StableHash for Vec<T> {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        self.as_slice().stable_hash(hasher);
    }
}

impl<A: Array> StableHash for SmallVec<A>
where
    A::Item: StableHash,
{
    fn stable_hash(&self, hasher: &mut StableHasher) {
        self.as_slice().stable_hash(hasher);
    }
}

impl<A: StableHash, B: StableHash> StableHash for (A, B) {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        self.0.stable_hash(hasher);
        self.1.stable_hash(hasher);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(StableHash)]
    struct Pair {
        left: EcoString,
        right: u32,
        #[stable_hash(skip)]
        #[allow(dead_code)]
        note: String,
    }

    #[derive(StableHash)]
    enum Shape {
        Unit,
        Wrapped(u32),
        Named { value: u32 },
    }

    #[test]
    fn test_deterministic_across_hashers() {
        let a = StableId::of(&vec![String::from("a"), String::from("b")]);
        let b = StableId::of(&vec![String::from("a"), String::from("b")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_length_prefix_prevents_concatenation_collisions() {
        let a = StableId::of(&vec![String::from("ab"), String::from("c")]);
        let b = StableId::of(&vec![String::from("a"), String::from("bc")]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_option_distinguishes_none_from_empty() {
        let none: Option<Vec<u8>> = None;
        let empty: Option<Vec<u8>> = Some(Vec::new());
        assert_ne!(StableId::of(&none), StableId::of(&empty));
    }

    #[test]
    fn test_skipped_fields_do_not_affect_hash() {
        let a = Pair {
            left: "x".into(),
            right: 1,
            note: String::from("first"),
        };
        let b = Pair {
            left: "x".into(),
            right: 1,
            note: String::from("second"),
        };
        assert_eq!(StableId::of(&a), StableId::of(&b));
    }

    #[test]
    fn test_enum_variants_are_tagged() {
        assert_ne!(
            StableId::of(&Shape::Wrapped(3)),
            StableId::of(&Shape::Named { value: 3 })
        );
        assert_ne!(StableId::of(&Shape::Unit), StableId::of(&Shape::Wrapped(0)));
    }

    #[test]
    fn test_display_is_sixteen_hex_digits() {
        assert_eq!(StableId(0xab).to_string(), "00000000000000ab");
    }
}
