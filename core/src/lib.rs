#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

//! Compile-time synthesis of native callable wrappers.
//!
//! The pipeline scans resolved call sites of the `INativeAction` /
//! `INativeFunc` factory surface, extracts structural descriptors for each
//! one, deduplicates call sites that need the same generated implementation
//! and renders both the implementation classes and the call-site redirects.
//!
//! ```ignore
//! use trampoline_core::{CancellationToken, Generator, GeneratorOptions};
//!
//! let generator = Generator::new(GeneratorOptions::default());
//! let output = generator.generate(&compilation, &CancellationToken::new())?;
//! host.add_source(&output.hint_name, &output.source);
//! ```

extern crate alloc;

// Lets `#[derive(StableHash)]` refer to `::trampoline_core` from inside this crate.
extern crate self as trampoline_core;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, format, string::String, string::ToString, vec, vec::Vec};

pub mod api;
pub mod cancel;
pub mod descriptors;
pub mod diagnostics;
pub mod emit;
pub mod errors;
pub mod grouping;
pub mod hash;
pub mod host;
pub mod marshalling;
pub mod scanner;
pub mod surface;
pub mod synth;

pub use api::{GeneratedOutput, Generator, GeneratorOptions};
pub use cancel::CancellationToken;
pub use errors::Error;

#[cfg(test)]
pub mod test_utils;
