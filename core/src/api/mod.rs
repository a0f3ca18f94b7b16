//! Public API of the generator.
//!
//! A [`Generator`] runs one pass over a host [`Compilation`](crate::host::Compilation):
//!
//! 1. **Scan**: keep the calls that resolve to a factory of the surface
//! 2. **Parse**: attach marshalling descriptors, reporting diagnostics
//! 3. **Group**: share implementation classes and redirects
//! 4. **Synthesize**: build and render the generated source
//!
//! [`GenerationCache`] memoizes whole passes by input fingerprint.
//!
//! # Example
//!
//! ```
//! use trampoline_core::api::{Generator, GeneratorOptions};
//! use trampoline_core::host::Compilation;
//! use trampoline_core::CancellationToken;
//!
//! let generator = Generator::new(GeneratorOptions::default());
//! let output = generator
//!     .generate(&Compilation::default(), &CancellationToken::new())
//!     .unwrap();
//! assert_eq!(output.hint_name, "NativeDelegates.g.cs");
//! assert!(output.diagnostics.is_empty());
//! ```

pub mod cache;
pub mod generator;
pub mod options;

pub use cache::{Fingerprint, GenerationCache};
pub use generator::{GeneratedOutput, GenerationStats, Generator};
pub use options::GeneratorOptions;
