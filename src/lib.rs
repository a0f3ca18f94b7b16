//! Trampoline - compile-time synthesis of native callable wrappers
//!
//! # Overview
//!
//! Trampoline redirects calls to the `INativeAction` / `INativeFunc` factory
//! surface to generated wrapper classes. The host compiler resolves every
//! candidate call and hands over a [`Compilation`] snapshot; a generation
//! pass returns the generated source together with diagnostics about
//! marshalling arguments it could not analyze.
//!
//! # Quick Start
//!
//! ```no_run
//! use trampoline::{CancellationToken, Generator, GeneratorOptions, load_snapshot, render_diagnostics};
//!
//! let compilation = load_snapshot("snapshot.json").unwrap();
//! let generator = Generator::new(GeneratorOptions::default());
//! let output = generator.generate(&compilation, &CancellationToken::new()).unwrap();
//!
//! render_diagnostics(&output.diagnostics, &compilation);
//! std::fs::write(&output.hint_name, &output.source).unwrap();
//! ```
//!
//! # Caching
//!
//! Hosts that regenerate on every edit can keep a [`GenerationCache`]: passes
//! over an unchanged snapshot return the previous output without re-running
//! any stage.

// Re-export public API from trampoline_core
pub use trampoline_core::api::{
    Fingerprint, GeneratedOutput, GenerationCache, GenerationStats, Generator, GeneratorOptions,
};
pub use trampoline_core::diagnostics::{Diagnostic, Severity};
pub use trampoline_core::host::{self, Compilation};
pub use trampoline_core::synth::declarations::render_declarations;
pub use trampoline_core::{CancellationToken, Error};

mod report;
mod snapshot;

pub use report::{
    render_diagnostics, render_diagnostics_to, render_diagnostics_to_string,
    render_diagnostics_to_string_no_color,
};
pub use snapshot::{SnapshotError, load_snapshot, parse_snapshot};
