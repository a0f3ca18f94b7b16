//! The generation pipeline.

use crate::cancel::CancellationToken;
use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::errors::Error;
use crate::host::Compilation;
use crate::scanner::Scanner;
use crate::synth::declarations;
use crate::{String, Vec, emit, grouping, marshalling, synth};

use super::GeneratorOptions;

/// Counts describing one pass, for logging and tooling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Calls handed over by the host.
    pub candidates: usize,
    /// Calls that resolved to a supported factory.
    pub call_sites: usize,
    pub implementations: usize,
    pub closed_groups: usize,
    pub open_dispatchers: usize,
}

/// Result of one generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutput {
    /// Name under which the host adds [`source`](Self::source).
    pub hint_name: String,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: GenerationStats,
}

static_assertions::assert_impl_all!(GeneratedOutput: Send, Sync);

impl GeneratedOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }
}

/// Runs generation passes with fixed options.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Run scan, parse, group and synthesis over `compilation`.
    ///
    /// Problems in the analysed program become diagnostics next to the
    /// output. The only error is cancellation.
    pub fn generate(
        &self,
        compilation: &Compilation,
        token: &CancellationToken,
    ) -> Result<GeneratedOutput, Error> {
        match self.run(compilation, token) {
            Err(Error::Cancelled) => {
                tracing::debug!("Generation pass cancelled");
                Err(Error::Cancelled)
            }
            result => result,
        }
    }

    fn run(
        &self,
        compilation: &Compilation,
        token: &CancellationToken,
    ) -> Result<GeneratedOutput, Error> {
        let mut diagnostics = Diagnostics::new();

        let scanned = Scanner::new(&self.options.contract_namespace).scan(
            compilation,
            &mut diagnostics,
            token,
        )?;
        let call_sites = scanned.len();

        let records = marshalling::attach(scanned, compilation, &mut diagnostics, token)?;
        let grouping = grouping::group(&records, token)?;

        token.check()?;
        let unit = synth::build_unit(&grouping, &self.options);
        let source = emit::render(&unit);

        let stats = GenerationStats {
            candidates: compilation.calls.len(),
            call_sites,
            implementations: grouping.implementations.len(),
            closed_groups: grouping.closed.len(),
            open_dispatchers: grouping.open.len(),
        };
        tracing::debug!(
            candidates = stats.candidates,
            call_sites = stats.call_sites,
            implementations = stats.implementations,
            diagnostics = diagnostics.len(),
            "Generation pass complete"
        );

        Ok(GeneratedOutput {
            hint_name: self.options.hint_name.clone(),
            source,
            diagnostics: diagnostics.into_vec(),
            stats,
        })
    }

    /// The declaration surface for these options.
    pub fn declarations(&self) -> String {
        declarations::render_declarations(&self.options)
    }
}
