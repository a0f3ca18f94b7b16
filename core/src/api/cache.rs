//! Content-addressed memoization of generation passes.

use alloc::sync::Arc;
use core::fmt;

use hashbrown::HashMap;

use crate::cancel::CancellationToken;
use crate::errors::Error;
use crate::host::Compilation;

use super::{GeneratedOutput, Generator, GeneratorOptions};

const FINGERPRINT_DOMAIN: &str = "trampoline-fingerprint-v1";

/// BLAKE3 digest of the options and the compilation snapshot of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(options: &GeneratorOptions, compilation: &Compilation) -> Result<Self, Error> {
        let bytes = postcard::to_allocvec(&(options, compilation))?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(FINGERPRINT_DOMAIN.as_bytes());
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
        Ok(Self(*hasher.finalize().as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Previously generated outputs, keyed by [`Fingerprint`].
///
/// Equal inputs always produce byte-identical output, so a hit is returned
/// without running any stage.
#[derive(Debug, Default)]
pub struct GenerationCache {
    entries: HashMap<Fingerprint, Arc<GeneratedOutput>>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<GeneratedOutput>> {
        self.entries.get(fingerprint).cloned()
    }

    /// The cached output for these inputs, generating it on a miss.
    ///
    /// A cancelled pass leaves the cache unchanged.
    pub fn generate(
        &mut self,
        generator: &Generator,
        compilation: &Compilation,
        token: &CancellationToken,
    ) -> Result<Arc<GeneratedOutput>, Error> {
        let fingerprint = Fingerprint::of(generator.options(), compilation)?;
        if let Some(output) = self.entries.get(&fingerprint) {
            tracing::debug!(%fingerprint, "Generation cache hit");
            return Ok(Arc::clone(output));
        }
        let output = Arc::new(generator.generate(compilation, token)?);
        self.entries.insert(fingerprint, Arc::clone(&output));
        Ok(output)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
