//! Configuration options for the generator.

use serde::{Deserialize, Serialize};

use crate::String;

/// Configuration options for a generation pass.
///
/// Options take part in the cache fingerprint: changing any of them
/// invalidates previously cached output.
///
/// # Example
///
/// ```
/// use trampoline_core::api::GeneratorOptions;
///
/// let options = GeneratorOptions {
///     generated_namespace: "MyApp.Interop".into(),
///     ..GeneratorOptions::default()
/// };
/// assert_eq!(options.contract_namespace, "NativeDelegates");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Namespace declaring `INativeAction` / `INativeFunc`.
    ///
    /// Default: `NativeDelegates`
    pub contract_namespace: String,

    /// Namespace of the generated implementation classes.
    ///
    /// Default: `NativeDelegates.Generated`
    pub generated_namespace: String,

    /// Hint name under which the host adds the generated source.
    ///
    /// Default: `NativeDelegates.g.cs`
    pub hint_name: String,

    /// Emit a file-local `InterceptsLocationAttribute` declaration.
    ///
    /// Disable when the target framework already provides the attribute.
    ///
    /// Default: true
    pub emit_intercepts_attribute: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            contract_namespace: String::from("NativeDelegates"),
            generated_namespace: String::from("NativeDelegates.Generated"),
            hint_name: String::from("NativeDelegates.g.cs"),
            emit_intercepts_attribute: true,
        }
    }
}
