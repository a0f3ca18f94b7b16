use core::fmt;

use ecow::EcoString;

use crate::hash::StableHash;
use crate::{String, Vec};

/// Native calling conventions a wrapper can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, StableHash)]
pub enum CallConvention {
    Cdecl,
    StdCall,
    ThisCall,
    /// The platform default.
    Winapi,
}

impl CallConvention {
    /// Variant order used when branching on a runtime convention.
    pub const ALL: [CallConvention; 4] = [
        CallConvention::Cdecl,
        CallConvention::StdCall,
        CallConvention::ThisCall,
        CallConvention::Winapi,
    ];

    /// Map a constant `CallingConvention` value.
    ///
    /// `FastCall` (5) and anything else is unsupported.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(CallConvention::Winapi),
            2 => Some(CallConvention::Cdecl),
            3 => Some(CallConvention::StdCall),
            4 => Some(CallConvention::ThisCall),
            _ => None,
        }
    }

    pub fn value(self) -> i64 {
        match self {
            CallConvention::Winapi => 1,
            CallConvention::Cdecl => 2,
            CallConvention::StdCall => 3,
            CallConvention::ThisCall => 4,
        }
    }

    /// Member name on the platform `CallingConvention` enum.
    pub fn member_name(self) -> &'static str {
        match self {
            CallConvention::Cdecl => "Cdecl",
            CallConvention::StdCall => "StdCall",
            CallConvention::ThisCall => "ThisCall",
            CallConvention::Winapi => "Winapi",
        }
    }

    /// Modifier type for `UnmanagedCallConv`; the platform default needs none.
    pub fn call_conv_type(self) -> Option<&'static str> {
        match self {
            CallConvention::Cdecl => Some("global::System.Runtime.CompilerServices.CallConvCdecl"),
            CallConvention::StdCall => {
                Some("global::System.Runtime.CompilerServices.CallConvStdcall")
            }
            CallConvention::ThisCall => {
                Some("global::System.Runtime.CompilerServices.CallConvThiscall")
            }
            CallConvention::Winapi => None,
        }
    }
}

/// One `MarshalAs` override, kept as the verbatim argument text of the
/// construction expression it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, StableHash)]
pub struct MarshalOverride {
    /// Positional constructor arguments, e.g. `UnmanagedType.LPStr`.
    pub arguments: Vec<EcoString>,
    /// Named initializers, e.g. `("SizeConst", "4")`.
    pub named: Vec<(EcoString, EcoString)>,
}

impl MarshalOverride {
    pub fn new(
        arguments: impl IntoIterator<Item = EcoString>,
        named: impl IntoIterator<Item = (EcoString, EcoString)>,
    ) -> Self {
        Self {
            arguments: arguments.into_iter().collect(),
            named: named.into_iter().collect(),
        }
    }

    /// Attribute text, e.g. `MarshalAs(UnmanagedType.LPArray, SizeConst = 4)`.
    pub fn render(&self) -> String {
        crate::ToString::to_string(self)
    }
}

impl fmt::Display for MarshalOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarshalAs(")?;
        let mut first = true;
        for argument in &self.arguments {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", argument)?;
        }
        for (name, value) in &self.named {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{} = {}", name, value)?;
        }
        write!(f, ")")
    }
}

/// The ABI options of one call site.
///
/// `calling_convention == None` means the convention is only known at run
/// time. `marshal_params_as`, when present, has exactly one entry per invoke
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, StableHash)]
pub struct MarshallingDescriptor {
    pub calling_convention: Option<CallConvention>,
    pub marshal_return_as: Option<MarshalOverride>,
    pub marshal_params_as: Option<Vec<Option<MarshalOverride>>>,
}

impl Default for MarshallingDescriptor {
    fn default() -> Self {
        Self {
            calling_convention: Some(CallConvention::Winapi),
            marshal_return_as: None,
            marshal_params_as: None,
        }
    }
}

impl MarshallingDescriptor {
    /// Whether construction must branch on a convention value at run time.
    pub fn is_runtime_convention(&self) -> bool {
        self.calling_convention.is_none()
    }

    /// The same overrides with a fixed convention.
    pub fn with_convention(&self, convention: CallConvention) -> Self {
        Self {
            calling_convention: Some(convention),
            ..self.clone()
        }
    }

    /// Override for the invoke parameter at `index`, if any.
    pub fn parameter_override(&self, index: usize) -> Option<&MarshalOverride> {
        self.marshal_params_as
            .as_ref()
            .and_then(|params| params.get(index))
            .and_then(Option::as_ref)
    }
}
