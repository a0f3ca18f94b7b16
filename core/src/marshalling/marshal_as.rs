//! Parsing rendered `MarshalAs(...)` text back into a [`MarshalOverride`].

use core::str::FromStr;

use ecow::EcoString;
use pest::Parser;
use pest_derive::Parser;

use crate::descriptors::MarshalOverride;
use crate::{Box, Vec};

#[derive(Parser)]
#[grammar = "marshalling/marshal_as.pest"]
pub struct MarshalAsParser;

/// Error returned when text is not a well-formed `MarshalAs(...)` attribute.
pub type ParseOverrideError = Box<pest::error::Error<Rule>>;

impl FromStr for MarshalOverride {
    type Err = ParseOverrideError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut pairs = MarshalAsParser::parse(Rule::marshal_as, text).map_err(Box::new)?;
        let mut arguments = Vec::new();
        let mut named = Vec::new();
        let Some(root) = pairs.next() else {
            return Ok(MarshalOverride::default());
        };
        for pair in root.into_inner() {
            match pair.as_rule() {
                Rule::positional => {
                    arguments.push(EcoString::from(pair.as_str().trim()));
                }
                Rule::named => {
                    let mut inner = pair.into_inner();
                    let name = inner.next().map(|p| p.as_str()).unwrap_or_default();
                    let value = inner.next().map(|p| p.as_str()).unwrap_or_default();
                    named.push((EcoString::from(name), EcoString::from(value.trim())));
                }
                _ => {}
            }
        }
        Ok(MarshalOverride { arguments, named })
    }
}
