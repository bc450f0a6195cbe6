//! Declarative policy documents.
//!
//! A document is the JSON form of a policy:
//!
//! ```json
//! {
//!   "directives": {
//!     "script-src": [{ "nonce": true }, "'strict-dynamic'", "https:"],
//!     "object-src": ["'none'"]
//!   },
//!   "report_only": false
//! }
//! ```
//!
//! String tokens are classified with [`Source::parse`]. The nonce placeholder
//! is the object `{"nonce": true}`, never a string.

use crate::core::policy::{CspPolicy, CspPolicyBuilder};
use crate::core::source::Source;
use crate::error::CspError;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    pub directives: DirectiveEntries,
    #[serde(default)]
    pub report_only: bool,
}

/// The `directives` object, in document order.
///
/// Repeated keys are kept rather than collapsed, so that building the policy
/// reports them as [`CspError::DuplicateDirective`].
#[derive(Debug, Clone, Default)]
pub struct DirectiveEntries(Vec<(String, Vec<TokenSpec>)>);

impl DirectiveEntries {
    /// Tokens of the first directive called `name`.
    pub fn get(&self, name: &str) -> Option<&[TokenSpec]> {
        self.0
            .iter()
            .find(|(directive, _)| directive == name)
            .map(|(_, tokens)| tokens.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TokenSpec])> {
        self.0
            .iter()
            .map(|(name, tokens)| (name.as_str(), tokens.as_slice()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for DirectiveEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = DirectiveEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of directive names to source lists")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Vec<TokenSpec>>()? {
                    entries.push(entry);
                }
                Ok(DirectiveEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TokenSpec {
    Literal(String),
    Placeholder(PlaceholderSpec),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceholderSpec {
    pub nonce: bool,
}

impl TokenSpec {
    pub fn to_source(&self) -> Result<Source, CspError> {
        match self {
            TokenSpec::Literal(token) => Source::parse(token),
            TokenSpec::Placeholder(PlaceholderSpec { nonce: true }) => Ok(Source::Nonce),
            TokenSpec::Placeholder(PlaceholderSpec { nonce: false }) => Err(
                CspError::ConfigError("placeholder object must be {\"nonce\": true}".to_string()),
            ),
        }
    }
}

impl PolicyDocument {
    pub fn from_json(json: &str) -> Result<Self, CspError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CspError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Classifies every token and builds the policy.
    pub fn into_policy(self) -> Result<CspPolicy, CspError> {
        let mut builder = CspPolicyBuilder::new().report_only(self.report_only);

        for (name, tokens) in self.directives.0 {
            let sources = tokens
                .iter()
                .map(TokenSpec::to_source)
                .collect::<Result<Vec<_>, _>>()?;
            builder = builder.directive(name, sources);
        }

        builder.build()
    }
}

impl CspPolicy {
    /// Parses and builds a policy from its JSON document form.
    pub fn from_json(json: &str) -> Result<CspPolicy, CspError> {
        PolicyDocument::from_json(json)?.into_policy()
    }
}
