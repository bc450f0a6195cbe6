use crate::constants::{
    NONCE_PREFIX, NONE_SOURCE, REPORT_SAMPLE_SOURCE, SELF_SOURCE, STRICT_DYNAMIC_SOURCE,
    SUFFIX_QUOTE, UNSAFE_EVAL_SOURCE, UNSAFE_HASHES_SOURCE, UNSAFE_INLINE_SOURCE,
    WASM_UNSAFE_EVAL_SOURCE,
};
use crate::error::CspError;
use crate::security::hash::HashAlgorithm;
use bytes::BytesMut;
use std::{borrow::Cow, fmt};
use url::Url;

/// One source expression of a directive.
///
/// `Nonce` carries no value: it marks the spot where the per-request nonce is
/// substituted when the header is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    None,
    Self_,
    UnsafeInline,
    UnsafeEval,
    StrictDynamic,
    ReportSample,
    WasmUnsafeEval,
    UnsafeHashes,
    Host(Cow<'static, str>),
    Scheme(Cow<'static, str>),
    /// `label` is the algorithm name as written, e.g. `sha256` or `SHA256`.
    Hash {
        algorithm: HashAlgorithm,
        label: Cow<'static, str>,
        value: Cow<'static, str>,
    },
    Nonce,
}

/// Shorthand for the per-request nonce placeholder.
pub const NONCE: Source = Source::Nonce;

impl Source {
    /// A hash source with the canonical lowercase label.
    pub fn new_hash(algorithm: HashAlgorithm, value: impl Into<Cow<'static, str>>) -> Self {
        Source::Hash {
            algorithm,
            label: Cow::Borrowed(algorithm.name()),
            value: value.into(),
        }
    }

    #[inline(always)]
    pub const fn is_none(&self) -> bool {
        matches!(self, Source::None)
    }

    #[inline(always)]
    pub const fn is_self(&self) -> bool {
        matches!(self, Source::Self_)
    }

    #[inline(always)]
    pub const fn is_unsafe_inline(&self) -> bool {
        matches!(self, Source::UnsafeInline)
    }

    #[inline(always)]
    pub const fn is_nonce_placeholder(&self) -> bool {
        matches!(self, Source::Nonce)
    }

    #[inline]
    pub const fn is_keyword(&self) -> bool {
        self.as_static_str().is_some()
    }

    #[inline]
    pub const fn as_static_str(&self) -> Option<&'static str> {
        match self {
            Source::None => Some(NONE_SOURCE),
            Source::Self_ => Some(SELF_SOURCE),
            Source::UnsafeInline => Some(UNSAFE_INLINE_SOURCE),
            Source::UnsafeEval => Some(UNSAFE_EVAL_SOURCE),
            Source::StrictDynamic => Some(STRICT_DYNAMIC_SOURCE),
            Source::ReportSample => Some(REPORT_SAMPLE_SOURCE),
            Source::WasmUnsafeEval => Some(WASM_UNSAFE_EVAL_SOURCE),
            Source::UnsafeHashes => Some(UNSAFE_HASHES_SOURCE),
            _ => None,
        }
    }

    /// Rendered length, counting the placeholder as a nonce of `nonce_len`.
    #[inline]
    pub fn estimated_size(&self, nonce_len: usize) -> usize {
        match self {
            Source::Host(host) => host.len(),
            Source::Scheme(scheme) => scheme.len() + 1,
            Source::Hash { label, value, .. } => label.len() + value.len() + 3,
            Source::Nonce => NONCE_PREFIX.len() + nonce_len + SUFFIX_QUOTE.len(),
            keyword => keyword.as_static_str().map_or(0, str::len),
        }
    }

    #[inline]
    pub fn scheme(&self) -> Option<&str> {
        match self {
            Source::Scheme(scheme) => Some(scheme.as_ref()),
            _ => None,
        }
    }

    #[inline]
    pub fn host(&self) -> Option<&str> {
        match self {
            Source::Host(host) => Some(host.as_ref()),
            _ => None,
        }
    }

    #[inline]
    pub fn hash_value(&self) -> Option<(&str, HashAlgorithm)> {
        match self {
            Source::Hash { algorithm, value, .. } => Some((value.as_ref(), *algorithm)),
            _ => None,
        }
    }

    /// Classifies a configured token string.
    ///
    /// Quoted tokens must be a known keyword or a hash. Literal
    /// `'nonce-...'` tokens are refused: a nonce only enters a policy through
    /// the [`Source::Nonce`] placeholder.
    pub fn parse(token: &str) -> Result<Source, CspError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CspError::InvalidDirectiveValue(
                "empty source expression".to_string(),
            ));
        }

        if token.starts_with('\'') {
            return Self::parse_quoted(token);
        }

        if let Some(scheme) = token.strip_suffix(':') {
            if is_scheme(scheme) {
                return Ok(Source::Scheme(Cow::Owned(scheme.to_ascii_lowercase())));
            }
        }

        let source = Source::Host(Cow::Owned(token.to_string()));
        source.validate()?;
        Ok(source)
    }

    fn parse_quoted(token: &str) -> Result<Source, CspError> {
        let inner = token
            .strip_prefix('\'')
            .and_then(|t| t.strip_suffix('\''))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CspError::InvalidDirectiveValue(format!("unbalanced quotes in '{}'", token))
            })?;

        let keyword = match inner.to_ascii_lowercase().as_str() {
            "none" => Some(Source::None),
            "self" => Some(Source::Self_),
            "unsafe-inline" => Some(Source::UnsafeInline),
            "unsafe-eval" => Some(Source::UnsafeEval),
            "strict-dynamic" => Some(Source::StrictDynamic),
            "report-sample" => Some(Source::ReportSample),
            "wasm-unsafe-eval" => Some(Source::WasmUnsafeEval),
            "unsafe-hashes" => Some(Source::UnsafeHashes),
            _ => None,
        };
        if let Some(keyword) = keyword {
            return Ok(keyword);
        }

        if let Some((prefix, value)) = inner.split_once('-') {
            if prefix.eq_ignore_ascii_case("nonce") {
                return Err(CspError::InvalidDirectiveValue(format!(
                    "literal nonce {} is not allowed, use the nonce placeholder",
                    token
                )));
            }

            if let Ok(algorithm) = HashAlgorithm::try_from(prefix.to_ascii_lowercase().as_str())
            {
                algorithm.validate_value(value)?;
                return Ok(Source::Hash {
                    algorithm,
                    label: Cow::Owned(prefix.to_string()),
                    value: Cow::Owned(value.to_string()),
                });
            }
        }

        Err(CspError::InvalidDirectiveValue(format!(
            "unrecognized keyword {}",
            token
        )))
    }

    /// Checks the token shape of values built directly through the enum.
    pub fn validate(&self) -> Result<(), CspError> {
        match self {
            Source::Host(host) => {
                if host.is_empty() {
                    return Err(CspError::InvalidDirectiveValue("empty host".to_string()));
                }
                if let Some(bad) = host
                    .chars()
                    .find(|c| c.is_whitespace() || c.is_control() || matches!(c, ';' | ',' | '\''))
                {
                    return Err(CspError::InvalidDirectiveValue(format!(
                        "host '{}' contains forbidden character {:?}",
                        host, bad
                    )));
                }
                if host.contains("://") && !host.contains('*') {
                    Url::parse(host).map_err(|e| {
                        CspError::InvalidDirectiveValue(format!("host '{}': {}", host, e))
                    })?;
                }
                Ok(())
            }
            Source::Scheme(scheme) if !is_scheme(scheme) => Err(CspError::InvalidDirectiveValue(
                format!("invalid scheme '{}'", scheme),
            )),
            Source::Hash {
                algorithm,
                label,
                value,
            } => {
                if !label.eq_ignore_ascii_case(algorithm.name()) {
                    return Err(CspError::InvalidDirectiveValue(format!(
                        "hash label '{}' does not name {}",
                        label, algorithm
                    )));
                }
                algorithm.validate_value(value)
            }
            _ => Ok(()),
        }
    }

    /// Appends the wire form of this source to `buffer`.
    ///
    /// The placeholder expands to `'nonce-<nonce>'`; rendering it without a
    /// nonce is an error.
    pub(crate) fn write_to_buffer(
        &self,
        buffer: &mut BytesMut,
        nonce: Option<&str>,
    ) -> Result<(), CspError> {
        match self {
            Source::Host(host) => buffer.extend_from_slice(host.as_bytes()),
            Source::Scheme(scheme) => {
                buffer.extend_from_slice(scheme.as_bytes());
                buffer.extend_from_slice(b":");
            }
            Source::Hash { label, value, .. } => {
                buffer.reserve(label.len() + value.len() + 3);
                buffer.extend_from_slice(SUFFIX_QUOTE.as_bytes());
                buffer.extend_from_slice(label.as_bytes());
                buffer.extend_from_slice(b"-");
                buffer.extend_from_slice(value.as_bytes());
                buffer.extend_from_slice(SUFFIX_QUOTE.as_bytes());
            }
            Source::Nonce => {
                let nonce = nonce.ok_or(CspError::MissingNonce)?;
                buffer.reserve(NONCE_PREFIX.len() + nonce.len() + SUFFIX_QUOTE.len());
                buffer.extend_from_slice(NONCE_PREFIX.as_bytes());
                buffer.extend_from_slice(nonce.as_bytes());
                buffer.extend_from_slice(SUFFIX_QUOTE.as_bytes());
            }
            keyword => {
                if let Some(s) = keyword.as_static_str() {
                    buffer.extend_from_slice(s.as_bytes());
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Host(host) => f.write_str(host),
            Source::Scheme(scheme) => write!(f, "{}:", scheme),
            Source::Hash { label, value, .. } => write!(f, "'{}-{}'", label, value),
            Source::Nonce => write!(f, "{}{{nonce}}{}", NONCE_PREFIX, SUFFIX_QUOTE),
            keyword => f.write_str(keyword.as_static_str().unwrap_or_default()),
        }
    }
}

impl std::str::FromStr for Source {
    type Err = CspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::parse(s)
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
