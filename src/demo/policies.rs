use crate::core::policy::{CspPolicy, CspPolicyBuilder};
use crate::core::source::{Source, NONCE};
use crate::demo::pages::{COUNT_HANDLER, COUNT_INLINE_SCRIPT, COUNT_JS, TWITTER_INLINE_SCRIPT};
use crate::error::CspError;
use crate::security::hash::{HashAlgorithm, HashGenerator};
use std::borrow::Cow;

const JSDELIVR: &str = "https://cdn.jsdelivr.net";
const TWITTER_PLATFORM: &str = "https://platform.twitter.com";
const TWITTER_SYNDICATION: &str = "https://cdn.syndication.twimg.com";

fn host(value: &'static str) -> Source {
    Source::Host(Cow::Borrowed(value))
}

/// `sha384-<base64>` for `/js/count.js`, as used in an `integrity` attribute.
pub fn count_script_integrity() -> String {
    format!(
        "{}-{}",
        HashAlgorithm::Sha384,
        HashGenerator::generate(HashAlgorithm::Sha384, COUNT_JS.as_bytes())
    )
}

/// Every demo policy, built once at startup.
#[derive(Debug, Clone)]
pub struct DemoPolicies {
    pub basics: CspPolicy,
    pub hashes: CspPolicy,
    pub remote_hashes: CspPolicy,
    pub inline_hashes: CspPolicy,
    pub nonces: CspPolicy,
    /// Steps 1 to 5 of the Twitter walkthrough.
    pub twitter: Vec<CspPolicy>,
    pub strict_dynamic: CspPolicy,
    pub universal: CspPolicy,
    pub custom: Option<CspPolicy>,
}

impl DemoPolicies {
    pub fn build(custom: Option<CspPolicy>) -> Result<Self, CspError> {
        Ok(Self {
            basics: basics()?,
            hashes: hashes()?,
            remote_hashes: remote_hashes()?,
            inline_hashes: inline_hashes()?,
            nonces: nonces()?,
            twitter: (1..=5).map(twitter_step).collect::<Result<_, _>>()?,
            strict_dynamic: strict_dynamic()?,
            universal: universal()?,
            custom,
        })
    }
}

pub fn basics() -> Result<CspPolicy, CspError> {
    CspPolicyBuilder::new().script_src([Source::Self_]).build()
}

pub fn hashes() -> Result<CspPolicy, CspError> {
    CspPolicyBuilder::new()
        .script_src([
            Source::Self_,
            HashGenerator::generate_source(HashAlgorithm::Sha256, COUNT_INLINE_SCRIPT.as_bytes()),
        ])
        .build()
}

pub fn remote_hashes() -> Result<CspPolicy, CspError> {
    CspPolicyBuilder::new()
        .script_src([HashGenerator::generate_source(
            HashAlgorithm::Sha384,
            COUNT_JS.as_bytes(),
        )])
        .build()
}

pub fn inline_hashes() -> Result<CspPolicy, CspError> {
    CspPolicyBuilder::new()
        .script_src_elem([Source::Self_])
        .script_src_attr([
            Source::UnsafeHashes,
            HashGenerator::generate_source(HashAlgorithm::Sha256, COUNT_HANDLER.as_bytes()),
        ])
        .build()
}

pub fn nonces() -> Result<CspPolicy, CspError> {
    CspPolicyBuilder::new().script_src([NONCE]).build()
}

/// Each step allows one more thing the embedded tweet needs.
pub fn twitter_step(step: usize) -> Result<CspPolicy, CspError> {
    let mut sources = vec![Source::Self_];
    if step >= 2 {
        sources.push(host(JSDELIVR));
    }
    if step >= 3 {
        sources.push(HashGenerator::generate_source(
            HashAlgorithm::Sha256,
            TWITTER_INLINE_SCRIPT.as_bytes(),
        ));
    }
    if step >= 4 {
        sources.push(host(TWITTER_PLATFORM));
    }
    if step >= 5 {
        sources.push(host(TWITTER_SYNDICATION));
    }

    CspPolicyBuilder::new().script_src(sources).build()
}

pub fn strict_dynamic() -> Result<CspPolicy, CspError> {
    CspPolicyBuilder::new()
        .script_src([NONCE, Source::StrictDynamic])
        .build()
}

/// Nonce plus strict-dynamic, with fallbacks for browsers that know neither.
pub fn universal() -> Result<CspPolicy, CspError> {
    CspPolicyBuilder::new()
        .script_src([
            NONCE,
            Source::StrictDynamic,
            Source::UnsafeInline,
            Source::Scheme(Cow::Borrowed("http")),
            Source::Scheme(Cow::Borrowed("https")),
            Source::UnsafeEval,
        ])
        .object_src([Source::None])
        .base_uri([Source::Self_])
        .build()
}
