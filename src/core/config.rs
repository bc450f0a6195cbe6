use crate::constants::DEFAULT_NONCE_LENGTH;
use crate::core::policy::CspPolicy;
use crate::error::CspError;
use crate::monitoring::stats::CspStats;
use crate::security::nonce::{NonceGenerator, NonceSource};
use actix_web::http::header::{HeaderName, HeaderValue};
use std::sync::Arc;

/// Everything the middleware needs, fixed at startup.
///
/// Cloning is cheap: the policy, nonce source and stats are shared.
#[derive(Clone)]
pub struct CspConfig {
    policy: Arc<CspPolicy>,
    nonce_source: Arc<dyn NonceSource>,
    stats: Arc<CspStats>,
}

impl CspConfig {
    /// Wraps an already built policy with the default nonce generator.
    pub fn new(policy: CspPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            nonce_source: Arc::new(NonceGenerator::default()),
            stats: Arc::new(CspStats::new()),
        }
    }

    #[inline]
    pub fn policy(&self) -> &Arc<CspPolicy> {
        &self.policy
    }

    #[inline]
    pub fn header_name(&self) -> HeaderName {
        self.policy.header_name()
    }

    #[inline]
    pub fn requires_nonce(&self) -> bool {
        self.policy.requires_nonce()
    }

    /// Draws a nonce if, and only if, the policy has a placeholder.
    pub fn generate_nonce(&self) -> Result<Option<String>, CspError> {
        if !self.policy.requires_nonce() {
            return Ok(None);
        }

        let nonce = self.nonce_source.generate()?;
        self.stats.increment_nonce_generation_count();
        Ok(Some(nonce))
    }

    #[inline]
    pub fn header_value(&self, nonce: Option<&str>) -> Result<HeaderValue, CspError> {
        self.policy.header_value(nonce)
    }

    #[inline]
    pub fn stats(&self) -> &Arc<CspStats> {
        &self.stats
    }
}

#[derive(Default)]
pub struct CspConfigBuilder {
    policy: Option<CspPolicy>,
    nonce_length: Option<usize>,
    nonce_source: Option<Arc<dyn NonceSource>>,
}

impl CspConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn policy(mut self, policy: CspPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Number of random bytes per nonce; at least 16.
    #[inline]
    pub fn with_nonce_length(mut self, length: usize) -> Self {
        self.nonce_length = Some(length);
        self
    }

    #[inline]
    pub fn with_nonce_source(mut self, source: Arc<dyn NonceSource>) -> Self {
        self.nonce_source = Some(source);
        self
    }

    pub fn build(self) -> Result<CspConfig, CspError> {
        let policy = self
            .policy
            .ok_or_else(|| CspError::ConfigError("no policy configured".to_string()))?;

        let nonce_source: Arc<dyn NonceSource> = match (self.nonce_source, self.nonce_length) {
            (Some(_), Some(_)) => {
                return Err(CspError::ConfigError(
                    "nonce length cannot be combined with a custom nonce source".to_string(),
                ))
            }
            (Some(source), None) => source,
            (None, length) => Arc::new(NonceGenerator::new(
                length.unwrap_or(DEFAULT_NONCE_LENGTH),
            )?),
        };

        Ok(CspConfig {
            policy: Arc::new(policy),
            nonce_source,
            stats: Arc::new(CspStats::new()),
        })
    }
}
