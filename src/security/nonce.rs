use crate::constants::{DEFAULT_NONCE_LENGTH, MIN_NONCE_LENGTH};
use crate::error::CspError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use getrandom::getrandom;
use smallvec::{smallvec, SmallVec};
use std::{
    fmt,
    ops::Deref,
    sync::atomic::{AtomicUsize, Ordering},
};

/// A secure source of per-request nonces.
///
/// Implementations are shared by every in-flight request, so `generate` must
/// be callable concurrently and must never hand out the same value twice.
pub trait NonceSource: Send + Sync {
    /// Returns a fresh base64 nonce, or an error if no secure randomness is
    /// available. Implementations must not fall back to a weaker source.
    fn generate(&self) -> Result<String, CspError>;
}

/// Nonce generator backed by the operating system CSPRNG.
///
/// Nonces are `length` random bytes encoded as standard base64 with padding,
/// so the default 16 bytes yields a 24 character value.
#[derive(Debug)]
pub struct NonceGenerator {
    length: usize,
    generated: AtomicUsize,
}

impl NonceGenerator {
    pub fn new(length: usize) -> Result<Self, CspError> {
        if length < MIN_NONCE_LENGTH {
            return Err(CspError::InvalidNonceLength(length));
        }

        Ok(Self {
            length,
            generated: AtomicUsize::new(0),
        })
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }
}

impl Default for NonceGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_NONCE_LENGTH,
            generated: AtomicUsize::new(0),
        }
    }
}

impl NonceSource for NonceGenerator {
    fn generate(&self) -> Result<String, CspError> {
        let mut buffer: SmallVec<[u8; 32]> = smallvec![0u8; self.length];

        getrandom(&mut buffer).map_err(|e| {
            log::error!("secure random source unavailable: {}", e);
            CspError::CryptoError(format!("failed to generate nonce bytes: {}", e))
        })?;

        self.generated.fetch_add(1, Ordering::Relaxed);
        Ok(BASE64.encode(&buffer))
    }
}

/// The nonce generated for one request, without the `'nonce-` wrapper.
///
/// Stored in the request extensions by the middleware and dropped with the
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestNonce(String);

impl RequestNonce {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for RequestNonce {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for RequestNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
