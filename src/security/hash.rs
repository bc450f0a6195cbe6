use crate::core::source::Source;
use crate::error::CspError;
use base64::{
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE},
    Engine,
};
use ring::constant_time::verify_slices_are_equal;
use ring::digest::{self, SHA256, SHA384, SHA512};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    #[inline(always)]
    pub fn digest_algorithm(&self) -> &'static digest::Algorithm {
        match self {
            HashAlgorithm::Sha256 => &SHA256,
            HashAlgorithm::Sha384 => &SHA384,
            HashAlgorithm::Sha512 => &SHA512,
        }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Raw digest size in bytes.
    #[inline(always)]
    pub const fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Checks that `value` is base64 or base64url of a digest of this
    /// algorithm. The two alphabets cannot be mixed within one value.
    pub fn validate_value(&self, value: &str) -> Result<(), CspError> {
        let decoded = if value.contains(['-', '_']) {
            URL_SAFE.decode(value)
        } else {
            BASE64.decode(value)
        };
        let decoded = decoded.map_err(|e| {
            CspError::InvalidDirectiveValue(format!(
                "{} hash '{}' is not valid base64: {}",
                self, value, e
            ))
        })?;

        if decoded.len() != self.digest_len() {
            return Err(CspError::InvalidDirectiveValue(format!(
                "{} hash '{}' decodes to {} bytes, expected {}",
                self,
                value,
                decoded.len(),
                self.digest_len()
            )));
        }

        Ok(())
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&str> for HashAlgorithm {
    type Error = CspError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(CspError::InvalidHashAlgorithm(s.to_string())),
        }
    }
}

/// Computes integrity hashes for content the application itself serves.
#[derive(Debug)]
pub struct HashGenerator;

impl HashGenerator {
    #[inline]
    pub fn generate(algorithm: HashAlgorithm, data: &[u8]) -> String {
        let digest = digest::digest(algorithm.digest_algorithm(), data);
        BASE64.encode(digest.as_ref())
    }

    #[inline]
    pub fn generate_source(algorithm: HashAlgorithm, data: &[u8]) -> Source {
        let hash = Self::generate(algorithm, data);
        Source::new_hash(algorithm, hash)
    }

    pub fn verify_hash(algorithm: HashAlgorithm, data: &[u8], hash: &str) -> bool {
        let calculated = Self::generate(algorithm, data);
        verify_slices_are_equal(calculated.as_bytes(), hash.as_bytes()).is_ok()
    }
}
