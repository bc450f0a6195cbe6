use crate::core::source::Source;
use crate::error::CspError;
use crate::security::hash::{HashAlgorithm, HashGenerator};
use crate::security::nonce::RequestNonce;
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};

/// Access to the request-scoped CSP state.
pub trait CspExtensions {
    /// The nonce drawn for this request, if its policy has one.
    fn get_nonce(&self) -> Option<String>;

    /// `nonce="<value>"`, ready to drop into an inline `<script>` or `<style>`.
    fn nonce_attribute(&self) -> Option<String> {
        self.get_nonce().map(|nonce| format!("nonce=\"{}\"", nonce))
    }

    fn generate_hash_source(&self, algorithm: HashAlgorithm, data: &[u8]) -> Source;
}

impl<T> CspExtensions for T
where
    T: HttpMessage,
{
    fn get_nonce(&self) -> Option<String> {
        self.extensions()
            .get::<RequestNonce>()
            .map(|nonce| nonce.as_str().to_owned())
    }

    fn generate_hash_source(&self, algorithm: HashAlgorithm, data: &[u8]) -> Source {
        HashGenerator::generate_source(algorithm, data)
    }
}

/// Handlers behind a nonce policy can take the nonce as a parameter.
///
/// Extraction fails with a 500 when the route is not wrapped by a nonce
/// policy, rather than rendering markup with an empty nonce.
impl FromRequest for RequestNonce {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let nonce = req.extensions().get::<RequestNonce>().cloned();
        ready(nonce.ok_or_else(|| {
            log::error!(
                "no CSP nonce for {}: route is not wrapped by a nonce policy",
                req.path()
            );
            CspError::MissingNonce.into()
        }))
    }
}
