use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CspError {
    #[error("Invalid directive value: {0}")]
    InvalidDirectiveValue(String),

    #[error("Invalid directive name: {0}")]
    InvalidDirectiveName(String),

    #[error("Directive '{0}' is defined more than once")]
    DuplicateDirective(String),

    #[error("Nonce placeholder appears more than once (in '{0}')")]
    DuplicateNoncePlaceholder(String),

    #[error("Invalid hash algorithm: {0}")]
    InvalidHashAlgorithm(String),

    #[error("Nonce length of {0} bytes is below the 16 byte minimum")]
    InvalidNonceLength(usize),

    #[error("Policy requires a nonce but none was supplied")]
    MissingNonce,

    #[error("Crypto error: {0}")]
    CryptoError(String),

    #[error("Header processing error: {0}")]
    HeaderError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Policy document error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CspError {
    /// Whether the error can only come out of policy construction.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidDirectiveValue(_)
                | Self::InvalidDirectiveName(_)
                | Self::DuplicateDirective(_)
                | Self::DuplicateNoncePlaceholder(_)
                | Self::InvalidHashAlgorithm(_)
                | Self::InvalidNonceLength(_)
                | Self::ConfigError(_)
                | Self::JsonError(_)
        )
    }
}

impl ResponseError for CspError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
