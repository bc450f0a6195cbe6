pub use crate::core::{CspConfig, CspConfigBuilder, CspPolicy, CspPolicyBuilder, Source, NONCE};
pub use crate::error::CspError;
pub use crate::middleware::{
    csp_middleware, csp_middleware_with_config, CspExtensions, CspMiddleware,
};
pub use crate::security::{HashAlgorithm, HashGenerator, NonceSource, RequestNonce};
