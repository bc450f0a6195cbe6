pub(crate) mod constants;
pub mod core;
pub mod demo;
pub mod error;
pub mod middleware;
pub mod monitoring;
pub mod prelude;
pub mod security;

// Re-export commonly used types for convenience
pub use crate::core::{
    CspConfig, CspConfigBuilder, CspPolicy, CspPolicyBuilder, PolicyDocument, Source, NONCE,
};
pub use error::CspError;
pub use middleware::{csp_middleware, csp_middleware_with_config, CspExtensions, CspMiddleware};
pub use monitoring::CspStats;
pub use security::{HashAlgorithm, HashGenerator, NonceGenerator, NonceSource, RequestNonce};
