pub mod config;
pub mod directives;
pub mod document;
pub mod policy;
pub mod source;

pub use config::{CspConfig, CspConfigBuilder};
pub use directives::*;
pub use document::{DirectiveEntries, PolicyDocument};
pub use policy::{CspPolicy, CspPolicyBuilder};
pub use source::{Source, NONCE};
