use crate::core::document::PolicyDocument;
use crate::core::policy::CspPolicy;
use crate::error::CspError;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Demo server settings, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// `CSP_DEMO_ADDR`
    pub addr: String,
    /// `CSP_DEMO_POLICY`: JSON policy document served at `/custom`.
    pub custom_policy: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            custom_policy: None,
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self {
            addr: env::var("CSP_DEMO_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string()),
            custom_policy: env::var_os("CSP_DEMO_POLICY").map(PathBuf::from),
        }
    }

    pub fn load_custom_policy(&self) -> Result<Option<CspPolicy>, CspError> {
        match &self.custom_policy {
            Some(path) => {
                log::info!("loading custom policy from {}", path.display());
                PolicyDocument::from_path(path)?.into_policy().map(Some)
            }
            None => Ok(None),
        }
    }
}
