//! The demo site: one route per CSP technique.

pub mod pages;
pub mod policies;
pub mod routes;
pub mod settings;

pub use policies::DemoPolicies;
pub use routes::configure;
pub use settings::ServerSettings;
