//! External tool adapters
//!
//! - `bundle` - reads exported component bundles
//! - `vlocity` - OmniStudio DataPacks via the Vlocity Build Tool
//! - `salesforce` - authentication and platform metadata via `sf`
//! - `toolchain` - the exporter/deployer/authenticator built from both

mod bundle;
mod salesforce;
mod toolchain;
mod vlocity;

pub use bundle::BundleSource;
pub use salesforce::SfCli;
pub use toolchain::SalesforceToolchain;
pub use vlocity::VlocityCli;
