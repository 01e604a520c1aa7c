//! Deploy Module
//!
//! Release creation, release redeploys and promotions.
//!
//! ## Structure
//!
//! - `options` - Request types (`DeployOptions`, `RedeployOptions`, `PromoteOptions`)
//! - `result` - Result types (`DeployResult`, `PromoteResult`)
//! - `use_case` - The deployment pipeline (`DeployUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use omnirelease::application::deploy::{DeployOptions, DeployUseCase};
//!
//! let use_case = DeployUseCase::new(&context);
//! let result = use_case.execute(&DeployOptions::new("dev", "main", selection, "jdoe").with_target("uat"))?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::{DeployOptions, PromoteOptions, RedeployOptions};
pub use result::{DeployResult, PromoteResult};
pub use use_case::DeployUseCase;

#[cfg(test)]
mod tests;
