//! Presentation Layer
//!
//! Wires use cases to their infrastructure dependencies. Argument parsing
//! and rendering live in the binary.
//!
//! ## Usage
//!
//! ```ignore
//! use omnirelease::presentation::factory;
//!
//! let context = factory::create_context(&config, cancel);
//! let result = factory::create_deploy_use_case(&context).execute(&options)?;
//! ```

pub mod factory;

pub use factory::{
    create_context, create_deploy_use_case, create_pending_use_case, create_rollback_use_case,
};
