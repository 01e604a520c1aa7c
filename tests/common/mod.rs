#![allow(dead_code)]

//! Common test utilities for integration tests.
//!
//! - `BareRepo`: a local bare release repository plus a seeding clone
//! - `TestEnv`: isolated state, home and config for running the binary

pub mod env;
pub mod repo;

#[allow(unused_imports)]
pub use env::*;
#[allow(unused_imports)]
pub use repo::*;
