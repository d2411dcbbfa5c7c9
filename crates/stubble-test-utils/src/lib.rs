//! Utilities shared by stubble tests.
//!
//! Fixture builders for small class hierarchies and native method bodies, plus guards for tests
//! that touch process environment variables.

pub mod env;
pub mod fixtures;

pub use env::{env_lock, EnvVarGuard};
pub use fixtures::*;
