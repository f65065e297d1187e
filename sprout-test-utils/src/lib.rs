//! Test utilities shared across the sprout workspace
//!
//! Provides [`FixtureDir`], a temporary directory for writing config and
//! issues files that tests then load by path.
//!
//! The clippy dead_code lint is disabled for this crate because test utilities
//! may not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::FixtureDir;
