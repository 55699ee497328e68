//! Common test infrastructure for cnb-actions-image tests
//!
//! Provides a wiremock-backed registry and fixture tag lists taken from
//! real builder update runs.

#![allow(dead_code)]

pub mod mock_registry;

pub use mock_registry::*;
