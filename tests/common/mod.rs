//! Shared fixtures for the integration and property tests

#![allow(dead_code)] // Each test crate uses a different subset

pub mod builders;

pub use builders::*;
