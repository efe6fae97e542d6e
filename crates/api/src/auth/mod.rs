//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token validation (and generation for local tooling and tests).

pub mod jwt;
