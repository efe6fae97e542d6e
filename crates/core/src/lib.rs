//! Domain rules for the dashboard-sharing platform.
//!
//! This crate has no internal dependencies so that the persistence layer,
//! the HTTP service layer and tests can all share the same role, department
//! and access-control semantics.

pub mod access;
pub mod departments;
pub mod error;
pub mod favorites;
pub mod mentions;
pub mod notification_types;
pub mod roles;
pub mod types;
pub mod validation;
