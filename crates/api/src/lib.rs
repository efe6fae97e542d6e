//! Dashshare API server library.
//!
//! Exposes config, state, services, error handling, routes and the
//! WebSocket layer so integration tests and the binary share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
pub mod ws;
