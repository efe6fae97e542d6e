//! Notification fan-out, listing and read-state management.
//!
//! - [`service::NotificationService`] -- persists notifications and pushes
//!   them through a [`sink::NotificationSink`].
//! - [`sink`] -- the real-time delivery seam and its no-op default.

pub mod service;
pub mod sink;

pub use service::{NotificationPage, NotificationQuery, NotificationService, Pagination};
pub use sink::{NoopSink, NotificationSink};
