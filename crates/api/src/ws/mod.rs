//! WebSocket delivery of notifications.
//!
//! Provides connection management, the heartbeat task, the authenticated
//! upgrade handler and the JSON frames exchanged with clients.

pub mod events;
mod handler;
mod heartbeat;
pub mod manager;

pub use events::{ClientEvent, ServerEvent};
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
