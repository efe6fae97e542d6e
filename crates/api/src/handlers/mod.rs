pub mod comments;
pub mod dashboards;
pub mod favorites;
pub mod notifications;
