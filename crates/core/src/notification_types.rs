//! Notification kinds and their pre-rendered messages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The event that produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Comment,
    Mention,
    DashboardAssigned,
    DashboardCreated,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Comment => "COMMENT",
            NotificationType::Mention => "MENTION",
            NotificationType::DashboardAssigned => "DASHBOARD_ASSIGNED",
            NotificationType::DashboardCreated => "DASHBOARD_CREATED",
        }
    }

    /// Render the human-readable message stored on the notification.
    ///
    /// `sender` is the sender's display name (name, falling back to email).
    pub fn render_message(self, sender: &str, dashboard_title: &str) -> String {
        match self {
            NotificationType::Comment => format!("{sender} commented on \"{dashboard_title}\""),
            NotificationType::Mention => {
                format!("{sender} mentioned you in a comment on \"{dashboard_title}\"")
            }
            NotificationType::DashboardAssigned => {
                format!("{sender} assigned you to dashboard \"{dashboard_title}\"")
            }
            NotificationType::DashboardCreated => {
                format!("{sender} created a new dashboard: \"{dashboard_title}\"")
            }
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMMENT" => Ok(NotificationType::Comment),
            "MENTION" => Ok(NotificationType::Mention),
            "DASHBOARD_ASSIGNED" => Ok(NotificationType::DashboardAssigned),
            "DASHBOARD_CREATED" => Ok(NotificationType::DashboardCreated),
            other => Err(format!("Unknown notification type '{other}'")),
        }
    }
}

/// Pick the name shown for a sender: the display name if set, otherwise the email.
pub fn sender_display<'a>(name: Option<&'a str>, email: &'a str) -> &'a str {
    match name {
        Some(name) if !name.trim().is_empty() => name,
        _ => email,
    }
}
