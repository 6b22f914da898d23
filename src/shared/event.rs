/**
 * Real-time Event System
 *
 * This module defines the change notifications pushed to connected clients.
 * Events describe what changed (a snippet, a folder, a group's activity feed,
 * an invitation) and carry a JSON payload with the affected record.
 */
use serde::{Deserialize, Serialize};

/// Type of real-time event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A snippet was created, updated, archived, restored or removed
    Snippet,
    /// A folder was created, renamed or removed
    Folder,
    /// New entry in a group's activity feed
    Group,
    /// An invitation addressed to the subscriber
    Invitation,
    /// Free-form user notification
    Notification,
    /// Custom event type
    Custom(String),
}

impl EventType {
    /// Name used as the SSE `event:` field
    pub fn name(&self) -> &str {
        match self {
            EventType::Snippet => "snippet",
            EventType::Folder => "folder",
            EventType::Group => "group",
            EventType::Invitation => "invitation",
            EventType::Notification => "notification",
            EventType::Custom(name) => name.as_str(),
        }
    }

    /// Parse a name from a `types=` filter; unknown non-empty names are custom
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "snippet" => Some(EventType::Snippet),
            "folder" => Some(EventType::Folder),
            "group" => Some(EventType::Group),
            "invitation" => Some(EventType::Invitation),
            "notification" => Some(EventType::Notification),
            "" => None,
            custom => Some(EventType::Custom(custom.to_string())),
        }
    }
}

/// What happened to the record an event refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Archived,
    Restored,
    Deleted,
}

/// Real-time event delivered to subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeEvent {
    /// Type of event
    pub event_type: EventType,
    /// Change kind, for record events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ChangeAction>,
    /// Event payload (JSON-serializable data)
    pub payload: serde_json::Value,
    /// Timestamp when event occurred (RFC3339)
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            action: None,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a record-change event
    pub fn change(event_type: EventType, action: ChangeAction, payload: serde_json::Value) -> Self {
        Self::new(event_type, payload).with_action(action)
    }

    /// Create a notification event
    pub fn notification(title: String, message: String) -> Self {
        Self::new(
            EventType::Notification,
            serde_json::json!({
                "title": title,
                "message": message,
            }),
        )
    }

    /// Set the change action
    pub fn with_action(mut self, action: ChangeAction) -> Self {
        self.action = Some(action);
        self
    }
}
