//! Structured events emitted while a match is played.
//!
//! The engine never formats prose. Each event names a presentation key that
//! the front-end looks up, plus a small payload for substitutions.
use serde::{Deserialize, Serialize};

/// Stable identifier for one event within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// One-based index of the match moment the event belongs to.
    pub moment: u32,
    /// Sequence number within the moment.
    pub seq: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Kickoff,
    AttackStart,
    Outcome,
    Goal,
    Clock,
    FullTime,
    ActionCap,
}

/// Which side of the pitch an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Team,
    Opponent,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: EventId,
    pub minute: u32,
    pub kind: EventKind,
    pub side: Side,
    pub ui_key: String,
    /// `folder/file` key of an illustration, if the outcome has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl MatchEvent {
    #[must_use]
    pub fn is_goal(&self) -> bool {
        self.kind == EventKind::Goal
    }
}

/// Pending event before the session stamps it with an id and minute.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EventDraft {
    pub kind: EventKind,
    pub side: Side,
    pub ui_key: &'static str,
    pub image_key: Option<&'static str>,
    pub payload: serde_json::Value,
}

impl EventDraft {
    pub(crate) const fn new(kind: EventKind, side: Side, ui_key: &'static str) -> Self {
        Self {
            kind,
            side,
            ui_key,
            image_key: None,
            payload: serde_json::Value::Null,
        }
    }

    pub(crate) const fn image(mut self, image_key: Option<&'static str>) -> Self {
        self.image_key = image_key;
        self
    }

    pub(crate) fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_without_empty_fields() {
        let event = MatchEvent {
            id: EventId { moment: 2, seq: 1 },
            minute: 17,
            kind: EventKind::Goal,
            side: Side::Team,
            ui_key: "match.forward.goal".to_string(),
            image_key: None,
            payload: serde_json::Value::Null,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("image_key"));
        assert!(!json.contains("payload"));
        let restored: MatchEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, event);
        assert!(restored.is_goal());
    }
}
