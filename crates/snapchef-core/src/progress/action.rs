//! Inbound participant activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use uuid::Uuid;

/// What the participant did. Unrecognised wire values deserialize to
/// [`ActionKind::Unknown`] and match no challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    RecipeCreated,
    RecipeShared,
    RatingGiven,
    PhotoUploaded,
    IngredientsScanned,
    /// Produced internally when a timed session reaches its target.
    TimeCompleted,
    #[serde(other)]
    Unknown,
}

impl std::str::FromStr for ActionKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let quoted = serde_json::Value::String(s.trim().to_ascii_lowercase().replace('-', "_"));
        Ok(serde_json::from_value(quoted).unwrap_or(ActionKind::Unknown))
    }
}

/// One immutable unit of participant activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeActionEvent {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub kind: ActionKind,
    pub at: DateTime<Utc>,
    /// Free-form details, e.g. `rating`, `calories`, `ingredient_count`.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ChallengeActionEvent {
    pub fn new(kind: ActionKind, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            at,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Numeric metadata, accepting both JSON numbers and numeric strings.
    pub fn meta_f64(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key)?.as_str()
    }
}

/// Bounded most-recent-first history of submitted events.
///
/// Debugging and analytics only; nothing reads it to decide progress.
#[derive(Debug, Clone)]
pub struct EventLog {
    capacity: usize,
    events: VecDeque<ChallengeActionEvent>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn push(&mut self, event: ChallengeActionEvent) {
        if self.capacity == 0 {
            return;
        }
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Up to `limit` events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ChallengeActionEvent> {
        self.events.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_deserializes() {
        let json = r#"{"kind":"recipe_deleted","at":"2024-02-14T10:00:00Z"}"#;
        let event: ChallengeActionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, ActionKind::Unknown);
        assert!(event.metadata.is_empty());
    }

    #[test]
    fn kind_from_str() {
        assert_eq!("recipe-created".parse::<ActionKind>().unwrap(), ActionKind::RecipeCreated);
        assert_eq!("RATING_GIVEN".parse::<ActionKind>().unwrap(), ActionKind::RatingGiven);
        assert_eq!("nope".parse::<ActionKind>().unwrap(), ActionKind::Unknown);
    }

    #[test]
    fn numeric_metadata_accepts_strings() {
        let e = ChallengeActionEvent::new(ActionKind::RatingGiven, Utc::now())
            .with_meta("rating", "5")
            .with_meta("calories", 420);
        assert_eq!(e.meta_f64("rating"), Some(5.0));
        assert_eq!(e.meta_f64("calories"), Some(420.0));
        assert_eq!(e.meta_f64("missing"), None);
    }

    #[test]
    fn log_keeps_most_recent() {
        let mut log = EventLog::new(3);
        let base = Utc::now();
        for i in 0..5 {
            log.push(
                ChallengeActionEvent::new(ActionKind::PhotoUploaded, base).with_meta("n", i),
            );
        }
        assert_eq!(log.len(), 3);
        let recent = log.recent(10);
        let ns: Vec<f64> = recent.iter().filter_map(|e| e.meta_f64("n")).collect();
        assert_eq!(ns, vec![4.0, 3.0, 2.0]);
    }
}
