//! # Event Log
//!
//! Append-only history of what happened in a session.
//!
//! ```text
//!  #1  150 inserted
//!  #2  cola selected
//!  #3  change of 0 returned
//! ```
//!
//! Records are never edited, removed, or reordered. The log is purely
//! observational: no machine rule reads it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

/// What an event records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    MoneyInserted { amount: Money },
    ItemSelected { name: String, price: Money },
    ChangeReturned { amount: Money },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::MoneyInserted { amount } => write!(f, "{amount} inserted"),
            EventKind::ItemSelected { name, .. } => write!(f, "{name} selected"),
            EventKind::ChangeReturned { amount } => write!(f, "change of {amount} returned"),
        }
    }
}

/// A single immutable log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Position in the log, starting at 1.
    pub sequence: u64,

    pub kind: EventKind,

    /// Human-readable text shown on the progress board.
    pub message: String,

    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
}

/// The ordered event sequence of one session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and returns a copy of the stored record.
    pub fn record(&mut self, kind: EventKind) -> Event {
        let event = Event {
            sequence: self.events.len() as u64 + 1,
            message: kind.to_string(),
            kind,
            recorded_at: Utc::now(),
        };
        self.events.push(event.clone());
        event
    }

    /// Every event, oldest first.
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> + '_ {
        self.events.iter().map(|e| e.message.as_str())
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let inserted = EventKind::MoneyInserted {
            amount: Money::from_units(150),
        };
        let selected = EventKind::ItemSelected {
            name: "cola".to_string(),
            price: Money::from_units(150),
        };
        let returned = EventKind::ChangeReturned {
            amount: Money::from_units(0),
        };

        assert_eq!(inserted.to_string(), "150 inserted");
        assert_eq!(selected.to_string(), "cola selected");
        assert_eq!(returned.to_string(), "change of 0 returned");
    }

    #[test]
    fn test_record_appends_in_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        let first = log.record(EventKind::MoneyInserted {
            amount: Money::from_units(100),
        });
        let second = log.record(EventKind::MoneyInserted {
            amount: Money::from_units(50),
        });

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert!(first.recorded_at <= second.recorded_at);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(&second));
        assert_eq!(
            log.messages().collect::<Vec<_>>(),
            vec!["100 inserted", "50 inserted"]
        );
    }

    #[test]
    fn test_event_serializes_tagged_kind() {
        let mut log = EventLog::new();
        let event = log.record(EventKind::ChangeReturned {
            amount: Money::from_units(40),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "change_returned");
        assert_eq!(json["kind"]["amount"], 40);
        assert_eq!(json["message"], "change of 40 returned");
        assert_eq!(json["sequence"], 1);
    }
}
