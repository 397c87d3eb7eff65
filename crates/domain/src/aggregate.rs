//! Core aggregate and domain event traits.

use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name used for serialization and metrics.
    fn event_type(&self) -> &'static str;

    /// Returns the human-readable name written to the history log.
    fn history_name(&self) -> &'static str;

    /// Returns the structured payload written to the history log.
    fn history_meta(&self) -> serde_json::Value;
}

/// Trait for aggregates whose mutations are expressed as events.
///
/// Command methods validate against the current state and return the
/// events describing the change; [`Aggregate::apply`] then performs the
/// change. Commands never mutate, and `apply` never fails.
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate's commands can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Applies an event to the aggregate, updating its state.
    ///
    /// Must be deterministic: the same state and event always produce the
    /// same new state.
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum TestEvent {
        Renamed { name: String },
        Bumped,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                TestEvent::Renamed { .. } => "Renamed",
                TestEvent::Bumped => "Bumped",
            }
        }

        fn history_name(&self) -> &'static str {
            match self {
                TestEvent::Renamed { .. } => "Test Renamed",
                TestEvent::Bumped => "Test Bumped",
            }
        }

        fn history_meta(&self) -> serde_json::Value {
            serde_json::to_value(self).unwrap_or_default()
        }
    }

    #[derive(Debug, Default)]
    struct Counter {
        name: String,
        count: u32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("test error")]
    struct TestError;

    impl Aggregate for Counter {
        type Event = TestEvent;
        type Error = TestError;

        fn aggregate_type() -> &'static str {
            "Counter"
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                TestEvent::Renamed { name } => self.name = name,
                TestEvent::Bumped => self.count += 1,
            }
        }
    }

    #[test]
    fn test_apply_events_in_order() {
        let mut counter = Counter::default();
        counter.apply_events(vec![
            TestEvent::Renamed {
                name: "first".to_string(),
            },
            TestEvent::Bumped,
            TestEvent::Renamed {
                name: "second".to_string(),
            },
            TestEvent::Bumped,
        ]);

        assert_eq!(counter.name, "second");
        assert_eq!(counter.count, 2);
        assert_eq!(Counter::aggregate_type(), "Counter");
    }

    #[test]
    fn test_domain_event_names() {
        assert_eq!(TestEvent::Bumped.event_type(), "Bumped");
        assert_eq!(TestEvent::Bumped.history_name(), "Test Bumped");
    }
}
