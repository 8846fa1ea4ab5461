//! Command execution pipeline for event-sourced aggregates.
//!
//! ```text
//! Command
//!   -> load stream
//!   -> rehydrate aggregate (apply history)
//!   -> handle command (pure, produces events)
//!   -> append (optimistic concurrency on the loaded version)
//! ```
//!
//! The dispatcher contains no IO itself; it composes an `EventStore`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use pledge_core::{Aggregate, AggregateId, DomainError, ExpectedVersion};

use crate::event_store::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The aggregate rejected the command.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The stream moved between load and append.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// A stored payload no longer matches the aggregate's event type.
    #[error("failed to deserialize stored event: {0}")]
    Deserialize(String),

    #[error(transparent)]
    Store(EventStoreError),
}

impl From<EventStoreError> for DispatchError {
    fn from(value: EventStoreError) -> Self {
        match value {
            EventStoreError::Concurrency(msg) => DispatchError::Concurrency(msg),
            other => DispatchError::Store(other),
        }
    }
}

/// Reusable command execution engine.
#[derive(Debug)]
pub struct CommandDispatcher<S> {
    store: S,
}

impl<S> CommandDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: EventStore> CommandDispatcher<S> {
    /// Run `command` against the current state of the aggregate and append
    /// the resulting events. Returns the committed events.
    ///
    /// A concurrent append to the same stream surfaces as
    /// `DispatchError::Concurrency`; callers may reload and retry.
    pub fn dispatch<A>(
        &self,
        aggregate_type: &str,
        aggregate_id: AggregateId,
        command: A::Command,
        make_aggregate: impl FnOnce(AggregateId) -> A,
    ) -> Result<Vec<StoredEvent>, DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Event: pledge_events::Event + Serialize + DeserializeOwned,
    {
        let history = self.store.load_stream(aggregate_type, aggregate_id)?;
        validate_loaded_stream(aggregate_type, aggregate_id, &history)?;
        let expected = match stream_version(&history) {
            0 => ExpectedVersion::NoStream,
            v => ExpectedVersion::Exact(v),
        };

        let mut aggregate = make_aggregate(aggregate_id);
        apply_history(&mut aggregate, &history)?;

        let decided = aggregate.handle(&command)?;
        if decided.is_empty() {
            return Ok(vec![]);
        }

        let uncommitted = decided
            .iter()
            .map(|ev| UncommittedEvent::from_typed(aggregate_id, aggregate_type, Uuid::now_v7(), ev))
            .collect::<Result<Vec<_>, _>>()?;

        let committed = self.store.append(uncommitted, expected)?;
        tracing::debug!(
            aggregate_type,
            %aggregate_id,
            events = committed.len(),
            version = stream_version(&committed),
            "command dispatched"
        );

        Ok(committed)
    }

    /// Rebuild the current state of an aggregate from its stream.
    pub fn load<A>(
        &self,
        aggregate_type: &str,
        aggregate_id: AggregateId,
        make_aggregate: impl FnOnce(AggregateId) -> A,
    ) -> Result<A, DispatchError>
    where
        A: Aggregate,
        A::Event: DeserializeOwned,
    {
        let history = self.store.load_stream(aggregate_type, aggregate_id)?;
        validate_loaded_stream(aggregate_type, aggregate_id, &history)?;
        let mut aggregate = make_aggregate(aggregate_id);
        apply_history(&mut aggregate, &history)?;
        Ok(aggregate)
    }
}

fn stream_version(stream: &[StoredEvent]) -> u64 {
    stream.last().map(|e| e.sequence_number).unwrap_or(0)
}

fn validate_loaded_stream(
    aggregate_type: &str,
    aggregate_id: AggregateId,
    stream: &[StoredEvent],
) -> Result<(), DispatchError> {
    // A stream must be this aggregate's own, numbered 1..n without gaps.
    for (idx, e) in stream.iter().enumerate() {
        if e.aggregate_id != aggregate_id || e.aggregate_type != aggregate_type {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(format!(
                "loaded stream contains a foreign event at index {idx}"
            ))));
        }
        if e.sequence_number != idx as u64 + 1 {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(format!(
                "unexpected sequence_number {} at index {idx}",
                e.sequence_number
            ))));
        }
    }
    Ok(())
}

fn apply_history<A>(aggregate: &mut A, history: &[StoredEvent]) -> Result<(), DispatchError>
where
    A: Aggregate,
    A::Event: DeserializeOwned,
{
    for stored in history {
        let ev: A::Event = serde_json::from_value(stored.payload.clone())
            .map_err(|e| DispatchError::Deserialize(e.to_string()))?;
        aggregate.apply(&ev);
    }
    Ok(())
}
