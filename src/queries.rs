/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Read-only projections of rocket state.
//!
//! Reads go straight to the store; they need no ordering coordination and
//! never touch the Sequencer's locks or buffers.

use crate::store::{Aggregate, AggregateStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised on the read path.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No aggregate exists for the requested channel.
    #[error("rocket not found: {0}")]
    NotFound(String),

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Public view of a rocket. Absent fields are omitted from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RocketState {
    /// Channel identifier.
    pub channel: String,

    /// Rocket type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Current speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,

    /// Current mission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,

    /// Lifecycle status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl From<Aggregate> for RocketState {
    fn from(aggregate: Aggregate) -> Self {
        Self {
            channel: aggregate.key,
            kind: aggregate.kind,
            speed: aggregate.speed,
            mission: aggregate.mission,
            status: aggregate.status,
        }
    }
}

/// Sort order for [`RocketQueries::list_rockets`]. Always ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// By channel identifier.
    #[default]
    Channel,
    /// By speed.
    Speed,
    /// By mission.
    Mission,
    /// By status.
    Status,
}

impl SortBy {
    /// Parses a `sort_by` query value. Unknown values fall back to `Channel`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "speed" => Self::Speed,
            "mission" => Self::Mission,
            "status" => Self::Status,
            _ => Self::Channel,
        }
    }
}

/// Query facade over an [`AggregateStore`].
#[derive(Debug)]
pub struct RocketQueries<S> {
    store: Arc<S>,
}

impl<S> Clone for RocketQueries<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: AggregateStore> RocketQueries<S> {
    /// Creates a query facade sharing `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the state of one rocket.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] if the channel has no aggregate.
    pub fn get_rocket(&self, channel: &str) -> Result<RocketState, QueryError> {
        self.store
            .get(channel)?
            .map(RocketState::from)
            .ok_or_else(|| QueryError::NotFound(channel.to_string()))
    }

    /// Returns every rocket, sorted ascending by `sort`.
    ///
    /// Absent values sort first; ties are broken by channel.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Storage`] if the store fails.
    pub fn list_rockets(&self, sort: SortBy) -> Result<Vec<RocketState>, QueryError> {
        let mut rockets: Vec<RocketState> = self
            .store
            .list()?
            .into_iter()
            .map(RocketState::from)
            .collect();

        match sort {
            SortBy::Channel => rockets.sort_by(|a, b| a.channel.cmp(&b.channel)),
            SortBy::Speed => rockets.sort_by(|a, b| {
                a.speed.cmp(&b.speed).then_with(|| a.channel.cmp(&b.channel))
            }),
            SortBy::Mission => rockets.sort_by(|a, b| {
                a.mission
                    .cmp(&b.mission)
                    .then_with(|| a.channel.cmp(&b.channel))
            }),
            SortBy::Status => rockets.sort_by(|a, b| {
                a.status
                    .cmp(&b.status)
                    .then_with(|| a.channel.cmp(&b.channel))
            }),
        }
        Ok(rockets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAggregateStore;

    fn rocket(key: &str, speed: Option<i64>, mission: &str) -> Aggregate {
        let mut aggregate = Aggregate::empty(key).with_watermark(1);
        aggregate.speed = speed;
        aggregate.mission = Some(mission.to_string());
        aggregate.status = Some("launched".to_string());
        aggregate
    }

    fn queries() -> RocketQueries<InMemoryAggregateStore> {
        let store = InMemoryAggregateStore::new();
        store.seed(rocket("b", Some(300), "ARTEMIS"));
        store.seed(rocket("a", Some(900), "GEMINI"));
        store.seed(rocket("c", None, "APOLLO"));
        RocketQueries::new(Arc::new(store))
    }

    fn channels(rockets: &[RocketState]) -> Vec<&str> {
        rockets.iter().map(|r| r.channel.as_str()).collect()
    }

    #[test]
    fn test_get_rocket_not_found() {
        let err = queries().get_rocket("missing").unwrap_err();
        assert!(matches!(err, QueryError::NotFound(ref key) if key == "missing"));
    }

    #[test]
    fn test_list_sort_orders() {
        let queries = queries();
        let by = |sort| queries.list_rockets(sort).unwrap();
        assert_eq!(channels(&by(SortBy::Channel)), vec!["a", "b", "c"]);
        assert_eq!(channels(&by(SortBy::Speed)), vec!["c", "b", "a"]);
        assert_eq!(channels(&by(SortBy::Mission)), vec!["c", "b", "a"]);
        assert_eq!(channels(&by(SortBy::Status)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_by_parse_falls_back_to_channel() {
        assert_eq!(SortBy::parse("speed"), SortBy::Speed);
        assert_eq!(SortBy::parse("mission"), SortBy::Mission);
        assert_eq!(SortBy::parse("status"), SortBy::Status);
        assert_eq!(SortBy::parse("price"), SortBy::Channel);
        assert_eq!(SortBy::parse(""), SortBy::Channel);
    }

    #[test]
    fn test_absent_fields_omitted_from_json() {
        let state = queries().get_rocket("c").unwrap();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"channel": "c", "mission": "APOLLO", "status": "launched"})
        );
    }
}
