/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Tag-to-transition dispatch.

use super::rocket::{
    ExplodedTransition, LaunchedTransition, MissionChangedTransition, SpeedDecreasedTransition,
    SpeedIncreasedTransition,
};
use super::{Transition, TransitionError, WriteMode};
use crate::store::{Aggregate, StoreError, StoreTransaction};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of transitions keyed by event-type tag.
///
/// # Examples
///
/// ```
/// use rocket_inventory::store::{AggregateStore, InMemoryAggregateStore, StoreTransaction};
/// use rocket_inventory::transition::TransitionRegistry;
///
/// let store = InMemoryAggregateStore::new();
/// let registry = TransitionRegistry::with_defaults();
///
/// let mut txn = store.begin().unwrap();
/// registry
///     .apply(
///         &mut txn,
///         "RocketLaunched",
///         "ch-1",
///         1,
///         br#"{"type":"Falcon-9","launchSpeed":500,"mission":"ARTEMIS"}"#,
///     )
///     .unwrap();
/// txn.commit().unwrap();
///
/// assert_eq!(store.get("ch-1").unwrap().unwrap().watermark, 1);
/// ```
#[derive(Clone, Default)]
pub struct TransitionRegistry {
    transitions: HashMap<String, Arc<dyn Transition>>,
}

impl TransitionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transitions: HashMap::new(),
        }
    }

    /// Creates a registry holding the five built-in rocket transitions.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(LaunchedTransition);
        registry.register(SpeedIncreasedTransition);
        registry.register(SpeedDecreasedTransition);
        registry.register(ExplodedTransition);
        registry.register(MissionChangedTransition);
        registry
    }

    /// Registers `transition` under its own tag, replacing any previous entry.
    pub fn register<T: Transition + 'static>(&mut self, transition: T) {
        self.transitions
            .insert(transition.kind().to_string(), Arc::new(transition));
    }

    /// Returns `true` if a transition is registered for `kind`.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.transitions.contains_key(kind)
    }

    /// Applies the transition registered for `kind` within `txn`.
    ///
    /// Reads the prior aggregate, computes the next one and writes it back
    /// together with `watermark = sequence_num`. The written row always
    /// carries `key` and `sequence_num`, whatever the transition returned.
    /// Returns the written aggregate.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::UnknownKind`] if nothing is registered for `kind`
    /// - any validation error raised by the transition itself
    /// - [`TransitionError::MissingAggregate`] if an update-mode transition
    ///   targets a key with no row
    /// - [`TransitionError::Store`] if reading or writing fails
    pub fn apply<X: StoreTransaction>(
        &self,
        txn: &mut X,
        kind: &str,
        key: &str,
        sequence_num: u64,
        payload: &[u8],
    ) -> Result<Aggregate, TransitionError> {
        let transition = self
            .transitions
            .get(kind)
            .ok_or_else(|| TransitionError::UnknownKind(kind.to_string()))?;

        let prior = txn.read(key)?;
        let mut next = transition.apply(prior.as_ref(), key, sequence_num, payload)?;
        key.clone_into(&mut next.key);
        next.watermark = sequence_num;

        let written = match transition.write_mode() {
            WriteMode::Upsert => txn.upsert(next.clone()),
            WriteMode::Update => txn.update(next.clone()),
        };
        match written {
            Ok(()) => Ok(next),
            Err(StoreError::MissingRow { key }) => Err(TransitionError::MissingAggregate {
                key,
                kind: transition.kind(),
            }),
            Err(err) => Err(err.into()),
        }
    }
}

impl std::fmt::Debug for TransitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.transitions.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("TransitionRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
