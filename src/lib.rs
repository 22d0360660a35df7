/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # Rocket Inventory
//!
//! An ordered, idempotent event-ingestion engine. Rocket events for a channel
//! arrive over an at-least-once transport, possibly duplicated, reordered or
//! delivered concurrently; the [`Sequencer`] applies each one to the
//! channel's aggregate exactly once and strictly in sequence order.
//!
//! ## Modules
//!
//! - [`sequencer`] - per-key locking, reorder buffer and ordered application
//! - [`transition`] - event-kind to state-transition dispatch
//! - [`store`] - aggregate store interface and an in-memory implementation
//! - [`ingress`] - decoding of wire messages into [`InboundEvent`]s
//! - [`queries`] - read-only projections over the store
//!
//! ## Example
//!
//! ```no_run
//! use rocket_inventory::ingress;
//! use rocket_inventory::queries::{RocketQueries, SortBy};
//! use rocket_inventory::{InMemoryAggregateStore, Sequencer};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryAggregateStore::new());
//! let sequencer = Sequencer::new(Arc::clone(&store));
//!
//! let body = br#"{
//!     "metadata": {
//!         "channel": "193270a9-c9cf-404a-8f83-838e71d9ae67",
//!         "messageNumber": 1,
//!         "messageTime": "2022-02-02T19:39:05.86337+01:00",
//!         "messageType": "RocketLaunched"
//!     },
//!     "message": {"type": "Falcon-9", "launchSpeed": 500, "mission": "ARTEMIS"}
//! }"#;
//! sequencer.submit(ingress::decode(body)?).await?;
//!
//! let rockets = RocketQueries::new(store).list_rockets(SortBy::Speed)?;
//! assert_eq!(rockets.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod ingress;
pub mod queries;
pub mod sequencer;
pub mod store;
pub mod transition;

pub use sequencer::{InboundEvent, Sequencer, SequencerConfig, SequencerError, SequencerReceipt};
pub use store::{Aggregate, AggregateStore, InMemoryAggregateStore, StoreError};
pub use transition::{TransitionError, TransitionRegistry};
