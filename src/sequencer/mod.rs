/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Sequencer module for per-key ordered, idempotent event application.
//!
//! Events for a key arrive over an at-least-once, possibly reordered
//! transport. The Sequencer applies each one to the key's aggregate exactly
//! once and strictly in ascending sequence order.
//!
//! # Architecture
//!
//! - Each key has its own async lock, created on first use; different keys
//!   never contend
//! - The key's watermark is read inside a store transaction
//! - Events at or below the watermark are duplicates and are discarded
//! - Events beyond `watermark + 1` wait in a per-key reorder buffer
//! - The next expected event is applied, then every contiguous buffered
//!   successor is drained, all within the same transaction
//!
//! # Examples
//!
//! ```no_run
//! use rocket_inventory::sequencer::{InboundEvent, Sequencer};
//! use rocket_inventory::store::InMemoryAggregateStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sequencer = Arc::new(Sequencer::new(Arc::new(InMemoryAggregateStore::new())));
//!
//! let receipt = sequencer
//!     .submit(InboundEvent::new(
//!         "ch-1",
//!         1,
//!         "RocketLaunched",
//!         r#"{"type":"Falcon-9","launchSpeed":500,"mission":"ARTEMIS"}"#,
//!     ))
//!     .await?;
//! println!("{:?} -> watermark {}", receipt.outcome, receipt.watermark);
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod config;
pub mod core;
pub mod event;
pub mod locks;
pub mod receipt;
pub mod result;

#[cfg(test)]
mod tests;

// Re-export main types
pub use config::SequencerConfig;
pub use core::{Sequencer, SequencerError};
pub use event::InboundEvent;
pub use receipt::SequencerReceipt;
pub use result::SubmitOutcome;
