/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Feeds a shuffled stream of wire messages for two channels through the
//! ingress adapter and the Sequencer, then prints the resulting fleet.
//!
//! Run with `RUST_LOG=debug` to watch buffering and draining.

use rocket_inventory::ingress::{self, ResponseClass};
use rocket_inventory::queries::{RocketQueries, SortBy};
use rocket_inventory::{InMemoryAggregateStore, Sequencer};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn message(channel: &str, number: u64, kind: &str, body: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "metadata": {
            "channel": channel,
            "messageNumber": number,
            "messageTime": "2022-02-02T19:39:05.86337+01:00",
            "messageType": kind,
        },
        "message": body,
    }))
    .unwrap_or_default()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = Arc::new(InMemoryAggregateStore::new());
    let sequencer = Arc::new(Sequencer::new(Arc::clone(&store)));
    let queries = RocketQueries::new(Arc::clone(&store));

    let alpha = "193270a9-c9cf-404a-8f83-838e71d9ae67";
    let beta = "b7d1e4a2-5c3f-4e8a-9d61-0f2c7a8e4b19";

    let stream = vec![
        message(alpha, 3, "RocketSpeedDecreased", serde_json::json!({"by": 2500})),
        message(beta, 2, "RocketMissionChanged", serde_json::json!({"newMission": "SHUTTLE_MIR"})),
        message(alpha, 1, "RocketLaunched", serde_json::json!({"type": "Falcon-9", "launchSpeed": 500, "mission": "ARTEMIS"})),
        message(beta, 1, "RocketLaunched", serde_json::json!({"type": "Falcon-Heavy", "launchSpeed": 800, "mission": "GEMINI"})),
        message(alpha, 4, "RocketExploded", serde_json::json!({"reason": "PRESSURE_VESSEL_FAILURE"})),
        message(alpha, 1, "RocketLaunched", serde_json::json!({"type": "Falcon-9", "launchSpeed": 500, "mission": "ARTEMIS"})),
        message(alpha, 2, "RocketSpeedIncreased", serde_json::json!({"by": 3000})),
        message(beta, 3, "RocketBogus", serde_json::json!({})),
    ];

    let mut handles = Vec::new();
    for body in stream {
        let sequencer = Arc::clone(&sequencer);
        handles.push(tokio::spawn(async move {
            let event = match ingress::decode(&body) {
                Ok(event) => event,
                Err(err) => return (ResponseClass::from(&err), err.to_string()),
            };
            match sequencer.submit(event).await {
                Ok(receipt) => (ResponseClass::Ok, format!("{:?}", receipt.outcome)),
                Err(err) => (ResponseClass::of(&err), err.to_string()),
            }
        }));
    }

    for handle in handles {
        match handle.await {
            Ok((ResponseClass::Ok, detail)) => info!(detail = %detail, "accepted"),
            Ok((class, detail)) => warn!(status = class.status_code(), detail = %detail, "rejected"),
            Err(err) => warn!(error = %err, "submission task failed"),
        }
    }

    match queries.list_rockets(SortBy::Channel) {
        Ok(rockets) => {
            for rocket in rockets {
                println!("{}", serde_json::to_string(&rocket).unwrap_or_default());
            }
        }
        Err(err) => warn!(error = %err, "listing failed"),
    }
}
