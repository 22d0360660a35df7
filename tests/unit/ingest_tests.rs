use rocket_inventory::ingress::{self, ResponseClass};
use rocket_inventory::queries::{QueryError, RocketQueries, RocketState};
use rocket_inventory::{InMemoryAggregateStore, Sequencer, SequencerError};
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    const CHANNEL: &str = "193270a9-c9cf-404a-8f83-838e71d9ae67";

    fn wire(channel: &str, number: i64, kind: &str, message: &str) -> Vec<u8> {
        format!(
            r#"{{"metadata":{{"channel":"{channel}","messageNumber":{number},"messageTime":"2022-02-02T19:39:05.86337+01:00","messageType":"{kind}"}},"message":{message}}}"#
        )
        .into_bytes()
    }

    fn launch(channel: &str, number: i64, mission: &str) -> Vec<u8> {
        wire(
            channel,
            number,
            "RocketLaunched",
            &format!(r#"{{"type":"Falcon-9","launchSpeed":500,"mission":"{mission}"}}"#),
        )
    }

    fn setup() -> (
        Arc<Sequencer<InMemoryAggregateStore>>,
        RocketQueries<InMemoryAggregateStore>,
    ) {
        let store = Arc::new(InMemoryAggregateStore::new());
        let sequencer = Arc::new(Sequencer::new(Arc::clone(&store)));
        (sequencer, RocketQueries::new(store))
    }

    /// Decodes and submits a body the way a transport handler would.
    async fn post(sequencer: &Sequencer<InMemoryAggregateStore>, body: &[u8]) -> ResponseClass {
        let event = match ingress::decode(body) {
            Ok(event) => event,
            Err(err) => return ResponseClass::from(&err),
        };
        match sequencer.submit(event).await {
            Ok(_) => ResponseClass::Ok,
            Err(err) => ResponseClass::of(&err),
        }
    }

    // --- single message ---

    #[tokio::test]
    async fn test_post_and_get_rocket() {
        let (sequencer, queries) = setup();
        assert_eq!(post(&sequencer, &launch(CHANNEL, 1, "ARTEMIS")).await, ResponseClass::Ok);

        let rocket = queries.get_rocket(CHANNEL).unwrap();
        assert_eq!(
            rocket,
            RocketState {
                channel: CHANNEL.to_string(),
                kind: Some("Falcon-9".to_string()),
                speed: Some(500),
                mission: Some("ARTEMIS".to_string()),
                status: Some("launched".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_rocket_not_found() {
        let (_, queries) = setup();
        assert!(matches!(
            queries.get_rocket("missing"),
            Err(QueryError::NotFound(_))
        ));
    }

    // --- ordering ---

    #[tokio::test]
    async fn test_out_of_order_messages() {
        let (sequencer, queries) = setup();
        let bodies = [
            wire(CHANNEL, 4, "RocketExploded", r#"{"reason":"PRESSURE_VESSEL_FAILURE"}"#),
            wire(CHANNEL, 3, "RocketMissionChanged", r#"{"newMission":"SHUTTLE_MIR"}"#),
            launch(CHANNEL, 1, "ARTEMIS"),
            wire(CHANNEL, 2, "RocketSpeedIncreased", r#"{"by":3000}"#),
        ];
        for body in &bodies {
            assert_eq!(post(&sequencer, body).await, ResponseClass::Ok);
        }

        let rocket = queries.get_rocket(CHANNEL).unwrap();
        assert_eq!(rocket.speed, Some(3500));
        assert_eq!(rocket.mission.as_deref(), Some("SHUTTLE_MIR"));
        assert_eq!(rocket.status.as_deref(), Some("exploded"));
    }

    #[tokio::test]
    async fn test_duplicate_messages() {
        let (sequencer, queries) = setup();
        let body = launch(CHANNEL, 1, "ARTEMIS");
        for _ in 0..3 {
            assert_eq!(post(&sequencer, &body).await, ResponseClass::Ok);
        }
        assert_eq!(
            post(&sequencer, &wire(CHANNEL, 2, "RocketSpeedDecreased", r#"{"by":200}"#)).await,
            ResponseClass::Ok
        );
        assert_eq!(
            post(&sequencer, &wire(CHANNEL, 2, "RocketSpeedDecreased", r#"{"by":200}"#)).await,
            ResponseClass::Ok
        );

        assert_eq!(queries.get_rocket(CHANNEL).unwrap().speed, Some(300));
        assert_eq!(queries.list_rockets(Default::default()).unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_messages() {
        let (sequencer, queries) = setup();
        assert_eq!(post(&sequencer, &launch(CHANNEL, 1, "ARTEMIS")).await, ResponseClass::Ok);

        let mut handles = Vec::new();
        for number in 2..=11 {
            let sequencer = Arc::clone(&sequencer);
            handles.push(tokio::spawn(async move {
                let body = wire(CHANNEL, number, "RocketSpeedIncreased", r#"{"by":100}"#);
                post(&sequencer, &body).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), ResponseClass::Ok);
        }

        assert_eq!(queries.get_rocket(CHANNEL).unwrap().speed, Some(1500));
    }

    // --- error mapping ---

    #[tokio::test]
    async fn test_bad_requests_are_client_errors() {
        let (sequencer, queries) = setup();
        assert_eq!(post(&sequencer, b"{").await, ResponseClass::ClientError);
        assert_eq!(
            post(&sequencer, &wire(CHANNEL, 0, "RocketLaunched", "{}")).await,
            ResponseClass::ClientError
        );
        assert_eq!(
            post(&sequencer, &wire(CHANNEL, 1, "Bogus", "{}")).await,
            ResponseClass::ClientError
        );
        assert_eq!(
            post(&sequencer, &wire(CHANNEL, 1, "RocketLaunched", r#"{"type":"Falcon-9"}"#)).await,
            ResponseClass::ClientError
        );
        assert!(queries.get_rocket(CHANNEL).is_err());
    }

    #[tokio::test]
    async fn test_validation_errors_are_not_retryable() {
        let (sequencer, _) = setup();
        let event = ingress::decode(&wire(CHANNEL, 1, "Bogus", "{}")).unwrap();
        let err = sequencer.submit(event).await.unwrap_err();
        assert!(matches!(err, SequencerError::Validation(_)));
        assert!(!err.is_retryable());
        assert_eq!(ResponseClass::of(&err).status_code(), 400);
    }
}
