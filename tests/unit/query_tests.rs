use rocket_inventory::queries::{RocketQueries, SortBy};
use rocket_inventory::{InMemoryAggregateStore, InboundEvent, Sequencer};
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    fn launched(channel: &str, speed: i64, mission: &str) -> InboundEvent {
        InboundEvent::new(
            channel,
            1,
            "RocketLaunched",
            format!(r#"{{"type":"Falcon-9","launchSpeed":{speed},"mission":"{mission}"}}"#),
        )
    }

    async fn fleet() -> RocketQueries<InMemoryAggregateStore> {
        let store = Arc::new(InMemoryAggregateStore::new());
        let sequencer = Sequencer::new(Arc::clone(&store));
        for event in [
            launched("ch-c", 700, "APOLLO"),
            launched("ch-a", 300, "GEMINI"),
            launched("ch-b", 500, "ARTEMIS"),
        ] {
            sequencer.submit(event).await.unwrap();
        }
        sequencer
            .submit(InboundEvent::new("ch-a", 2, "RocketExploded", r#"{"reason":"FUEL"}"#))
            .await
            .unwrap();
        RocketQueries::new(store)
    }

    fn channels(queries: &RocketQueries<InMemoryAggregateStore>, sort: &str) -> Vec<String> {
        queries
            .list_rockets(SortBy::parse(sort))
            .unwrap()
            .into_iter()
            .map(|rocket| rocket.channel)
            .collect()
    }

    #[tokio::test]
    async fn test_list_sorted_by_mission() {
        let queries = fleet().await;
        assert_eq!(channels(&queries, "mission"), vec!["ch-c", "ch-b", "ch-a"]);
    }

    #[tokio::test]
    async fn test_list_sorted_by_speed() {
        let queries = fleet().await;
        assert_eq!(channels(&queries, "speed"), vec!["ch-a", "ch-b", "ch-c"]);
    }

    #[tokio::test]
    async fn test_list_sorted_by_status() {
        let queries = fleet().await;
        assert_eq!(channels(&queries, "status"), vec!["ch-a", "ch-b", "ch-c"]);
    }

    #[tokio::test]
    async fn test_list_default_sort_is_channel() {
        let queries = fleet().await;
        assert_eq!(channels(&queries, ""), vec!["ch-a", "ch-b", "ch-c"]);
        assert_eq!(channels(&queries, "unknown"), vec!["ch-a", "ch-b", "ch-c"]);
    }

    #[tokio::test]
    async fn test_list_serializes_like_get() {
        let queries = fleet().await;
        let listed = queries.list_rockets(SortBy::Channel).unwrap();
        let json = serde_json::to_value(&listed[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "channel": "ch-a",
                "type": "Falcon-9",
                "speed": 300,
                "mission": "GEMINI",
                "status": "exploded"
            })
        );
    }
}
