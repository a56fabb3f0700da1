// Dispatcher fan-out tests against a wiremock alert consumer

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::alert::AlertDispatcher;
use common::config::AlertingConfig;
use common::db::repositories::SubscriberDirectory;
use common::errors::DatabaseError;
use common::models::{Listing, Subscription, Vehicle};
use std::sync::Arc;
use wiremock::matchers::{body_json_string, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Directory test double with a fixed subscriber set
struct StaticDirectory {
    subscribers: Vec<String>,
}

#[async_trait]
impl SubscriberDirectory for StaticDirectory {
    async fn list_subscribers(&self, _vehicle_id: i64) -> Result<Vec<String>, DatabaseError> {
        Ok(self.subscribers.clone())
    }

    async fn add_subscription(
        &self,
        _vehicle_id: i64,
        _client_id: &str,
    ) -> Result<Subscription, DatabaseError> {
        unimplemented!("not used by dispatcher")
    }

    async fn remove_subscription(
        &self,
        _vehicle_id: i64,
        _client_id: &str,
    ) -> Result<(), DatabaseError> {
        unimplemented!("not used by dispatcher")
    }
}

/// Directory test double whose lookup always fails
struct FailingDirectory;

#[async_trait]
impl SubscriberDirectory for FailingDirectory {
    async fn list_subscribers(&self, _vehicle_id: i64) -> Result<Vec<String>, DatabaseError> {
        Err(DatabaseError::QueryFailed("connection reset".to_string()))
    }

    async fn add_subscription(
        &self,
        _vehicle_id: i64,
        _client_id: &str,
    ) -> Result<Subscription, DatabaseError> {
        unimplemented!("not used by dispatcher")
    }

    async fn remove_subscription(
        &self,
        _vehicle_id: i64,
        _client_id: &str,
    ) -> Result<(), DatabaseError> {
        unimplemented!("not used by dispatcher")
    }
}

fn dispatcher(consumer_url: String, subscribers: &[&str]) -> AlertDispatcher {
    let config = AlertingConfig {
        consumer_url,
        delivery_timeout_seconds: 5,
    };
    let directory = Arc::new(StaticDirectory {
        subscribers: subscribers.iter().map(|s| s.to_string()).collect(),
    });
    AlertDispatcher::new(&config, directory).unwrap()
}

fn vehicle() -> Vehicle {
    Vehicle {
        id: 1,
        manufacturer: "Toyota".to_string(),
        model: "Corolla".to_string(),
        year: "1996".to_string(),
        last_row_id: None,
        last_branch: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn listing() -> Listing {
    Listing {
        row_id: "row1".to_string(),
        branch: "location1".to_string(),
        year: "1996".to_string(),
        make: "Toyota".to_string(),
        model: "Corolla".to_string(),
        date_listed: NaiveDate::from_ymd_opt(2023, 4, 15).unwrap(),
        listing_url: "https://example.com/listing/row1".to_string(),
    }
}

#[tokio::test]
async fn test_one_delivery_per_subscriber() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/new-listing-consumer"))
        .and(body_partial_json(serde_json::json!({"row_id": "row1"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(3)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(
        format!("{}/v1/new-listing-consumer", server.uri()),
        &["client-a", "client-b", "client-c"],
    );

    let delivered = dispatcher.dispatch(&listing(), &vehicle()).await;
    assert_eq!(delivered, 3);
}

#[tokio::test]
async fn test_payload_carries_listing_and_client_fields() {
    let server = MockServer::start().await;

    let expected = serde_json::json!({
        "year": "1996",
        "make": "Toyota",
        "model": "Corolla",
        "date_listed": "2023-04-15",
        "row_id": "row1",
        "branch": "location1",
        "listing_url": "https://example.com/listing/row1",
        "client_id": "client-a",
    });

    Mock::given(method("POST"))
        .and(body_json_string(expected.to_string()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(server.uri(), &["client-a"]);
    let delivered = dispatcher.dispatch(&listing(), &vehicle()).await;
    assert_eq!(delivered, 1);
}

#[tokio::test]
async fn test_only_204_counts_as_delivered() {
    let server = MockServer::start().await;

    // A 200 is still a delivery failure: the consumer contract is 204.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(server.uri(), &["client-a", "client-b"]);
    let delivered = dispatcher.dispatch(&listing(), &vehicle()).await;
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn test_one_failing_subscriber_does_not_block_the_others() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"client_id": "client-b"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(server.uri(), &["client-a", "client-b", "client-c"]);
    let delivered = dispatcher.dispatch(&listing(), &vehicle()).await;

    // client-b failed, the other two were still attempted and accepted.
    assert_eq!(delivered, 2);
}

#[tokio::test]
async fn test_no_subscribers_means_no_deliveries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = dispatcher(server.uri(), &[]);
    let delivered = dispatcher.dispatch(&listing(), &vehicle()).await;
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn test_directory_failure_is_not_a_cycle_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let config = AlertingConfig {
        consumer_url: server.uri(),
        delivery_timeout_seconds: 5,
    };
    let dispatcher = AlertDispatcher::new(&config, Arc::new(FailingDirectory)).unwrap();

    // Failed lookup results in zero deliveries, not a panic or error.
    let delivered = dispatcher.dispatch(&listing(), &vehicle()).await;
    assert_eq!(delivered, 0);
}
