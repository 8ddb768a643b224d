//! Runs against a disposable MongoDB container; needs Docker.

use database::mongodb::{
    MongoConfig, check_health, check_health_detailed, connect_with_retry, is_duplicate_key,
};
use database::common::RetryConfig;
use mongodb::IndexModel;
use mongodb::bson::{Document, doc};
use mongodb::options::IndexOptions;
use test_utils::TestMongo;

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_connect_and_probe_health() {
    let mongo = TestMongo::new().await;
    let config = MongoConfig::with_database(mongo.connection_string(), "agronet_test");

    let client = connect_with_retry(&config, Some(RetryConfig::new().with_max_retries(1)))
        .await
        .unwrap();

    assert!(check_health(&client).await);
    let status = check_health_detailed(&client).await;
    assert!(status.healthy);
    assert!(status.message.is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unique_index_violation_is_detected() {
    let mongo = TestMongo::new().await;
    let collection = mongo.database().collection::<Document>("emails");

    collection
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await
        .unwrap();

    collection.insert_one(doc! { "email": "jane@test.com" }).await.unwrap();
    let err = collection
        .insert_one(doc! { "email": "jane@test.com" })
        .await
        .unwrap_err();

    assert!(is_duplicate_key(&err));
}

#[tokio::test]
async fn test_connect_fails_on_malformed_url() {
    let config = MongoConfig::with_database("not-a-mongo-url", "agronet_test");
    let result = connect_with_retry(
        &config,
        Some(RetryConfig::new().with_max_retries(0).without_jitter()),
    )
    .await;

    assert!(result.is_err());
}
