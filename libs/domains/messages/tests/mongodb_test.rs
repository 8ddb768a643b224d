//! MongoMessageRepository against a disposable MongoDB container; needs Docker.

use chrono::{Duration, Utc};
use domain_messages::*;
use test_utils::{TestDataBuilder, TestMongo};

async fn service(mongo: &TestMongo) -> MessageService<MongoMessageRepository> {
    let repository = MongoMessageRepository::new(&mongo.database());
    repository.init_indexes().await.unwrap();
    MessageService::new(repository)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_thread_creation_yields_one_thread() {
    let mongo = TestMongo::new().await;
    let service = service(&mongo).await;
    let builder = TestDataBuilder::from_test_name("mongo_thread_race");
    let (buyer, farmer) = (builder.id("buyer"), builder.id("farmer"));

    let attempts: Vec<_> = (0..6)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    service.ensure_thread(buyer, farmer).await
                } else {
                    service.ensure_thread(farmer, buyer).await
                }
            })
        })
        .collect();

    let mut ids = Vec::new();
    for attempt in attempts {
        ids.push(attempt.await.unwrap().unwrap().id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(service.list_threads_for_user(farmer).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_messages_flow() {
    let mongo = TestMongo::new().await;
    let service = service(&mongo).await;
    let builder = TestDataBuilder::from_test_name("mongo_messages_flow");
    let (buyer, farmer, other_farmer) = (
        builder.id("buyer"),
        builder.id("farmer"),
        builder.id("other_farmer"),
    );

    let quiet = service.ensure_thread(buyer, other_farmer).await.unwrap();
    let busy = service.ensure_thread(buyer, farmer).await.unwrap();

    for (from, to, text) in [(buyer, farmer, "first"), (farmer, buyer, "second")] {
        service
            .send_message(from, MessageTarget::ByThread(busy.id), to, text.to_string())
            .await
            .unwrap();
    }
    service
        .send_message(
            buyer,
            MessageTarget::ByThread(quiet.id),
            other_farmer,
            "later".to_string(),
        )
        .await
        .unwrap();

    let threads = service.list_threads_for_user(buyer).await.unwrap();
    assert_eq!(threads[0].id, quiet.id);
    assert_eq!(threads[1].id, busy.id);

    let messages = service.list_by_thread(busy.id).await.unwrap();
    assert_eq!(messages[0].content, "first");
    assert_eq!(messages[1].content, "second");

    assert_eq!(service.unread_count(buyer).await.unwrap(), 1);
    assert_eq!(service.mark_thread_read(busy.id, buyer).await.unwrap(), 1);
    assert_eq!(service.unread_count(buyer).await.unwrap(), 0);

    let read = service.mark_read(messages[0].id).await.unwrap();
    assert!(read.read);

    service.delete_message(messages[0].id).await.unwrap();
    assert!(matches!(
        service.get_message(messages[0].id).await,
        Err(MessageError::MessageNotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_touch_thread_keeps_latest_activity() {
    let mongo = TestMongo::new().await;
    let repository = MongoMessageRepository::new(&mongo.database());
    repository.init_indexes().await.unwrap();
    let builder = TestDataBuilder::from_test_name("mongo_touch_thread");
    let thread = repository
        .create_thread(MessageThread::new(builder.id("buyer"), builder.id("farmer")))
        .await
        .unwrap();
    let later = Utc::now() + Duration::seconds(10);

    assert!(repository.touch_thread(thread.id, later).await.unwrap());
    assert!(
        repository
            .touch_thread(thread.id, later - Duration::seconds(5))
            .await
            .unwrap()
    );

    let stored = repository.get_thread(thread.id).await.unwrap().unwrap();
    assert_eq!(stored.last_message_at, later);
}
