//! MongoUserRepository against a disposable MongoDB container; needs Docker.

use domain_users::*;
use test_utils::{TestDataBuilder, TestMongo};

async fn service(mongo: &TestMongo) -> UserService<MongoUserRepository> {
    let repository = MongoUserRepository::new(&mongo.database());
    repository.init_indexes().await.unwrap();
    UserService::new(repository)
}

fn candidate(email: &str) -> NewUser {
    NewUser {
        firstname: "Chidi".to_string(),
        lastname: "Eze".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role: Role::Buyer,
        location: None,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_round_trip_by_id_and_email() {
    let mongo = TestMongo::new().await;
    let service = service(&mongo).await;
    let builder = TestDataBuilder::from_test_name("mongo_user_round_trip");
    let email = builder.email("chidi");

    let created = service
        .create_user(candidate(&email.to_uppercase()))
        .await
        .unwrap();

    let by_id = service.get_user(created.id).await.unwrap();
    assert_eq!(by_id.email, email);

    let by_email = service.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unique_index_reports_duplicate_email() {
    let mongo = TestMongo::new().await;
    let repository = MongoUserRepository::new(&mongo.database());
    repository.init_indexes().await.unwrap();

    repository
        .create(User::new(candidate("twice@farm.ng")))
        .await
        .unwrap();

    // Straight to the repository: no pre-check, only the index
    let result = repository.create(User::new(candidate("Twice@Farm.ng"))).await;
    assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_registrations_leave_one_account() {
    let mongo = TestMongo::new().await;
    let service = service(&mongo).await;

    let attempts = (0..6).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.create_user(candidate("race@farm.ng")).await })
    });

    let mut created = 0;
    let mut conflicts = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => created += 1,
            Err(UserError::DuplicateEmail(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 5);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_and_find_by_ids() {
    let mongo = TestMongo::new().await;
    let service = service(&mongo).await;

    let user = service.create_user(candidate("patch@farm.ng")).await.unwrap();
    let updated = service
        .update_user(
            user.id,
            UserPatch {
                role: Some(Role::Farmer),
                farmer_application_status: Some(FarmerApplicationStatus::Approved),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Farmer);
    assert_eq!(
        updated.farmer_application_status,
        FarmerApplicationStatus::Approved
    );

    let summaries = service.find_by_ids(&[user.id]).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, user.id);

    let missing = service
        .update_user(uuid::Uuid::now_v7(), UserPatch::default())
        .await;
    assert!(matches!(missing, Err(UserError::NotFound(_))));
}
