//! MongoApplicationRepository against a disposable MongoDB container; needs Docker.

use domain_farmer_applications::*;
use domain_users::{
    FarmerApplicationStatus, MongoUserRepository, NewUser, Role, User, UserService,
};
use test_utils::{TestDataBuilder, TestMongo};

type Service = ApplicationService<MongoApplicationRepository, MongoUserRepository>;

async fn setup(mongo: &TestMongo) -> (Service, UserService<MongoUserRepository>) {
    let db = mongo.database();
    let users_repo = MongoUserRepository::new(&db);
    users_repo.init_indexes().await.unwrap();
    let applications = MongoApplicationRepository::new(&db);
    applications.init_indexes().await.unwrap();

    let users = UserService::new(users_repo);
    (ApplicationService::new(applications, users.clone()), users)
}

async fn applicant(users: &UserService<MongoUserRepository>, email: &str) -> User {
    users
        .create_user(NewUser {
            firstname: "Kofi".to_string(),
            lastname: "Mensah".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Buyer,
            location: None,
        })
        .await
        .unwrap()
}

fn details() -> ApplicationDetails {
    ApplicationDetails {
        business_name: "Volta Cocoa".to_string(),
        business_address: "Ho, Volta Region".to_string(),
        business_phone: "+233244000000".to_string(),
        business_email: "cocoa@volta.gh".to_string(),
        business_description: "Cocoa and plantain".to_string(),
        certifications: Some("Organic".to_string()),
        experience: None,
        products: None,
        id_card_url: None,
        proof_of_farm_url: None,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_partial_index_allows_one_active_application() {
    let mongo = TestMongo::new().await;
    let repository = MongoApplicationRepository::new(&mongo.database());
    repository.init_indexes().await.unwrap();
    let user_id = TestDataBuilder::from_test_name("partial_index").user_id();

    let first = repository
        .create(FarmerApplication::new(user_id, details()))
        .await
        .unwrap();
    let second = repository
        .create(FarmerApplication::new(user_id, details()))
        .await;
    assert!(matches!(
        second,
        Err(ApplicationError::ActiveApplicationExists)
    ));

    // Rejected applications fall outside the index
    repository
        .update_status(first.id, ApplicationStatus::Rejected)
        .await
        .unwrap();
    repository
        .create(FarmerApplication::new(user_id, details()))
        .await
        .unwrap();

    let reopened = repository
        .update_status(first.id, ApplicationStatus::Pending)
        .await;
    assert!(matches!(
        reopened,
        Err(ApplicationError::ActiveApplicationExists)
    ));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_submissions_leave_one_application() {
    let mongo = TestMongo::new().await;
    let (service, users) = setup(&mongo).await;
    let user = applicant(&users, "race@volta.gh").await;

    let attempts = (0..5).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.submit(user.id, details()).await })
    });

    let mut submitted = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => submitted += 1,
            Err(ApplicationError::AlreadyPending) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(submitted, 1);
    assert_eq!(service.find_by_user(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_review_cycle_updates_user_and_stats() {
    let mongo = TestMongo::new().await;
    let (service, users) = setup(&mongo).await;
    let user = applicant(&users, "kofi@volta.gh").await;

    let first = service.submit(user.id, details()).await.unwrap();
    service
        .set_status(first.id, ApplicationStatus::Rejected)
        .await
        .unwrap();
    let second = service.submit(user.id, details()).await.unwrap();
    service
        .set_status(second.id, ApplicationStatus::Approved)
        .await
        .unwrap();

    let user = users.get_user(user.id).await.unwrap();
    assert_eq!(user.role, Role::Farmer);
    assert_eq!(
        user.farmer_application_status,
        FarmerApplicationStatus::Approved
    );

    let history = service.find_by_user(user.id).await.unwrap();
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);

    let stats = service.stats().await.unwrap();
    assert_eq!((stats.total, stats.approved, stats.rejected), (2, 1, 1));

    let listed = service
        .find_all(ApplicationFilter {
            status: Some(ApplicationStatus::Approved),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].applicant.as_ref().unwrap().id, user.id);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_details_and_remove() {
    let mongo = TestMongo::new().await;
    let (service, users) = setup(&mongo).await;
    let user = applicant(&users, "details@volta.gh").await;
    let application = service.submit(user.id, details()).await.unwrap();

    let updated = service
        .update_details(
            application.id,
            UpdateApplicationDetails {
                experience: Some("15 years".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.experience.as_deref(), Some("15 years"));
    assert_eq!(updated.certifications.as_deref(), Some("Organic"));

    service.remove(application.id).await.unwrap();
    assert!(matches!(
        service.remove(application.id).await,
        Err(ApplicationError::NotFound(_))
    ));
}
