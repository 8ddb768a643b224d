//! MongoWishlistRepository against a disposable MongoDB container; needs Docker.

use domain_wishlist::*;
use test_utils::{TestDataBuilder, TestMongo};

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_compound_index_rejects_duplicate_pair() {
    let mongo = TestMongo::new().await;
    let repository = MongoWishlistRepository::new(&mongo.database());
    repository.init_indexes().await.unwrap();
    let data = TestDataBuilder::from_test_name("wishlist_unique");
    let (user, other_user, product) = (data.user_id(), data.id("other"), data.id("product"));

    repository.add(WishlistEntry::new(user, product)).await.unwrap();
    assert!(matches!(
        repository.add(WishlistEntry::new(user, product)).await,
        Err(WishlistError::AlreadyInWishlist)
    ));
    repository
        .add(WishlistEntry::new(other_user, product))
        .await
        .unwrap();

    assert!(repository.contains(user, product).await.unwrap());
    assert!(repository.remove(user, product).await.unwrap());
    assert!(!repository.contains(user, product).await.unwrap());
    assert!(repository.contains(other_user, product).await.unwrap());

    repository.add(WishlistEntry::new(user, product)).await.unwrap();
    assert!(repository.contains(user, product).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_is_newest_first() {
    let mongo = TestMongo::new().await;
    let repository = MongoWishlistRepository::new(&mongo.database());
    repository.init_indexes().await.unwrap();
    let data = TestDataBuilder::from_test_name("wishlist_order");
    let user = data.user_id();

    let first = repository
        .add(WishlistEntry::new(user, data.id("first")))
        .await
        .unwrap();
    let second = repository
        .add(WishlistEntry::new(user, data.id("second")))
        .await
        .unwrap();

    let listed = repository.list_for_user(user).await.unwrap();
    assert_eq!(
        listed.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
}
