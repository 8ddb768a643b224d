//! MongoProductRepository against a disposable MongoDB container; needs Docker.

use domain_products::*;
use domain_users::GeoPoint;
use test_utils::assertions::assert_sorted_desc;
use test_utils::{TestDataBuilder, TestMongo};

fn product(farmer_id: uuid::Uuid, name: &str, price: i64, quantity: i32) -> Product {
    Product::new(
        farmer_id,
        CreateProduct {
            name: name.to_string(),
            description: format!("{name} from the northern farms"),
            price,
            quantity,
            location: Some(GeoPoint::new(7.49, 9.07)),
        },
        vec![],
    )
}

async fn repository(mongo: &TestMongo) -> MongoProductRepository {
    let repository = MongoProductRepository::new(&mongo.database());
    repository.init_indexes().await.unwrap();
    repository
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_filters_and_ordering() {
    let mongo = TestMongo::new().await;
    let repository = repository(&mongo).await;
    let data = TestDataBuilder::from_test_name("product_filters");
    let farmer = data.user_id();

    repository.create(product(farmer, "Sorghum", 9000, 5)).await.unwrap();
    repository.create(product(farmer, "Millet", 7000, 0)).await.unwrap();
    repository
        .create(product(data.id("other_farmer"), "Sesame (hulled)", 15000, 3))
        .await
        .unwrap();

    let all = repository.list(ProductFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_sorted_desc(&all, |p| p.id, "products newest first");

    let mine = repository
        .list(ProductFilter {
            farmer_id: Some(farmer),
            in_stock: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Sorghum");

    let cheap = repository
        .list(ProductFilter {
            max_price: Some(9000),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(cheap.len(), 2);

    // Regex metacharacters in the search term are matched literally
    let searched = repository
        .list(ProductFilter {
            search: Some("SESAME (".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_get_many_and_delete() {
    let mongo = TestMongo::new().await;
    let repository = repository(&mongo).await;
    let farmer = TestDataBuilder::from_test_name("product_update").user_id();

    let beans = repository.create(product(farmer, "Beans", 4000, 10)).await.unwrap();
    let yam = repository.create(product(farmer, "Yam", 2500, 8)).await.unwrap();

    let updated = repository
        .update(
            beans.id,
            UpdateProduct {
                quantity: Some(2),
                images: Some(vec!["https://cdn.agronet.test/beans.jpg".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.quantity, 2);
    assert_eq!(updated.price, 4000);
    assert_eq!(updated.images.len(), 1);
    assert_eq!(updated.location, GeoPoint::new(7.49, 9.07));

    assert!(repository.delete(yam.id).await.unwrap());
    assert!(!repository.delete(yam.id).await.unwrap());

    let found = repository.get_many(&[beans.id, yam.id]).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, beans.id);

    assert!(
        repository
            .update(yam.id, UpdateProduct::default())
            .await
            .unwrap()
            .is_none()
    );
}
