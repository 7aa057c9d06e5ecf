use chrono::Utc;

use catalog_auth::{Mobile, RoleFlags, User, UserName, UserStore};
use catalog_core::StoreError;
use catalog_products::{Brand, BrandInput, CatalogEntity, Manufacturer, ManufacturerInput, Variant};

use super::*;

#[test]
fn constraint_names_map_to_wire_fields() {
    assert_eq!(constraint_field("variants", "variants_sku_key"), "SKU");
    assert_eq!(constraint_field("brands", "brands_manufacturer_id_fkey"), "manufacturer");
    assert_eq!(constraint_field("brands", "brands_name_key"), "name");
    assert_eq!(
        constraint_field("categories", "categories_parent_category_id_fkey"),
        "parent_category"
    );
    assert_eq!(constraint_field("users", "users_mobile_key"), "mobile");
}

#[test]
fn statements_bind_every_column_in_order() {
    assert_eq!(
        insert_sql::<Manufacturer>(),
        "INSERT INTO manufacturers (id, name, user_id, date_added) VALUES ($1, $2, $3, $4)"
    );
    assert_eq!(
        update_sql::<Manufacturer>(),
        "UPDATE manufacturers SET name = $2, user_id = $3, date_added = $4 WHERE id = $1"
    );

    let variant_insert = insert_sql::<Variant>();
    assert!(variant_insert.ends_with("$11)"));
    assert!(variant_insert.contains("sku"));
}

/// Runs against a live database when `TEST_DATABASE_URL` is set; the schema
/// is applied to it and test rows are left behind.
#[tokio::test]
async fn postgres_round_trip_with_cascade() {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        return;
    };
    let store = PostgresStore::connect(&url, 2).await.unwrap();

    let nonce = uuid::Uuid::now_v7();
    let suffix = nonce.simple().to_string();
    let mobile = format!("{:010}", nonce.as_u128() % 10_000_000_000);
    let owner = User::new(
        Mobile::parse(mobile).unwrap(),
        UserName::parse("pgtestuser").unwrap(),
        "hash".into(),
        RoleFlags::executive(),
        Utc::now(),
    );
    let owner = store.create_user(owner).await.unwrap();

    let m = Manufacturer::create(
        ManufacturerInput {
            name: Some(Some(format!("Acme {suffix}"))),
        },
        owner.id,
        Utc::now(),
    )
    .unwrap();
    let b = Brand::create(
        BrandInput {
            name: Some(Some(format!("Brand {suffix}"))),
            manufacturer: Some(Some(m.id)),
        },
        owner.id,
        Utc::now(),
    )
    .unwrap();

    store.insert(vec![m.clone()]).await.unwrap();
    store.insert(vec![b.clone()]).await.unwrap();
    let same_name = Manufacturer::create(
        ManufacturerInput {
            name: Some(Some(m.name.clone())),
        },
        owner.id,
        Utc::now(),
    )
    .unwrap();
    assert_eq!(
        store.insert(vec![same_name]).await.unwrap_err(),
        StoreError::duplicate("manufacturer", "name")
    );

    assert!(Repository::<Manufacturer>::delete(&store, m.id).await.unwrap());
    assert_eq!(Repository::<Brand>::get(&store, b.id).await.unwrap(), None);
}
