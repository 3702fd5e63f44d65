//! End-to-end admin console tests against the mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::Utc;
use robe_admin::client::AdminApiError;
use robe_admin::coupons::CouponForm;
use robe_admin::guard::AdminGuard;
use robe_admin::orders::OrderStats;
use robe_admin::products::{ImagePayload, ProductForm, ProductUpdate};
use robe_admin::{AdminClient, AdminError};
use robe_core::{Category, Customer, PaymentMethod, Price, ProductId, UserRole};
use robe_integration_tests::MockBackend;
use robe_storefront::Storefront;
use serde_json::json;

const TOKEN: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

async fn setup() -> (MockBackend, AdminClient) {
    let backend = MockBackend::start().await.unwrap();
    backend.add_user("admin@robe.shop", "admin");
    backend.add_user("nadia@example.com", "user");
    let client = AdminClient::new(&backend.admin_config(Some(TOKEN)).unwrap()).unwrap();
    (backend, client)
}

fn product_form(image: Option<String>) -> ProductForm {
    ProductForm {
        name: "Katan Sharee".to_string(),
        price: "5200".to_string(),
        description: "Banarasi katan silk".to_string(),
        category: "Sharee".to_string(),
        gender: Some("women".to_string()),
        color: Some("Purple".to_string()),
        image,
    }
}

// ============================================================================
// Access
// ============================================================================

#[tokio::test]
async fn test_guard_admits_only_admins() {
    let (backend, client) = setup().await;

    let session = AdminGuard::authorize(&client, "admin@robe.shop").await.unwrap();
    assert_eq!(session.email.as_str(), "admin@robe.shop");

    let err = AdminGuard::authorize(&client, "nadia@example.com").await.unwrap_err();
    assert!(matches!(err, AdminError::Forbidden(_)));
    assert_eq!(err.report(), "Access denied: admin role required");

    let err = AdminGuard::authorize(&client, "stranger@example.com").await.unwrap_err();
    assert!(matches!(err, AdminError::Forbidden(_)));

    let err = AdminGuard::authorize(&client, "not-an-email").await.unwrap_err();
    assert!(matches!(err, AdminError::InvalidIdentity(_)));

    assert_eq!(backend.hits("GET", "/users/role/admin@robe.shop"), 1);
    assert_eq!(backend.hits("GET", "/users/role/nadia@example.com"), 1);
}

#[tokio::test]
async fn test_role_lookup_failure_denies_access() {
    let (backend, _) = setup().await;
    backend.require_token(TOKEN);
    let anonymous = AdminClient::new(&backend.admin_config(None).unwrap()).unwrap();

    assert_eq!(
        anonymous
            .user_role(&"admin@robe.shop".parse().unwrap())
            .await,
        None
    );
    let err = AdminGuard::authorize(&anonymous, "admin@robe.shop").await.unwrap_err();
    assert!(matches!(err, AdminError::Forbidden(_)));
}

#[tokio::test]
async fn test_bearer_token_sent_with_every_request() {
    let (backend, client) = setup().await;
    backend.require_token(TOKEN);

    assert_eq!(
        client.user_role(&"admin@robe.shop".parse().unwrap()).await,
        Some(UserRole::Admin)
    );
    client.list_products().await.unwrap();
    client.list_orders().await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(request.authorization.as_deref(), Some(format!("Bearer {TOKEN}").as_str()));
        assert!(request.request_id.is_some());
    }

    let anonymous = AdminClient::new(&backend.admin_config(None).unwrap()).unwrap();
    let err = anonymous.list_products().await.unwrap_err();
    assert!(matches!(err, AdminApiError::Unauthorized(_)));
    assert_eq!(
        AdminError::from(err).report(),
        "The backend refused the admin token"
    );
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_lifecycle() {
    let (backend, client) = setup().await;

    let image = ImagePayload::from_bytes("image/png", &[0x89, b'P', b'N', b'G']).unwrap();
    let url = client.upload_image(&image).await.unwrap();
    assert!(url.starts_with("https://cdn.mock/uploads/"));

    let new_product = product_form(Some(url.clone())).validate().unwrap();
    let id = client.create_product(&new_product).await.unwrap().unwrap();

    let stored = backend.products();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["_id"], json!(id.as_str()));
    assert_eq!(stored[0]["category"], json!("sharee"));
    assert_eq!(stored[0]["gender"], json!("women"));
    assert_eq!(stored[0]["price"], json!(5200));

    let product = client.get_product(&id).await.unwrap();
    assert_eq!(product.name, "Katan Sharee");
    assert_eq!(product.image, url);
    assert_eq!(product.color.as_deref(), Some("purple"));

    let update = ProductUpdate::from_product(&product)
        .with_changes(None, Some("4800"), Some("collection"), None)
        .unwrap();
    client.update_product(&id, &update).await.unwrap();

    let listed = client.list_products().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].price, Price::from_taka(4800));
    assert!(listed[0].in_category(Category::Collection.as_str()));
    assert_eq!(listed[0].name, "Katan Sharee");

    client.delete_product(&id).await.unwrap();
    assert!(client.list_products().await.unwrap().is_empty());
    assert!(matches!(
        client.get_product(&id).await.unwrap_err(),
        AdminApiError::NotFound(_)
    ));
    assert!(matches!(
        client.delete_product(&ProductId::new("missing")).await.unwrap_err(),
        AdminApiError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_product_without_image_is_never_sent() {
    let (backend, _) = setup().await;
    assert!(product_form(None).validate().is_err());
    assert_eq!(backend.hits("POST", "/products"), 0);
}

#[tokio::test]
async fn test_admin_and_storefront_share_the_catalog() {
    let (backend, client) = setup().await;
    let created = client
        .create_product(&product_form(Some("https://cdn.mock/k.jpg".into())).validate().unwrap())
        .await
        .unwrap()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = Storefront::new(backend.storefront_config(dir.path(), "0").unwrap()).unwrap();
    let products = store.client().list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, created);
}

// ============================================================================
// Coupons and orders
// ============================================================================

#[tokio::test]
async fn test_coupon_created_by_admin_is_honored_at_checkout() {
    let (backend, client) = setup().await;
    backend.add_product(json!({
        "_id": "p-panjabi",
        "name": "Cotton Panjabi",
        "price": 1800,
        "category": "panjabi",
        "image": "https://cdn.mock/p.jpg",
    }));

    let coupon = CouponForm {
        user_email: "nadia@example.com".to_string(),
        code: "eid200".to_string(),
        discount: "200".to_string(),
    }
    .validate()
    .unwrap();
    let coupon_id = client.create_coupon(&coupon).await.unwrap().unwrap();

    let coupons = client.list_coupons().await.unwrap();
    assert_eq!(coupons.len(), 1);
    assert_eq!(coupons[0].code, "EID200");
    assert_eq!(coupons[0].user_email, "nadia@example.com");
    assert_eq!(coupons[0].discount, Price::from_taka(200));

    let dir = tempfile::tempdir().unwrap();
    let store = Storefront::new(backend.storefront_config(dir.path(), "60").unwrap()).unwrap();
    let product = store.client().get_product(&ProductId::new("p-panjabi")).await.unwrap();
    store.cart().add(&product, 2);
    let checkout = store.checkout();
    checkout.apply_coupon("EID200").await.unwrap();
    checkout
        .submit(Customer {
            email: "nadia@example.com".to_string(),
            first_name: "Nadia".to_string(),
            last_name: "Rahman".to_string(),
            mobile: "01700000000".to_string(),
            address: "Dhanmondi".to_string(),
            payment_method: PaymentMethod::CashOnDelivery,
        })
        .await
        .unwrap();

    let orders = client.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.total(), Price::from_taka(3460));
    assert_eq!(order.unit_count(), 2);
    assert_eq!(order.coupon_applied.as_deref(), Some("EID200"));
    assert_eq!(order.customer.full_name(), "Nadia Rahman");

    let stats = OrderStats::from_orders(&orders, Utc::now());
    assert_eq!(stats.total_orders, 1);
    assert_eq!(stats.revenue, Price::from_taka(3460));
    assert_eq!(stats.average_order, Price::from_taka(3460));
    assert_eq!(stats.this_month, 1);

    client.delete_coupon(&coupon_id).await.unwrap();
    assert!(backend.coupons().is_empty());
    assert!(checkout.apply_coupon("EID200").await.is_err());
}

#[tokio::test]
async fn test_lists_accept_wrapped_shape() {
    let (backend, client) = setup().await;
    backend.wrap_lists(true);
    backend.add_coupon("SAVE10", 10, "nadia@example.com");

    let users = client.list_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].role, UserRole::Admin);
    assert_eq!(users[1].role, UserRole::User);

    assert_eq!(client.list_coupons().await.unwrap().len(), 1);
    assert!(client.list_orders().await.unwrap().is_empty());
}
