mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn test_place_order() {
    let app = TestApp::new().await;
    let (seller, _) = app.user("seller@example.com", "Seller").await;
    let (_, client) = app.user("client@example.com", "Client").await;
    let product = app.product(&seller, "Logo design").await;

    let anonymous = app.post("/api/orders", None, json!({"productId": product})).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["message"], "Not authenticated");

    let missing_product = app.post("/api/orders", Some(&client), json!({})).await;
    assert_eq!(missing_product.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_product.body["message"], "productId is required");

    let unknown = app
        .post("/api/orders", Some(&client), json!({"productId": "nope"}))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["message"], "Product not found");

    let placed = app
        .post(
            "/api/orders",
            Some(&client),
            json!({"productId": product, "description": "  Blue please  "}),
        )
        .await;
    assert_eq!(placed.status, StatusCode::CREATED);
    assert_eq!(placed.body["message"], "Order processed successfully");
    assert!(placed.body["id"].is_string());

    let all = app.get("/api/orders", Some(&client)).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["data"][0]["id"], placed.body["id"]);
    assert_eq!(all.body["data"][0]["prof_id"], seller.as_str());
    assert_eq!(all.body["data"][0]["description"], "Blue please");

    let listing = app.get("/api/orders", None).await;
    assert_eq!(listing.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_orders_by_side_embed_the_product() {
    let app = TestApp::new().await;
    let (seller, seller_token) = app.user("seller@example.com", "Seller").await;
    let (client, client_token) = app.user("client@example.com", "Client").await;
    let product = app.product(&seller, "Logo design").await;

    app.post("/api/orders", Some(&client_token), json!({"productId": product}))
        .await;

    let mine = app.get("/api/orders/user", Some(&client_token)).await;
    assert_eq!(mine.status, StatusCode::OK);
    let mine = mine.body["data"].as_array().unwrap().clone();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["client_id"], client.as_str());
    assert_eq!(mine[0]["post"]["title"], "Logo design");

    let received = app.get("/api/orders/professional", Some(&seller_token)).await;
    assert_eq!(received.body["data"][0]["id"], mine[0]["id"]);
    assert_eq!(received.body["data"][0]["post"]["id"], product.as_str());

    let nothing_received = app.get("/api/orders/professional", Some(&client_token)).await;
    assert_eq!(nothing_received.body["data"], json!([]));

    let anonymous = app.get("/api/orders/user", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_shares_the_order_endpoints() {
    let app = TestApp::new().await;
    let (seller, _) = app.user("seller@example.com", "Seller").await;
    let (_, client) = app.user("client@example.com", "Client").await;
    let product = app.product(&seller, "Logo design").await;

    let placed = app
        .post("/api/cart", Some(&client), json!({"productId": product}))
        .await;
    assert_eq!(placed.status, StatusCode::CREATED);

    let listed = app.get("/api/cart", Some(&client)).await;
    assert_eq!(listed.body["data"][0]["id"], placed.body["id"]);
}
