use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn ticket_defaults_to_event_price() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Priced", json!({"ticketPrice": 18000})).await;

    let res = app
        .post_with_token(routes::TICKETS, &json!({"eventId": event}), &admin)
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["price"], 18000);
    assert_eq!(res.body["isUsed"], false);
    assert_eq!(res.body["isActive"], true);
    let number = res.body["ticketNumber"].as_str().unwrap();
    assert!(number.starts_with("TKT-"), "{number}");
    assert_eq!(number.rsplit('-').next().unwrap().len(), 6);

    let explicit = app
        .post_with_token(routes::TICKETS, &json!({"eventId": event, "price": 0}), &admin)
        .await;
    assert_eq!(explicit.body["price"], 0);
    assert_ne!(explicit.body["ticketNumber"], res.body["ticketNumber"]);

    // Issuing tickets leaves the event's sold counter alone.
    let detail = app.get_without_token(&routes::event(event)).await;
    assert_eq!(detail.body["soldTickets"], 0);
}

#[tokio::test]
async fn ticket_requires_existing_event_and_user() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Real", json!({})).await;

    let res = app
        .post_with_token(routes::TICKETS, &json!({"eventId": Uuid::now_v7()}), &admin)
        .await;
    assert_eq!(res.status, 404);

    let res = app
        .post_with_token(
            routes::TICKETS,
            &json!({"eventId": event, "userId": Uuid::now_v7()}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 404);

    let res = app
        .post_with_token(
            routes::TICKETS,
            &json!({
                "eventId": event,
                "saleStartDate": "2099-05-01T10:00:00Z",
                "saleEndDate": "2099-04-01T10:00:00Z",
            }),
            &admin,
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn lookup_by_number_and_redeem_once() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Door", json!({})).await;
    let issued = app
        .post_with_token(routes::TICKETS, &json!({"eventId": event}), &admin)
        .await;
    let number = issued.body["ticketNumber"].as_str().unwrap().to_string();

    let found = app
        .get_with_token(&routes::ticket_by_number(&number.to_lowercase()), &admin)
        .await;
    assert_eq!(found.status, 200, "{}", found.text);
    assert_eq!(found.id(), issued.id());

    let redeemed = app
        .post_with_token(&routes::ticket_redeem(issued.id()), &json!({}), &admin)
        .await;
    assert_eq!(redeemed.status, 200, "{}", redeemed.text);
    assert_eq!(redeemed.body["isUsed"], true);
    assert!(redeemed.body["usedAt"].is_string());

    let again = app
        .post_with_token(&routes::ticket_redeem(issued.id()), &json!({}), &admin)
        .await;
    assert_eq!(again.status, 409);
    assert_eq!(again.body["code"], "CONFLICT");

    let missing = app
        .get_with_token(&routes::ticket_by_number("TKT-0-AAAAAA"), &admin)
        .await;
    assert_eq!(missing.status, 404);
}

#[tokio::test]
async fn inactive_ticket_cannot_be_redeemed() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Voided", json!({})).await;
    let id = app
        .post_with_token(routes::TICKETS, &json!({"eventId": event}), &admin)
        .await
        .id();

    let res = app
        .put_with_token(&routes::ticket(id), &json!({"isActive": false}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let res = app
        .post_with_token(&routes::ticket_redeem(id), &json!({}), &admin)
        .await;
    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn list_filters_unused_tickets() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Listed", json!({})).await;
    let other = app.create_event(&admin, "Elsewhere", json!({})).await;

    let first = app
        .post_with_token(routes::TICKETS, &json!({"eventId": event}), &admin)
        .await
        .id();
    app.post_with_token(routes::TICKETS, &json!({"eventId": event}), &admin)
        .await;
    app.post_with_token(routes::TICKETS, &json!({"eventId": other}), &admin)
        .await;
    app.post_with_token(&routes::ticket_redeem(first), &json!({}), &admin)
        .await;

    let for_event = app
        .get_with_token(&format!("{}?eventId={event}", routes::TICKETS), &admin)
        .await;
    assert_eq!(for_event.status, 200, "{}", for_event.text);
    assert_eq!(for_event.body["pagination"]["total"], 2);

    let unused = app
        .get_with_token(&format!("{}?eventId={event}&unused=true", routes::TICKETS), &admin)
        .await;
    assert_eq!(unused.body["pagination"]["total"], 1);
}

#[tokio::test]
async fn ticket_endpoints_require_permission() {
    let app = TestApp::spawn().await;
    let member = app.create_user_with_role("m@example.com", "member").await;

    let res = app.get_with_token(routes::TICKETS, &member).await;
    assert_eq!(res.status, 403);

    let res = app.get_without_token(routes::TICKETS).await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn delete_ticket() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Refund", json!({})).await;
    let id = app
        .post_with_token(routes::TICKETS, &json!({"eventId": event}), &admin)
        .await
        .id();

    let res = app.delete_with_token(&routes::ticket(id), &admin).await;
    assert_eq!(res.status, 204);
    let res = app.get_with_token(&routes::ticket(id), &admin).await;
    assert_eq!(res.status, 404);
}
