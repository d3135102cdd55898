use serde_json::json;

use crate::common::{TestApp, routes};

const MAP: &str = r#"<iframe src="https://www.google.com/maps/embed?pb=abc" width="600" height="450" onload="track()"></iframe>"#;

#[tokio::test]
async fn map_markup_is_sanitized_on_create() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app
        .post_with_token(
            routes::VENUES,
            &json!({
                "name": "Vega",
                "address": "Enghavevej 40",
                "city": "København",
                "images": [" /img/a.jpg ", "", "/img/b.jpg"],
                "mapEmbedHtml": format!("<script>alert(1)</script>{MAP}"),
            }),
            &admin,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    let map = res.body["mapEmbedHtml"].as_str().unwrap();
    assert!(!map.contains("<script"), "{map}");
    assert!(!map.contains("onload"), "{map}");
    assert!(map.contains("https://www.google.com/maps/embed?pb=abc"), "{map}");
    assert_eq!(res.body["images"], json!(["/img/a.jpg", "/img/b.jpg"]));
}

#[tokio::test]
async fn map_markup_must_be_one_iframe() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    for html in ["<div>map</div>".to_string(), format!("{MAP}{MAP}")] {
        let res = app
            .post_with_token(
                routes::VENUES,
                &json!({"name": "Vega", "address": "Enghavevej 40", "mapEmbedHtml": html}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 400, "{html}");
        assert_eq!(res.body["code"], "INVALID_EMBED");
    }
}

#[tokio::test]
async fn update_can_clear_map() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let res = app
        .post_with_token(
            routes::VENUES,
            &json!({"name": "Loppen", "address": "Christiania", "mapEmbedHtml": MAP}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    let id = res.id();

    let res = app
        .put_with_token(&routes::venue(id), &json!({"mapEmbedHtml": null}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert!(res.body["mapEmbedHtml"].is_null());
    assert_eq!(res.body["name"], "Loppen");
}

#[tokio::test]
async fn list_filters_by_city_and_search() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.create_venue(&admin, "Pumpehuset").await;
    let res = app
        .post_with_token(
            routes::VENUES,
            &json!({"name": "Train", "address": "Toldbodgade 6", "city": "Aarhus"}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 201);

    let aarhus = app
        .get_without_token(&format!("{}?city=aarhus", routes::VENUES))
        .await;
    assert_eq!(aarhus.status, 200, "{}", aarhus.text);
    assert_eq!(aarhus.body["pagination"]["total"], 1);
    assert_eq!(aarhus.body["data"][0]["name"], "Train");

    let by_address = app
        .get_without_token(&format!("{}?search=studie", routes::VENUES))
        .await;
    assert_eq!(by_address.body["data"][0]["name"], "Pumpehuset");
}

#[tokio::test]
async fn venue_with_events_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let venue = app.create_venue(&admin, "Busy Hall").await;
    let event = app
        .create_event(&admin, "Booked", json!({"venueId": venue}))
        .await;

    let res = app.delete_with_token(&routes::venue(venue), &admin).await;
    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");

    let res = app.delete_with_token(&routes::event(event), &admin).await;
    assert_eq!(res.status, 204);

    let res = app.delete_with_token(&routes::venue(venue), &admin).await;
    assert_eq!(res.status, 204);
    let res = app.get_without_token(&routes::venue(venue)).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn member_cannot_create_venue() {
    let app = TestApp::spawn().await;
    let member = app.create_user_with_role("m@example.com", "member").await;

    let res = app
        .post_with_token(
            routes::VENUES,
            &json!({"name": "Nope", "address": "Nowhere 1"}),
            &member,
        )
        .await;

    assert_eq!(res.status, 403);
}
