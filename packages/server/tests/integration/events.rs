use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, routes};

fn titles(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn create_returns_detail_with_venue() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let venue = app.create_venue(&admin, "Pumpehuset").await;

    let res = app
        .post_with_token(
            routes::EVENTS,
            &json!({
                "title": "Sommerjazz",
                "description": "Jazz in the garden.",
                "date": "2099-07-01",
                "startTime": "19:30",
                "endTime": "23:00",
                "ticketPrice": 25000,
                "totalTickets": 150,
                "venueId": venue,
            }),
            &admin,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["status"], "published");
    assert_eq!(res.body["isActive"], true);
    assert_eq!(res.body["soldTickets"], 0);
    assert_eq!(res.body["venue"]["name"], "Pumpehuset");
    assert_eq!(res.body["lineup"], json!([]));
}

#[tokio::test]
async fn create_validates_fields() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let base = json!({
        "title": "Broken",
        "description": "Nope.",
        "date": "2099-07-01",
        "startTime": "19:30",
        "ticketPrice": 100,
        "totalTickets": 10,
    });

    for (field, value) in [
        ("startTime", json!("7pm")),
        ("ticketPrice", json!(-1)),
        ("totalTickets", json!(-5)),
        ("venueId", json!(Uuid::now_v7())),
        ("title", json!("")),
    ] {
        let mut body = base.clone();
        body[field] = value;
        let res = app.post_with_token(routes::EVENTS, &body, &admin).await;
        assert_eq!(res.status, 400, "{field}: {}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn hidden_events_are_only_visible_to_managers() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let member = app.create_user_with_role("fan@example.com", "member").await;

    let public = app.create_event(&admin, "Public Show", json!({})).await;
    let draft = app
        .create_event(&admin, "Draft Show", json!({"status": "draft"}))
        .await;
    let inactive = app
        .create_event(&admin, "Inactive Show", json!({"isActive": false}))
        .await;

    let anon = app.get_without_token(routes::EVENTS).await;
    assert_eq!(anon.status, 200, "{}", anon.text);
    assert_eq!(titles(&anon.body), ["Public Show"]);

    let as_member = app.get_with_token(routes::EVENTS, &member).await;
    assert_eq!(titles(&as_member.body), ["Public Show"]);

    let as_admin = app.get_with_token(routes::EVENTS, &admin).await;
    assert_eq!(as_admin.body["pagination"]["total"], 3);

    assert_eq!(app.get_without_token(&routes::event(public)).await.status, 200);
    for hidden in [draft, inactive] {
        assert_eq!(app.get_without_token(&routes::event(hidden)).await.status, 404);
        assert_eq!(app.get_with_token(&routes::event(hidden), &member).await.status, 404);
        assert_eq!(app.get_with_token(&routes::event(hidden), &admin).await.status, 200);
    }
}

#[tokio::test]
async fn list_filters_by_date_venue_and_search() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let venue = app.create_venue(&admin, "Train").await;

    app.create_event(&admin, "Past Gig", json!({"date": "2001-01-01"}))
        .await;
    app.create_event(&admin, "Autumn Gig", json!({"date": "2099-10-01", "venueId": venue}))
        .await;
    app.create_event(&admin, "Spring Gig", json!({"date": "2099-03-01"}))
        .await;

    let all = app.get_without_token(routes::EVENTS).await;
    assert_eq!(titles(&all.body), ["Past Gig", "Spring Gig", "Autumn Gig"]);

    let upcoming = app
        .get_without_token(&format!("{}?upcoming=true", routes::EVENTS))
        .await;
    assert_eq!(titles(&upcoming.body), ["Spring Gig", "Autumn Gig"]);

    let ranged = app
        .get_without_token(&format!("{}?from=2099-01-01&to=2099-06-30", routes::EVENTS))
        .await;
    assert_eq!(titles(&ranged.body), ["Spring Gig"]);

    let at_venue = app
        .get_without_token(&format!("{}?venueId={venue}", routes::EVENTS))
        .await;
    assert_eq!(titles(&at_venue.body), ["Autumn Gig"]);

    let search = app
        .get_without_token(&format!("{}?search=AUTUMN", routes::EVENTS))
        .await;
    assert_eq!(titles(&search.body), ["Autumn Gig"]);
}

#[tokio::test]
async fn update_keeps_ticket_counts_consistent() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let id = app.create_event(&admin, "Counting", json!({})).await;

    let res = app
        .put_with_token(&routes::event(id), &json!({"soldTickets": 40}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["soldTickets"], 40);
    assert_eq!(res.body["title"], "Counting");

    let res = app
        .put_with_token(&routes::event(id), &json!({"totalTickets": 30}), &admin)
        .await;
    assert_eq!(res.status, 400);

    let res = app
        .put_with_token(&routes::event(id), &json!({"status": "cancelled"}), &admin)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "cancelled");
}

#[tokio::test]
async fn delete_event_removes_lineup() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Gone Soon", json!({})).await;
    let artist = app.create_artist(&admin, "Opener").await;

    let entry = app
        .post_with_token(
            routes::EVENT_ARTISTS,
            &json!({"eventId": event, "artistId": artist}),
            &admin,
        )
        .await;
    assert_eq!(entry.status, 201, "{}", entry.text);

    let res = app.delete_with_token(&routes::event(event), &admin).await;
    assert_eq!(res.status, 204);

    let res = app
        .get_without_token(&routes::event_artist(entry.id()))
        .await;
    assert_eq!(res.status, 404);

    let res = app.delete_with_token(&routes::event(event), &admin).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn lineup_is_ordered_with_unordered_acts_last() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Festival", json!({})).await;
    let headliner = app.create_artist(&admin, "Headliner").await;
    let support = app.create_artist(&admin, "Support").await;
    let walk_on = app.create_artist(&admin, "Walk-on").await;

    for (artist, order) in [(walk_on, json!(null)), (headliner, json!(2)), (support, json!(1))] {
        let res = app
            .post_with_token(
                routes::EVENT_ARTISTS,
                &json!({
                    "eventId": event,
                    "artistId": artist,
                    "performanceOrder": order,
                    "performanceTime": "20:00",
                    "setDuration": 45,
                }),
                &admin,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let detail = app.get_without_token(&routes::event(event)).await;
    assert_eq!(detail.status, 200);
    let names: Vec<_> = detail.body["lineup"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["artist"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Support", "Headliner", "Walk-on"]);
    assert_eq!(detail.body["lineup"][0]["artist"]["slug"], "support");

    let featuring = app
        .get_without_token(&format!("{}?artistId={walk_on}", routes::EVENTS))
        .await;
    assert_eq!(titles(&featuring.body), ["Festival"]);
}

#[tokio::test]
async fn artist_can_appear_once_per_event() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Once", json!({})).await;
    let artist = app.create_artist(&admin, "Solo").await;
    let body = json!({"eventId": event, "artistId": artist});

    let first = app.post_with_token(routes::EVENT_ARTISTS, &body, &admin).await;
    assert_eq!(first.status, 201, "{}", first.text);

    let again = app.post_with_token(routes::EVENT_ARTISTS, &body, &admin).await;
    assert_eq!(again.status, 409);
    assert_eq!(again.body["code"], "CONFLICT");

    let missing = app
        .post_with_token(
            routes::EVENT_ARTISTS,
            &json!({"eventId": event, "artistId": Uuid::now_v7()}),
            &admin,
        )
        .await;
    assert_eq!(missing.status, 404);
}

#[tokio::test]
async fn lineup_entry_update_and_pair_removal() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Pairs", json!({})).await;
    let artist = app.create_artist(&admin, "Duo").await;

    let entry = app
        .post_with_token(
            routes::EVENT_ARTISTS,
            &json!({"eventId": event, "artistId": artist, "fee": 500000}),
            &admin,
        )
        .await
        .id();

    let res = app
        .put_with_token(
            &routes::event_artist(entry),
            &json!({"performanceTime": "21:15", "fee": null}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["performanceTime"], "21:15");
    assert!(res.body["fee"].is_null());

    let res = app
        .put_with_token(
            &routes::event_artist(entry),
            &json!({"performanceTime": "9pm"}),
            &admin,
        )
        .await;
    assert_eq!(res.status, 400);

    let listed = app
        .get_without_token(&format!("{}?eventId={event}", routes::EVENT_ARTISTS))
        .await;
    assert_eq!(listed.body["pagination"]["total"], 1);

    let res = app
        .delete_with_token(&routes::event_artist_pair(event, artist), &admin)
        .await;
    assert_eq!(res.status, 204);

    let res = app
        .delete_with_token(&routes::event_artist_pair(event, artist), &admin)
        .await;
    assert_eq!(res.status, 404);
}
