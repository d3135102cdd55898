use sea_orm::{ConnectionTrait, DbBackend, Statement};
use serde_json::{Value, json};
use server::config::ContactConfig;

use crate::common::{TestApp, routes};

fn message(email: &str, text: &str) -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": email,
        "message": text,
        "subject": "Booking inquiry",
    })
}

async fn backdate_messages(app: &TestApp, email: &str, minutes: i64) {
    app.db
        .execute_raw(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE contact_message SET created_at = created_at - make_interval(mins => $1) WHERE email = $2",
            [(minutes as i32).into(), email.into()],
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn submission_is_stored_normalized() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(
            routes::CONTACT,
            &json!({
                "name": "  Ada Lovelace ",
                "email": " Ada@Example.COM ",
                "message": "We would love to book you for a summer party.",
                "type": "booking",
                "eventDate": "2099-07-12",
                "budget": "10.000 kr",
            }),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["message"], "Message sent successfully");

    let admin = app.admin_token().await;
    let stored = app
        .get_with_token(&routes::contact_message(res.id()), &admin)
        .await;
    assert_eq!(stored.status, 200, "{}", stored.text);
    assert_eq!(stored.body["name"], "Ada Lovelace");
    assert_eq!(stored.body["email"], "ada@example.com");
    assert_eq!(stored.body["type"], "booking");
    assert_eq!(stored.body["status"], "pending");
    assert_eq!(stored.body["isRead"], false);
    assert_eq!(stored.body["eventDate"], "2099-07-12");
}

#[tokio::test]
async fn invalid_fields_are_rejected() {
    let app = TestApp::spawn().await;

    let cases = [
        (json!({"name": "Ada", "email": "ada@example.com"}), "required"),
        (message("not-an-email", "A long enough message body."), "email"),
        (
            json!({"name": "A", "email": "ada@example.com", "message": "A long enough message body."}),
            "Name",
        ),
        (message("ada@example.com", "short"), "Message"),
    ];

    for (body, expected) in cases {
        let res = app.post_without_token(routes::CONTACT, &body).await;
        assert_eq!(res.status, 400, "{body}");
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(
            res.body["message"].as_str().unwrap().contains(expected),
            "{}",
            res.text
        );
    }
}

#[tokio::test]
async fn spam_signals_do_not_block_submission() {
    let app = TestApp::spawn().await;

    let res = app
        .post_without_token(
            routes::CONTACT,
            &message("spam@example.com", "Click here to make money, buy now!"),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
}

#[tokio::test]
async fn duplicate_message_is_rejected_until_window_passes() {
    let app = TestApp::spawn().await;
    let body = message("dup@example.com", "Are you available on the 12th of July?");

    let first = app.post_without_token(routes::CONTACT, &body).await;
    assert_eq!(first.status, 201, "{}", first.text);

    let second = app.post_without_token(routes::CONTACT, &body).await;
    assert_eq!(second.status, 429);
    assert_eq!(second.body["code"], "DUPLICATE_SUBMISSION");
    let retry = second.retry_after().expect("Retry-After header");
    assert!((1..=3600).contains(&retry), "{retry}");

    // Case and surrounding whitespace in the email do not evade the check.
    let mut shouted = body.clone();
    shouted["email"] = json!("  DUP@example.com");
    let third = app.post_without_token(routes::CONTACT, &shouted).await;
    assert_eq!(third.status, 429);

    backdate_messages(&app, "dup@example.com", 61).await;

    let later = app.post_without_token(routes::CONTACT, &body).await;
    assert_eq!(later.status, 201, "{}", later.text);
}

#[tokio::test]
async fn per_email_volume_is_capped() {
    let app = TestApp::spawn().await;

    for i in 0..5 {
        let res = app
            .post_without_token(
                routes::CONTACT,
                &message("busy@example.com", &format!("Question number {i} about the tour.")),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let res = app
        .post_without_token(
            routes::CONTACT,
            &message("busy@example.com", "One more question about the tour."),
        )
        .await;
    assert_eq!(res.status, 429);
    assert_eq!(res.body["code"], "RATE_LIMITED");
    assert!(res.retry_after().is_some());

    let other = app
        .post_without_token(
            routes::CONTACT,
            &message("calm@example.com", "One more question about the tour."),
        )
        .await;
    assert_eq!(other.status, 201);
}

#[tokio::test]
async fn per_ip_limit_applies_across_emails() {
    let app = TestApp::spawn_behind_proxy(ContactConfig {
        ip_limit: 3,
        ..ContactConfig::default()
    })
    .await;

    for i in 0..3 {
        let res = app
            .post_from_ip(
                routes::CONTACT,
                &message(&format!("fan{i}@example.com"), "Hello from the front row!"),
                "203.0.113.7",
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let blocked = app
        .post_from_ip(
            routes::CONTACT,
            &message("fan9@example.com", "Hello from the front row!"),
            "203.0.113.7",
        )
        .await;
    assert_eq!(blocked.status, 429);
    assert_eq!(blocked.body["code"], "RATE_LIMITED");
    assert!(blocked.retry_after().is_some());

    let elsewhere = app
        .post_from_ip(
            routes::CONTACT,
            &message("fan9@example.com", "Hello from the front row!"),
            "198.51.100.2",
        )
        .await;
    assert_eq!(elsewhere.status, 201, "{}", elsewhere.text);
}

#[tokio::test]
async fn spoofed_forwarded_for_shares_the_peer_bucket() {
    let app = TestApp::spawn_with(ContactConfig {
        ip_limit: 3,
        ..ContactConfig::default()
    })
    .await;

    for (i, spoofed) in ["1.1.1.1", "2.2.2.2", "3.3.3.3"].into_iter().enumerate() {
        let res = app
            .post_from_ip(
                routes::CONTACT,
                &message(&format!("fan{i}@example.com"), "Hello from the front row!"),
                spoofed,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let blocked = app
        .post_from_ip(
            routes::CONTACT,
            &message("fan9@example.com", "Hello from the front row!"),
            "4.4.4.4",
        )
        .await;
    assert_eq!(blocked.status, 429);
    assert_eq!(blocked.body["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn inbox_requires_contact_permission() {
    let app = TestApp::spawn().await;
    let member = app.create_user_with_role("m@example.com", "member").await;

    let res = app.get_with_token(routes::CONTACT, &member).await;
    assert_eq!(res.status, 403);

    let res = app.get_without_token(routes::CONTACT).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}

#[tokio::test]
async fn admin_workflow_read_reply_archive() {
    let app = TestApp::spawn().await;
    let editor = app.create_user_with_role("ed@example.com", "editor").await;

    let id = app
        .post_without_token(
            routes::CONTACT,
            &message("fan@example.com", "Will there be an encore in Aarhus?"),
        )
        .await
        .id();

    let list = app
        .get_with_token(&format!("{}?status=pending", routes::CONTACT), &editor)
        .await;
    assert_eq!(list.status, 200, "{}", list.text);
    assert_eq!(list.body["pagination"]["total"], 1);

    let read = app
        .post_with_token(&routes::contact_action(id, "read"), &json!({}), &editor)
        .await;
    assert_eq!(read.status, 200, "{}", read.text);
    assert_eq!(read.body["isRead"], true);
    assert_eq!(read.body["status"], "read");

    let replied = app
        .post_with_token(
            &routes::contact_action(id, "reply"),
            &json!({"adminNotes": "Answered by phone"}),
            &editor,
        )
        .await;
    assert_eq!(replied.status, 200, "{}", replied.text);
    assert_eq!(replied.body["status"], "replied");
    assert_eq!(replied.body["adminNotes"], "Answered by phone");
    assert!(replied.body["repliedAt"].is_string());

    // Marking read again does not move a replied message backwards.
    let reread = app
        .post_with_token(&routes::contact_action(id, "read"), &json!({}), &editor)
        .await;
    assert_eq!(reread.body["status"], "replied");

    let archived = app
        .post_with_token(&routes::contact_action(id, "archive"), &json!({}), &editor)
        .await;
    assert_eq!(archived.status, 200);
    assert_eq!(archived.body["status"], "archived");

    let pending = app
        .get_with_token(&format!("{}?status=pending", routes::CONTACT), &editor)
        .await;
    assert_eq!(pending.body["pagination"]["total"], 0);

    let deleted = app
        .delete_with_token(&routes::contact_message(id), &editor)
        .await;
    assert_eq!(deleted.status, 204);
    let gone = app
        .get_with_token(&routes::contact_message(id), &editor)
        .await;
    assert_eq!(gone.status, 404);
}
