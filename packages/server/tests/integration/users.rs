use serde_json::json;

use crate::common::{TestApp, routes};

fn new_user(email: &str) -> serde_json::Value {
    json!({
        "firstName": "Mette",
        "lastName": "Hansen",
        "email": email,
        "password": "long-enough-password",
    })
}

#[tokio::test]
async fn admin_can_create_a_user_that_can_log_in() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app
        .post_with_token(routes::USERS, &new_user("Mette@Example.com"), &admin)
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["email"], "mette@example.com");
    assert_eq!(res.body["role"], "member");
    assert!(res.body.get("password").is_none());

    let login = app
        .post_without_token(
            routes::LOGIN,
            &json!({"email": "mette@example.com", "password": "long-enough-password"}),
        )
        .await;
    assert_eq!(login.status, 200, "{}", login.text);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let first = app
        .post_with_token(routes::USERS, &new_user("dup@example.com"), &admin)
        .await;
    assert_eq!(first.status, 201, "{}", first.text);

    let res = app
        .post_with_token(routes::USERS, &new_user("DUP@example.com"), &admin)
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn short_password_and_unknown_role_are_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let mut body = new_user("a@example.com");
    body["password"] = json!("short");
    let res = app.post_with_token(routes::USERS, &body, &admin).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");

    let mut body = new_user("a@example.com");
    body["role"] = json!("superuser");
    let res = app.post_with_token(routes::USERS, &body, &admin).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn editor_cannot_manage_users() {
    let app = TestApp::spawn().await;
    let editor = app.create_user_with_role("ed@example.com", "editor").await;

    let res = app
        .post_with_token(routes::USERS, &new_user("x@example.com"), &editor)
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");

    let res = app.get_with_token(routes::USERS, &editor).await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn list_supports_search_and_pagination() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    for i in 0..3 {
        app.insert_user(&format!("fan{i}@example.com"), "member").await;
    }

    let res = app
        .get_with_token(&format!("{}?search=FAN&perPage=2", routes::USERS), &admin)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
    assert_eq!(res.body["pagination"]["total"], 3);
    assert_eq!(res.body["pagination"]["totalPages"], 2);
}

#[tokio::test]
async fn member_can_edit_own_profile_but_not_role() {
    let app = TestApp::spawn().await;
    let id = app.insert_user("self@example.com", "member").await;
    let token = app.login("self@example.com").await;

    let res = app
        .put_with_token(&routes::user(id), &json!({"phoneNumber": "+45 1234 5678"}), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["phoneNumber"], "+45 1234 5678");

    let res = app
        .put_with_token(&routes::user(id), &json!({"role": "admin"}), &token)
        .await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn member_cannot_read_other_accounts() {
    let app = TestApp::spawn().await;
    let other = app.insert_user("other@example.com", "member").await;
    let token = app.create_user_with_role("me@example.com", "member").await;

    let res = app.get_with_token(&routes::user(other), &token).await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn admin_cannot_delete_self_but_can_delete_others() {
    let app = TestApp::spawn().await;
    let admin_id = app.insert_user("root@example.com", "admin").await;
    let admin = app.login("root@example.com").await;
    let other = app.insert_user("gone@example.com", "member").await;

    let res = app.delete_with_token(&routes::user(admin_id), &admin).await;
    assert_eq!(res.status, 409);

    let res = app.delete_with_token(&routes::user(other), &admin).await;
    assert_eq!(res.status, 204);

    let res = app.get_with_token(&routes::user(other), &admin).await;
    assert_eq!(res.status, 404);
}
