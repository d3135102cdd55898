use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

mod login {
    use super::*;

    #[tokio::test]
    async fn user_can_log_in_with_valid_credentials() {
        let app = TestApp::spawn().await;
        app.insert_user("ada@example.com", "editor").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "ada@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["user"]["email"], "ada@example.com");
        assert!(res.body["user"].get("password").is_none());
        let permissions = res.body["permissions"].as_array().unwrap();
        assert!(permissions.contains(&json!("artist:manage")));
        assert!(!permissions.contains(&json!("user:manage")));
    }

    #[tokio::test]
    async fn email_is_matched_case_insensitively() {
        let app = TestApp::spawn().await;
        app.insert_user("ada@example.com", "member").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "  ADA@Example.com ", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.insert_user("ada@example.com", "member").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "ada@example.com", "password": "not-the-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_email_gets_the_same_error_as_a_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "nobody@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"email": 42}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn returns_the_current_user() {
        let app = TestApp::spawn().await;
        let token = app.create_user_with_role("max@example.com", "member").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["user"]["email"], "max@example.com");
        assert_eq!(res.body["user"]["role"], "member");
        assert_eq!(res.body["permissions"], json!([]));
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_a_garbage_token() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not.a.jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}
