use serde_json::json;

use crate::common::{TestApp, png_bytes, routes};

const SPOTIFY: &str = r#"<iframe src="https://open.spotify.com/embed/track/4uLU6hMCjMI75M1A2tKUQC" width="300" height="380"></iframe>"#;
const YOUTUBE: &str = r#"<iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ" title="Live at Vega" onload="steal()"></iframe>"#;

#[tokio::test]
async fn create_derives_unique_slugs() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let first = app
        .post_with_token(routes::ARTISTS, &json!({"name": "Nordlys Kvartet"}), &admin)
        .await;
    assert_eq!(first.status, 201, "{}", first.text);
    assert_eq!(first.body["slug"], "nordlys-kvartet");
    assert_eq!(first.body["embeddings"], json!([]));
    assert_eq!(first.body["isBookable"], false);

    let second = app
        .post_with_token(routes::ARTISTS, &json!({"name": "Nordlys  Kvartet!"}), &admin)
        .await;
    assert_eq!(second.status, 201, "{}", second.text);
    assert_eq!(second.body["slug"], "nordlys-kvartet-2");

    let by_slug = app
        .get_without_token(&routes::artist_by_slug("nordlys-kvartet-2"))
        .await;
    assert_eq!(by_slug.status, 200);
    assert_eq!(by_slug.id(), second.id());
}

#[tokio::test]
async fn writes_require_artist_permission() {
    let app = TestApp::spawn().await;
    let member = app.create_user_with_role("m@example.com", "member").await;

    let res = app
        .post_with_token(routes::ARTISTS, &json!({"name": "Nobody"}), &member)
        .await;
    assert_eq!(res.status, 403);

    let res = app
        .post_without_token(routes::ARTISTS, &json!({"name": "Nobody"}))
        .await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn name_is_validated() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app
        .post_with_token(routes::ARTISTS, &json!({"name": " "}), &admin)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn list_filters_by_genre_and_search() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    for (name, genre) in [("Alpha", "Jazz"), ("Bravo", "indie"), ("Charlie", "jazz")] {
        let res = app
            .post_with_token(routes::ARTISTS, &json!({"name": name, "genre": genre}), &admin)
            .await;
        assert_eq!(res.status, 201);
    }

    let jazz = app
        .get_without_token(&format!("{}?genre=JAZZ", routes::ARTISTS))
        .await;
    assert_eq!(jazz.status, 200, "{}", jazz.text);
    let names: Vec<_> = jazz.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Alpha", "Charlie"]);

    let search = app
        .get_without_token(&format!("{}?search=rav", routes::ARTISTS))
        .await;
    assert_eq!(search.body["pagination"]["total"], 1);
    assert_eq!(search.body["data"][0]["name"], "Bravo");
}

#[tokio::test]
async fn update_is_partial_and_slug_conflicts_are_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let a = app.create_artist(&admin, "First Act").await;
    app.create_artist(&admin, "Second Act").await;

    let res = app
        .put_with_token(&routes::artist(a), &json!({"bio": "From Aarhus."}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["bio"], "From Aarhus.");
    assert_eq!(res.body["genre"], "jazz");

    let res = app
        .put_with_token(&routes::artist(a), &json!({"genre": null}), &admin)
        .await;
    assert_eq!(res.status, 200);
    assert!(res.body["genre"].is_null());
    assert_eq!(res.body["bio"], "From Aarhus.");

    let res = app
        .put_with_token(&routes::artist(a), &json!({"slug": "second-act"}), &admin)
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn delete_removes_artist() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let id = app.create_artist(&admin, "Short Lived").await;

    let res = app.delete_with_token(&routes::artist(id), &admin).await;
    assert_eq!(res.status, 204);

    let res = app.get_without_token(&routes::artist(id)).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn embed_lifecycle_keeps_id_and_sanitizes() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let artist = app.create_artist(&admin, "Bølgeslag").await;

    let added = app
        .post_with_token(
            &routes::embeddings(artist),
            &json!({"embedCode": SPOTIFY}),
            &admin,
        )
        .await;
    assert_eq!(added.status, 201, "{}", added.text);
    assert_eq!(added.body["platform"], "spotify");
    assert_eq!(added.body["embedCode"], SPOTIFY);
    let embed_id = added.body["id"].as_str().unwrap().to_string();
    assert!(embed_id.starts_with("embed_"), "{embed_id}");
    let created_at = added.body["createdAt"].clone();

    let updated = app
        .put_with_token(
            &routes::embedding(artist, &embed_id),
            &json!({"embedCode": YOUTUBE}),
            &admin,
        )
        .await;
    assert_eq!(updated.status, 200, "{}", updated.text);
    assert_eq!(updated.body["id"], embed_id.as_str());
    assert_eq!(updated.body["platform"], "youtube");
    assert_eq!(updated.body["title"], "Live at Vega");
    assert_eq!(updated.body["createdAt"], created_at);
    assert!(updated.body["updatedAt"].is_string());
    let code = updated.body["embedCode"].as_str().unwrap();
    assert!(!code.contains("onload"), "{code}");

    let listed = app.get_without_token(&routes::embeddings(artist)).await;
    assert_eq!(listed.status, 200);
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let artist_body = app.get_without_token(&routes::artist(artist)).await;
    assert_eq!(artist_body.body["embeddings"][0]["id"], embed_id.as_str());

    let removed = app
        .delete_with_token(&routes::embedding(artist, &embed_id), &admin)
        .await;
    assert_eq!(removed.status, 200);
    assert_eq!(removed.body, json!([]));

    let again = app
        .delete_with_token(&routes::embedding(artist, &embed_id), &admin)
        .await;
    assert_eq!(again.status, 404);
}

#[tokio::test]
async fn rejected_embeds_leave_artist_untouched() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let artist = app.create_artist(&admin, "Strict").await;

    let cases = [
        ("", "required"),
        (r#"<iframe src="https://vimeo.com/video/1"></iframe>"#, "Unsupported platform"),
        (
            r#"<iframe title="open.spotify.com/embed" src="https://evil.example/x"></iframe>"#,
            "Invalid Spotify embed URL",
        ),
        ("<div>https://open.spotify.com/embed/track/abc</div>", "missing src"),
    ];
    for (code, expected) in cases {
        let res = app
            .post_with_token(&routes::embeddings(artist), &json!({"embedCode": code}), &admin)
            .await;
        assert_eq!(res.status, 400, "{code}");
        assert_eq!(res.body["code"], "INVALID_EMBED");
        assert!(
            res.body["message"].as_str().unwrap().contains(expected),
            "{code}: {}",
            res.text
        );
    }

    let listed = app.get_without_token(&routes::embeddings(artist)).await;
    assert_eq!(listed.body, json!([]));
}

#[tokio::test]
async fn unknown_embedding_id_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let artist = app.create_artist(&admin, "Lonely").await;

    let res = app
        .put_with_token(
            &routes::embedding(artist, "embed_0_missing00"),
            &json!({"embedCode": SPOTIFY}),
            &admin,
        )
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn validate_endpoint_reports_without_storing() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let ok = app
        .post_with_token(routes::EMBED_VALIDATE, &json!({"embedCode": YOUTUBE}), &admin)
        .await;
    assert_eq!(ok.status, 200, "{}", ok.text);
    assert_eq!(ok.body["isValid"], true);
    assert_eq!(ok.body["platform"], "youtube");
    assert_eq!(
        ok.body["thumbnailUrl"],
        "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
    );
    assert!(!ok.body["sanitizedCode"].as_str().unwrap().contains("onload"));

    let bad = app
        .post_with_token(
            routes::EMBED_VALIDATE,
            &json!({"embedCode": "<p>not an embed</p>"}),
            &admin,
        )
        .await;
    assert_eq!(bad.status, 200);
    assert_eq!(bad.body["isValid"], false);
    assert!(bad.body["error"].is_string());
}

#[tokio::test]
async fn image_upload_sets_image_url() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let artist = app.create_artist(&admin, "Pictured").await;

    let res = app
        .upload_image(&routes::artist_image(artist), "press.png", "image/png", png_bytes(), &[], &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let url = res.body["imageUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/artists/artist-"), "{url}");
    assert!(url.ends_with(".png"), "{url}");

    let served = app.client.get(app.url(&url)).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.headers()["content-type"], "image/png");
    assert_eq!(served.bytes().await.unwrap().as_ref(), png_bytes().as_slice());

    let res = app
        .upload_image(
            &routes::artist_image(artist),
            "press.png",
            "image/png",
            b"GIF89a not really a png".to_vec(),
            &[],
            &admin,
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "INVALID_UPLOAD");
}
