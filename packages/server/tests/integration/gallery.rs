use serde_json::json;

use crate::common::{TestApp, png_bytes, routes};

#[tokio::test]
async fn upload_stores_file_and_metadata() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let event = app.create_event(&admin, "Photographed", json!({})).await;
    let event_id = event.to_string();

    let res = app
        .upload_image(
            routes::GALLERY_UPLOAD,
            "crowd.PNG",
            "image/png",
            png_bytes(),
            &[
                ("caption", "Front row"),
                ("photographer", "Mette"),
                ("eventId", &event_id),
                ("tags", "Live, crowd ,live"),
                ("category", "Event"),
                ("orderIndex", "3"),
            ],
            &admin,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["caption"], "Front row");
    assert_eq!(res.body["eventId"], event_id.as_str());
    assert_eq!(res.body["tags"], json!(["live", "crowd"]));
    assert_eq!(res.body["category"], "event");
    assert_eq!(res.body["orderIndex"], 3);
    assert_eq!(res.body["isPublished"], true);
    let url = res.body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/gallery/image-"), "{url}");

    let served = app.client.get(app.url(&url)).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn upload_rejects_non_images() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let cases = [
        ("notes.txt", "text/plain", b"hello".to_vec()),
        ("fake.png", "image/png", b"<svg onload=alert(1)>".to_vec()),
        ("photo.png", "image/jpeg", png_bytes()),
        ("../../escape.png", "image/png", png_bytes()),
    ];
    for (name, mime, bytes) in cases {
        let res = app
            .upload_image(routes::GALLERY_UPLOAD, name, mime, bytes, &[], &admin)
            .await;
        assert_eq!(res.status, 400, "{name}: {}", res.text);
        assert_eq!(res.body["code"], "INVALID_UPLOAD");
    }

    let res = app
        .upload_image(
            routes::GALLERY_UPLOAD,
            "ok.png",
            "image/png",
            png_bytes(),
            &[("category", "poster")],
            &admin,
        )
        .await;
    assert_eq!(res.status, 400);

    let listed = app.get_with_token(routes::GALLERY, &admin).await;
    assert_eq!(listed.body["pagination"]["total"], 0);
}

#[tokio::test]
async fn unpublished_images_are_hidden_from_the_public() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let draft = app
        .upload_image(
            routes::GALLERY_UPLOAD,
            "draft.png",
            "image/png",
            png_bytes(),
            &[("isPublished", "false")],
            &admin,
        )
        .await;
    assert_eq!(draft.status, 201, "{}", draft.text);
    assert_eq!(draft.body["isPublished"], false);

    let public = app
        .post_with_token(
            routes::GALLERY,
            &json!({"filename": "cdn.jpg", "url": "https://cdn.example/cdn.jpg"}),
            &admin,
        )
        .await;
    assert_eq!(public.status, 201, "{}", public.text);

    let anon = app.get_without_token(routes::GALLERY).await;
    assert_eq!(anon.body["pagination"]["total"], 1);
    assert_eq!(anon.body["data"][0]["filename"], "cdn.jpg");

    let hidden = app.get_without_token(&routes::gallery_image(draft.id())).await;
    assert_eq!(hidden.status, 404);

    let as_admin = app
        .get_with_token(&format!("{}?published=false", routes::GALLERY), &admin)
        .await;
    assert_eq!(as_admin.body["pagination"]["total"], 1);
    assert_eq!(as_admin.body["data"][0]["id"], draft.body["id"]);

    let published = app
        .put_with_token(
            &routes::gallery_image(draft.id()),
            &json!({"isPublished": true}),
            &admin,
        )
        .await;
    assert_eq!(published.status, 200, "{}", published.text);
    let visible = app.get_without_token(&routes::gallery_image(draft.id())).await;
    assert_eq!(visible.status, 200);
}

#[tokio::test]
async fn list_filters_by_tag_and_category() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    for (name, tags, category) in [
        ("a.jpg", json!(["live", "crowd"]), "event"),
        ("b.jpg", json!(["backstage"]), "artist"),
        ("c.jpg", json!(["Live"]), "venue"),
    ] {
        let res = app
            .post_with_token(
                routes::GALLERY,
                &json!({
                    "filename": name,
                    "url": format!("https://cdn.example/{name}"),
                    "tags": tags,
                    "category": category,
                }),
                &admin,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let live = app
        .get_without_token(&format!("{}?tag=LIVE", routes::GALLERY))
        .await;
    assert_eq!(live.status, 200, "{}", live.text);
    assert_eq!(live.body["pagination"]["total"], 2);

    let artists = app
        .get_without_token(&format!("{}?category=artist", routes::GALLERY))
        .await;
    assert_eq!(artists.body["pagination"]["total"], 1);
    assert_eq!(artists.body["data"][0]["filename"], "b.jpg");
}

#[tokio::test]
async fn delete_removes_record_and_file() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app
        .upload_image(routes::GALLERY_UPLOAD, "bye.png", "image/png", png_bytes(), &[], &admin)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    let url = res.body["url"].as_str().unwrap().to_string();

    let deleted = app
        .delete_with_token(&routes::gallery_image(res.id()), &admin)
        .await;
    assert_eq!(deleted.status, 204);

    let gone = app.get_with_token(&routes::gallery_image(res.id()), &admin).await;
    assert_eq!(gone.status, 404);
    let file = app.client.get(app.url(&url)).send().await.unwrap();
    assert_eq!(file.status(), 404);
}

#[tokio::test]
async fn member_cannot_upload() {
    let app = TestApp::spawn().await;
    let member = app.create_user_with_role("m@example.com", "member").await;

    let res = app
        .upload_image(routes::GALLERY_UPLOAD, "x.png", "image/png", png_bytes(), &[], &member)
        .await;

    assert_eq!(res.status, 403);
}
