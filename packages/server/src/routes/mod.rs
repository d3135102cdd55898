use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::{
    artist, auth, contact, embedding, event, event_artist, gallery, ticket, uploads, user, venue,
};
use crate::state::AppState;

/// Room for multipart framing and metadata fields on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload_limit = DefaultBodyLimit::max(config.upload.max_size as usize + MULTIPART_OVERHEAD);

    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/artists", artist_routes(upload_limit.clone()))
        .nest("/embeddings", embedding_routes())
        .nest("/venues", venue_routes())
        .nest("/events", event_routes())
        .nest("/event-artists", event_artist_routes())
        .nest("/tickets", ticket_routes())
        .nest("/gallery", gallery_routes(upload_limit))
        .nest("/contact", contact_routes())
}

/// Media served from the upload directory, mounted outside `/api`.
pub fn upload_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(uploads::serve_upload))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::login))
        .routes(routes!(auth::me))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(user::list_users, user::create_user))
        .routes(routes!(user::get_user, user::update_user, user::delete_user))
}

fn artist_routes(upload_limit: DefaultBodyLimit) -> OpenApiRouter<AppState> {
    let image = OpenApiRouter::new()
        .routes(routes!(artist::upload_artist_image))
        .layer(upload_limit);

    OpenApiRouter::new()
        .routes(routes!(artist::list_artists, artist::create_artist))
        .routes(routes!(artist::get_artist_by_slug))
        .routes(routes!(
            artist::get_artist,
            artist::update_artist,
            artist::delete_artist
        ))
        .routes(routes!(embedding::list_embeddings, embedding::add_embedding))
        .routes(routes!(
            embedding::update_embedding,
            embedding::delete_embedding
        ))
        .merge(image)
}

fn embedding_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(embedding::validate_embed))
}

fn venue_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(venue::list_venues, venue::create_venue))
        .routes(routes!(
            venue::get_venue,
            venue::update_venue,
            venue::delete_venue
        ))
}

fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(event::list_events, event::create_event))
        .routes(routes!(
            event::get_event,
            event::update_event,
            event::delete_event
        ))
}

fn event_artist_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            event_artist::list_event_artists,
            event_artist::create_event_artist
        ))
        .routes(routes!(
            event_artist::get_event_artist,
            event_artist::update_event_artist,
            event_artist::delete_event_artist
        ))
        .routes(routes!(event_artist::remove_artist_from_event))
}

fn ticket_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(ticket::list_tickets, ticket::create_ticket))
        .routes(routes!(ticket::get_ticket_by_number))
        .routes(routes!(
            ticket::get_ticket,
            ticket::update_ticket,
            ticket::delete_ticket
        ))
        .routes(routes!(ticket::redeem_ticket))
}

fn gallery_routes(upload_limit: DefaultBodyLimit) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(gallery::upload_gallery_image))
        .layer(upload_limit);

    OpenApiRouter::new()
        .routes(routes!(
            gallery::list_gallery_images,
            gallery::create_gallery_image
        ))
        .routes(routes!(
            gallery::get_gallery_image,
            gallery::update_gallery_image,
            gallery::delete_gallery_image
        ))
        .merge(upload)
}

fn contact_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(contact::list_messages, contact::submit_contact))
        .routes(routes!(
            contact::get_message,
            contact::update_message,
            contact::delete_message
        ))
        .routes(routes!(contact::mark_read))
        .routes(routes!(contact::mark_replied))
        .routes(routes!(contact::archive_message))
}
