use chrono::{Duration, Utc};
use common::EventStatus;
use common::slug::slugify;
use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::entity::{artist, contact_message, event, event_artist, gallery_image, role, role_permission, user, venue};
use crate::utils::hash::hash_password;

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["admin", "editor", "member"];

/// Permissions known to the API.
pub const PERMISSIONS: &[&str] = &[
    "artist:manage",
    "event:manage",
    "venue:manage",
    "ticket:manage",
    "gallery:manage",
    "contact:manage",
    "user:manage",
];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: all permissions
    ("admin", "artist:manage"),
    ("admin", "event:manage"),
    ("admin", "venue:manage"),
    ("admin", "ticket:manage"),
    ("admin", "gallery:manage"),
    ("admin", "contact:manage"),
    ("admin", "user:manage"),
    // Editor: content and inbox, no account management
    ("editor", "artist:manage"),
    ("editor", "event:manage"),
    ("editor", "venue:manage"),
    ("editor", "ticket:manage"),
    ("editor", "gallery:manage"),
    ("editor", "contact:manage"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(OnConflict::column(role::Column::Name).do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => roles_inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => perms_inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: String) {
    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}

/// Ensure required database indexes exist.
///
/// Schema sync does not create composite indexes, so they are created here
/// on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Duplicate and volume checks:
    // SELECT ... FROM contact_message WHERE email = ? AND created_at > ?
    create_index(
        db,
        "idx_contact_message_email_created",
        Index::create()
            .if_not_exists()
            .name("idx_contact_message_email_created")
            .table(contact_message::Entity)
            .col(contact_message::Column::Email)
            .col(contact_message::Column::CreatedAt)
            .to_string(PostgresQueryBuilder),
    )
    .await;

    create_index(
        db,
        "idx_event_date",
        Index::create()
            .if_not_exists()
            .name("idx_event_date")
            .table(event::Entity)
            .col(event::Column::Date)
            .to_string(PostgresQueryBuilder),
    )
    .await;

    // One line-up slot per artist and event.
    create_index(
        db,
        "uq_event_artist_pair",
        Index::create()
            .if_not_exists()
            .unique()
            .name("uq_event_artist_pair")
            .table(event_artist::Entity)
            .col(event_artist::Column::EventId)
            .col(event_artist::Column::ArtistId)
            .to_string(PostgresQueryBuilder),
    )
    .await;

    create_index(
        db,
        "idx_gallery_image_event",
        Index::create()
            .if_not_exists()
            .name("idx_gallery_image_event")
            .table(gallery_image::Entity)
            .col(gallery_image::Column::EventId)
            .to_string(PostgresQueryBuilder),
    )
    .await;

    Ok(())
}

/// Password given to every demo account.
pub const DEMO_PASSWORD: &str = "stagehand-demo";

const DEMO_USERS: &[(&str, &str, &str, &str)] = &[
    ("Admin", "User", "admin@stagehand.local", "admin"),
    ("Edith", "Editor", "editor@stagehand.local", "editor"),
    ("Max", "Member", "member@stagehand.local", "member"),
];

const DEMO_ARTISTS: &[(&str, &str, &str)] = &[
    ("Nordlys Kvartet", "jazz", "Four-piece acoustic jazz from Aarhus."),
    ("Bølgeslag", "indie", "Dream-pop trio with a soft spot for tape echo."),
    ("DJ Fyrtårn", "electronic", "House and disco sets, vinyl only."),
];

const DEMO_VENUES: &[(&str, &str, &str)] = &[
    ("Pumpehuset", "Studiestræde 52", "København"),
    ("Train", "Toldbodgade 6", "Aarhus"),
];

/// Counts of demo records created by one [`seed_demo`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DemoSummary {
    pub users: u32,
    pub artists: u32,
    pub venues: u32,
    pub events: u32,
    pub lineup: u32,
}

/// Insert sample users, artists, venues, events and line-up entries.
///
/// Records that already exist (matched on email, slug, venue name or event
/// title) are left alone, so the function can be rerun.
pub async fn seed_demo(db: &DatabaseConnection) -> anyhow::Result<DemoSummary> {
    let mut summary = DemoSummary::default();
    let now = Utc::now();

    let password = hash_password(DEMO_PASSWORD)
        .map_err(|e| anyhow::anyhow!("failed to hash demo password: {e}"))?;
    for &(first, last, email, role) in DEMO_USERS {
        let exists = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }
        user::ActiveModel {
            id: Set(Uuid::now_v7()),
            first_name: Set(first.into()),
            last_name: Set(last.into()),
            email: Set(email.into()),
            password: Set(password.clone()),
            role: Set(role.into()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        summary.users += 1;
    }

    let mut artist_ids = Vec::new();
    for &(name, genre, bio) in DEMO_ARTISTS {
        let slug = slugify(name);
        if let Some(existing) = artist::Entity::find()
            .filter(artist::Column::Slug.eq(&slug))
            .one(db)
            .await?
        {
            artist_ids.push(existing.id);
            continue;
        }
        let model = artist::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.into()),
            slug: Set(slug),
            bio: Set(Some(bio.into())),
            genre: Set(Some(genre.into())),
            is_bookable: Set(true),
            embeddings: Set(serde_json::json!([])),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        artist_ids.push(model.id);
        summary.artists += 1;
    }

    let mut venue_ids = Vec::new();
    for &(name, address, city) in DEMO_VENUES {
        if let Some(existing) = venue::Entity::find()
            .filter(venue::Column::Name.eq(name))
            .one(db)
            .await?
        {
            venue_ids.push(existing.id);
            continue;
        }
        let model = venue::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.into()),
            address: Set(address.into()),
            city: Set(Some(city.into())),
            images: Set(serde_json::json!([])),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        venue_ids.push(model.id);
        summary.venues += 1;
    }

    let today = now.date_naive();
    let demo_events = [
        ("Sommerjazz i Haven", 14, "19:30", 15_000, venue_ids.first()),
        ("Indie Night", 30, "20:00", 12_000, venue_ids.get(1)),
    ];
    for (i, (title, days_ahead, start, price, venue_id)) in demo_events.into_iter().enumerate() {
        let exists = event::Entity::find()
            .filter(event::Column::Title.eq(title))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }
        let model = event::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(title.into()),
            description: Set(format!("{title}. Doors open half an hour before the show.")),
            date: Set(today + Duration::days(days_ahead)),
            start_time: Set(start.into()),
            ticket_price: Set(price),
            total_tickets: Set(200),
            sold_tickets: Set(0),
            is_active: Set(true),
            status: Set(EventStatus::Published),
            current_attendees: Set(0),
            venue_id: Set(venue_id.copied()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        summary.events += 1;

        // Two acts per event, rotating through the demo artists.
        for slot in 0..2 {
            let Some(&artist_id) = artist_ids.get((i + slot) % artist_ids.len().max(1)) else {
                continue;
            };
            event_artist::ActiveModel {
                id: Set(Uuid::now_v7()),
                event_id: Set(model.id),
                artist_id: Set(artist_id),
                performance_order: Set(Some(slot as i32 + 1)),
                set_duration: Set(Some(45)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
            summary.lineup += 1;
        }
    }

    info!(?summary, "Demo data seeded");
    Ok(summary)
}
