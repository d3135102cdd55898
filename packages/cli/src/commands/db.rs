use anyhow::Context;
use console::style;
use dialoguer::Confirm;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait, Statement};
use server::entity::{
    artist, contact_message, event, event_artist, gallery_image, ticket, user, venue,
};
use server::seed::DEMO_PASSWORD;

use super::connect;

async fn apply_schema(db: &DatabaseConnection) -> anyhow::Result<()> {
    server::database::sync_schema(db)
        .await
        .context("Schema sync failed")?;
    server::seed::seed_role_permissions(db)
        .await
        .context("Failed to seed roles")?;
    server::seed::ensure_indexes(db).await?;
    Ok(())
}

pub async fn migrate(database_url: Option<String>) -> anyhow::Result<()> {
    let db = connect(database_url).await?;
    apply_schema(&db).await?;
    println!("{} Schema is up to date", style("✔").green());
    Ok(())
}

pub async fn seed(database_url: Option<String>, demo: bool) -> anyhow::Result<()> {
    let db = connect(database_url).await?;
    apply_schema(&db).await?;
    println!("{} Roles and permissions seeded", style("✔").green());

    if demo {
        let summary = server::seed::seed_demo(&db).await?;
        println!(
            "{} Demo data: {} users, {} artists, {} venues, {} events, {} line-up entries",
            style("✔").green(),
            summary.users,
            summary.artists,
            summary.venues,
            summary.events,
            summary.lineup,
        );
        if summary.users > 0 {
            println!(
                "  Demo accounts use the password {}",
                style(DEMO_PASSWORD).bold()
            );
        }
    }
    Ok(())
}

pub async fn reset(database_url: Option<String>, yes: bool) -> anyhow::Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("This drops every table and all data. Continue?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    let db = connect(database_url).await?;
    server::database::drop_all_tables(&db)
        .await
        .context("Failed to drop tables")?;
    println!("{} Dropped all tables", style("✔").yellow());
    apply_schema(&db).await?;
    println!("{} Schema recreated", style("✔").green());
    Ok(())
}

async fn count<E: EntityTrait>(db: &DatabaseConnection, _: E) -> anyhow::Result<u64>
where
    E::Model: Sync,
{
    Ok(E::find().count(db).await?)
}

pub async fn check_db(database_url: Option<String>) -> anyhow::Result<()> {
    let db = connect(database_url).await?;

    let version = db
        .query_one_raw(Statement::from_string(
            DbBackend::Postgres,
            "SELECT version() AS version",
        ))
        .await?
        .map(|row| row.try_get::<String>("", "version"))
        .transpose()?
        .unwrap_or_default();
    println!("{} Connected: {}", style("✔").green(), version);

    let tables = [
        ("user", count(&db, user::Entity).await),
        ("artist", count(&db, artist::Entity).await),
        ("venue", count(&db, venue::Entity).await),
        ("event", count(&db, event::Entity).await),
        ("event_artist", count(&db, event_artist::Entity).await),
        ("ticket", count(&db, ticket::Entity).await),
        ("gallery_image", count(&db, gallery_image::Entity).await),
        ("contact_message", count(&db, contact_message::Entity).await),
    ];
    for (name, rows) in tables {
        match rows {
            Ok(n) => println!("  {:<16} {}", name, n),
            Err(_) => println!("  {:<16} {}", name, style("missing").red()),
        }
    }
    Ok(())
}
