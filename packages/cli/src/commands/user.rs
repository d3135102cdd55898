use anyhow::{Context, bail};
use console::style;
use dialoguer::Password;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use server::entity::{role, user};
use server::models::user::{CreateUserRequest, PASSWORD_MIN};
use server::utils::hash::hash_password;
use uuid::Uuid;

use super::connect;

pub async fn create_user(
    database_url: Option<String>,
    email: String,
    first_name: String,
    last_name: String,
    role_name: String,
) -> anyhow::Result<()> {
    let password = Password::new()
        .with_prompt(format!("Password (min {PASSWORD_MIN} characters)"))
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let request = CreateUserRequest {
        first_name,
        last_name,
        email,
        password,
        phone_number: None,
        address: None,
        image_url: None,
        role: Some(role_name),
    };
    let email = server::models::user::validate_create_user(&request)?;
    let role_name = request.role.unwrap_or_default().trim().to_string();

    let db = connect(database_url).await?;
    if role::Entity::find_by_id(role_name.clone())
        .one(&db)
        .await?
        .is_none()
    {
        bail!("Unknown role '{role_name}'. Run `stagehand migrate` to seed the default roles.");
    }

    let hash = hash_password(&request.password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    let now = chrono::Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        first_name: Set(request.first_name.trim().to_string()),
        last_name: Set(request.last_name.trim().to_string()),
        email: Set(email.clone()),
        password: Set(hash),
        role: Set(role_name.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .with_context(|| format!("Failed to create {email}; the address may already be registered"))?;

    println!(
        "{} Created {} ({}) with id {}",
        style("✔").green(),
        style(&email).bold(),
        role_name,
        model.id
    );
    Ok(())
}
