//! Database-backed checks for the public contact form.
//!
//! Callers run these inside one transaction after [`lock_email`], so two
//! concurrent submissions from the same address are serialized.

use std::cmp;

use chrono::{DateTime, Duration, Utc};
use common::contact::ContactSubmission;
use sea_orm::*;
use sha2::{Digest, Sha256};

use crate::entity::contact_message;
use crate::error::AppError;

/// Advisory-lock key for an email: the first 8 bytes of its SHA-256.
pub fn advisory_key(email: &str) -> i64 {
    let digest = Sha256::digest(email.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(bytes)
}

/// Take a transaction-scoped advisory lock for `email`. Released on commit
/// or rollback.
pub async fn lock_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<(), DbErr> {
    db.execute_raw(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1)",
        [advisory_key(email).into()],
    ))
    .await?;
    Ok(())
}

fn seconds_until(expires: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    cmp::max((expires - now).num_seconds(), 1) as u64
}

/// Reject the submission if the same address sent the same message within
/// the window.
pub async fn check_duplicate<C: ConnectionTrait>(
    db: &C,
    submission: &ContactSubmission,
    window_minutes: u32,
) -> Result<(), AppError> {
    let now = Utc::now();
    let window = Duration::minutes(window_minutes.into());

    let previous = contact_message::Entity::find()
        .filter(contact_message::Column::Email.eq(&submission.email))
        .filter(contact_message::Column::Message.eq(&submission.message))
        .filter(contact_message::Column::CreatedAt.gt(now - window))
        .order_by_asc(contact_message::Column::CreatedAt)
        .one(db)
        .await?;

    match previous {
        Some(m) => {
            tracing::warn!(email = %submission.email, "Duplicate contact submission rejected");
            Err(AppError::DuplicateSubmission {
                retry_after: seconds_until(m.created_at + window, now),
            })
        }
        None => Ok(()),
    }
}

/// Reject the submission once the address has `max_per_window` messages
/// inside the window. `max_per_window == 0` disables the cap.
pub async fn check_volume<C: ConnectionTrait>(
    db: &C,
    email: &str,
    window_minutes: u32,
    max_per_window: u32,
) -> Result<(), AppError> {
    if max_per_window == 0 {
        return Ok(());
    }

    let now = Utc::now();
    let window = Duration::minutes(window_minutes.into());
    let since = now - window;

    let count = contact_message::Entity::find()
        .filter(contact_message::Column::Email.eq(email))
        .filter(contact_message::Column::CreatedAt.gt(since))
        .count(db)
        .await?;

    if count >= max_per_window as u64 {
        let oldest = contact_message::Entity::find()
            .filter(contact_message::Column::Email.eq(email))
            .filter(contact_message::Column::CreatedAt.gt(since))
            .order_by_asc(contact_message::Column::CreatedAt)
            .one(db)
            .await?;

        let retry_after = oldest
            .map(|m| seconds_until(m.created_at + window, now))
            .unwrap_or(60);

        tracing::warn!(email, count, "Contact volume cap reached");
        return Err(AppError::RateLimited {
            message: "Too many messages from this email address. Please try again later."
                .into(),
            retry_after,
        });
    }

    Ok(())
}

/// Log heuristic spam matches. Never rejects.
pub fn flag_spam(submission: &ContactSubmission) -> Vec<&'static str> {
    let signals = submission.spam_signals();
    if !signals.is_empty() {
        tracing::warn!(
            email = %submission.email,
            signals = ?signals,
            "Potential spam detected in contact submission"
        );
    }
    signals
}
