use sqlx::SqlitePool;

use super::models::{
    ChannelMembershipRecord, ChannelRecord, GENERAL_CHANNEL_DESCRIPTION, GENERAL_CHANNEL_NAME,
    GENERAL_CHANNEL_SLUG,
};

const CHANNEL_COLUMNS: &str =
    "id, community_id, name, slug, description, is_private, is_default, created_at";

const CHANNEL_MEMBERSHIP_COLUMNS: &str = "id, user_id, channel_id, is_owner, is_moderator, \
     is_member, is_blocked, is_pending, receive_notifications, created_at";

pub async fn channels_for_community(
    pool: &SqlitePool,
    community_id: &str,
) -> Result<Vec<ChannelRecord>, sqlx::Error> {
    sqlx::query_as::<_, ChannelRecord>(&format!(
        "SELECT {CHANNEL_COLUMNS} FROM channels WHERE community_id = ? \
         ORDER BY is_default DESC, slug"
    ))
    .bind(community_id)
    .fetch_all(pool)
    .await
}

/// Insert the default "general" channel for a freshly created community.
///
/// `user_id` is the creating user; ownership is recorded separately by
/// [`insert_owner_in_channel`].
pub async fn insert_general_channel(
    pool: &SqlitePool,
    community_id: &str,
    user_id: &str,
) -> Result<ChannelRecord, sqlx::Error> {
    let id = cuid2::create_id();
    tracing::debug!(community_id, user_id, channel_id = %id, "creating general channel");

    sqlx::query_as::<_, ChannelRecord>(&format!(
        "INSERT INTO channels (id, community_id, name, slug, description, is_private, is_default) \
         VALUES (?, ?, ?, ?, ?, 0, 1) RETURNING {CHANNEL_COLUMNS}"
    ))
    .bind(&id)
    .bind(community_id)
    .bind(GENERAL_CHANNEL_NAME)
    .bind(GENERAL_CHANNEL_SLUG)
    .bind(GENERAL_CHANNEL_DESCRIPTION)
    .fetch_one(pool)
    .await
}

pub async fn insert_owner_in_channel(
    pool: &SqlitePool,
    channel_id: &str,
    user_id: &str,
) -> Result<ChannelMembershipRecord, sqlx::Error> {
    let id = cuid2::create_id();
    sqlx::query_as::<_, ChannelMembershipRecord>(&format!(
        "INSERT INTO users_channels \
         (id, user_id, channel_id, is_owner, is_moderator, is_member, is_blocked, is_pending, receive_notifications) \
         VALUES (?, ?, ?, 1, 0, 1, 0, 0, 1) RETURNING {CHANNEL_MEMBERSHIP_COLUMNS}"
    ))
    .bind(&id)
    .bind(user_id)
    .bind(channel_id)
    .fetch_one(pool)
    .await
}

pub async fn channel_owner_ids(
    pool: &SqlitePool,
    channel_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT user_id FROM users_channels WHERE channel_id = ? AND is_owner = 1 ORDER BY created_at",
    )
    .bind(channel_id)
    .fetch_all(pool)
    .await
}
