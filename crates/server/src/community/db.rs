use std::collections::BTreeSet;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::models::{CommunityMembershipRecord, CommunityRecord, NewCommunity};

const COMMUNITY_COLUMNS: &str = "id, name, slug, description, website, creator_id, created_at";

const COMMUNITY_MEMBERSHIP_COLUMNS: &str = "id, user_id, community_id, is_owner, is_moderator, \
     is_member, is_blocked, is_pending, receive_notifications, reputation, created_at";

pub async fn fetch_community_by_id(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<CommunityRecord>, sqlx::Error> {
    sqlx::query_as::<_, CommunityRecord>(&format!(
        "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_community_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<CommunityRecord>, sqlx::Error> {
    sqlx::query_as::<_, CommunityRecord>(&format!(
        "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE slug = ?"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}

/// Batch lookup of communities by exact slug.
pub async fn fetch_communities_by_slug(
    pool: &SqlitePool,
    slugs: &BTreeSet<String>,
) -> Result<Vec<CommunityRecord>, sqlx::Error> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE slug IN ("
    ));
    let mut separated = builder.separated(", ");
    for slug in slugs {
        separated.push_bind(slug.as_str());
    }
    separated.push_unseparated(") ORDER BY slug");

    builder
        .build_query_as::<CommunityRecord>()
        .fetch_all(pool)
        .await
}

pub async fn fetch_all_communities(pool: &SqlitePool) -> Result<Vec<CommunityRecord>, sqlx::Error> {
    sqlx::query_as::<_, CommunityRecord>(&format!(
        "SELECT {COMMUNITY_COLUMNS} FROM communities ORDER BY slug"
    ))
    .fetch_all(pool)
    .await
}

pub async fn insert_community(
    pool: &SqlitePool,
    community: &NewCommunity,
    creator_id: &str,
) -> Result<CommunityRecord, sqlx::Error> {
    let id = cuid2::create_id();
    sqlx::query_as::<_, CommunityRecord>(&format!(
        "INSERT INTO communities (id, name, slug, description, website, creator_id) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {COMMUNITY_COLUMNS}"
    ))
    .bind(&id)
    .bind(&community.name)
    .bind(&community.slug)
    .bind(community.description.as_deref())
    .bind(community.website.as_deref())
    .bind(creator_id)
    .fetch_one(pool)
    .await
}

/// Whether an insert failed on the `communities.slug` uniqueness constraint.
pub fn is_slug_conflict(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

pub async fn insert_owner_in_community(
    pool: &SqlitePool,
    community_id: &str,
    user_id: &str,
) -> Result<CommunityMembershipRecord, sqlx::Error> {
    let id = cuid2::create_id();
    sqlx::query_as::<_, CommunityMembershipRecord>(&format!(
        "INSERT INTO users_communities \
         (id, user_id, community_id, is_owner, is_moderator, is_member, is_blocked, is_pending, receive_notifications, reputation) \
         VALUES (?, ?, ?, 1, 0, 1, 0, 0, 1, 0) RETURNING {COMMUNITY_MEMBERSHIP_COLUMNS}"
    ))
    .bind(&id)
    .bind(user_id)
    .bind(community_id)
    .fetch_one(pool)
    .await
}

pub async fn community_owner_ids(
    pool: &SqlitePool,
    community_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT user_id FROM users_communities WHERE community_id = ? AND is_owner = 1 ORDER BY created_at",
    )
    .bind(community_id)
    .fetch_all(pool)
    .await
}
