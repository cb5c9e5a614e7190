#[derive(Clone, Debug, sqlx::FromRow)]
pub struct CommunityRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub creator_id: String,
    pub created_at: String,
}

/// A community creation request as submitted, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateCommunityRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
}

/// A creation request whose slug has already been sanitized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCommunity {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub website: Option<String>,
}

/// A user's relationship to a community (`users_communities`).
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct CommunityMembershipRecord {
    pub id: String,
    pub user_id: String,
    pub community_id: String,
    pub is_owner: bool,
    pub is_moderator: bool,
    pub is_member: bool,
    pub is_blocked: bool,
    pub is_pending: bool,
    pub receive_notifications: bool,
    pub reputation: i64,
    pub created_at: String,
}

#[derive(Clone)]
pub struct CommunityNode(pub CommunityRecord);

impl From<CommunityRecord> for CommunityNode {
    fn from(record: CommunityRecord) -> Self {
        CommunityNode(record)
    }
}
