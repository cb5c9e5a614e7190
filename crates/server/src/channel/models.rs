/// Name, slug and description of the channel every new community starts with.
pub const GENERAL_CHANNEL_NAME: &str = "General";
pub const GENERAL_CHANNEL_SLUG: &str = "general";
pub const GENERAL_CHANNEL_DESCRIPTION: &str = "General chatter";

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ChannelRecord {
    pub id: String,
    pub community_id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub is_default: bool,
    pub created_at: String,
}

/// A user's relationship to a channel (`users_channels`).
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ChannelMembershipRecord {
    pub id: String,
    pub user_id: String,
    pub channel_id: String,
    pub is_owner: bool,
    pub is_moderator: bool,
    pub is_member: bool,
    pub is_blocked: bool,
    pub is_pending: bool,
    pub receive_notifications: bool,
    pub created_at: String,
}

#[derive(Clone)]
pub struct ChannelNode(pub ChannelRecord);

impl From<ChannelRecord> for ChannelNode {
    fn from(record: ChannelRecord) -> Self {
        ChannelNode(record)
    }
}
