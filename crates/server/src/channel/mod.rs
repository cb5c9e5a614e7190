pub mod db;
pub mod models;
pub mod queries;

pub use models::{ChannelMembershipRecord, ChannelNode, ChannelRecord};
