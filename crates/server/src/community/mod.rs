pub mod db;
pub mod models;
pub mod mutations;
pub mod queries;
pub mod store;
pub mod workflow;

pub use models::{
    CommunityMembershipRecord, CommunityNode, CommunityRecord, CreateCommunityRequest, NewCommunity,
};
pub use mutations::CreateCommunityInput;
pub use store::{CommunityStore, SqliteCommunityStore};
pub use workflow::{CreateCommunityOutcome, CreateCommunityWorkflow, CreationFailure};
