pub mod reserved;
pub mod slug;

pub use reserved::ReservedSlugs;
pub use slug::sanitize_slug;
