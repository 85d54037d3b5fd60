mod handler;
pub(crate) mod model;

pub use handler::{follow_index, profile_follow, profile_unfollow};
