mod handler;
pub(crate) mod model;

pub use handler::{create_group, delete_group, group_posts};
