mod handler;
pub(crate) mod model;

pub use handler::{add_comment, index, post_create, post_delete, post_detail, post_edit};
