mod handler;
pub(crate) mod model;

pub use handler::{login, register};
