pub mod follows;
pub mod groups;
pub mod posts;
pub mod profiles;
pub mod user;
