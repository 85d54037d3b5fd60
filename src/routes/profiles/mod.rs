mod handler;

pub use handler::profile;
