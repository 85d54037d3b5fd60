// Feed page cache. Pages are cached under an epoch-versioned key with a
// short TTL; writers bump the epoch instead of deleting page keys, and the
// superseded entries expire on their own.

pub mod feed;
pub mod keys;

pub use feed::FeedCache;
