/// Counter key whose value versions every feed page key.
pub const FEED_EPOCH_KEY: &str = "feed:epoch";

/// Scope label for the site-wide feed, the only scope cached today.
pub const GLOBAL_SCOPE: &str = "global";

pub fn feed_page_key(epoch: u64, scope: &str, page: u32) -> String {
    format!("feed:{}:{}:{}", epoch, scope, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_keys_embed_epoch_scope_and_page() {
        assert_eq!(feed_page_key(0, GLOBAL_SCOPE, 1), "feed:0:global:1");
        assert_eq!(feed_page_key(3, GLOBAL_SCOPE, 12), "feed:3:global:12");
    }

    #[test]
    fn bumped_epoch_changes_every_page_key() {
        assert_ne!(
            feed_page_key(1, GLOBAL_SCOPE, 1),
            feed_page_key(2, GLOBAL_SCOPE, 1)
        );
    }
}
