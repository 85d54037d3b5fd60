use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub page_count: u32,
    pub feed_cache_ttl_secs: u64,
    pub login_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = env::var("JWT_EXPIRATION")?
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            page_count: env::var("PAGE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            feed_cache_ttl_secs: env::var("FEED_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            login_url: env::var("LOGIN_URL").unwrap_or_else(|_| "/auth/login/".into()),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn feed_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.feed_cache_ttl_secs)
    }
}

#[cfg(test)]
impl Config {
    /// Config with inert endpoints, for router tests that never touch the
    /// database or Redis.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/test".into(),
            redis_url: "redis://localhost/".into(),
            jwt_secret: "test-secret".into(),
            jwt_expiration_secs: 3600,
            server_host: "127.0.0.1".into(),
            server_port: 0,
            page_count: 10,
            feed_cache_ttl_secs: 20,
            login_url: "/auth/login/".into(),
        }
    }
}
