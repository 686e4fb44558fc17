use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub storage: StorageConfig,
}

/// Where collections live. Shared by the API server and the maintenance
/// binaries, which do not need the JWT secret.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub snapshot_path: String,
    // Remote document store (optional)
    pub remote_url: Option<String>,
    pub remote_auth: Option<String>,
    pub remote_timeout: Duration,
    /// `None` disables lazy re-probing once the remote store is marked down.
    pub reprobe_every: Option<Duration>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5002".into())
                .parse()?,
            jwt_secret: required("JWT_SECRET")?,
            storage: StorageConfig::from_env()?,
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let timeout_ms: u64 = env::var("REMOTE_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".into())
            .parse()?;
        let reprobe_secs: u64 = env::var("REMOTE_REPROBE_SECS")
            .unwrap_or_else(|_| "0".into())
            .parse()?;
        Ok(Self {
            snapshot_path: env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "data/mock_db.json".into()),
            remote_url: env::var("REMOTE_DB_URL").ok().filter(|s| !s.is_empty()),
            remote_auth: env::var("REMOTE_DB_AUTH").ok().filter(|s| !s.is_empty()),
            remote_timeout: Duration::from_millis(timeout_ms),
            reprobe_every: (reprobe_secs > 0).then(|| Duration::from_secs(reprobe_secs)),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
