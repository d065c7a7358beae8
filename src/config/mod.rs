use std::env;
use std::path::PathBuf;

/// A username/password pair allowed to provision its own account on first login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapCredential {
    pub username: String,
    pub password: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string (default: "sqlite://study_vault.db?mode=rwc")
    pub database_url: String,

    /// Directory holding uploaded blobs (default: "uploads")
    pub upload_dir: PathBuf,

    /// Maximum request body size in bytes (default: 15 MB)
    pub max_file_size: usize,

    /// Maximum records returned by a category listing (default: 50)
    pub list_limit: u64,

    /// HMAC secret for session tokens
    pub jwt_secret: String,

    /// Session lifetime in hours (default: 24)
    pub session_ttl_hours: i64,

    /// Mark the session cookie `Secure` (default: false)
    pub cookie_secure: bool,

    /// Accounts that are created on first successful login (default: none)
    pub bootstrap_users: Vec<BootstrapCredential>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://study_vault.db?mode=rwc".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_file_size: 15 * 1024 * 1024, // 15 MB
            list_limit: 50,
            jwt_secret: "change-me".to_string(),
            session_ttl_hours: 24,
            cookie_secure: false,
            bootstrap_users: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using an insecure default");
            default.jwt_secret.clone()
        });

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            list_limit: env::var("LIST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.list_limit),

            jwt_secret,

            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.session_ttl_hours),

            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.cookie_secure),

            bootstrap_users: env::var("BOOTSTRAP_USERS")
                .map(|v| parse_bootstrap_users(&v))
                .unwrap_or(default.bootstrap_users),
        }
    }

    /// Config for tests and local hacking: everything rooted under `base`.
    pub fn development(base: &std::path::Path) -> Self {
        Self {
            database_url: format!("sqlite://{}?mode=rwc", base.join("test.db").display()),
            upload_dir: base.join("uploads"),
            jwt_secret: "development-secret".to_string(),
            ..Self::default()
        }
    }

    pub fn find_bootstrap(&self, username: &str, password: &str) -> Option<&BootstrapCredential> {
        self.bootstrap_users
            .iter()
            .find(|c| c.username == username && c.password == password)
    }
}

/// Parses `user:pass,user2:pass2`. Entries without a colon or with an empty
/// username are skipped.
pub fn parse_bootstrap_users(raw: &str) -> Vec<BootstrapCredential> {
    raw.split(',')
        .filter_map(|entry| {
            let (username, password) = entry.trim().split_once(':')?;
            if username.is_empty() {
                return None;
            }
            Some(BootstrapCredential {
                username: username.to_string(),
                password: password.to_string(),
            })
        })
        .collect()
}
