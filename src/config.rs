use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
    /// Shared secret for verifying identity-provider webhooks. Absence is
    /// tolerated at startup and reported per-request with a 500.
    pub clerk_webhook_secret: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth = AuthConfig {
            jwt_secret: std::env::var("AUTH_JWT_SECRET")?,
            issuer: std::env::var("AUTH_ISSUER").unwrap_or_else(|_| "hypeshelf".into()),
            audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "hypeshelf-users".into()),
        };
        let clerk_webhook_secret = std::env::var("CLERK_WEBHOOK_SECRET").ok();
        Ok(Self {
            database_url,
            auth,
            clerk_webhook_secret,
        })
    }
}
