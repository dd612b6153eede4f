use serde::Deserialize;

/// Credentials for the account created on first start, if none exists yet.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed {
                email,
                password,
                first_name: std::env::var("ADMIN_FIRST_NAME").unwrap_or_else(|_| "Admin".into()),
                last_name: std::env::var("ADMIN_LAST_NAME").unwrap_or_else(|_| "User".into()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            max_connections,
            admin,
        })
    }
}
