use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub auth_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "medcheck.db".to_string()),
            auth_url: env::var("AUTH_URL")
                .unwrap_or_else(|_| "http://localhost:4000/verify".to_string()),
        }
    }
}
