// Runtime configuration loaded from environment variables

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_minutes: i64,
    pub allow_user_register: bool,
    pub worker_register_key: String,
    pub database_url: String,
    pub host: String,
    pub port: String,
}

fn require(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{} must be set in environment", name))
}

fn parse_minutes(name: &str, default: i64) -> Result<i64, String> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<i64>()
            .map_err(|_| format!("{} must be a whole number of minutes", name)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            secret_key: require("SECRET_KEY")?,
            access_token_expire_minutes: parse_minutes("ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,
            refresh_token_expire_minutes: parse_minutes(
                "REFRESH_TOKEN_EXPIRE_MINUTES",
                60 * 24 * 7,
            )?,
            allow_user_register: std::env::var("ALLOW_USER_REGISTER")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(true),
            worker_register_key: require("WORKER_REGISTER_KEY")?,
            database_url: require("DATABASE_URL")?,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT").unwrap_or_else(|_| "8080".to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr_joins_host_and_port() {
        let settings = Settings {
            secret_key: "secret".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_minutes: 60 * 24 * 7,
            allow_user_register: true,
            worker_register_key: "key".to_string(),
            database_url: "postgresql://localhost/db".to_string(),
            host: "127.0.0.1".to_string(),
            port: "8080".to_string(),
        };
        assert_eq!(settings.bind_addr(), "127.0.0.1:8080");
    }
}
