use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub amount_policy: AmountPolicy,
    pub response: ResponseKind,
    pub auth: Option<BasicAuth>,
}

/// Whether amounts may carry satang (two decimal places) or whole Baht only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountPolicy {
    Decimal,
    Integer,
}

impl FromStr for AmountPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "decimal" => Ok(Self::Decimal),
            "integer" => Ok(Self::Integer),
            other => anyhow::bail!(
                "unknown amount policy '{}', expected 'decimal' or 'integer'",
                other
            ),
        }
    }
}

/// What POST /generate answers with on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Page,
    Image,
}

impl FromStr for ResponseKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "page" => Ok(Self::Page),
            "image" => Ok(Self::Image),
            other => anyhow::bail!(
                "unknown response kind '{}', expected 'page' or 'image'",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        // Basic auth is enabled only when both variables are present
        let auth = match (env::var("AUTH_USER"), env::var("AUTH_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(BasicAuth { username, password }),
            (Err(_), Err(_)) => None,
            _ => anyhow::bail!("AUTH_USER and AUTH_PASSWORD must be set together"),
        };

        let config = Config {
            server: ServerConfig {
                host: env_or("HOST", "127.0.0.1"),
                port: parse_env("PORT", "3000")?,
            },
            database: DatabaseConfig {
                host: env_or("DB_HOST", "localhost"),
                port: parse_env("DB_PORT", "5432")?,
                name: env_or("DB_NAME", "qr_code"),
                user: env_or("DB_USER", "postgres"),
                password: env_or("DB_PASSWORD", ""),
                max_connections: parse_env("DB_MAX_CONNECTIONS", "5")?,
            },
            storage: StorageConfig {
                data_dir: env_or("DATA_DIR", "./data"),
            },
            generate: GenerateConfig {
                amount_policy: parse_env("AMOUNT_POLICY", "decimal")?,
                response: parse_env("GENERATE_RESPONSE", "page")?,
                auth,
            },
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.name.is_empty() {
            anyhow::bail!("DB_NAME must not be empty");
        }

        if self.database.user.is_empty() {
            anyhow::bail!("DB_USER must not be empty");
        }

        if self.database.password.is_empty() {
            log::warn!("DB_PASSWORD is empty, acceptable for local development only");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        if self.storage.data_dir.is_empty() {
            anyhow::bail!("DATA_DIR must not be empty");
        }

        if let Some(auth) = &self.generate.auth {
            if auth.username.is_empty() || auth.password.is_empty() {
                anyhow::bail!("AUTH_USER and AUTH_PASSWORD must not be empty");
            }
        }

        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = env_or(key, default);
    raw.parse()
        .map_err(|e| anyhow::anyhow!("invalid {} '{}': {}", key, raw, e))
}
