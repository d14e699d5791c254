//! Server configuration
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | DATABASE_PATH | comanda.db | SQLite 数据库文件 |
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | JWT_SECRET | (dev only) | JWT 签名密钥 |
//! | AUTH_API_KEY | (dev only) | 认证服务共享密钥 |
//! | ENVIRONMENT | development | 运行环境 |
//! | LIVE_CHANNEL_CAPACITY | 256 | 每个实时主题的广播缓冲 |

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file path
    pub database_path: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT secret for session tokens
    pub jwt_secret: String,
    /// Shared secret the auth collaborator presents when minting staff tokens
    pub auth_api_key: String,
    /// Environment: development | staging | production
    pub environment: String,
    /// Capacity of each live topic's broadcast channel
    pub live_channel_capacity: usize,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "comanda.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            auth_api_key: Self::require_secret("AUTH_API_KEY", &environment)?,
            live_channel_capacity: std::env::var("LIVE_CHANNEL_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(256),
            environment,
        })
    }
}
