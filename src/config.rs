use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;

/// 内存存储的数据库 URL（本地演示 / 测试）
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub raffle: RaffleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

/// 身份提供方签发的访问令牌校验配置（本服务只校验，不签发）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// false 时邮件只写日志
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Employee Portal".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaffleConfig {
    /// 中奖者确认领奖的时间窗口（秒）
    pub claim_window_secs: i64,
    /// 后台清理过期领奖窗口的间隔（秒）
    pub sweep_interval_secs: u64,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            claim_window_secs: 30,
            sweep_interval_secs: 5,
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)
                .with_context(|| format!("Failed to parse config file {config_path}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_defaults()?,
            Err(e) => {
                return Err(anyhow!("Failed to read config file {config_path}: {e}"));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(config_str: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(config_str)?)
    }

    fn from_env_defaults() -> anyhow::Result<Self> {
        // 数据库 URL 在无配置文件时必须提供
        let database_url = get_env("DATABASE_URL")
            .ok_or_else(|| anyhow!("DATABASE_URL is not set and config.toml was not found"))?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
            },
            smtp: SmtpConfig::default(),
            raffle: RaffleConfig::default(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }

        // SMTP
        if let Ok(v) = env::var("SMTP_ENABLED")
            && let Ok(b) = v.parse()
        {
            self.smtp.enabled = b;
        }
        if let Ok(v) = env::var("SMTP_HOST") {
            self.smtp.host = v;
        }
        if let Ok(v) = env::var("SMTP_PORT")
            && let Ok(p) = v.parse()
        {
            self.smtp.port = p;
        }
        if let Ok(v) = env::var("SMTP_USER") {
            self.smtp.username = v;
        }
        if let Ok(v) = env::var("SMTP_PASSWORD") {
            self.smtp.password = v;
        }
        if let Ok(v) = env::var("SMTP_FROM") {
            self.smtp.from_email = v;
        }

        // Raffle
        if let Ok(v) = env::var("RAFFLE_CLAIM_WINDOW_SECS")
            && let Ok(n) = v.parse()
        {
            self.raffle.claim_window_secs = n;
        }
        if let Ok(v) = env::var("RAFFLE_SWEEP_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.raffle.sweep_interval_secs = n;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.raffle.claim_window_secs <= 0 {
            return Err(anyhow!("raffle.claim_window_secs must be positive"));
        }
        if self.raffle.sweep_interval_secs == 0 {
            return Err(anyhow!("raffle.sweep_interval_secs must be positive"));
        }
        if self.smtp.enabled && self.smtp.host.is_empty() {
            return Err(anyhow!("smtp.host is required when smtp.enabled = true"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 9000

        [database]
        url = "memory://"
        max_connections = 5

        [jwt]
        secret = "test-secret"
    "#;

    #[test]
    fn test_parse_applies_section_defaults() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.database.is_memory());
        assert!(!config.smtp.enabled);
        assert_eq!(config.raffle.claim_window_secs, 30);
        assert_eq!(config.raffle.sweep_interval_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_claim_window() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.raffle.claim_window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_smtp_host_when_enabled() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.smtp.enabled = true;
        assert!(config.validate().is_err());
        config.smtp.host = "smtp.example.com".into();
        assert!(config.validate().is_ok());
    }
}
