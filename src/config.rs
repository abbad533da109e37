use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed path of the local auth database, created on first start.
    pub database_path: PathBuf,
    pub reports_dir: PathBuf,
    pub secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub log_level: String,
    pub crawler: CrawlerConfig,
    pub smtp: Option<SmtpConfig>,
    /// Managed auth provider credentials, if configured. This build only
    /// ships the local fallback; presence is detected and reported at
    /// startup so the operator knows which backend was selected.
    pub managed_auth: Option<ManagedAuthConfig>,
}

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct ManagedAuthConfig {
    pub url: String,
    pub key: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_path = PathBuf::from(env_or("PAGECHECK_DB_PATH", "data/auth.db"));
        let reports_dir = PathBuf::from(env_or("PAGECHECK_REPORTS_DIR", "data/reports"));

        let secret = env_or("PAGECHECK_SECRET", "dev-secret-key");

        let host: IpAddr = env_or("PAGECHECK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PAGECHECK_HOST: {e}"))?;

        let port: u16 = env_or("PAGECHECK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PAGECHECK_PORT: {e}"))?;

        let base_url = env_or("PAGECHECK_BASE_URL", &format!("http://{host}:{port}"));

        let log_level = env_or("PAGECHECK_LOG_LEVEL", "info");

        let crawler = CrawlerConfig {
            connect_timeout_secs: env_or("PAGECHECK_CONNECT_TIMEOUT", "5")
                .parse()
                .map_err(|e| format!("Invalid PAGECHECK_CONNECT_TIMEOUT: {e}"))?,
            read_timeout_secs: env_or("PAGECHECK_READ_TIMEOUT", "30")
                .parse()
                .map_err(|e| format!("Invalid PAGECHECK_READ_TIMEOUT: {e}"))?,
        };

        let smtp = match (
            std::env::var("PAGECHECK_SMTP_HOST").ok(),
            std::env::var("PAGECHECK_SMTP_PORT").ok(),
            std::env::var("PAGECHECK_SMTP_USER").ok(),
            std::env::var("PAGECHECK_SMTP_PASS").ok(),
            std::env::var("PAGECHECK_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid PAGECHECK_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        let managed_auth = match (
            std::env::var("PAGECHECK_AUTH_PROVIDER_URL").ok(),
            std::env::var("PAGECHECK_AUTH_PROVIDER_KEY").ok(),
        ) {
            (Some(url), Some(key)) => Some(ManagedAuthConfig { url, key }),
            _ => None,
        };

        Ok(Config {
            database_path,
            reports_dir,
            secret,
            host,
            port,
            base_url,
            log_level,
            crawler,
            smtp,
            managed_auth,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
