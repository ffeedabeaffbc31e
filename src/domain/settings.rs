//! Runtime settings resolved from the config file and the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::error::DashboardError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_POOL_SIZE: i64 = 4;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: i64 = 5;
pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8501";
pub const DEFAULT_STATIC_DIR: &str = "static";

const SUPABASE_POOLER_HOST: &str = "pooler.supabase.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub pool_size: u32,
    /// Upper bound on waiting for a pooled connection.
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub database: DatabaseSettings,
    pub cache_ttl: Duration,
    pub listen: SocketAddr,
    pub static_dir: PathBuf,
}

/// Rewrites a Supabase session-pooler URL (port 5432) to the transaction
/// pooler port 6543 and normalizes the `postgres://` scheme.
pub fn normalize_database_url(url: &str) -> String {
    let url = url.trim();
    let mut out = match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_string(),
    };
    if out.contains(SUPABASE_POOLER_HOST) && out.contains(":5432") {
        out = out.replacen(":5432", ":6543", 1);
    }
    out
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> DashboardError {
    DashboardError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

impl DatabaseSettings {
    /// `env_url` (normally `DATABASE_URL`) wins over `[database] url`.
    pub fn resolve(
        config: &dyn ConfigPort,
        env_url: Option<String>,
    ) -> Result<Self, DashboardError> {
        let url = env_url
            .filter(|u| !u.trim().is_empty())
            .or_else(|| config.get_string("database", "url"))
            .ok_or_else(|| DashboardError::ConfigMissing {
                section: "database".to_string(),
                key: "url".to_string(),
            })?;
        let pool_size = config.get_int("database", "pool_size", DEFAULT_POOL_SIZE);
        let pool_size = u32::try_from(pool_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| invalid("database", "pool_size", "pool_size must be a positive integer"))?;
        let timeout =
            config.get_int("database", "connect_timeout_seconds", DEFAULT_CONNECT_TIMEOUT_SECS);
        let timeout = u64::try_from(timeout).ok().filter(|n| *n > 0).ok_or_else(|| {
            invalid(
                "database",
                "connect_timeout_seconds",
                "connect_timeout_seconds must be a positive integer",
            )
        })?;
        Ok(Self {
            url: normalize_database_url(&url),
            pool_size,
            connect_timeout: Duration::from_secs(timeout),
        })
    }
}

impl AppSettings {
    pub fn resolve(
        config: &dyn ConfigPort,
        env_url: Option<String>,
    ) -> Result<Self, DashboardError> {
        let database = DatabaseSettings::resolve(config, env_url)?;

        let ttl = config.get_int("cache", "ttl_seconds", DEFAULT_CACHE_TTL_SECS);
        let ttl = u64::try_from(ttl)
            .map_err(|_| invalid("cache", "ttl_seconds", "ttl_seconds must be non-negative"))?;

        let listen = config
            .get_string("web", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen: SocketAddr = listen
            .trim()
            .parse()
            .map_err(|e| invalid("web", "listen", format!("{listen:?}: {e}")))?;

        let static_dir = config
            .get_string("web", "static_dir")
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        Ok(Self {
            database,
            cache_ttl: Duration::from_secs(ttl),
            listen,
            static_dir: PathBuf::from(static_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn supabase_session_port_moves_to_transaction_pooler() {
        assert_eq!(
            normalize_database_url(
                "postgres://u:p@aws-0-eu-west-1.pooler.supabase.com:5432/postgres"
            ),
            "postgresql://u:p@aws-0-eu-west-1.pooler.supabase.com:6543/postgres"
        );
    }

    #[test]
    fn plain_urls_keep_their_port() {
        assert_eq!(
            normalize_database_url("postgresql://reader@localhost:5432/trades"),
            "postgresql://reader@localhost:5432/trades"
        );
    }

    #[test]
    fn env_url_overrides_config() {
        let config =
            FileConfigAdapter::from_string("[database]\nurl = postgresql://file/db\n").unwrap();
        let db = DatabaseSettings::resolve(&config, Some("postgresql://env/db".into())).unwrap();
        assert_eq!(db.url, "postgresql://env/db");
        assert_eq!(db.pool_size, 4);
        assert_eq!(db.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn connect_timeout_is_configurable() {
        let config = FileConfigAdapter::from_string(
            "[database]\nurl = postgresql://h/db\nconnect_timeout_seconds = 2\n",
        )
        .unwrap();
        let db = DatabaseSettings::resolve(&config, None).unwrap();
        assert_eq!(db.connect_timeout, Duration::from_secs(2));

        let zero = FileConfigAdapter::from_string(
            "[database]\nurl = postgresql://h/db\nconnect_timeout_seconds = 0\n",
        )
        .unwrap();
        assert!(matches!(
            DatabaseSettings::resolve(&zero, None),
            Err(DashboardError::ConfigInvalid { key, .. }) if key == "connect_timeout_seconds"
        ));
    }

    #[test]
    fn missing_url_is_config_missing() {
        let err = DatabaseSettings::resolve(&FileConfigAdapter::empty(), None).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigMissing { key, .. } if key == "url"));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let config = FileConfigAdapter::from_string(
            "[database]\nurl = postgresql://h/db\npool_size = 0\n",
        )
        .unwrap();
        assert!(matches!(
            DatabaseSettings::resolve(&config, None),
            Err(DashboardError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn app_settings_defaults() {
        let settings =
            AppSettings::resolve(&FileConfigAdapter::empty(), Some("postgresql://h/db".into()))
                .unwrap();
        assert_eq!(settings.cache_ttl, Duration::from_secs(300));
        assert_eq!(settings.listen, "127.0.0.1:8501".parse::<SocketAddr>().unwrap());
        assert_eq!(settings.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn bad_listen_address_is_invalid() {
        let config = FileConfigAdapter::from_string("[web]\nlisten = nowhere\n").unwrap();
        let err = AppSettings::resolve(&config, Some("postgresql://h/db".into())).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { section, .. } if section == "web"));
    }
}
