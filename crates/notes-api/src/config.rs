//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `HOST` / `PORT` | `0.0.0.0` / `3000` |
//! | `NOTES_STORE` | `file` (`file`, `postgres`, `memory`) |
//! | `NOTES_FILE` | `data/notes.json` |
//! | `DATABASE_URL` | unset; overrides the `PG*` variables |
//! | `PGHOST` `PGPORT` `PGUSER` `PGPASSWORD` `PGDATABASE` | `localhost` `5432` `postgres` unset `notes` |
//! | `DB_MAX_CONNECTIONS` / `DB_MIN_CONNECTIONS` | `10` / `1` |
//! | `DB_CONNECT_TIMEOUT_SECS` | `30` |
//! | `APP_ENV` / `NODE_ENV` | `development`; `production` forces TLS to the database |
//! | `STATIC_DIR` | the crate's `static/` directory |
//! | `ALLOWED_ORIGINS` | unset (any origin) |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use notes_core::{Error, NoteStore, Result};
use notes_db::{
    create_pool_with_config, DatabaseSettings, InMemoryNoteStore, JsonFileStore, PgNoteStore,
    PoolConfig,
};
use tracing::info;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_NOTES_FILE: &str = "data/notes.json";
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Which persistence backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" | "json" => Ok(StoreKind::File),
            "postgres" | "postgresql" | "pg" | "db" => Ok(StoreKind::Postgres),
            "memory" | "mem" => Ok(StoreKind::Memory),
            other => Err(Error::Config(format!(
                "unknown NOTES_STORE '{}': expected file, postgres, or memory",
                other
            ))),
        }
    }
}

/// Backend selection plus its parameters.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    File {
        path: PathBuf,
    },
    Postgres {
        settings: DatabaseSettings,
        pool: PoolConfig,
    },
    Memory,
}

impl StoreConfig {
    pub fn kind(&self) -> StoreKind {
        match self {
            StoreConfig::File { .. } => StoreKind::File,
            StoreConfig::Postgres { .. } => StoreKind::Postgres,
            StoreConfig::Memory => StoreKind::Memory,
        }
    }

    /// Construct the configured store. For PostgreSQL this connects the
    /// pool and makes sure the `notes` table exists.
    pub async fn open(&self) -> Result<Arc<dyn NoteStore>> {
        match self {
            StoreConfig::File { path } => {
                info!(subsystem = "api", backend = "file", path = %path.display(), "Using JSON file store");
                Ok(Arc::new(JsonFileStore::new(path.clone())))
            }
            StoreConfig::Postgres { settings, pool } => {
                info!(subsystem = "api", backend = "postgres", "Connecting to database...");
                let pool = create_pool_with_config(settings, pool.clone()).await?;
                let store = PgNoteStore::new(pool);
                store.ensure_schema().await?;
                Ok(Arc::new(store))
            }
            StoreConfig::Memory => {
                info!(subsystem = "api", backend = "memory", "Using in-memory store; notes are lost on exit");
                Ok(Arc::new(InMemoryNoteStore::new()))
            }
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub static_dir: PathBuf,
    /// `None` allows any origin.
    pub allowed_origins: Option<Vec<String>>,
    pub production: bool,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let production = get("APP_ENV")
            .or_else(|| get("NODE_ENV"))
            .is_some_and(|env| env.eq_ignore_ascii_case("production"));

        let port = match get("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let kind = match get("NOTES_STORE") {
            Some(raw) => raw.parse()?,
            None => StoreKind::File,
        };

        let store = match kind {
            StoreKind::File => StoreConfig::File {
                path: get("NOTES_FILE")
                    .unwrap_or_else(|| DEFAULT_NOTES_FILE.to_string())
                    .into(),
            },
            StoreKind::Memory => StoreConfig::Memory,
            StoreKind::Postgres => {
                let defaults = DatabaseSettings::default();
                let settings = DatabaseSettings {
                    url: get("DATABASE_URL"),
                    host: get("PGHOST").unwrap_or(defaults.host),
                    port: match get("PGPORT") {
                        Some(raw) => parse_number::<u16>("PGPORT", &raw)?,
                        None => defaults.port,
                    },
                    user: get("PGUSER").unwrap_or(defaults.user),
                    password: get("PGPASSWORD"),
                    database: get("PGDATABASE").unwrap_or(defaults.database),
                    require_tls: production,
                };
                let mut pool = PoolConfig::default();
                if let Some(raw) = get("DB_MAX_CONNECTIONS") {
                    pool = pool.max_connections(parse_number::<u32>("DB_MAX_CONNECTIONS", &raw)?);
                }
                if let Some(raw) = get("DB_MIN_CONNECTIONS") {
                    pool = pool.min_connections(parse_number::<u32>("DB_MIN_CONNECTIONS", &raw)?);
                }
                if let Some(raw) = get("DB_CONNECT_TIMEOUT_SECS") {
                    let secs = parse_number::<u64>("DB_CONNECT_TIMEOUT_SECS", &raw)?;
                    pool = pool.connect_timeout(Duration::from_secs(secs));
                }
                StoreConfig::Postgres { settings, pool }
            }
        };

        let allowed_origins = get("ALLOWED_ORIGINS").map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            store,
            static_dir: get("STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
            allowed_origins,
            production,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid HOST/PORT: {}", e)))
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", key, raw)))
}
