//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `5000` |
//! | `TODO_STORE` | `memory` (`memory` or `mongodb`) |
//! | `MONGODB_URI` | required for `mongodb` |
//! | `MONGODB_DATABASE` | `todolist_app_db` |
//! | `MONGODB_COLLECTION` | `todos` |
//! | `CORS_ALLOW_ORIGINS` | `http://localhost:5173` (comma-separated, `*` for any) |
//!
//! A `.env` file in the working directory is loaded first if present.

use std::net::{IpAddr, SocketAddr};

use crate::error::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
#[cfg(feature = "mongodb")]
const DEFAULT_DATABASE: &str = "todolist_app_db";
#[cfg(feature = "mongodb")]
const DEFAULT_COLLECTION: &str = "todos";

/// Which backend holds the todos.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreConfig {
    Memory,
    #[cfg(feature = "mongodb")]
    MongoDb {
        uri: String,
        database: String,
        collection: String,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub store: StoreConfig,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(Error::Config(format!(".env: {e}")));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host: IpAddr = get("HOST")
            .as_deref()
            .unwrap_or(DEFAULT_HOST)
            .parse()
            .map_err(|e| Error::Config(format!("HOST: {e}")))?;

        let port = match get("PORT") {
            Some(p) => p.parse().map_err(|e| Error::Config(format!("PORT `{p}`: {e}")))?,
            None => DEFAULT_PORT,
        };

        let store = match get("TODO_STORE").as_deref().unwrap_or("memory") {
            "memory" => StoreConfig::Memory,
            #[cfg(feature = "mongodb")]
            "mongodb" => StoreConfig::MongoDb {
                uri: get("MONGODB_URI")
                    .ok_or_else(|| Error::Config("MONGODB_URI is required for the mongodb store".into()))?,
                database: get("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.into()),
                collection: get("MONGODB_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.into()),
            },
            #[cfg(not(feature = "mongodb"))]
            "mongodb" => {
                return Err(Error::Config(
                    "TODO_STORE=mongodb but this build lacks the `mongodb` feature".into(),
                ));
            }
            other => return Err(Error::Config(format!("TODO_STORE: unknown store `{other}`"))),
        };

        let cors_origins = get("CORS_ALLOW_ORIGINS")
            .as_deref()
            .unwrap_or(DEFAULT_CORS_ORIGIN)
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Self { addr: SocketAddr::new(host, port), store, cors_origins })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(cfg.store, StoreConfig::Memory);
        assert_eq!(cfg.cors_origins, ["http://localhost:5173"]);
    }

    #[test]
    fn empty_port_falls_back_to_default() {
        let cfg = config(&[("PORT", "")]).unwrap();
        assert_eq!(cfg.addr.port(), 5000);
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        assert!(matches!(config(&[("PORT", "http")]), Err(Error::Config(_))));
    }

    #[test]
    fn unknown_store_is_a_config_error() {
        assert!(matches!(config(&[("TODO_STORE", "redis")]), Err(Error::Config(_))));
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let cfg = config(&[("CORS_ALLOW_ORIGINS", "http://a.test, http://b.test ,")]).unwrap();
        assert_eq!(cfg.cors_origins, ["http://a.test", "http://b.test"]);
    }

    #[cfg(feature = "mongodb")]
    #[test]
    fn mongodb_store_needs_a_uri() {
        assert!(matches!(config(&[("TODO_STORE", "mongodb")]), Err(Error::Config(_))));

        let cfg = config(&[
            ("TODO_STORE", "mongodb"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
        ])
        .unwrap();
        assert_eq!(
            cfg.store,
            StoreConfig::MongoDb {
                uri: "mongodb://localhost:27017".into(),
                database: "todolist_app_db".into(),
                collection: "todos".into(),
            }
        );
    }
}
