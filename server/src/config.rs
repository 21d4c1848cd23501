use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::Context;

/// Where the static server listens and what it serves. Read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Output directory of the frontend build.
    pub dist_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            dist_dir: PathBuf::from("frontend/dist"),
            log_dir: PathBuf::from("server/log"),
        }
    }
}

impl ServerConfig {
    /// Reads `SERVER_ADDR`, `DIST_DIR` and `LOG_DIR`, falling back to the
    /// defaults. A `.env` file is loaded first when present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let addr = match lookup("SERVER_ADDR") {
            Some(raw) => raw.parse().with_context(|| format!("SERVER_ADDR is not a socket address: {raw}"))?,
            None => defaults.addr,
        };

        Ok(Self {
            addr,
            dist_dir: lookup("DIST_DIR").map(PathBuf::from).unwrap_or(defaults.dist_dir),
            log_dir: lookup("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
        })
    }
}
