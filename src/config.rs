use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub const DB_PATH_VAR: &str = "ROWSTORE_DB";
pub const ADDRESS_VAR: &str = "ROWSTORE_ADDR";

const DEFAULT_DB_PATH: &str = "db.json";
const DEFAULT_ADDRESS: &str = concat!("127.0.0.1", ":", "8080");

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub address: SocketAddr,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let db_path = lookup(DB_PATH_VAR).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let address = lookup(ADDRESS_VAR).unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let address = address
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid {ADDRESS_VAR}: {address}"))?;

        Ok(Self {
            db_path: PathBuf::from(db_path),
            address,
        })
    }
}
