use config::{Config, File};
use dotenv::dotenv;
use eyre::{eyre, Result};
use serde::{de::DeserializeOwned, Deserialize};

fn config_from_env() -> Result<AppConfig> {
    dotenv().ok();

    let settings = Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(
            config::Environment::default()
                .separator("__")
                .list_separator(","),
        )
        .build()?;

    settings.try_deserialize().map_err(eyre::Error::from)
}

pub trait LoadFromEnv: Sized + DeserializeOwned {
    fn load() -> Result<Self>;
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub indexer: Option<IndexerConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChainConfig {
    pub http_rpc_url: String,
    pub ws_rpc_url: String,
    pub chain_id: u64,
    #[serde(default)]
    pub start_block: u64,
    #[serde(default = "default_block_sync_batch_size")]
    pub block_sync_batch_size: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ContractConfig {
    pub address: String,
    /// Role hash the contract uses for its admin role. Differs between
    /// deployments (zero hash vs keccak256("DEFAULT_ADMIN_ROLE")).
    pub default_admin_role: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct IndexerSettings {
    #[serde(default = "default_projection_retries")]
    pub projection_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            projection_retries: default_projection_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct IndexerConfig {
    pub database: DatabaseConfig,
    pub chain: ChainConfig,
    pub contract: ContractConfig,
    #[serde(default)]
    pub settings: IndexerSettings,
}

fn default_block_sync_batch_size() -> u64 {
    500
}

fn default_projection_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl LoadFromEnv for IndexerConfig {
    fn load() -> Result<Self> {
        config_from_env()?
            .indexer
            .clone()
            .ok_or_else(|| eyre!("Configuration for the 'indexer' service is missing."))
    }
}
